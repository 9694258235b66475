use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

use super::UpstreamCredentials;

/// Handler で UpstreamCredentials を受け取るための extractor
/// middleware が request.extensions() に insert 済みである前提
/// 見つからない場合は middleware 未設定なので 500 (Server misconfigured)
pub struct UpstreamCredentialsExtractor(pub UpstreamCredentials);

impl FromRequestParts<AppState> for UpstreamCredentialsExtractor
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UpstreamCredentials>()
            .cloned()
            .map(UpstreamCredentialsExtractor)
            .ok_or(AppError::Misconfigured)
    }
}
