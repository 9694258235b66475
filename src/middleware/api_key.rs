//! Shared-secret gate for the advice endpoint.
//!
//! Responsibility:
//! - 設定確認: upstream key / advice key のどちらかが無ければ 500
//! - `X-Advice-Api-Key` が無い・一致しない場合は 401
//! - 通過したら UpstreamCredentials を request extensions に入れる
//!
//! Applied with `route_layer` on the POST route only, so unsupported methods
//! are rejected with 405 before the key is looked at.

use axum::{
    extract::{Request, State},
    http::HeaderName,
    middleware::Next,
    response::Response,
};

use crate::api::v1::extractors::UpstreamCredentials;
use crate::error::AppError;
use crate::state::AppState;

pub const ADVICE_API_KEY_HEADER: HeaderName = HeaderName::from_static("x-advice-api-key");

pub async fn require_api_key(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(creds) = state.config.credentials() else {
        tracing::error!(
            missing = ?state.config.missing_secrets(),
            "server misconfigured: secrets not set"
        );
        return Err(AppError::Misconfigured);
    };

    // Plain comparison; the shared secret is not a per-user credential.
    let provided = req
        .headers()
        .get(&ADVICE_API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided != Some(creds.advice_api_key) {
        tracing::warn!(present = provided.is_some(), "advice api key rejected");
        return Err(AppError::Unauthorized);
    }

    // middleware → extractor への受け渡し
    req.extensions_mut()
        .insert(UpstreamCredentials::new(creds.openai_api_key));

    Ok(next.run(req).await)
}
