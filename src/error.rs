/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / plain-text body, Content-Type は付けない)
 * - upstream の transport error を 502 に変換
 */
use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::upstream::UpstreamError;

/// Every terminal rejection of the advice endpoint.
///
/// The `Display` text is the response body, byte for byte.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Server misconfigured")]
    Misconfigured,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid JSON body")]
    InvalidJson,

    #[error("`hand` and `doras` must be arrays")]
    InvalidShape,

    #[error("Bad Gateway")]
    Upstream(#[from] UpstreamError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidJson | AppError::InvalidShape => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Upstream(err) = &self {
            tracing::error!(error = %err, "upstream request failed");
        }

        let mut res = Response::new(Body::from(self.to_string()));
        *res.status_mut() = self.status();
        res
    }
}
