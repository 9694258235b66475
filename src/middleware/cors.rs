//! CORS policy for the advice endpoint.
//!
//! Note:
//! - The desktop client calls from a custom application-scheme origin
//!   (`app://nanikiru`), which `tower_http::cors::CorsLayer` would simply omit
//!   headers for when unmatched. This API instead always answers with the
//!   three CORS headers and echoes `null` for unknown origins.
//! - This middleware should be applied at the Router level (not inside handlers).
//!
//! Policy:
//! - `Access-Control-Allow-Origin`: the request `Origin` if it is in the
//!   allowlist (exact match), otherwise the literal `null`.
//! - `Access-Control-Allow-Methods: POST, OPTIONS`
//! - `Access-Control-Allow-Headers: Content-Type, X-Advice-Api-Key`
//! - `OPTIONS` (preflight) is answered here with an empty 200.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Config;

pub const ALLOW_METHODS: &str = "POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, X-Advice-Api-Key";

/// Exact-match origin allowlist.
#[derive(Clone, Debug)]
pub struct AllowedOrigins(Arc<[HeaderValue]>);

impl AllowedOrigins {
    pub fn new<'a>(origins: impl IntoIterator<Item = &'a String>) -> Self {
        let origins: Vec<HeaderValue> = origins
            .into_iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();
        Self(origins.into())
    }

    /// Value for `Access-Control-Allow-Origin`.
    pub fn resolve(&self, origin: Option<&HeaderValue>) -> HeaderValue {
        match origin {
            Some(origin) if self.0.iter().any(|v| v == origin) => origin.clone(),
            _ => HeaderValue::from_static("null"),
        }
    }
}

/// Apply the CORS policy to the given Router.
pub fn apply(router: Router, config: &Config) -> Router {
    let allowed = AllowedOrigins::new(&config.cors_allowed_origins);

    router
        .layer(middleware::from_fn_with_state(allowed, cors_middleware))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
}

async fn cors_middleware(
    State(allowed): State<AllowedOrigins>,
    req: Request,
    next: Next,
) -> Response {
    let allow_origin = allowed.resolve(req.headers().get(header::ORIGIN));

    let mut res = if req.method() == Method::OPTIONS {
        tracing::debug!(origin = ?allow_origin, "preflight");
        Response::new(Body::empty())
    } else {
        next.run(req).await
    };

    res.headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    res
}
