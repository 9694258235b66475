/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - path routing はしない: どの path でも同じ advice endpoint (method で振り分け)
 * - api key gate は POST にだけ route_layer で掛ける (405 は key より先に返す)
 * - body size 上限は Bytes extractor 側で判定 (preflight / key check の後)
 */
use axum::{Router, extract::DefaultBodyLimit, middleware, routing::post};

use crate::api::v1::handlers::advice::{advice, method_not_allowed};
use crate::middleware::api_key::require_api_key;
use crate::state::AppState;

pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn routes(state: AppState) -> Router<AppState> {
    let endpoint = post(advice)
        .route_layer(middleware::from_fn_with_state(state, require_api_key))
        .fallback(method_not_allowed);

    Router::new()
        .route("/", endpoint.clone())
        .route("/{*path}", endpoint)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}
