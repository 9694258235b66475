/*
 * Responsibility
 * - middleware の公開インターフェース
 * - cors::apply, http::apply (Router 全体), api_key (POST route のみ)
 */
pub mod api_key;
pub mod cors;
pub mod http;
