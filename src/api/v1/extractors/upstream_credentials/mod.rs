/*!
 * Upstream credentials extractor
 *
 * Responsibility:
 * - api_key middleware が検証済みの upstream key を handler に渡す
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 */

mod core;
mod types;

pub use core::UpstreamCredentialsExtractor;
pub use types::UpstreamCredentials;
