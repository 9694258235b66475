/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - config: 起動時に確定した immutable な設定 (secrets 含む)
 *   - upstream: chat-completion client
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::{config::Config, services::upstream::UpstreamClient};

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: Arc<Config>, upstream: UpstreamClient) -> Self {
        Self { config, upstream }
    }

    pub fn from_config(config: Config) -> Self {
        let upstream = UpstreamClient::new(config.openai_url.clone());
        Self::new(Arc::new(config), upstream)
    }
}
