use std::fmt;
use std::sync::Arc;

/// Bearer token for the chat-completion upstream.
///
/// Only constructed by the api key middleware, after both secrets were found
/// and the caller's key matched.
#[derive(Clone)]
pub struct UpstreamCredentials {
    api_key: Arc<str>,
}

impl UpstreamCredentials {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: Arc::from(api_key),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for UpstreamCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
