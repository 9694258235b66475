/*
 * Responsibility
 * - 環境変数の読み込み (PORT, secrets, upstream URL, CORS 許可 origin)
 * - 設定値のバリデーション (形式不正なら起動失敗)
 * - secrets の欠落は起動失敗にしない: リクエスト毎に 500 を返す (handler 側の責務)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use url::Url;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "app://nanikiru";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Both secrets, available only when the deployment is complete.
#[derive(Clone, Copy)]
pub struct Credentials<'a> {
    pub openai_api_key: &'a str,
    pub advice_api_key: &'a str,
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Upstream bearer token
    pub openai_api_key: Option<String>,
    // Shared secret expected in X-Advice-Api-Key
    pub advice_api_key: Option<String>,

    pub openai_url: Url,
    pub cors_allowed_origins: Vec<String>,
}

// secrets を Debug 出力に載せない
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("advice_api_key", &self.advice_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_url", &self.openai_url.as_str())
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source (`from_env` passes the process env).
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(&var("APP_ENV").unwrap_or_default());

        // Empty values count as unset.
        let openai_api_key = var("OPENAI_API_KEY").filter(|v| !v.is_empty());
        let advice_api_key = var("ADVICE_API_KEY").filter(|v| !v.is_empty());

        let openai_url = var("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
        let openai_url = Url::parse(&openai_url).map_err(|_| ConfigError::Invalid("OPENAI_API_URL"))?;

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_else(|| vec![DEFAULT_ALLOWED_ORIGIN.to_string()]);

        Ok(Self {
            addr,
            app_env,
            openai_api_key,
            advice_api_key,
            openai_url,
            cors_allowed_origins,
        })
    }

    /// Returns both secrets, or `None` if either one is absent.
    pub fn credentials(&self) -> Option<Credentials<'_>> {
        Some(Credentials {
            openai_api_key: self.openai_api_key.as_deref()?,
            advice_api_key: self.advice_api_key.as_deref()?,
        })
    }

    /// Names of the secrets that are not configured.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.openai_api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        if self.advice_api_key.is_none() {
            missing.push("ADVICE_API_KEY");
        }
        missing
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
