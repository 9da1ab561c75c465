use crate::sender::SenderProfile;

/// Slowest accepted send rate (one message every 1000 s).
pub const MIN_SEND_RATE_PER_SEC: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gmail_access_token: Option<String>,
    pub from_address: Option<String>,
    pub fetch_timeout_secs: u64,
    pub fetch_max_bytes: usize,
    pub fetch_max_redirects: usize,
    pub fetch_user_agent: String,
    pub fetch_retries: u32,
    pub generation_timeout_secs: u64,
    pub delivery_timeout_secs: u64,
    pub max_concurrent_units: usize,
    pub send_rate_per_sec: f64,
    pub send_burst: u32,
    pub quota_backoff_ms: u64,
    pub max_quota_backoff_secs: u64,
    pub sender: SenderProfile,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("gemini_api_key", &"[redacted]")
            .field("gemini_model", &self.gemini_model)
            .field(
                "gmail_access_token",
                &self.gmail_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("from_address", &self.from_address)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_max_bytes", &self.fetch_max_bytes)
            .field("fetch_max_redirects", &self.fetch_max_redirects)
            .field("fetch_user_agent", &self.fetch_user_agent)
            .field("fetch_retries", &self.fetch_retries)
            .field("generation_timeout_secs", &self.generation_timeout_secs)
            .field("delivery_timeout_secs", &self.delivery_timeout_secs)
            .field("max_concurrent_units", &self.max_concurrent_units)
            .field("send_rate_per_sec", &self.send_rate_per_sec)
            .field("send_burst", &self.send_burst)
            .field("quota_backoff_ms", &self.quota_backoff_ms)
            .field("max_quota_backoff_secs", &self.max_quota_backoff_secs)
            .field("sender", &self.sender)
            .finish()
    }
}
