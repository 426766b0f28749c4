use std::env;
use std::time::Duration;

pub(crate) fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub(crate) fn env_duration_millis(key: &str, default_millis: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default_millis))
}

/// Connection settings for the Mailchimp Marketing API.
///
/// Missing values fall back to empty strings; a bad key surfaces as an
/// upstream authentication failure rather than a startup error.
#[derive(Debug, Clone)]
pub struct MailchimpConfig {
    pub api_key: String,
    pub server: String,
    pub list_id: String,
    pub base_url: Option<String>,
    pub request_timeout: Duration,
}

impl MailchimpConfig {
    pub fn from_env() -> Self {
        let server = env::var("MAILCHIMP_SERVER")
            .or_else(|_| env::var("MAILCHIM_SERVER"))
            .unwrap_or_default();

        Self {
            api_key: env_string("MAILCHIMP_API_KEY", ""),
            server,
            list_id: env_string("MAILCHIMP_LIST_ID", ""),
            base_url: env::var("MAILCHIMP_BASE_URL").ok().filter(|url| !url.is_empty()),
            request_timeout: env_duration_millis("MAILCHIMP_TIMEOUT_MS", 30_000),
        }
    }

    /// Root of the versioned API, e.g. `https://us21.api.mailchimp.com/3.0`.
    pub fn api_root(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.mailchimp.com/3.0", self.server),
        }
    }
}
