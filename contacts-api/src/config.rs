use crate::contacts::PollSettings;
use crate::mailchimp::config::{env_duration_millis, env_string};
use crate::mailchimp::MailchimpConfig;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mailchimp: MailchimpConfig,
    pub replace_poll: PollSettings,
}

impl AppConfig {
    /// Load a `.env` file when present, then read the environment.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::info!("loaded environment from {}", path.display());
        }

        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(5000);

        Self {
            host: env_string("HOST", "0.0.0.0"),
            port,
            mailchimp: MailchimpConfig::from_env(),
            replace_poll: PollSettings {
                interval: env_duration_millis("REPLACE_POLL_INTERVAL_MS", 1_000),
                deadline: env_duration_millis("REPLACE_POLL_DEADLINE_MS", 5_000),
            },
        }
    }
}
