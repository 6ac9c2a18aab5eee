use std::{fmt, time::Duration};

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

pub const DEFAULT_BASE_URL: &str = "https://api.phantombuster.com/api/v2/";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POLL_INTERVAL_MILLIS: u64 = 2000;
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub phantombuster: PhantombusterSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct PhantombusterSettings {
    pub base_url: String,
    pub api_key: String,
    pub agent_id: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub poll_interval_millis: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_poll_attempts: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_timeout_secs: u64,
}

impl PhantombusterSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// Keeps the API key out of startup logs.
impl fmt::Debug for PhantombusterSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhantombusterSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("agent_id", &self.agent_id)
            .field("poll_interval_millis", &self.poll_interval_millis)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Reads `configuration/base.yaml` (optional), then `APP_<SECTION>__<KEY>`
/// variables, then the plain `PORT`, `PHANTOMBUSTER_AGENT_ID` and
/// `PHANTOMBUSTER_API_KEY` variables the service has always been deployed with.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {e}"))
    })?;
    let configuration_directory = base_path.join("configuration");

    let settings = config::Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", i64::from(DEFAULT_PORT))?
        .set_default("phantombuster.base_url", DEFAULT_BASE_URL)?
        .set_default("phantombuster.poll_interval_millis", DEFAULT_POLL_INTERVAL_MILLIS as i64)?
        .set_default("phantombuster.max_poll_attempts", i64::from(DEFAULT_MAX_POLL_ATTEMPTS))?
        .set_default("phantombuster.request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS as i64)?
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("application.port", std::env::var("PORT").ok())?
        .set_override_option(
            "phantombuster.agent_id",
            std::env::var("PHANTOMBUSTER_AGENT_ID").ok(),
        )?
        .set_override_option(
            "phantombuster.api_key",
            std::env::var("PHANTOMBUSTER_API_KEY").ok(),
        )?
        .build()?;

    settings.try_deserialize::<Settings>()
}
