use std::time::Duration;

use secrecy::SecretString;

use crate::client::consts::{BASE_URL, EVENT_BUS_CAPACITY, OUTPUT_DRAIN_DELAY};
use crate::logging::LogConfig;
use crate::types::{SessionConfig, SessionConfigurator};

#[derive(Debug)]
pub struct Config {
    base_url: String,
    api_key: SecretString,
    session: SessionConfig,
    drain_delay: Duration,
    push_to_talk: bool,
    event_capacity: usize,
    log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Defaults, with the api key taken from `OPENAI_API_KEY` when set.
    pub fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            api_key: SecretString::from(std::env::var("OPENAI_API_KEY").unwrap_or_default()),
            session: SessionConfig::default(),
            drain_delay: OUTPUT_DRAIN_DELAY,
            push_to_talk: false,
            event_capacity: EVENT_BUS_CAPACITY,
            log: LogConfig::default(),
        }
    }

    /// Loads `.env` if present, then reads `OPENAI_API_KEY`, `REALTIME_BASE_URL`,
    /// `REALTIME_MODEL` and `RUST_LOG`.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("no .env loaded: {}", e);
        }
        let mut builder = ConfigBuilder::new().with_log(LogConfig::from_env());
        if let Ok(base_url) = std::env::var("REALTIME_BASE_URL") {
            builder = builder.with_base_url(&base_url);
        }
        if let Ok(model) = std::env::var("REALTIME_MODEL") {
            builder = builder.with_session(SessionConfig::builder().with_model(&model).build());
        }
        builder.build()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    pub fn drain_delay(&self) -> Duration {
        self.drain_delay
    }

    pub fn push_to_talk(&self) -> bool {
        self.push_to_talk
    }

    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    pub fn log(&self) -> &LogConfig {
        &self.log
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.config.api_key = SecretString::from(api_key.to_string());
        self
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.config.session = session;
        self
    }

    pub fn with_drain_delay(mut self, drain_delay: Duration) -> Self {
        self.config.drain_delay = drain_delay;
        self
    }

    pub fn with_push_to_talk(mut self, push_to_talk: bool) -> Self {
        self.config.push_to_talk = push_to_talk;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity.max(1);
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.config.log = log;
        self
    }

    /// Push-to-talk sessions run without server turn detection, and a session
    /// without turn detection is push-to-talk: only the client can end a turn.
    pub fn build(mut self) -> Config {
        let config = &mut self.config;
        if config.push_to_talk && config.session.turn_detection().is_some() {
            config.session = SessionConfigurator::from(config.session.clone())
                .with_turn_detection_disable()
                .build();
        } else if !config.push_to_talk && config.session.turn_detection().is_none() {
            tracing::debug!("turn detection disabled, using push-to-talk");
            config.push_to_talk = true;
        }
        self.config
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = Config::builder()
            .with_base_url("http://localhost:8080/v1/realtime/")
            .with_api_key("sk-test")
            .with_push_to_talk(true)
            .with_event_capacity(0)
            .build();

        assert_eq!(config.base_url(), "http://localhost:8080/v1/realtime");
        assert_eq!(config.api_key().expose_secret(), "sk-test");
        assert!(config.push_to_talk());
        assert_eq!(config.event_capacity(), 1);
        assert_eq!(config.drain_delay(), OUTPUT_DRAIN_DELAY);
    }

    #[test]
    fn hands_free_defaults_to_server_turn_detection() {
        let config = Config::builder().with_api_key("sk-test").build();
        assert!(!config.push_to_talk());
        assert!(config.session().turn_detection().is_some());
    }

    #[test]
    fn push_to_talk_and_turn_detection_agree() {
        let config = Config::builder().with_push_to_talk(true).build();
        assert!(config.push_to_talk());
        assert!(config.session().turn_detection().is_none());

        let session = SessionConfig::builder().with_turn_detection_disable().build();
        let config = Config::builder().with_session(session).build();
        assert!(config.push_to_talk());
        assert!(config.session().turn_detection().is_none());
    }
}
