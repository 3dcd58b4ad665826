use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// Log settings supplied with the client configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// An `EnvFilter` directive, e.g. `info` or `realtime_voice=debug`.
    pub filter: String,
    /// Trace every raw inbound frame. Frames carry transcripts, so this is off by default.
    pub log_frames: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            log_frames: false,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            filter: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_frames: std::env::var("REALTIME_LOG_FRAMES")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

/// Installs a global fmt subscriber. Applications with their own subscriber
/// should skip this; the client only emits `tracing` events.
pub fn init(config: &LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_new(&config.filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::rfc_3339())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_filter() {
        let config = LogConfig {
            filter: "realtime_voice=loud".to_string(),
            log_frames: false,
        };
        assert!(init(&config).is_err());
    }
}
