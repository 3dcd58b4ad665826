use std::time::Duration;

pub const BASE_URL: &str = "https://api.openai.com/v1/realtime";
pub const SESSIONS_PATH: &str = "/sessions";

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const SDP_CONTENT_TYPE: &str = "application/sdp";

pub const COMMAND_CHANNEL_LABEL: &str = "oai-events";

/// How long output stays muted after a cancelled response stops, so audio
/// already queued in the jitter buffer is not heard.
pub const OUTPUT_DRAIN_DELAY: Duration = Duration::from_millis(300);

pub const EVENT_BUS_CAPACITY: usize = 1024;
