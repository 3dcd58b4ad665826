use secrecy::ExposeSecret;
use secrecy::SecretString;

use crate::client::consts::SESSIONS_PATH;

pub fn sessions_url(base_url: &str) -> String {
    format!("{}{}", base_url, SESSIONS_PATH)
}

pub fn bearer(secret: &SecretString) -> String {
    format!("Bearer {}", secret.expose_secret())
}

/// Keeps error bodies short enough for a log line.
pub fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 512;
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
