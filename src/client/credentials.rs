use secrecy::{ExposeSecret, SecretString};

use crate::error::SessionError;

/// Short-lived client secret minted for one session. Only used to authorize
/// the SDP exchange; the client does not keep it after `connect` returns.
#[derive(Debug)]
pub struct EphemeralToken {
    value: SecretString,
    expires_at: Option<i64>,
}

impl EphemeralToken {
    pub fn new(value: &str, expires_at: Option<i64>) -> Self {
        Self {
            value: SecretString::from(value.to_string()),
            expires_at,
        }
    }

    pub fn secret(&self) -> &SecretString {
        &self.value
    }

    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Unix seconds.
    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    #[serde(default)]
    client_secret: Option<ClientSecret>,
}

#[derive(Debug, serde::Deserialize)]
struct ClientSecret {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
}

/// Pulls `client_secret.value` out of a session creation response.
pub(crate) fn parse_token_response(body: &str) -> Result<EphemeralToken, SessionError> {
    let response: TokenResponse = serde_json::from_str(body).map_err(|e| SessionError::Credential {
        status: None,
        detail: format!("unreadable token response: {}", e),
    })?;
    let secret = response.client_secret.ok_or_else(|| SessionError::Credential {
        status: None,
        detail: "response has no client_secret".to_string(),
    })?;
    match secret.value {
        Some(value) if !value.is_empty() => Ok(EphemeralToken::new(&value, secret.expires_at)),
        _ => Err(SessionError::Credential {
            status: None,
            detail: "client_secret has no value".to_string(),
        }),
    }
}
