use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use secrecy::{ExposeSecret, SecretString};

use crate::client::consts::{AUTHORIZATION_HEADER, CONTENT_TYPE_HEADER, SDP_CONTENT_TYPE};
use crate::client::credentials::{parse_token_response, EphemeralToken};
use crate::client::utils;
use crate::error::SessionError;
use crate::types::SessionConfig;

/// The two HTTP exchanges that bracket a session: minting an ephemeral token
/// and trading an SDP offer for the server's answer.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Signaling: Send + Sync {
    async fn fetch_token(&self, session: &SessionConfig) -> Result<EphemeralToken, SessionError>;

    async fn negotiate(&self, token: &EphemeralToken, model: &str, offer_sdp: &str) -> Result<String, SessionError>;
}

pub struct HttpSignaling {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpSignaling {
    pub fn new(base_url: &str, api_key: &SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: SecretString::from(api_key.expose_secret().to_string()),
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }
}

#[async_trait]
impl Signaling for HttpSignaling {
    async fn fetch_token(&self, session: &SessionConfig) -> Result<EphemeralToken, SessionError> {
        let response = self
            .http
            .post(utils::sessions_url(&self.base_url))
            .header(AUTHORIZATION_HEADER, utils::bearer(&self.api_key))
            .json(session)
            .send()
            .await
            .map_err(|e| SessionError::Credential {
                status: e.status().map(|s| s.as_u16()),
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| SessionError::Credential {
            status: Some(status.as_u16()),
            detail: e.to_string(),
        })?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "session token request rejected");
            return Err(SessionError::Credential {
                status: Some(status.as_u16()),
                detail: utils::truncate_body(&body),
            });
        }
        parse_token_response(&body)
    }

    async fn negotiate(&self, token: &EphemeralToken, model: &str, offer_sdp: &str) -> Result<String, SessionError> {
        let response = self
            .http
            .post(&self.base_url)
            .query(&[("model", model)])
            .header(AUTHORIZATION_HEADER, utils::bearer(token.secret()))
            .header(CONTENT_TYPE_HEADER, SDP_CONTENT_TYPE)
            .body(offer_sdp.to_string())
            .send()
            .await
            .map_err(|e| SessionError::Negotiation {
                status: e.status().map(|s| s.as_u16()),
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| SessionError::Negotiation {
            status: Some(status.as_u16()),
            detail: e.to_string(),
        })?;
        if status != reqwest::StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "sdp offer rejected");
            return Err(SessionError::Negotiation {
                status: Some(status.as_u16()),
                detail: utils::truncate_body(&body),
            });
        }
        if body.trim().is_empty() {
            return Err(SessionError::Negotiation {
                status: Some(status.as_u16()),
                detail: "empty sdp answer".to_string(),
            });
        }
        Ok(body)
    }
}
