use realtime_voice_types::events::server::ErrorDetails;

use crate::client::ConnectionState;

/// Coarse classification handed to listeners alongside every surfaced error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Credential,
    Negotiation,
    Transport,
    Protocol,
    SessionExpired,
    Decode,
    Encode,
    Usage,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("already connected")]
    AlreadyConnected,
    #[error("cannot start a session while {0:?}")]
    InvalidState(ConnectionState),
    #[error("not connected")]
    NotConnected,
    #[error("command channel is not open")]
    ChannelNotOpen,
    #[error("changing {0} requires a new session")]
    RequiresReconnect(&'static str),
    #[error("connect was cancelled by disconnect")]
    Cancelled,
    #[error("credential exchange failed: {detail}")]
    Credential { status: Option<u16>, detail: String },
    #[error("sdp negotiation failed: {detail}")]
    Negotiation { status: Option<u16>, detail: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server error: {0}")]
    Protocol(ErrorDetails),
    #[error("session expired: {0}")]
    SessionExpired(ErrorDetails),
    #[error("failed to encode client event: {0}")]
    Encode(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Credential { .. } => ErrorKind::Credential,
            SessionError::Negotiation { .. } => ErrorKind::Negotiation,
            SessionError::Transport(_) => ErrorKind::Transport,
            SessionError::Protocol(_) => ErrorKind::Protocol,
            SessionError::SessionExpired(_) => ErrorKind::SessionExpired,
            SessionError::Encode(_) => ErrorKind::Encode,
            SessionError::AlreadyConnected
            | SessionError::InvalidState(_)
            | SessionError::NotConnected
            | SessionError::ChannelNotOpen
            | SessionError::RequiresReconnect(_)
            | SessionError::Cancelled => ErrorKind::Usage,
        }
    }

    /// Whether reconnecting has a reasonable chance of succeeding. This crate
    /// never retries by itself.
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionError::Credential { status, .. } | SessionError::Negotiation { status, .. } => {
                match status {
                    None => true,
                    Some(code) => *code == 408 || *code == 429 || *code >= 500,
                }
            }
            SessionError::Transport(_) | SessionError::SessionExpired(_) => true,
            _ => false,
        }
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        SessionError::Transport(err.0)
    }
}

/// Failure reported by the peer transport.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// Why an inbound frame was dropped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("binary frame is not valid utf-8")]
    NotUtf8,
    #[error("frame is not valid json: {0}")]
    Json(String),
    #[error("frame has no string `type` field")]
    MissingType,
    #[error("unrecognized event type `{0}`")]
    UnknownType(String),
    #[error("malformed `{event_type}` payload: {reason}")]
    Payload { event_type: &'static str, reason: String },
}
