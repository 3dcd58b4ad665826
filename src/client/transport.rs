//! The media seam. A platform WebRTC stack implements these traits; the
//! session only needs a peer connection, one microphone track, the command
//! data channel and a handle on the remote audio track.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::TransportError;

/// A message received on the command channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelFrame {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl PeerState {
    /// `Disconnected` can recover on its own; these cannot.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PeerState::Failed | PeerState::Closed)
    }
}

pub enum TransportEvent {
    ChannelOpen,
    ChannelMessage(ChannelFrame),
    ChannelClosed,
    PeerStateChanged(PeerState),
    RemoteAudioTrack(Arc<dyn AudioTrack>),
}

impl std::fmt::Debug for TransportEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportEvent::ChannelOpen => write!(f, "ChannelOpen"),
            TransportEvent::ChannelMessage(frame) => f.debug_tuple("ChannelMessage").field(frame).finish(),
            TransportEvent::ChannelClosed => write!(f, "ChannelClosed"),
            TransportEvent::PeerStateChanged(state) => f.debug_tuple("PeerStateChanged").field(state).finish(),
            TransportEvent::RemoteAudioTrack(_) => write!(f, "RemoteAudioTrack"),
        }
    }
}

pub type TransportEventSender = mpsc::UnboundedSender<TransportEvent>;
pub type TransportEventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Creates a peer connection bound to the local audio source. Every
    /// callback of the connection and its channels is reported through `events`.
    async fn create_peer_connection(&self, events: TransportEventSender) -> Result<Arc<dyn PeerConnection>, TransportError>;
}

#[async_trait]
pub trait PeerConnection: Send + Sync {
    fn add_microphone_track(&self) -> Result<Arc<dyn AudioTrack>, TransportError>;

    /// Opens a reliable, ordered data channel.
    fn create_data_channel(&self, label: &str) -> Result<Arc<dyn DataChannel>, TransportError>;

    /// Creates the local offer and applies it as the local description.
    async fn create_offer(&self) -> Result<String, TransportError>;

    async fn set_remote_answer(&self, sdp: &str) -> Result<(), TransportError>;

    fn close(&self);
}

pub trait DataChannel: Send + Sync {
    fn is_open(&self) -> bool;

    /// Queues `text` on the channel. May be called with the session lock held,
    /// so it must not block or call back into the client.
    fn send_text(&self, text: &str) -> Result<(), TransportError>;

    fn close(&self);
}

pub trait AudioTrack: Send + Sync {
    /// Called with the session lock held, like [`DataChannel::send_text`].
    fn set_enabled(&self, enabled: bool);

    fn is_enabled(&self) -> bool;

    fn stop(&self) {}
}
