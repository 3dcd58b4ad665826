mod client;
mod error;
pub mod logging;

pub use client::{
    connect, decode_frame, AudioTrack, CancellationState, ChannelFrame, Client, Config, ConfigBuilder,
    ConnectionState, DataChannel, EphemeralToken, HttpSignaling, ListenerId, PeerConnection, PeerState,
    PeerTransport, ServerRx, SessionListener, Signaling, Stats, TransportEvent, TransportEventSender,
};
pub use error::{DecodeError, ErrorKind, SessionError, TransportError};
pub use realtime_voice_types as types;
