#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl ConnectionState {
    pub fn is_connecting_or_connected(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Connected)
    }
}

/// Local audio switches. The speaker is audible only while the caller wants it
/// on and no cancellation holds it muted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AudioGate {
    pub microphone: bool,
    pub speaker: bool,
    pub muted_for_cancel: bool,
}

impl Default for AudioGate {
    fn default() -> Self {
        Self {
            microphone: false,
            speaker: true,
            muted_for_cancel: false,
        }
    }
}

impl AudioGate {
    pub fn output_enabled(&self) -> bool {
        self.speaker && !self.muted_for_cancel
    }
}
