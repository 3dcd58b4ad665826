use crate::types::ServerEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancellationState {
    #[default]
    Idle,
    Cancelling,
}

/// Tracks whether a response is in flight and whether a cancellation is
/// waiting for the output buffer to stop. Muting and the drain timer live with
/// the session; this only decides.
#[derive(Debug, Default)]
pub(crate) struct ResponseCancellation {
    state: CancellationState,
    /// Set between `response.created` and `response.done`.
    active_response: Option<String>,
    /// Set between output buffer started and stopped or cleared.
    playing: bool,
}

impl ResponseCancellation {
    pub fn state(&self) -> CancellationState {
        self.state
    }

    pub fn in_flight(&self) -> bool {
        self.active_response.is_some() || self.playing
    }

    pub fn observe(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::ResponseCreated(e) => self.active_response = Some(e.response().id().to_string()),
            ServerEvent::ResponseDone(e) => {
                if self.active_response.as_deref() == Some(e.response().id()) {
                    self.active_response = None;
                }
            }
            ServerEvent::OutputAudioBufferStarted(_) => self.playing = true,
            ServerEvent::OutputAudioBufferStopped(_) | ServerEvent::OutputAudioBufferCleared(_) => self.playing = false,
            _ => {}
        }
    }

    /// The `response_id` a cancel command should carry, or `None` when there
    /// is nothing to cancel or a cancellation is already pending.
    pub fn target(&self, requested: Option<&str>) -> Option<Option<String>> {
        if self.state == CancellationState::Cancelling || !self.in_flight() {
            return None;
        }
        Some(requested.map(str::to_string).or_else(|| self.active_response.clone()))
    }

    pub fn begin(&mut self) {
        self.state = CancellationState::Cancelling;
    }

    /// Called on output stopped. Returns whether a cancellation was waiting on it.
    pub fn confirm_stopped(&mut self) -> bool {
        std::mem::replace(&mut self.state, CancellationState::Idle) == CancellationState::Cancelling
    }

    /// Called on `response.done`. A cancelled response that never started
    /// playing has no output buffer to stop, so its completion settles the
    /// cancellation instead.
    pub fn confirm_done(&mut self) -> bool {
        if self.state == CancellationState::Cancelling && !self.playing {
            self.state = CancellationState::Idle;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
