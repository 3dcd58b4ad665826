pub mod client;
pub mod server;

use client::*;
use server::*;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "session.update")]
    SessionUpdate(SessionUpdateEvent),
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend(InputAudioBufferAppendEvent),
    #[serde(rename = "input_audio_buffer.commit")]
    InputAudioBufferCommit(InputAudioBufferCommitEvent),
    #[serde(rename = "input_audio_buffer.clear")]
    InputAudioBufferClear(InputAudioBufferClearEvent),
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate(ConversationItemCreateEvent),
    #[serde(rename = "conversation.item.truncate")]
    ConversationItemTruncate(ConversationItemTruncateEvent),
    #[serde(rename = "conversation.item.delete")]
    ConversationItemDelete(ConversationItemDeleteEvent),
    #[serde(rename = "response.create")]
    ResponseCreate(ResponseCreateEvent),
    #[serde(rename = "response.cancel")]
    ResponseCancel(ResponseCancelEvent),
}

impl ClientEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ClientEvent::SessionUpdate(_) => "session.update",
            ClientEvent::InputAudioBufferAppend(_) => "input_audio_buffer.append",
            ClientEvent::InputAudioBufferCommit(_) => "input_audio_buffer.commit",
            ClientEvent::InputAudioBufferClear(_) => "input_audio_buffer.clear",
            ClientEvent::ConversationItemCreate(_) => "conversation.item.create",
            ClientEvent::ConversationItemTruncate(_) => "conversation.item.truncate",
            ClientEvent::ConversationItemDelete(_) => "conversation.item.delete",
            ClientEvent::ResponseCreate(_) => "response.create",
            ClientEvent::ResponseCancel(_) => "response.cancel",
        }
    }
}

/// Every server event type this crate understands, independent of payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerEventKind {
    Error,
    SessionCreated,
    SessionUpdated,
    ConversationCreated,
    ConversationItemCreated,
    ConversationItemDeleted,
    ConversationItemTruncated,
    InputAudioTranscriptionCompleted,
    InputAudioTranscriptionDelta,
    InputAudioTranscriptionFailed,
    InputAudioBufferCommitted,
    InputAudioBufferCleared,
    InputAudioBufferSpeechStarted,
    InputAudioBufferSpeechStopped,
    OutputAudioBufferStarted,
    OutputAudioBufferStopped,
    OutputAudioBufferCleared,
    ResponseCreated,
    ResponseDone,
    ResponseOutputItemAdded,
    ResponseOutputItemDone,
    ResponseContentPartAdded,
    ResponseContentPartDone,
    ResponseTextDelta,
    ResponseTextDone,
    ResponseAudioTranscriptDelta,
    ResponseAudioTranscriptDone,
    ResponseAudioDelta,
    ResponseAudioDone,
    ResponseFunctionCallArgumentsDelta,
    ResponseFunctionCallArgumentsDone,
    RateLimitsUpdated,
}

/// Older wire names still emitted by some server versions. Add new spellings
/// here only; nothing else matches on raw type strings.
const WIRE_ALIASES: &[(&str, ServerEventKind)] = &[
    ("output_audio_buffer.audio_started", ServerEventKind::OutputAudioBufferStarted),
    ("output_audio_buffer.audio_stopped", ServerEventKind::OutputAudioBufferStopped),
];

impl ServerEventKind {
    pub const ALL: [ServerEventKind; 32] = [
        ServerEventKind::Error,
        ServerEventKind::SessionCreated,
        ServerEventKind::SessionUpdated,
        ServerEventKind::ConversationCreated,
        ServerEventKind::ConversationItemCreated,
        ServerEventKind::ConversationItemDeleted,
        ServerEventKind::ConversationItemTruncated,
        ServerEventKind::InputAudioTranscriptionCompleted,
        ServerEventKind::InputAudioTranscriptionDelta,
        ServerEventKind::InputAudioTranscriptionFailed,
        ServerEventKind::InputAudioBufferCommitted,
        ServerEventKind::InputAudioBufferCleared,
        ServerEventKind::InputAudioBufferSpeechStarted,
        ServerEventKind::InputAudioBufferSpeechStopped,
        ServerEventKind::OutputAudioBufferStarted,
        ServerEventKind::OutputAudioBufferStopped,
        ServerEventKind::OutputAudioBufferCleared,
        ServerEventKind::ResponseCreated,
        ServerEventKind::ResponseDone,
        ServerEventKind::ResponseOutputItemAdded,
        ServerEventKind::ResponseOutputItemDone,
        ServerEventKind::ResponseContentPartAdded,
        ServerEventKind::ResponseContentPartDone,
        ServerEventKind::ResponseTextDelta,
        ServerEventKind::ResponseTextDone,
        ServerEventKind::ResponseAudioTranscriptDelta,
        ServerEventKind::ResponseAudioTranscriptDone,
        ServerEventKind::ResponseAudioDelta,
        ServerEventKind::ResponseAudioDone,
        ServerEventKind::ResponseFunctionCallArgumentsDelta,
        ServerEventKind::ResponseFunctionCallArgumentsDone,
        ServerEventKind::RateLimitsUpdated,
    ];

    /// The canonical wire name.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ServerEventKind::Error => "error",
            ServerEventKind::SessionCreated => "session.created",
            ServerEventKind::SessionUpdated => "session.updated",
            ServerEventKind::ConversationCreated => "conversation.created",
            ServerEventKind::ConversationItemCreated => "conversation.item.created",
            ServerEventKind::ConversationItemDeleted => "conversation.item.deleted",
            ServerEventKind::ConversationItemTruncated => "conversation.item.truncated",
            ServerEventKind::InputAudioTranscriptionCompleted => "conversation.item.input_audio_transcription.completed",
            ServerEventKind::InputAudioTranscriptionDelta => "conversation.item.input_audio_transcription.delta",
            ServerEventKind::InputAudioTranscriptionFailed => "conversation.item.input_audio_transcription.failed",
            ServerEventKind::InputAudioBufferCommitted => "input_audio_buffer.committed",
            ServerEventKind::InputAudioBufferCleared => "input_audio_buffer.cleared",
            ServerEventKind::InputAudioBufferSpeechStarted => "input_audio_buffer.speech_started",
            ServerEventKind::InputAudioBufferSpeechStopped => "input_audio_buffer.speech_stopped",
            ServerEventKind::OutputAudioBufferStarted => "output_audio_buffer.started",
            ServerEventKind::OutputAudioBufferStopped => "output_audio_buffer.stopped",
            ServerEventKind::OutputAudioBufferCleared => "output_audio_buffer.cleared",
            ServerEventKind::ResponseCreated => "response.created",
            ServerEventKind::ResponseDone => "response.done",
            ServerEventKind::ResponseOutputItemAdded => "response.output_item.added",
            ServerEventKind::ResponseOutputItemDone => "response.output_item.done",
            ServerEventKind::ResponseContentPartAdded => "response.content_part.added",
            ServerEventKind::ResponseContentPartDone => "response.content_part.done",
            ServerEventKind::ResponseTextDelta => "response.text.delta",
            ServerEventKind::ResponseTextDone => "response.text.done",
            ServerEventKind::ResponseAudioTranscriptDelta => "response.audio_transcript.delta",
            ServerEventKind::ResponseAudioTranscriptDone => "response.audio_transcript.done",
            ServerEventKind::ResponseAudioDelta => "response.audio.delta",
            ServerEventKind::ResponseAudioDone => "response.audio.done",
            ServerEventKind::ResponseFunctionCallArgumentsDelta => "response.function_call_arguments.delta",
            ServerEventKind::ResponseFunctionCallArgumentsDone => "response.function_call_arguments.done",
            ServerEventKind::RateLimitsUpdated => "rate_limits.updated",
        }
    }

    /// Maps a wire `type` string, canonical or aliased, to its kind.
    pub fn from_wire(name: &str) -> Option<ServerEventKind> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.wire_name() == name)
            .or_else(|| {
                WIRE_ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == name)
                    .map(|(_, kind)| *kind)
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Error(ErrorEvent),
    SessionCreated(SessionEvent),
    SessionUpdated(SessionEvent),
    ConversationCreated(ConversationCreatedEvent),
    ConversationItemCreated(ConversationItemCreatedEvent),
    ConversationItemDeleted(ConversationItemDeletedEvent),
    ConversationItemTruncated(ConversationItemTruncatedEvent),
    InputAudioTranscriptionCompleted(InputAudioTranscriptionCompletedEvent),
    InputAudioTranscriptionDelta(InputAudioTranscriptionDeltaEvent),
    InputAudioTranscriptionFailed(InputAudioTranscriptionFailedEvent),
    InputAudioBufferCommitted(InputAudioBufferCommittedEvent),
    InputAudioBufferCleared(InputAudioBufferClearedEvent),
    InputAudioBufferSpeechStarted(InputAudioBufferSpeechStartedEvent),
    InputAudioBufferSpeechStopped(InputAudioBufferSpeechStoppedEvent),
    OutputAudioBufferStarted(OutputAudioBufferEvent),
    OutputAudioBufferStopped(OutputAudioBufferEvent),
    OutputAudioBufferCleared(OutputAudioBufferEvent),
    ResponseCreated(ResponseEvent),
    ResponseDone(ResponseEvent),
    ResponseOutputItemAdded(ResponseOutputItemEvent),
    ResponseOutputItemDone(ResponseOutputItemEvent),
    ResponseContentPartAdded(ResponseContentPartEvent),
    ResponseContentPartDone(ResponseContentPartEvent),
    ResponseTextDelta(ResponseDeltaEvent),
    ResponseTextDone(ResponseTextDoneEvent),
    ResponseAudioTranscriptDelta(ResponseDeltaEvent),
    ResponseAudioTranscriptDone(ResponseAudioTranscriptDoneEvent),
    ResponseAudioDelta(ResponseDeltaEvent),
    ResponseAudioDone(ResponseAudioDoneEvent),
    ResponseFunctionCallArgumentsDelta(ResponseFunctionCallArgumentsDeltaEvent),
    ResponseFunctionCallArgumentsDone(ResponseFunctionCallArgumentsDoneEvent),
    RateLimitsUpdated(RateLimitsUpdatedEvent),
}

impl ServerEvent {
    /// Decodes the payload of an event whose kind is already known. Fields not
    /// belonging to the payload, including `type`, are ignored.
    pub fn from_value(kind: ServerEventKind, value: serde_json::Value) -> serde_json::Result<ServerEvent> {
        use serde_json::from_value;
        Ok(match kind {
            ServerEventKind::Error => ServerEvent::Error(from_value(value)?),
            ServerEventKind::SessionCreated => ServerEvent::SessionCreated(from_value(value)?),
            ServerEventKind::SessionUpdated => ServerEvent::SessionUpdated(from_value(value)?),
            ServerEventKind::ConversationCreated => ServerEvent::ConversationCreated(from_value(value)?),
            ServerEventKind::ConversationItemCreated => ServerEvent::ConversationItemCreated(from_value(value)?),
            ServerEventKind::ConversationItemDeleted => ServerEvent::ConversationItemDeleted(from_value(value)?),
            ServerEventKind::ConversationItemTruncated => ServerEvent::ConversationItemTruncated(from_value(value)?),
            ServerEventKind::InputAudioTranscriptionCompleted => ServerEvent::InputAudioTranscriptionCompleted(from_value(value)?),
            ServerEventKind::InputAudioTranscriptionDelta => ServerEvent::InputAudioTranscriptionDelta(from_value(value)?),
            ServerEventKind::InputAudioTranscriptionFailed => ServerEvent::InputAudioTranscriptionFailed(from_value(value)?),
            ServerEventKind::InputAudioBufferCommitted => ServerEvent::InputAudioBufferCommitted(from_value(value)?),
            ServerEventKind::InputAudioBufferCleared => ServerEvent::InputAudioBufferCleared(from_value(value)?),
            ServerEventKind::InputAudioBufferSpeechStarted => ServerEvent::InputAudioBufferSpeechStarted(from_value(value)?),
            ServerEventKind::InputAudioBufferSpeechStopped => ServerEvent::InputAudioBufferSpeechStopped(from_value(value)?),
            ServerEventKind::OutputAudioBufferStarted => ServerEvent::OutputAudioBufferStarted(from_value(value)?),
            ServerEventKind::OutputAudioBufferStopped => ServerEvent::OutputAudioBufferStopped(from_value(value)?),
            ServerEventKind::OutputAudioBufferCleared => ServerEvent::OutputAudioBufferCleared(from_value(value)?),
            ServerEventKind::ResponseCreated => ServerEvent::ResponseCreated(from_value(value)?),
            ServerEventKind::ResponseDone => ServerEvent::ResponseDone(from_value(value)?),
            ServerEventKind::ResponseOutputItemAdded => ServerEvent::ResponseOutputItemAdded(from_value(value)?),
            ServerEventKind::ResponseOutputItemDone => ServerEvent::ResponseOutputItemDone(from_value(value)?),
            ServerEventKind::ResponseContentPartAdded => ServerEvent::ResponseContentPartAdded(from_value(value)?),
            ServerEventKind::ResponseContentPartDone => ServerEvent::ResponseContentPartDone(from_value(value)?),
            ServerEventKind::ResponseTextDelta => ServerEvent::ResponseTextDelta(from_value(value)?),
            ServerEventKind::ResponseTextDone => ServerEvent::ResponseTextDone(from_value(value)?),
            ServerEventKind::ResponseAudioTranscriptDelta => ServerEvent::ResponseAudioTranscriptDelta(from_value(value)?),
            ServerEventKind::ResponseAudioTranscriptDone => ServerEvent::ResponseAudioTranscriptDone(from_value(value)?),
            ServerEventKind::ResponseAudioDelta => ServerEvent::ResponseAudioDelta(from_value(value)?),
            ServerEventKind::ResponseAudioDone => ServerEvent::ResponseAudioDone(from_value(value)?),
            ServerEventKind::ResponseFunctionCallArgumentsDelta => ServerEvent::ResponseFunctionCallArgumentsDelta(from_value(value)?),
            ServerEventKind::ResponseFunctionCallArgumentsDone => ServerEvent::ResponseFunctionCallArgumentsDone(from_value(value)?),
            ServerEventKind::RateLimitsUpdated => ServerEvent::RateLimitsUpdated(from_value(value)?),
        })
    }

    pub fn kind(&self) -> ServerEventKind {
        match self {
            ServerEvent::Error(_) => ServerEventKind::Error,
            ServerEvent::SessionCreated(_) => ServerEventKind::SessionCreated,
            ServerEvent::SessionUpdated(_) => ServerEventKind::SessionUpdated,
            ServerEvent::ConversationCreated(_) => ServerEventKind::ConversationCreated,
            ServerEvent::ConversationItemCreated(_) => ServerEventKind::ConversationItemCreated,
            ServerEvent::ConversationItemDeleted(_) => ServerEventKind::ConversationItemDeleted,
            ServerEvent::ConversationItemTruncated(_) => ServerEventKind::ConversationItemTruncated,
            ServerEvent::InputAudioTranscriptionCompleted(_) => ServerEventKind::InputAudioTranscriptionCompleted,
            ServerEvent::InputAudioTranscriptionDelta(_) => ServerEventKind::InputAudioTranscriptionDelta,
            ServerEvent::InputAudioTranscriptionFailed(_) => ServerEventKind::InputAudioTranscriptionFailed,
            ServerEvent::InputAudioBufferCommitted(_) => ServerEventKind::InputAudioBufferCommitted,
            ServerEvent::InputAudioBufferCleared(_) => ServerEventKind::InputAudioBufferCleared,
            ServerEvent::InputAudioBufferSpeechStarted(_) => ServerEventKind::InputAudioBufferSpeechStarted,
            ServerEvent::InputAudioBufferSpeechStopped(_) => ServerEventKind::InputAudioBufferSpeechStopped,
            ServerEvent::OutputAudioBufferStarted(_) => ServerEventKind::OutputAudioBufferStarted,
            ServerEvent::OutputAudioBufferStopped(_) => ServerEventKind::OutputAudioBufferStopped,
            ServerEvent::OutputAudioBufferCleared(_) => ServerEventKind::OutputAudioBufferCleared,
            ServerEvent::ResponseCreated(_) => ServerEventKind::ResponseCreated,
            ServerEvent::ResponseDone(_) => ServerEventKind::ResponseDone,
            ServerEvent::ResponseOutputItemAdded(_) => ServerEventKind::ResponseOutputItemAdded,
            ServerEvent::ResponseOutputItemDone(_) => ServerEventKind::ResponseOutputItemDone,
            ServerEvent::ResponseContentPartAdded(_) => ServerEventKind::ResponseContentPartAdded,
            ServerEvent::ResponseContentPartDone(_) => ServerEventKind::ResponseContentPartDone,
            ServerEvent::ResponseTextDelta(_) => ServerEventKind::ResponseTextDelta,
            ServerEvent::ResponseTextDone(_) => ServerEventKind::ResponseTextDone,
            ServerEvent::ResponseAudioTranscriptDelta(_) => ServerEventKind::ResponseAudioTranscriptDelta,
            ServerEvent::ResponseAudioTranscriptDone(_) => ServerEventKind::ResponseAudioTranscriptDone,
            ServerEvent::ResponseAudioDelta(_) => ServerEventKind::ResponseAudioDelta,
            ServerEvent::ResponseAudioDone(_) => ServerEventKind::ResponseAudioDone,
            ServerEvent::ResponseFunctionCallArgumentsDelta(_) => ServerEventKind::ResponseFunctionCallArgumentsDelta,
            ServerEvent::ResponseFunctionCallArgumentsDone(_) => ServerEventKind::ResponseFunctionCallArgumentsDone,
            ServerEvent::RateLimitsUpdated(_) => ServerEventKind::RateLimitsUpdated,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.kind().wire_name()
    }

    pub fn event_id(&self) -> &str {
        match self {
            ServerEvent::Error(e) => e.event_id(),
            ServerEvent::SessionCreated(e) | ServerEvent::SessionUpdated(e) => e.event_id(),
            ServerEvent::ConversationCreated(e) => e.event_id(),
            ServerEvent::ConversationItemCreated(e) => e.event_id(),
            ServerEvent::ConversationItemDeleted(e) => e.event_id(),
            ServerEvent::ConversationItemTruncated(e) => e.event_id(),
            ServerEvent::InputAudioTranscriptionCompleted(e) => e.event_id(),
            ServerEvent::InputAudioTranscriptionDelta(e) => e.event_id(),
            ServerEvent::InputAudioTranscriptionFailed(e) => e.event_id(),
            ServerEvent::InputAudioBufferCommitted(e) => e.event_id(),
            ServerEvent::InputAudioBufferCleared(e) => e.event_id(),
            ServerEvent::InputAudioBufferSpeechStarted(e) => e.event_id(),
            ServerEvent::InputAudioBufferSpeechStopped(e) => e.event_id(),
            ServerEvent::OutputAudioBufferStarted(e)
            | ServerEvent::OutputAudioBufferStopped(e)
            | ServerEvent::OutputAudioBufferCleared(e) => e.event_id(),
            ServerEvent::ResponseCreated(e) | ServerEvent::ResponseDone(e) => e.event_id(),
            ServerEvent::ResponseOutputItemAdded(e) | ServerEvent::ResponseOutputItemDone(e) => e.event_id(),
            ServerEvent::ResponseContentPartAdded(e) | ServerEvent::ResponseContentPartDone(e) => e.event_id(),
            ServerEvent::ResponseTextDelta(e)
            | ServerEvent::ResponseAudioTranscriptDelta(e)
            | ServerEvent::ResponseAudioDelta(e) => e.event_id(),
            ServerEvent::ResponseTextDone(e) => e.event_id(),
            ServerEvent::ResponseAudioTranscriptDone(e) => e.event_id(),
            ServerEvent::ResponseAudioDone(e) => e.event_id(),
            ServerEvent::ResponseFunctionCallArgumentsDelta(e) => e.event_id(),
            ServerEvent::ResponseFunctionCallArgumentsDone(e) => e.event_id(),
            ServerEvent::RateLimitsUpdated(e) => e.event_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_kind_round_trips_through_its_wire_name() {
        for kind in ServerEventKind::ALL {
            assert_eq!(ServerEventKind::from_wire(kind.wire_name()), Some(kind));
        }
    }

    #[test]
    fn output_audio_buffer_aliases_resolve() {
        assert_eq!(
            ServerEventKind::from_wire("output_audio_buffer.audio_stopped"),
            Some(ServerEventKind::OutputAudioBufferStopped)
        );
        assert_eq!(
            ServerEventKind::from_wire("output_audio_buffer.audio_started"),
            Some(ServerEventKind::OutputAudioBufferStarted)
        );
        assert_eq!(ServerEventKind::from_wire("response.output_audio.delta"), None);
    }

    #[test]
    fn decodes_audio_transcript_delta_with_position() {
        let value = json!({
            "type": "response.audio_transcript.delta",
            "event_id": "event_4",
            "response_id": "resp_1",
            "item_id": "item_2",
            "output_index": 0,
            "content_index": 1,
            "delta": "Hel"
        });
        let event = ServerEvent::from_value(ServerEventKind::ResponseAudioTranscriptDelta, value).unwrap();
        let ServerEvent::ResponseAudioTranscriptDelta(delta) = &event else {
            panic!("unexpected event {event:?}");
        };
        assert_eq!(delta.delta(), "Hel");
        assert_eq!(delta.position().response_id(), "resp_1");
        assert_eq!(delta.position().content_index(), 1);
        assert_eq!(event.event_id(), "event_4");
        assert_eq!(event.event_type(), "response.audio_transcript.delta");
    }

    #[test]
    fn decodes_session_expired_error() {
        let value = json!({
            "type": "error",
            "event_id": "event_9",
            "error": {
                "type": "invalid_request_error",
                "code": "session_expired",
                "message": "Your session hit the maximum duration of 30 minutes.",
                "param": null,
                "event_id": null
            }
        });
        let ServerEvent::Error(error) = ServerEvent::from_value(ServerEventKind::Error, value).unwrap() else {
            panic!("expected an error event");
        };
        assert!(error.error().is_session_expired());
    }

    #[test]
    fn decodes_response_done_with_usage() {
        let value = json!({
            "type": "response.done",
            "event_id": "event_7",
            "response": {
                "id": "resp_1",
                "object": "realtime.response",
                "status": "cancelled",
                "status_details": {"type": "cancelled", "reason": "client_cancelled"},
                "output": [],
                "usage": {"total_tokens": 30, "input_tokens": 20, "output_tokens": 10}
            }
        });
        let ServerEvent::ResponseDone(done) = ServerEvent::from_value(ServerEventKind::ResponseDone, value).unwrap() else {
            panic!("expected response.done");
        };
        assert_eq!(done.response().status(), &ResponseStatus::Cancelled);
        assert_eq!(done.response().usage().map(|u| u.total_tokens()), Some(30));
    }

    #[test]
    fn missing_fields_are_a_decode_error() {
        let value = json!({"type": "conversation.item.deleted", "event_id": "event_1"});
        assert!(ServerEvent::from_value(ServerEventKind::ConversationItemDeleted, value).is_err());
    }

    #[test]
    fn client_event_serializes_with_type_tag() {
        let event = ClientEvent::ResponseCancel(ResponseCancelEvent::new(None));
        assert_eq!(serde_json::to_value(&event).unwrap(), json!({"type": "response.cancel"}));
        assert_eq!(event.event_type(), "response.cancel");
    }
}
