use crate::error::SessionError;
use crate::types::audio::Base64EncodedAudioBytes;
use crate::types::events::client::{
    ConversationItemCreateEvent, ConversationItemDeleteEvent, ConversationItemTruncateEvent,
    InputAudioBufferAppendEvent, InputAudioBufferClearEvent, InputAudioBufferCommitEvent, ResponseCancelEvent,
    ResponseCreateEvent, SessionUpdateEvent,
};
use crate::types::{ClientEvent, Item, SessionConfig};

#[derive(serde::Serialize)]
struct Envelope<'a> {
    event_id: &'a str,
    #[serde(flatten)]
    event: &'a ClientEvent,
}

pub(crate) fn new_event_id() -> String {
    format!("event_{}", uuid::Uuid::new_v4().simple())
}

/// Serializes `event` with a fresh `event_id`, returning the id and the text frame.
pub(crate) fn encode(event: &ClientEvent) -> Result<(String, String), SessionError> {
    let event_id = new_event_id();
    let text = serde_json::to_string(&Envelope {
        event_id: &event_id,
        event,
    })
    .map_err(|e| SessionError::Encode(e.to_string()))?;
    Ok((event_id, text))
}

pub(crate) fn session_update(session: SessionConfig) -> ClientEvent {
    ClientEvent::SessionUpdate(SessionUpdateEvent::new(session))
}

pub(crate) fn input_audio_append(audio: Base64EncodedAudioBytes) -> ClientEvent {
    ClientEvent::InputAudioBufferAppend(InputAudioBufferAppendEvent::new(audio))
}

pub(crate) fn input_audio_commit() -> ClientEvent {
    ClientEvent::InputAudioBufferCommit(InputAudioBufferCommitEvent::new())
}

pub(crate) fn input_audio_clear() -> ClientEvent {
    ClientEvent::InputAudioBufferClear(InputAudioBufferClearEvent::new())
}

pub(crate) fn response_create() -> ClientEvent {
    ClientEvent::ResponseCreate(ResponseCreateEvent::new())
}

pub(crate) fn response_cancel(response_id: Option<&str>) -> ClientEvent {
    ClientEvent::ResponseCancel(ResponseCancelEvent::new(response_id))
}

pub(crate) fn item_create(item: Item) -> ClientEvent {
    ClientEvent::ConversationItemCreate(ConversationItemCreateEvent::new(item))
}

pub(crate) fn item_truncate(item_id: &str, audio_end_ms: u32) -> ClientEvent {
    ClientEvent::ConversationItemTruncate(ConversationItemTruncateEvent::new(item_id, audio_end_ms))
}

pub(crate) fn item_delete(item_id: &str) -> ClientEvent {
    ClientEvent::ConversationItemDelete(ConversationItemDeleteEvent::new(item_id))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::{json, Value};

    use super::*;

    fn frame(event: &ClientEvent) -> Value {
        let (event_id, text) = encode(event).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["event_id"], json!(event_id));
        value
    }

    #[test]
    fn envelopes_match_wire_shapes() {
        let commit = frame(&input_audio_commit());
        assert_eq!(commit["type"], "input_audio_buffer.commit");
        assert_eq!(commit.as_object().unwrap().len(), 2);

        let cancel = frame(&response_cancel(None));
        assert_eq!(cancel["type"], "response.cancel");
        assert!(cancel.get("response_id").is_none());
        assert_eq!(frame(&response_cancel(Some("resp_1")))["response_id"], "resp_1");

        let truncate = frame(&item_truncate("item_7", 1500));
        assert_eq!(truncate["item_id"], "item_7");
        assert_eq!(truncate["content_index"], 0);
        assert_eq!(truncate["audio_end_ms"], 1500);

        let text = frame(&item_create(Item::user_text("hello")));
        assert_eq!(text["type"], "conversation.item.create");
        assert_eq!(text["item"]["type"], "message");
        assert_eq!(text["item"]["role"], "user");
        assert_eq!(text["item"]["content"][0], json!({"type": "input_text", "text": "hello"}));

        let output = frame(&item_create(Item::function_call_output("call_1", "{\"ok\":true}")));
        assert_eq!(output["item"]["type"], "function_call_output");
        assert_eq!(output["item"]["call_id"], "call_1");

        let update = frame(&session_update(SessionConfig::default()));
        assert_eq!(update["session"]["model"], SessionConfig::default().model());
    }

    #[test]
    fn event_ids_are_unique() {
        let ids: HashSet<String> = (0..500)
            .map(|_| encode(&response_create()).unwrap().0)
            .collect();
        assert_eq!(ids.len(), 500);
        assert!(ids.iter().all(|id| id.len() > "event_".len()));
    }
}
