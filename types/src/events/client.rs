use crate::audio::Base64EncodedAudioBytes;
use crate::Item;
use crate::session::SessionConfig;

// Client events carry no `event_id`: the sender wraps every event in an
// envelope that stamps a fresh id at send time.

/// `session.update` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionUpdateEvent {
    /// The session configuration to apply
    session: SessionConfig,
}

impl SessionUpdateEvent {
    pub fn new(session: SessionConfig) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }
}

/// `input_audio_buffer.append` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferAppendEvent {
    /// The audio data to append to the buffer
    audio: Base64EncodedAudioBytes,
}

impl InputAudioBufferAppendEvent {
    pub fn new(audio: Base64EncodedAudioBytes) -> Self {
        Self { audio }
    }

    pub fn audio(&self) -> &Base64EncodedAudioBytes {
        &self.audio
    }
}

/// `input_audio_buffer.commit` event
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferCommitEvent {}

impl InputAudioBufferCommitEvent {
    pub fn new() -> Self {
        Self {}
    }
}

/// `input_audio_buffer.clear` event
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferClearEvent {}

impl InputAudioBufferClearEvent {
    pub fn new() -> Self {
        Self {}
    }
}

/// `conversation.item.create` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversationItemCreateEvent {
    /// The ID of the preceding item after which the new item will be inserted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_item_id: Option<String>,
    /// The item to add to the conversation
    item: Item,
}

impl ConversationItemCreateEvent {
    pub fn new(item: Item) -> Self {
        Self {
            previous_item_id: None,
            item,
        }
    }

    pub fn with_previous_item_id(mut self, previous_item_id: &str) -> Self {
        self.previous_item_id = Some(previous_item_id.to_string());
        self
    }

    pub fn item(&self) -> &Item {
        &self.item
    }
}

/// `conversation.item.truncate` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversationItemTruncateEvent {
    /// The ID of the assistant message item to truncate.
    item_id: String,
    /// The index of the content part to truncate
    content_index: u32,
    /// Inclusive duration up to which audio is truncated, in milliseconds
    audio_end_ms: u32,
}

impl ConversationItemTruncateEvent {
    /// Truncates the first (and for audio replies, only) content part.
    pub fn new(item_id: &str, audio_end_ms: u32) -> Self {
        Self {
            item_id: item_id.to_string(),
            content_index: 0,
            audio_end_ms,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn audio_end_ms(&self) -> u32 {
        self.audio_end_ms
    }
}

/// `conversation.item.delete` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversationItemDeleteEvent {
    /// The ID of the item to delete
    item_id: String,
}

impl ConversationItemDeleteEvent {
    pub fn new(item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
        }
    }
}

/// Per-response overrides for `response.create`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modalities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
}

impl ResponseOptions {
    pub fn with_modalities(mut self, modalities: Vec<String>) -> Self {
        self.modalities = Some(modalities);
        self
    }

    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.instructions = Some(instructions.to_string());
        self
    }
}

/// `response.create` event
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseCreateEvent {
    /// Configuration for the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<ResponseOptions>,
}

impl ResponseCreateEvent {
    pub fn new() -> Self {
        Self { response: None }
    }

    pub fn with_options(mut self, options: ResponseOptions) -> Self {
        self.response = Some(options);
        self
    }
}

/// `response.cancel` event
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseCancelEvent {
    /// The response to cancel; the server cancels the in-progress one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response_id: Option<String>,
}

impl ResponseCancelEvent {
    pub fn new(response_id: Option<&str>) -> Self {
        Self {
            response_id: response_id.map(str::to_string),
        }
    }

    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }
}
