mod resources;
mod error;

pub use resources::*;
pub use error::{ErrorDetails, SESSION_EXPIRED_CODE};
use crate::ContentPart;

/// Correlation ids carried by every streamed response delta.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContentPosition {
    /// The ID of the response
    response_id: String,
    /// The ID of the item
    item_id: String,
    /// The index of the output item in the response
    output_index: u32,
    /// The index of the content part in the item's content array
    content_index: u32,
}

impl ContentPosition {
    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }

    pub fn content_index(&self) -> u32 {
        self.content_index
    }
}

/// `error` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ErrorEvent {
    event_id: String,

    /// Details about the error
    error: ErrorDetails,
}

impl ErrorEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn error(&self) -> &ErrorDetails {
        &self.error
    }
}

/// `session.created` and `session.updated` events
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionEvent {
    event_id: String,
    /// The session resource
    session: SessionResource,
}

impl SessionEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn session(&self) -> &SessionResource {
        &self.session
    }
}

/// `conversation.created` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversationCreatedEvent {
    event_id: String,

    /// The conversation resource
    conversation: ConversationResource,
}

impl ConversationCreatedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn conversation(&self) -> &ConversationResource {
        &self.conversation
    }
}

/// `input_audio_buffer.committed` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferCommittedEvent {
    event_id: String,

    /// The ID of the preceding item after which the new item will be inserted
    #[serde(default)]
    previous_item_id: Option<String>,
    /// The ID of the user message item that will be created
    item_id: String,
}

impl InputAudioBufferCommittedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn previous_item_id(&self) -> Option<&str> {
        self.previous_item_id.as_deref()
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// `input_audio_buffer.cleared` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferClearedEvent {
    event_id: String,
}

impl InputAudioBufferClearedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }
}

/// `input_audio_buffer.speech_started` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferSpeechStartedEvent {
    event_id: String,

    /// Milliseconds since the session started when speech was detected
    audio_start_ms: u32,
    /// The ID of the user message item that will be created when speech stops
    item_id: String,
}

impl InputAudioBufferSpeechStartedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn audio_start_ms(&self) -> u32 {
        self.audio_start_ms
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// `input_audio_buffer.speech_stopped` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferSpeechStoppedEvent {
    event_id: String,

    /// Milliseconds since the session started when speech stopped
    audio_end_ms: u32,
    /// The ID of the user message item that will be created
    item_id: String,
}

impl InputAudioBufferSpeechStoppedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn audio_end_ms(&self) -> u32 {
        self.audio_end_ms
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// `output_audio_buffer.started`, `.stopped` and `.cleared` events.
///
/// `response_id` is not reliably present on these, so callers must not match on it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutputAudioBufferEvent {
    event_id: String,
    #[serde(default)]
    response_id: Option<String>,
}

impl OutputAudioBufferEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }
}

/// `conversation.item.created` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversationItemCreatedEvent {
    event_id: String,

    /// The ID of the preceding item
    #[serde(default)]
    previous_item_id: Option<String>,
    /// The item that was created
    item: ItemResource,
}

impl ConversationItemCreatedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn previous_item_id(&self) -> Option<&str> {
        self.previous_item_id.as_deref()
    }

    pub fn item(&self) -> &ItemResource {
        &self.item
    }
}

/// `conversation.item.input_audio_transcription.completed` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioTranscriptionCompletedEvent {
    event_id: String,

    /// The ID of the user message item
    item_id: String,

    /// The index of the content part containing the audio
    content_index: u32,

    /// The transcribed text
    transcript: String,
}

impl InputAudioTranscriptionCompletedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn content_index(&self) -> u32 {
        self.content_index
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct TranscriptionLogprob {
    bytes: Vec<u8>,
    logprob: f64,
    token: String,
}

impl TranscriptionLogprob {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn logprob(&self) -> f64 {
        self.logprob
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// `conversation.item.input_audio_transcription.delta` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioTranscriptionDeltaEvent {
    event_id: String,
    item_id: String,
    #[serde(default)]
    content_index: u32,
    delta: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    logprobs: Option<Vec<TranscriptionLogprob>>,
}

impl InputAudioTranscriptionDeltaEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn content_index(&self) -> u32 {
        self.content_index
    }

    pub fn delta(&self) -> &str {
        &self.delta
    }

    pub fn logprobs(&self) -> Option<&[TranscriptionLogprob]> {
        self.logprobs.as_deref()
    }
}

/// `conversation.item.input_audio_transcription.failed` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioTranscriptionFailedEvent {
    event_id: String,

    /// The ID of the user message item
    item_id: String,

    /// The index of the content part containing the audio
    content_index: u32,

    /// Details of the transcription error
    error: ErrorDetails,
}

impl InputAudioTranscriptionFailedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn content_index(&self) -> u32 {
        self.content_index
    }

    pub fn error(&self) -> &ErrorDetails {
        &self.error
    }
}

/// `conversation.item.truncated` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversationItemTruncatedEvent {
    event_id: String,

    /// The ID of the assistant message item that was truncated
    item_id: String,
    /// The index of the content part that was truncated
    content_index: u32,
    /// The duration up to which the audio was truncated, in milliseconds
    audio_end_ms: u32,
}

impl ConversationItemTruncatedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn content_index(&self) -> u32 {
        self.content_index
    }

    pub fn audio_end_ms(&self) -> u32 {
        self.audio_end_ms
    }
}

/// `conversation.item.deleted` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversationItemDeletedEvent {
    event_id: String,

    /// The ID of the item that was deleted
    item_id: String,
}

impl ConversationItemDeletedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// `response.created` and `response.done` events
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseEvent {
    event_id: String,

    /// The response resource
    response: ResponseResource,
}

impl ResponseEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response(&self) -> &ResponseResource {
        &self.response
    }
}

/// `response.output_item.added` and `response.output_item.done` events
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseOutputItemEvent {
    event_id: String,

    /// The ID of the response to which the item belongs
    response_id: String,
    /// The index of the output item in the response
    output_index: u32,
    /// The item that was added or completed
    item: ItemResource,
}

impl ResponseOutputItemEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }

    pub fn item(&self) -> &ItemResource {
        &self.item
    }
}

/// `response.content_part.added` and `response.content_part.done` events
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseContentPartEvent {
    event_id: String,
    #[serde(flatten)]
    position: ContentPosition,
    /// The content part that was added or completed
    part: ContentPart,
}

impl ResponseContentPartEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn position(&self) -> &ContentPosition {
        &self.position
    }

    pub fn part(&self) -> &ContentPart {
        &self.part
    }
}

/// `response.text.delta`, `response.audio_transcript.delta` and `response.audio.delta` events
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseDeltaEvent {
    event_id: String,
    #[serde(flatten)]
    position: ContentPosition,
    /// Text, transcript or base64 audio, depending on the event
    delta: String,
}

impl ResponseDeltaEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn position(&self) -> &ContentPosition {
        &self.position
    }

    pub fn delta(&self) -> &str {
        &self.delta
    }
}

/// `response.text.done` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseTextDoneEvent {
    event_id: String,
    #[serde(flatten)]
    position: ContentPosition,
    /// The completed text content
    text: String,
}

impl ResponseTextDoneEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn position(&self) -> &ContentPosition {
        &self.position
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// `response.audio_transcript.done` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseAudioTranscriptDoneEvent {
    event_id: String,
    #[serde(flatten)]
    position: ContentPosition,
    /// The completed audio transcript
    transcript: String,
}

impl ResponseAudioTranscriptDoneEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn position(&self) -> &ContentPosition {
        &self.position
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}

/// `response.audio.done` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseAudioDoneEvent {
    event_id: String,
    #[serde(flatten)]
    position: ContentPosition,
}

impl ResponseAudioDoneEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn position(&self) -> &ContentPosition {
        &self.position
    }
}

/// `response.function_call_arguments.delta` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseFunctionCallArgumentsDeltaEvent {
    event_id: String,

    /// The ID of the response
    response_id: String,
    /// The ID of the function call item
    item_id: String,
    /// The index of the output item in the response
    output_index: u32,
    /// The ID of the function call
    call_id: String,
    /// The delta in the function calling arguments
    delta: String,
}

impl ResponseFunctionCallArgumentsDeltaEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn delta(&self) -> &str {
        &self.delta
    }
}

/// `response.function_call_arguments.done` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseFunctionCallArgumentsDoneEvent {
    event_id: String,

    /// The ID of the response
    response_id: String,
    /// The ID of the function call item
    item_id: String,
    /// The index of the output item in the response
    output_index: u32,
    /// The ID of the function call
    call_id: String,
    /// The name of the function, when the server includes it
    #[serde(default)]
    name: Option<String>,
    /// The completed function calling arguments
    arguments: String,
}

impl ResponseFunctionCallArgumentsDoneEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }
}

/// `rate_limits.updated` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RateLimitsUpdatedEvent {
    event_id: String,

    /// List of rate limit information
    rate_limits: Vec<RateLimitInformation>,
}

impl RateLimitsUpdatedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn rate_limits(&self) -> &[RateLimitInformation] {
        &self.rate_limits
    }
}
