use crate::audio::{AudioFormat, InputAudioTranscription, TranscriptionModel, TurnDetection, Voice};
use crate::tools::{Tool, ToolChoice};

pub const DEFAULT_MODEL: &str = "gpt-4o-realtime-preview-2024-12-17";

/// The session configuration sent with the token request and with `session.update`.
///
/// `model` and `voice` identify the session: changing either requires a new
/// connection. Every other field can be patched on a live session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// The realtime model the session runs against.
    model: String,

    /// The set of modalities the model can respond with. To disable audio, set this to ["text"].
    modalities: Vec<String>,

    /// The default system instructions prepended to model calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,

    /// The voice the model uses to respond. Cannot be changed once the model has responded with audio.
    voice: Voice,

    /// The format of input audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    input_audio_format: Option<AudioFormat>,

    /// The format of output audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    output_audio_format: Option<AudioFormat>,

    /// Configuration for input audio transcription. Serialized as null to turn it off.
    input_audio_transcription: Option<InputAudioTranscription>,

    /// Configuration for turn detection. Serialized as null to turn it off.
    turn_detection: Option<TurnDetection>,

    /// Tools(Functions) available to the model.
    tools: Vec<Tool>,

    /// How the model chooses tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,

    /// Sampling temperature for the model.
    temperature: f32,

    /// Maximum number of output tokens for a single response, or "inf".
    #[serde(skip_serializing_if = "Option::is_none")]
    max_response_output_tokens: Option<MaxOutputTokens>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            modalities: vec!["text".to_string(), "audio".to_string()],
            instructions: None,
            voice: Voice::Alloy,
            input_audio_format: None,
            output_audio_format: None,
            input_audio_transcription: None,
            turn_detection: Some(TurnDetection::default()),
            tools: vec![],
            tool_choice: None,
            temperature: 0.8,
            max_response_output_tokens: None,
        }
    }
}

/// The fields of a [`SessionConfig`] that can only change by reconnecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub model: String,
    pub voice: Voice,
}

impl SessionConfig {
    pub fn builder() -> SessionConfigurator {
        SessionConfigurator::new()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn modalities(&self) -> &[String] {
        &self.modalities
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn input_audio_transcription(&self) -> Option<&InputAudioTranscription> {
        self.input_audio_transcription.as_ref()
    }

    pub fn turn_detection(&self) -> Option<&TurnDetection> {
        self.turn_detection.as_ref()
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_response_output_tokens(&self) -> Option<&MaxOutputTokens> {
        self.max_response_output_tokens.as_ref()
    }

    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            model: self.model.clone(),
            voice: self.voice.clone(),
        }
    }

    /// Compares everything except the identity fields.
    pub fn patchable_eq(&self, other: &SessionConfig) -> bool {
        self.modalities == other.modalities
            && self.instructions == other.instructions
            && self.input_audio_format == other.input_audio_format
            && self.output_audio_format == other.output_audio_format
            && self.input_audio_transcription == other.input_audio_transcription
            && self.turn_detection == other.turn_detection
            && self.tools == other.tools
            && self.tool_choice == other.tool_choice
            && self.temperature == other.temperature
            && self.max_response_output_tokens == other.max_response_output_tokens
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum MaxOutputTokens {
    Number(u32),
    Infinity(Unbounded),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Unbounded {
    #[serde(rename = "inf")]
    Inf,
}

impl MaxOutputTokens {
    pub fn inf() -> Self {
        MaxOutputTokens::Infinity(Unbounded::Inf)
    }
}

pub struct SessionConfigurator {
    session: SessionConfig,
}

impl Default for SessionConfigurator {
    fn default() -> Self {
        Self::new()
    }
}

impl From<SessionConfig> for SessionConfigurator {
    fn from(session: SessionConfig) -> Self {
        Self { session }
    }
}

impl SessionConfigurator {
    pub fn new() -> Self {
        Self {
            session: SessionConfig::default(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.session.model = model.to_string();
        self
    }

    pub fn with_modalities(mut self, modalities: Vec<String>) -> Self {
        self.session.modalities = modalities;
        self
    }

    pub fn with_modalities_disable_audio(mut self) -> Self {
        self.session.modalities = vec!["text".to_string()];
        self
    }

    pub fn with_modalities_enable_audio(mut self) -> Self {
        self.session.modalities = vec!["text".to_string(), "audio".to_string()];
        self
    }

    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.session.instructions = Some(instructions.to_string());
        self
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.session.voice = voice;
        self
    }

    pub fn with_input_audio_format(mut self, format: AudioFormat) -> Self {
        self.session.input_audio_format = Some(format);
        self
    }

    pub fn with_output_audio_format(mut self, format: AudioFormat) -> Self {
        self.session.output_audio_format = Some(format);
        self
    }

    pub fn with_input_audio_transcription(mut self, input_audio_transcription: InputAudioTranscription) -> Self {
        self.session.input_audio_transcription = Some(input_audio_transcription);
        self
    }

    pub fn with_input_audio_transcription_disable(mut self) -> Self {
        self.session.input_audio_transcription = None;
        self
    }

    pub fn with_input_audio_transcription_enable(mut self, model: TranscriptionModel) -> Self {
        self.session.input_audio_transcription = Some(InputAudioTranscription::new().with_model(model));
        self
    }

    pub fn with_turn_detection_enable(mut self, turn_detection: TurnDetection) -> Self {
        self.session.turn_detection = Some(turn_detection);
        self
    }

    pub fn with_turn_detection_disable(mut self) -> Self {
        self.session.turn_detection = None;
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.session.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.session.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.session.temperature = temperature;
        self
    }

    pub fn with_max_response_output_tokens(mut self, max_output_tokens: MaxOutputTokens) -> Self {
        self.session.max_response_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn build(self) -> SessionConfig {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ServerVadTurnDetection;

    #[test]
    fn disabled_policies_serialize_as_null() {
        let config = SessionConfig::builder().with_turn_detection_disable().build();
        let json = serde_json::to_value(&config).unwrap();
        assert!(json["turn_detection"].is_null());
        assert!(json["input_audio_transcription"].is_null());
        assert_eq!(json["model"], DEFAULT_MODEL);
        assert_eq!(json["voice"], "alloy");
    }

    #[test]
    fn server_vad_is_on_by_default() {
        let config = SessionConfig::default();
        assert_eq!(config.turn_detection(), Some(&TurnDetection::default()));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["turn_detection"]["type"], "server_vad");

        let off = SessionConfigurator::from(config).with_turn_detection_disable().build();
        assert!(off.turn_detection().is_none());
        assert_eq!(off.model(), DEFAULT_MODEL);
    }

    #[test]
    fn max_output_tokens_accepts_inf() {
        let config: SessionConfig = serde_json::from_str(r#"{"max_response_output_tokens":"inf"}"#).unwrap();
        assert_eq!(config.max_response_output_tokens(), Some(&MaxOutputTokens::inf()));

        let config: SessionConfig = serde_json::from_str(r#"{"max_response_output_tokens":512}"#).unwrap();
        assert_eq!(config.max_response_output_tokens(), Some(&MaxOutputTokens::Number(512)));
    }

    #[test]
    fn patchable_eq_ignores_identity() {
        let a = SessionConfig::builder()
            .with_voice(Voice::Ash)
            .with_turn_detection_enable(TurnDetection::ServerVad(ServerVadTurnDetection::default()))
            .build();
        let b = SessionConfig::builder()
            .with_model("gpt-4o-mini-realtime-preview")
            .with_voice(Voice::Verse)
            .with_turn_detection_enable(TurnDetection::ServerVad(ServerVadTurnDetection::default()))
            .build();
        assert!(a.patchable_eq(&b));
        assert_ne!(a.identity(), b.identity());

        let c = SessionConfig::builder().with_voice(Voice::Ash).with_temperature(0.6).build();
        assert!(!a.patchable_eq(&c));
    }
}
