#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text(TextPart),
    #[serde(rename = "audio")]
    Audio(AudioTranscriptPart),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextPart {
    #[serde(default)]
    text: String,
}

impl TextPart {
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioTranscriptPart {
    #[serde(default)]
    transcript: String,
}

impl AudioTranscriptPart {
    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}
