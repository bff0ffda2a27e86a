//! Skill request and response envelopes.
//!
//! Only the fields the gateway reads are modelled; everything else in the
//! platform payload is ignored.

use serde::{Deserialize, Serialize};

/// A parsed skill request.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillRequest {
    #[serde(default)]
    pub version: Option<String>,
    pub request: RequestBody,
}

impl SkillRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

/// The `request` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub intent: Option<IntentSlot>,
}

/// The `request.intent` object.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentSlot {
    pub name: String,
}

// =============================================================================
// Response
// =============================================================================

/// Response envelope returned to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillResponse {
    pub version: &'static str,
    pub response: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub output_speech: OutputSpeech,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    pub should_end_session: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub speech_type: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

impl OutputSpeech {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            speech_type: "PlainText",
            text: text.into(),
        }
    }
}

impl SkillResponse {
    /// Speak and end the session.
    pub fn tell(text: impl Into<String>) -> Self {
        Self {
            version: "1.0",
            response: ResponseBody {
                output_speech: OutputSpeech::plain(text),
                reprompt: None,
                should_end_session: true,
            },
        }
    }

    /// Speak and keep the session open, repeating the speech as reprompt.
    pub fn ask(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            version: "1.0",
            response: ResponseBody {
                reprompt: Some(Reprompt {
                    output_speech: OutputSpeech::plain(text.clone()),
                }),
                output_speech: OutputSpeech::plain(text),
                should_end_session: false,
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.response.output_speech.text
    }
}
