//! Intent resolution.

use super::skill::SkillRequest;

pub const WELCOME_INTENT: &str = "WelcomeIntent";
pub const HELP_INTENT: &str = "HelpIntent";
pub const FEED_INTENT: &str = "FeedIntent";
pub const CANCEL_INTENT: &str = "CancelIntent";
pub const STOP_INTENT: &str = "StopIntent";

const BUILT_IN_PREFIX: &str = "AMAZON.";

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Welcome,
    Help,
    Feed,
    Exit,
    /// Anything not handled; answered with help.
    Unknown(String),
}

impl Intent {
    /// Map an intent name (built-in prefix already removed).
    pub fn from_name(name: &str) -> Self {
        match name {
            WELCOME_INTENT => Self::Welcome,
            HELP_INTENT => Self::Help,
            FEED_INTENT => Self::Feed,
            CANCEL_INTENT | STOP_INTENT => Self::Exit,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Resolve the intent of a request. Unsupported request types fall back to help.
    pub fn resolve(request: &SkillRequest) -> Self {
        intent_name(request)
            .map(|name| Self::from_name(&name))
            .unwrap_or(Self::Help)
    }
}

/// Intent name for a request: launches are a welcome, intent requests carry
/// their own name with the built-in prefix removed.
pub fn intent_name(request: &SkillRequest) -> Option<String> {
    match request.request.request_type.as_str() {
        "LaunchRequest" => Some(WELCOME_INTENT.to_string()),
        "IntentRequest" => request
            .request
            .intent
            .as_ref()
            .map(|intent| intent.name.replace(BUILT_IN_PREFIX, "")),
        _ => None,
    }
}
