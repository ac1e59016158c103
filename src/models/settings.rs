//! Chatbot branding and widget settings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::message::Role;

/// Scripted conversation opener from the chatbot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedMessage {
    pub content: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Widget settings delivered with the chatbot metadata.
///
/// `placeholder-text` keeps its kebab-case wire key; everything else is
/// camelCase on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default)]
    pub styles: HashMap<String, String>,
    #[serde(default)]
    pub messages: Vec<ScriptedMessage>,
    #[serde(rename = "contactUrl", default, skip_serializing_if = "Option::is_none")]
    pub contact_url: Option<String>,
    #[serde(rename = "introOptions", default, skip_serializing_if = "Vec::is_empty")]
    pub intro_options: Vec<String>,
    #[serde(
        rename = "placeholder-text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub placeholder_text: Option<String>,
}

/// Chatbot identity and settings, as served by the metadata endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: Option<ChatSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_parse_wire_keys() {
        let json = r#"{
            "styles": { "--color": "black", "--border-radius": "6px" },
            "messages": [
                { "content": "Hi, I'm {chatbot.name}!", "role": "assistant" },
                { "content": "Pick a topic", "role": "assistant", "options": ["Pricing"] }
            ],
            "contactUrl": "https://example.com/contact",
            "introOptions": ["What do you do?"],
            "placeholder-text": "Ask me anything"
        }"#;

        let settings: ChatSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.styles["--color"], "black");
        assert_eq!(settings.messages.len(), 2);
        assert_eq!(settings.messages[1].options, vec!["Pricing"]);
        assert_eq!(settings.placeholder_text.as_deref(), Some("Ask me anything"));
        assert_eq!(settings.intro_options, vec!["What do you do?"]);
    }

    #[test]
    fn test_settings_parse_minimal() {
        let settings: ChatSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.styles.is_empty());
        assert!(settings.messages.is_empty());
        assert!(settings.placeholder_text.is_none());
    }

    #[test]
    fn test_metadata_without_settings() {
        let json = r#"{ "name": "Helper", "description": null }"#;
        let metadata: ChatbotMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Helper"));
        assert!(metadata.settings.is_none());
    }
}
