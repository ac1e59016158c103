//! Wire envelopes for the remote chat API
//!
//! Every endpoint wraps its payload in `{ code, data }`; a non-zero `code`
//! or missing `data` is treated as a failed call.

use serde::Deserialize;

use super::message::Role;
use super::settings::ChatbotMetadata;

/// `GET /chatbot/{vendorId}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatbotEnvelope {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub data: Option<ChatbotMetadata>,
}

/// Message entry as it appears in send/status payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub id: Option<String>,
    pub role: Role,
    pub content: String,
}

/// `POST /chat` response in synchronous mode.
#[derive(Debug, Clone, Deserialize)]
pub struct SendSyncEnvelope {
    #[serde(default)]
    pub data: Option<SendSyncData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendSyncData {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

/// `POST /chat` response in asynchronous mode.
#[derive(Debug, Clone, Deserialize)]
pub struct SendAsyncEnvelope {
    #[serde(default)]
    pub data: Option<SendAsyncData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAsyncData {
    pub conversation_id: String,
}

/// `GET /chat/{conversationId}/{vendorId}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusEnvelope {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub data: Option<StatusData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
    #[serde(default)]
    pub pending_response: bool,
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chatbot_envelope_parse() {
        let json = r#"{
            "code": 0,
            "message": "ok",
            "data": {
                "chatbotId": "cb-1",
                "vendorId": "v-1",
                "name": "Helper",
                "description": null,
                "settings": { "messages": [], "styles": {} },
                "createdAt": "2025-01-01T00:00:00Z",
                "updatedAt": "2025-01-01T00:00:00Z"
            }
        }"#;
        let envelope: ChatbotEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.code, 0);
        let data = envelope.data.unwrap();
        assert_eq!(data.name.as_deref(), Some("Helper"));
        assert!(data.settings.is_some());
    }

    #[test]
    fn test_sync_send_envelope_without_messages() {
        let envelope: SendSyncEnvelope = serde_json::from_str(r#"{ "data": {} }"#).unwrap();
        assert!(envelope.data.unwrap().messages.is_empty());
    }

    #[test]
    fn test_status_envelope_parse() {
        let json = r#"{
            "code": 0,
            "data": {
                "pendingResponse": false,
                "messages": [
                    { "role": "user", "content": "hi" },
                    { "role": "assistant", "content": "hello", "id": "m-2" }
                ]
            }
        }"#;
        let envelope: StatusEnvelope = serde_json::from_str(json).unwrap();
        let data = envelope.data.unwrap();
        assert!(!data.pending_response);
        assert_eq!(data.messages.len(), 2);
        assert_eq!(data.messages[1].id.as_deref(), Some("m-2"));
    }

    #[test]
    fn test_async_send_envelope_parse() {
        let json = r#"{ "data": { "conversationId": "conv-9" } }"#;
        let envelope: SendAsyncEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.unwrap().conversation_id, "conv-9");
    }
}
