//! Scripted ChatApi implementation for tests
//!
//! Responses are queued per endpoint (status responses keyed by conversation
//! id) and popped in order; an exhausted queue yields an error.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::transport::ChatApi;
use crate::models::{
    ChatSettings, ChatbotEnvelope, ChatbotMetadata, Role, SendAsyncData, SendAsyncEnvelope,
    SendSyncData, SendSyncEnvelope, StatusData, StatusEnvelope, WireMessage,
};

#[derive(Default)]
pub struct ScriptedApi {
    chatbot: Mutex<VecDeque<Result<ChatbotEnvelope>>>,
    send_sync: Mutex<VecDeque<Result<SendSyncEnvelope>>>,
    send_async: Mutex<VecDeque<Result<SendAsyncEnvelope>>>,
    status: Mutex<HashMap<String, VecDeque<Result<StatusEnvelope>>>>,
    /// Calls against the metadata endpoint
    pub chatbot_calls: AtomicUsize,
    /// Calls against the status endpoint (all conversations)
    pub status_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chatbot(&self, response: Result<ChatbotEnvelope>) {
        self.chatbot.lock().unwrap().push_back(response);
    }

    pub fn push_send_sync(&self, response: Result<SendSyncEnvelope>) {
        self.send_sync.lock().unwrap().push_back(response);
    }

    pub fn push_send_async(&self, response: Result<SendAsyncEnvelope>) {
        self.send_async.lock().unwrap().push_back(response);
    }

    pub fn push_status(&self, conversation_id: &str, response: Result<StatusEnvelope>) {
        self.status
            .lock()
            .unwrap()
            .entry(conversation_id.to_string())
            .or_default()
            .push_back(response);
    }

    /// Queue `n` still-pending status responses for a conversation.
    pub fn push_status_pending(&self, conversation_id: &str, n: usize) {
        for _ in 0..n {
            self.push_status(conversation_id, Ok(status_pending()));
        }
    }
}

#[async_trait]
impl ChatApi for ScriptedApi {
    async fn fetch_chatbot(&self) -> Result<ChatbotEnvelope> {
        self.chatbot_calls.fetch_add(1, Ordering::SeqCst);
        self.chatbot
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted chatbot response")))
    }

    async fn send_sync(&self, _message: &str) -> Result<SendSyncEnvelope> {
        self.send_sync
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted sync send response")))
    }

    async fn send_async(&self, _message: &str) -> Result<SendAsyncEnvelope> {
        self.send_async
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted async send response")))
    }

    async fn conversation_status(&self, conversation_id: &str) -> Result<StatusEnvelope> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status
            .lock()
            .unwrap()
            .get_mut(conversation_id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(anyhow!("no scripted status for {}", conversation_id)))
    }
}

// -- Envelope builders --

pub fn chatbot_envelope(name: &str, settings: Option<ChatSettings>) -> ChatbotEnvelope {
    ChatbotEnvelope {
        code: 0,
        data: Some(ChatbotMetadata {
            name: Some(name.to_string()),
            description: None,
            settings,
        }),
    }
}

pub fn sync_reply(messages: Vec<WireMessage>) -> SendSyncEnvelope {
    SendSyncEnvelope {
        data: Some(SendSyncData { messages }),
    }
}

pub fn async_accepted(conversation_id: &str) -> SendAsyncEnvelope {
    SendAsyncEnvelope {
        data: Some(SendAsyncData {
            conversation_id: conversation_id.to_string(),
        }),
    }
}

pub fn status_pending() -> StatusEnvelope {
    StatusEnvelope {
        code: 0,
        data: Some(StatusData {
            pending_response: true,
            messages: Vec::new(),
        }),
    }
}

pub fn status_resolved(content: &str) -> StatusEnvelope {
    StatusEnvelope {
        code: 0,
        data: Some(StatusData {
            pending_response: false,
            messages: vec![
                wire_message(Role::User, "question"),
                wire_message(Role::Assistant, content),
            ],
        }),
    }
}

pub fn wire_message(role: Role, content: &str) -> WireMessage {
    WireMessage {
        id: None,
        role,
        content: content.to_string(),
    }
}
