//! Conversation state container
//!
//! Single source of truth for the presentation layer. State is mutated only
//! through the container's actions: initialize, send, and resolution
//! handling. Pending assistant placeholders are reconciled by id, never by
//! position, so overlapping sends may resolve in any order.

use chrono::Utc;
use std::sync::Arc;

use crate::models::{ChatMessage, ChatSettings, ScriptedMessage};
use crate::service::{ChatService, FALLBACK_NAME};

/// User-facing error when initialization fails.
pub const INIT_ERROR: &str = "Failed to initialize chat. Please try again.";
/// User-facing error when a send is rejected outright.
pub const SEND_ERROR: &str = "Failed to send message. Please try again.";

/// Template token replaced with the chatbot name in scripted openers.
const NAME_TOKEN: &str = "{chatbot.name}";

/// Conversation state as rendered by the UI.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub settings: ChatSettings,
    pub messages: Vec<ChatMessage>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Conversation container: mediates between the presentation layer and the
/// chat service.
pub struct Conversation {
    service: Arc<ChatService>,
    state: ConversationState,
    chatbot_name: String,
    initializing: bool,
    initialized: bool,
}

impl Conversation {
    pub fn new(service: Arc<ChatService>) -> Self {
        Self {
            service,
            state: ConversationState::default(),
            chatbot_name: FALLBACK_NAME.to_string(),
            initializing: false,
            initialized: false,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn chatbot_name(&self) -> &str {
        &self.chatbot_name
    }

    /// Load chatbot branding and settings, materializing scripted openers.
    ///
    /// Runs at most once per session; re-entrant calls are no-ops. A failed
    /// run leaves the container un-initialized so a retry re-invokes the
    /// fetch.
    pub async fn initialize(&mut self) {
        if self.initializing || self.initialized {
            tracing::debug!("Chat already initialized or initializing, skipping");
            return;
        }
        self.initializing = true;
        tracing::debug!("Initializing chat");

        self.state.messages.clear();
        self.state.is_loading = true;

        // Name fetch always succeeds (fixed fallback on failure).
        self.chatbot_name = self.service.chatbot_name().await;

        match self.service.fetch_chat_settings().await {
            Ok(settings) => {
                self.state.messages = self.scripted_openers(&settings.messages);
                self.state.settings = settings;
                self.state.error = None;
                self.initialized = true;
            }
            Err(e) => {
                tracing::error!("Error initializing chat: {:#}", e);
                self.state.error = Some(INIT_ERROR.to_string());
            }
        }

        self.initializing = false;
        self.state.is_loading = false;
    }

    /// Append the user message optimistically, then the service reply
    /// (finalized or pending placeholder).
    ///
    /// Requires non-empty trimmed input and no send already in flight. A
    /// degraded reply is still a successful call; only a rejected send sets
    /// the container error, and the user message stays either way.
    pub async fn send_chat_message(&mut self, content: &str) {
        let content = content.trim();
        if content.is_empty() || self.state.is_loading {
            return;
        }
        self.state.is_loading = true;

        self.state.messages.push(ChatMessage::user(content));

        match self.service.send_message(content).await {
            Ok(reply) => {
                self.state.messages.push(reply);
                self.state.error = None;
            }
            Err(e) => {
                tracing::error!("Error sending message: {:#}", e);
                self.state.error = Some(SEND_ERROR.to_string());
            }
        }

        self.state.is_loading = false;
    }

    /// Apply an async reply resolution: overwrite the matching message in
    /// place. An unmatched id is dropped, which is valid when the list was
    /// reset between send and resolution.
    pub fn handle_resolution(&mut self, resolution: ChatMessage) {
        match self
            .state
            .messages
            .iter_mut()
            .find(|m| m.id == resolution.id)
        {
            Some(slot) => {
                slot.content = resolution.content;
                slot.role = resolution.role;
                slot.pending = false;
            }
            None => {
                tracing::debug!("Dropping resolution for unknown message {}", resolution.id);
            }
        }
    }

    fn scripted_openers(&self, scripted: &[ScriptedMessage]) -> Vec<ChatMessage> {
        scripted
            .iter()
            .enumerate()
            .map(|(index, msg)| ChatMessage {
                id: format!("initial-{}", index),
                content: msg.content.replace(NAME_TOKEN, &self.chatbot_name),
                role: msg.role,
                created_at: Utc::now().to_rfc3339(),
                pending: false,
            })
            .collect()
    }
}
