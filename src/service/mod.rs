//! Chat service: metadata cache, send protocol, async reply resolution
//!
//! Owns all network interaction. Metadata is cached with a TTL and served
//! stale when a refresh fails. Sending runs in one of two protocol modes:
//! synchronous (reply embedded in the response) or asynchronous (immediate
//! pending placeholder plus a background poll loop whose terminal result is
//! broadcast on the resolution channel).

use anyhow::{anyhow, bail, Context};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::api::ChatApi;
use crate::config::ProtocolMode;
use crate::models::{ChatMessage, ChatSettings, ChatbotMetadata, Role, WireMessage};

/// Metadata cache lifetime.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);
/// Delay between status poll attempts.
const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Poll attempt cap (~30s wall-clock budget).
const MAX_POLL_ATTEMPTS: u32 = 30;

/// Name used whenever the chatbot identity cannot be fetched.
pub const FALLBACK_NAME: &str = "Chatbot";
/// Placeholder content for a pending assistant message.
pub const PLACEHOLDER_CONTENT: &str = "Thinking...";
/// Reply had no usable assistant entry.
pub const FALLBACK_NO_ASSISTANT: &str = "Sorry, I couldn't process your request.";
/// Transport failure in synchronous mode.
pub const FALLBACK_NETWORK: &str = "Network error occurred. Please try again.";
/// Poll attempt cap exceeded.
pub const FALLBACK_TIMEOUT: &str = "Sorry, the response took too long. Please try again.";
/// A poll request failed.
pub const FALLBACK_POLL_ERROR: &str =
    "Sorry, something went wrong while waiting for a response.";

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Metadata unreachable with no cache to fall back on.
    #[error("chatbot metadata unavailable: {0}")]
    Fetch(anyhow::Error),
    /// Metadata reachable but the settings payload is missing.
    #[error("chatbot settings missing from metadata")]
    Config,
    /// Send request rejected outright (async mode only; sync mode degrades).
    #[error("message send rejected: {0}")]
    Send(anyhow::Error),
}

struct CacheEntry {
    metadata: ChatbotMetadata,
    fetched_at: Instant,
}

/// Client-side chat service. One instance per widget session.
pub struct ChatService {
    api: Arc<dyn ChatApi>,
    mode: ProtocolMode,
    cache: Mutex<Option<CacheEntry>>,
    resolutions: broadcast::Sender<ChatMessage>,
}

impl ChatService {
    pub fn new(api: Arc<dyn ChatApi>, mode: ProtocolMode) -> Arc<Self> {
        let (resolutions, _) = broadcast::channel(16);
        Arc::new(Self {
            api,
            mode,
            cache: Mutex::new(None),
            resolutions,
        })
    }

    /// Subscribe to async reply resolutions. Every background poll loop ends
    /// by broadcasting exactly one terminal message here.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.resolutions.subscribe()
    }

    /// Chatbot metadata, served from cache while fresh.
    ///
    /// A failed refresh falls back to a stale entry when one exists; only a
    /// failure with an empty cache propagates.
    pub async fn fetch_chatbot_metadata(&self) -> Result<ChatbotMetadata, ServiceError> {
        if let Some(entry) = self.cache.lock().unwrap().as_ref() {
            if entry.fetched_at.elapsed() < CACHE_TTL {
                return Ok(entry.metadata.clone());
            }
        }

        tracing::debug!("Fetching chatbot metadata from API");
        match self.fetch_metadata_remote().await {
            Ok(metadata) => {
                // Replace the whole entry; concurrent fetches race benignly
                // (last write wins).
                *self.cache.lock().unwrap() = Some(CacheEntry {
                    metadata: metadata.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(metadata)
            }
            Err(e) => {
                if let Some(entry) = self.cache.lock().unwrap().as_ref() {
                    tracing::warn!("Metadata fetch failed, using stale cache: {:#}", e);
                    return Ok(entry.metadata.clone());
                }
                tracing::error!("Error fetching chatbot metadata: {:#}", e);
                Err(ServiceError::Fetch(e))
            }
        }
    }

    async fn fetch_metadata_remote(&self) -> anyhow::Result<ChatbotMetadata> {
        let envelope = self.api.fetch_chatbot().await?;
        if envelope.code != 0 {
            bail!("chatbot endpoint returned code {}", envelope.code);
        }
        envelope.data.context("chatbot response missing data")
    }

    /// Widget settings derived from metadata.
    pub async fn fetch_chat_settings(&self) -> Result<ChatSettings, ServiceError> {
        let metadata = self.fetch_chatbot_metadata().await?;
        metadata.settings.ok_or(ServiceError::Config)
    }

    /// Chatbot display name. Never fails; any problem yields the fixed
    /// fallback so initialization is never blocked on branding.
    pub async fn chatbot_name(&self) -> String {
        match self.fetch_chatbot_metadata().await {
            Ok(metadata) => metadata
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| FALLBACK_NAME.to_string()),
            Err(e) => {
                tracing::warn!("Error fetching chatbot name: {:#}", e);
                FALLBACK_NAME.to_string()
            }
        }
    }

    /// Send a user message using the configured protocol mode.
    ///
    /// Sync mode never errors: transport and payload problems degrade to a
    /// finalized assistant message with fixed apologetic content. Async mode
    /// returns a pending placeholder on acceptance and errors only when the
    /// initial POST itself is rejected.
    pub async fn send_message(
        self: &Arc<Self>,
        content: &str,
    ) -> Result<ChatMessage, ServiceError> {
        match self.mode {
            ProtocolMode::Sync => Ok(self.send_sync_mode(content).await),
            ProtocolMode::Async => self.send_async_mode(content).await,
        }
    }

    async fn send_sync_mode(&self, content: &str) -> ChatMessage {
        let envelope = match self.api.send_sync(content).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!("Error sending message: {:#}", e);
                return ChatMessage::fallback(FALLBACK_NETWORK);
            }
        };

        let messages = envelope.data.map(|data| data.messages).unwrap_or_default();
        match messages.iter().find(|m| m.role == Role::Assistant) {
            Some(reply) => ChatMessage::assistant(
                reply
                    .id
                    .clone()
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                reply.content.clone(),
            ),
            None => ChatMessage::fallback(FALLBACK_NO_ASSISTANT),
        }
    }

    async fn send_async_mode(
        self: &Arc<Self>,
        content: &str,
    ) -> Result<ChatMessage, ServiceError> {
        let envelope = self.api.send_async(content).await.map_err(ServiceError::Send)?;
        let conversation_id = envelope
            .data
            .map(|data| data.conversation_id)
            .ok_or_else(|| ServiceError::Send(anyhow!("send response missing conversation id")))?;

        let placeholder = ChatMessage::pending(PLACEHOLDER_CONTENT);
        let placeholder_id = placeholder.id.clone();

        // The loop runs to completion even if every subscriber is gone; a
        // broadcast into the void is fine.
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let content = service.poll_for_reply(&conversation_id).await;
            let resolution = ChatMessage::assistant(placeholder_id, content);
            let _ = service.resolutions.send(resolution);
        });

        Ok(placeholder)
    }

    /// Poll the status endpoint until the reply resolves, the attempt cap is
    /// reached, or a poll fails. Always returns terminal content.
    async fn poll_for_reply(&self, conversation_id: &str) -> String {
        for attempt in 1..=MAX_POLL_ATTEMPTS {
            tokio::time::sleep(POLL_INTERVAL).await;

            let status = match self.api.conversation_status(conversation_id).await {
                Ok(envelope) if envelope.code == 0 => envelope.data,
                Ok(envelope) => {
                    tracing::warn!(
                        "Status poll for {} returned code {}",
                        conversation_id,
                        envelope.code
                    );
                    return FALLBACK_POLL_ERROR.to_string();
                }
                Err(e) => {
                    tracing::warn!("Status poll for {} failed: {:#}", conversation_id, e);
                    return FALLBACK_POLL_ERROR.to_string();
                }
            };

            let Some(status) = status else {
                return FALLBACK_POLL_ERROR.to_string();
            };

            if status.pending_response {
                tracing::debug!(
                    "Conversation {} still pending (attempt {}/{})",
                    conversation_id,
                    attempt,
                    MAX_POLL_ATTEMPTS
                );
                continue;
            }

            return latest_assistant_content(&status.messages)
                .unwrap_or_else(|| FALLBACK_NO_ASSISTANT.to_string());
        }

        tracing::warn!("Conversation {} did not resolve in time", conversation_id);
        FALLBACK_TIMEOUT.to_string()
    }
}

/// Most recent assistant entry in a status message list.
fn latest_assistant_content(messages: &[WireMessage]) -> Option<String> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.content.clone())
}
