//! Remote chat API surface
//!
//! Object-safe so the service can be driven by a scripted transport in tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ChatbotEnvelope, SendAsyncEnvelope, SendSyncEnvelope, StatusEnvelope};

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Fetch chatbot identity and settings.
    async fn fetch_chatbot(&self) -> Result<ChatbotEnvelope>;

    /// Send a message in synchronous mode; the reply rides in the response.
    async fn send_sync(&self, message: &str) -> Result<SendSyncEnvelope>;

    /// Send a message in asynchronous mode; the response carries a
    /// conversation id used for status polling.
    async fn send_async(&self, message: &str) -> Result<SendAsyncEnvelope>;

    /// Poll the status of an asynchronous conversation.
    async fn conversation_status(&self, conversation_id: &str) -> Result<StatusEnvelope>;
}
