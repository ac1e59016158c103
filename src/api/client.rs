//! HTTP transport for the remote chat API
//!
//! Wraps reqwest::Client with per-endpoint timeouts and status checking.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use super::transport::ChatApi;
use crate::config::Config;
use crate::models::{ChatbotEnvelope, SendAsyncEnvelope, SendSyncEnvelope, StatusEnvelope};

/// Metadata endpoint timeout.
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);
/// Send endpoint timeout (both protocol modes).
const SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// reqwest-backed [`ChatApi`] implementation.
pub struct HttpChatApi {
    http: reqwest::Client,
    base_url: String,
    vendor_id: String,
}

impl HttpChatApi {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            vendor_id: config.vendor_id.clone(),
        }
    }

    fn chatbot_url(&self) -> String {
        format!("{}/chatbot/{}", self.base_url, self.vendor_id)
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    fn status_url(&self, conversation_id: &str) -> String {
        format!("{}/chat/{}/{}", self.base_url, conversation_id, self.vendor_id)
    }

    fn send_body(&self, message: &str, is_async: bool) -> serde_json::Value {
        serde_json::json!({
            "async": is_async,
            "message": message,
            "vendorId": self.vendor_id,
        })
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn fetch_chatbot(&self) -> Result<ChatbotEnvelope> {
        let url = self.chatbot_url();
        tracing::debug!("Chatbot GET {}", url);

        let resp = self
            .http
            .get(&url)
            .timeout(METADATA_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("Chatbot GET {} failed", url))?;

        check_response(resp, &url)
            .await?
            .json()
            .await
            .context("Failed to parse chatbot response")
    }

    async fn send_sync(&self, message: &str) -> Result<SendSyncEnvelope> {
        let url = self.chat_url();
        tracing::debug!("Chat POST {} (sync)", url);

        let resp = self
            .http
            .post(&url)
            .timeout(SEND_TIMEOUT)
            .json(&self.send_body(message, false))
            .send()
            .await
            .with_context(|| format!("Chat POST {} failed", url))?;

        check_response(resp, &url)
            .await?
            .json()
            .await
            .context("Failed to parse send response")
    }

    async fn send_async(&self, message: &str) -> Result<SendAsyncEnvelope> {
        let url = self.chat_url();
        tracing::debug!("Chat POST {} (async)", url);

        let resp = self
            .http
            .post(&url)
            .timeout(SEND_TIMEOUT)
            .json(&self.send_body(message, true))
            .send()
            .await
            .with_context(|| format!("Chat POST {} failed", url))?;

        check_response(resp, &url)
            .await?
            .json()
            .await
            .context("Failed to parse send response")
    }

    async fn conversation_status(&self, conversation_id: &str) -> Result<StatusEnvelope> {
        let url = self.status_url(conversation_id);
        tracing::debug!("Status GET {}", url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Status GET {} failed", url))?;

        check_response(resp, &url)
            .await?
            .json()
            .await
            .context("Failed to parse status response")
    }
}

/// Check HTTP response status code and return a clear error on failure.
async fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("HTTP {} for {}: {}", status.as_u16(), url, body);
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> HttpChatApi {
        let mut config = Config::default();
        config.api_base_url = "https://api.example.com/v2/".to_string();
        config.vendor_id = "v-1".to_string();
        HttpChatApi::new(&config)
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let api = api();
        assert_eq!(api.chatbot_url(), "https://api.example.com/v2/chatbot/v-1");
        assert_eq!(api.chat_url(), "https://api.example.com/v2/chat");
        assert_eq!(
            api.status_url("conv-7"),
            "https://api.example.com/v2/chat/conv-7/v-1"
        );
    }

    #[test]
    fn test_send_body_shape() {
        let api = api();
        let body = api.send_body("hello", true);
        assert_eq!(body["async"], true);
        assert_eq!(body["message"], "hello");
        assert_eq!(body["vendorId"], "v-1");
    }
}
