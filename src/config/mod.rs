//! Runtime configuration
//!
//! Defaults, then an optional `config.toml` in the platform config directory,
//! then environment overrides (`CHAT_VENDOR_ID`, `CHAT_API_BASE_URL`,
//! `CHAT_ASYNC`).

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Vendor used when no identifier is configured.
pub const DEFAULT_VENDOR_ID: &str = "c91c8550-8c5b-48ae-8be5-80522fd34dcd";
pub const DEFAULT_API_BASE_URL: &str = "https://dev-api.deeto.ai/v2";

/// How the send endpoint is driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolMode {
    /// One POST, full reply in the response.
    #[default]
    Sync,
    /// POST returns a conversation id; the reply is polled in the background.
    Async,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifier selecting which chatbot persona to load
    pub vendor_id: String,
    /// Base URL of the remote chat API
    pub api_base_url: String,
    /// Send protocol mode
    pub protocol_mode: ProtocolMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VENDOR_ID.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            protocol_mode: ProtocolMode::default(),
        }
    }
}

impl Config {
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "chatbot-cli", "chatbot-cli")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Environment variables take precedence over the config file.
    pub fn apply_env(&mut self) {
        if let Ok(vendor_id) = std::env::var("CHAT_VENDOR_ID") {
            if !vendor_id.is_empty() {
                self.vendor_id = vendor_id;
            }
        }
        if let Ok(base_url) = std::env::var("CHAT_API_BASE_URL") {
            if !base_url.is_empty() {
                self.api_base_url = base_url;
            }
        }
        if let Ok(flag) = std::env::var("CHAT_ASYNC") {
            match flag.as_str() {
                "1" | "true" | "yes" => self.protocol_mode = ProtocolMode::Async,
                "0" | "false" | "no" => self.protocol_mode = ProtocolMode::Sync,
                _ => {}
            }
        }
    }
}
