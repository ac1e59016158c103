//! Data models for chat entities

mod message;
mod settings;
mod wire;

pub use message::*;
pub use settings::*;
pub use wire::*;
