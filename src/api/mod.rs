//! Remote chat API transport

pub mod client;
#[cfg(test)]
pub mod testing;
mod transport;

pub use client::HttpChatApi;
pub use transport::ChatApi;
