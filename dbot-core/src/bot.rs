//! Bot abstraction for sending messages and photos.
//!
//! [`Bot`] trait is transport-agnostic; dbot-telegram implements it via teloxide.

use crate::error::Result;
use crate::types::Chat;
use async_trait::async_trait;

/// Abstraction for sending replies. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a message whose text is already escaped MarkdownV2.
    async fn send_markdown(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends an image (raw bytes) with an optional plain-text caption.
    async fn send_photo(&self, chat: &Chat, image: Vec<u8>, caption: Option<&str>) -> Result<()>;
}
