//! Logs every inbound message in `before()` and the final outcome in `after()`.

use async_trait::async_trait;
use dbot_core::{Handler, HandlerResponse, Message, Result};
use tracing::{debug, info, instrument};

/// Maximum number of characters of message text written to the log.
const CONTENT_PREVIEW_CHARS: usize = 64;

/// Logs each message and the chain's response; never stops the chain.
#[derive(Clone, Default)]
pub struct LoggingHandler;

impl LoggingHandler {
    pub fn new() -> Self {
        Self
    }
}

/// First `CONTENT_PREVIEW_CHARS` characters of `content`, with `...` appended when cut.
pub(crate) fn content_preview(content: &str) -> String {
    let mut chars = content.chars();
    let preview: String = chars.by_ref().take(CONTENT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

#[async_trait]
impl Handler for LoggingHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            username = %message.user.username.as_deref().unwrap_or("unknown"),
            message_content = %content_preview(&message.content),
            "Received message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        match response {
            HandlerResponse::Reply(text) => info!(
                message_id = %message.id,
                reply_len = text.chars().count(),
                "Replied to message"
            ),
            other => debug!(message_id = %message.id, response = ?other, "Message not answered"),
        }
        Ok(())
    }
}
