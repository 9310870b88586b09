//! # Handler chain
//!
//! Runs the handlers registered for the bot against each incoming message:
//! every `before` in registration order (any `false` stops the chain), then `handle`
//! until one returns `Stop` or `Reply`, then every `after` in reverse order with the final response.

use dbot_core::{Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Ordered list of handlers shared by all updates. Cloning is cheap (handlers are `Arc`).
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler.
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs all before → handle until Stop/Reply → all after in reverse. Returns the final response.
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    pub async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        for h in &self.handlers {
            if !h.before(message).await? {
                info!(
                    handler = %std::any::type_name_of_val(h.as_ref()),
                    "before returned false, chain stopped"
                );
                return Ok(HandlerResponse::Stop);
            }
        }

        let mut final_response = HandlerResponse::Continue;
        for h in &self.handlers {
            let response = h.handle(message).await?;
            debug!(
                handler = %std::any::type_name_of_val(h.as_ref()),
                response = ?response,
                "Handler processed"
            );
            if matches!(response, HandlerResponse::Stop | HandlerResponse::Reply(_)) {
                final_response = response;
                break;
            }
        }

        for h in self.handlers.iter().rev() {
            h.after(message, &final_response).await?;
        }

        let reply_len = match &final_response {
            HandlerResponse::Reply(text) => Some(text.len()),
            _ => None,
        };
        info!(message_id = %message.id, reply_len = ?reply_len, "handler chain finished");

        Ok(final_response)
    }
}

// Tests live in tests/handler_chain_test.rs
