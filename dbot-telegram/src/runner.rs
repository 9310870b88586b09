//! REPL runner: converts teloxide messages to core::Message and passes them to the HandlerChain.

use anyhow::Result;
use dbot_core::ToCoreMessage;
use handler_chain::HandlerChain;
use teloxide::prelude::*;
use tracing::{error, info, instrument, warn};

use crate::adapters::TelegramMessageWrapper;

/// Bot's own username from getMe; `None` when the call fails or the bot has none.
#[instrument(skip(bot))]
pub async fn fetch_bot_username(bot: &teloxide::Bot) -> Option<String> {
    match bot.get_me().await {
        Ok(me) => {
            info!(
                username = %me.user.username.as_deref().unwrap_or("unknown"),
                "Bot authorized"
            );
            me.user.username.clone()
        }
        Err(e) => {
            warn!(error = %e, "getMe failed; commands addressed to other bots will not be filtered");
            None
        }
    }
}

/// Starts long polling with the given teloxide Bot. Each text message is converted to a core
/// message and handled by `handler_chain` in its own task, so slow lookups never block polling.
#[instrument(skip(bot, handler_chain))]
pub async fn run_repl(bot: teloxide::Bot, handler_chain: HandlerChain) -> Result<()> {
    info!("Starting polling");

    teloxide::repl(bot, move |msg: teloxide::types::Message| {
        let chain = handler_chain.clone();

        async move {
            if msg.text().is_none() {
                return Ok(());
            }
            let core_msg = TelegramMessageWrapper(&msg).to_core();

            tokio::spawn(async move {
                if let Err(e) = chain.handle(&core_msg).await {
                    error!(
                        error = %e,
                        user_id = core_msg.user.id,
                        chat_id = core_msg.chat.id,
                        "Handler chain failed"
                    );
                }
            });

            Ok(())
        }
    })
    .await;

    Ok(())
}
