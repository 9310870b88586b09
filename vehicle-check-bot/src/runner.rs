use anyhow::Result;
use dbot_core::init_tracing;
use dbot_telegram::{fetch_bot_username, run_repl};
use tracing::{info, instrument};

use crate::components::{build_bot_components, build_handler_chain};
use crate::config::BotConfig;

/// Main entry: validate config, init logging, build components and handler chain, then poll.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.log_file)?;

    info!(config = ?config, "Initializing bot");

    let components = build_bot_components(&config)?;
    let bot_username = fetch_bot_username(&components.teloxide_bot).await;
    let handler_chain = build_handler_chain(
        components.api.clone(),
        components.bot.clone(),
        bot_username,
    );

    info!("Bot started successfully");

    run_repl(components.teloxide_bot, handler_chain).await
}
