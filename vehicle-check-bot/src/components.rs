//! Builds the runtime pieces from [`BotConfig`]: teloxide bot, [`Bot`] adapter, API client and handler chain.

use anyhow::Result;
use check_handlers::CheckCommandHandler;
use dbot_core::Bot;
use dbot_telegram::{build_teloxide_bot, TelegramBotAdapter};
use handler_chain::HandlerChain;
use middleware::LoggingHandler;
use std::sync::Arc;
use tracing::{info, instrument};
use vehicle_check_client::{VehicleCheckApi, VehicleCheckClient};

use crate::config::BotConfig;

/// Shared components. Cloning is cheap.
#[derive(Clone)]
pub struct BotComponents {
    pub teloxide_bot: teloxide::Bot,
    pub bot: Arc<dyn Bot>,
    pub api: Arc<dyn VehicleCheckApi>,
}

/// Creates the Telegram bot and the upstream API client from config.
#[instrument(skip(config))]
pub fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let teloxide_bot = build_teloxide_bot(&config.bot_token, config.telegram_api_url.as_deref())?;
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let api: Arc<dyn VehicleCheckApi> =
        Arc::new(VehicleCheckClient::new(config.client_config())?);

    info!(
        osago_api_url = %config.osago_api_url,
        fines_api_url = %config.fines_api_url,
        http_timeout_secs = config.http_timeout.as_secs(),
        "Components built"
    );

    Ok(BotComponents {
        teloxide_bot,
        bot,
        api,
    })
}

/// Chain: logging first (sees every message and the final reply), then the command handler.
/// `bot_username` is the bot's own name, used to skip commands addressed to other bots.
pub fn build_handler_chain(
    api: Arc<dyn VehicleCheckApi>,
    bot: Arc<dyn Bot>,
    bot_username: Option<String>,
) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler::new()))
        .add_handler(Arc::new(
            CheckCommandHandler::new(api, bot).with_bot_username(bot_username),
        ))
}
