//! # dbot-telegram
//!
//! Telegram layer: converts teloxide updates to [`dbot_core::Message`], implements [`dbot_core::Bot`]
//! on top of teloxide, and runs the long-polling REPL that feeds every text message to the handler chain.
//! No lookup logic lives here.

mod adapters;
mod bot_adapter;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::{build_teloxide_bot, TelegramBotAdapter};
pub use runner::{fetch_bot_username, run_repl};
