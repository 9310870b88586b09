//! # Vehicle check bot
//!
//! Telegram bot that looks up OSAGO insurance policies and traffic fines. Loads [`BotConfig`]
//! from the environment once, wires the API client, the Telegram adapter and the handler chain,
//! then runs long polling.

pub mod cli;
pub mod components;
pub mod config;
pub mod runner;

pub use cli::{Cli, Commands};
pub use components::{build_bot_components, build_handler_chain, BotComponents};
pub use config::BotConfig;
pub use runner::run_bot;
