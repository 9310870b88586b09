//! # Check handlers
//!
//! Chat commands of the vehicle check bot: `/start`, `/help`, `/check_osago_vin`, `/check_osago_reg`,
//! `/check_fines` and `/fine_photo`. Each command checks its argument count, validates argument
//! formats, calls the [`vehicle_check_client::VehicleCheckApi`] and renders the result as MarkdownV2.

mod check_handler;
mod command;
pub mod format;
pub mod validation;

pub use check_handler::CheckCommandHandler;
pub use command::{Command, ParsedCommand};
