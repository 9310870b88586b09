//! # Middleware for the vehicle check bot
//!
//! Chain handlers that observe traffic without replying.

mod logging;

pub use logging::LoggingHandler;
