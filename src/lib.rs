//! Slash command plumbing and table rendering for Discord bots.

pub mod bot;
pub mod config;
pub mod error;
pub mod table;

pub use bot::{Bot, CommandOptions, Handler, HandlerError, HandlerResult};
pub use config::BotOptions;
pub use error::{BotError, Result};
