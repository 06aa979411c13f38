//! Command Handlers module
//!
//! Handlers translate application intents into stat updates.

mod battle_handler;
mod commands;
mod rating_handler;
mod register_handler;

pub use battle_handler::BattleVoteHandler;
pub use commands::*;
pub use rating_handler::RateJokeHandler;
pub use register_handler::RegisterJokeHandler;
