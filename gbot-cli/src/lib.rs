//! # gbot-cli
//!
//! Command-line runner: env config, a demo router and a line-oriented replay of raw events.

pub mod cli;
pub mod config;
pub mod console;
pub mod demo;
pub mod replay;

pub use cli::{Cli, Commands};
pub use config::GbotConfig;
pub use console::ConsoleDispatcher;
pub use demo::build_router;
pub use replay::{replay, ReplayOutcome};
