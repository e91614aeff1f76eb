//! magpt terminal front end
//!
//! Presentation layer for the chat session: argument parsing, the line
//! editor loop, slash commands and rendering of session events.

pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod render;
pub mod repl;
pub mod router;

pub use error::{CliError, CliResult};
pub use router::Cli;
