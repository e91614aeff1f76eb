//! Slash commands typed at the prompt

pub mod help;

use crate::error::{CliError, CliResult};

/// A slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Settings,
    Set { key: String, value: String },
    Models,
    Reconnect,
    Copy(usize),
    Status,
    Help,
    Quit,
}

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Text to send as a prompt
    Prompt(String),
    Command(Command),
}

/// Command names, for suggestions
pub const COMMAND_NAMES: [&str; 8] = [
    "/settings",
    "/set",
    "/models",
    "/reconnect",
    "/copy",
    "/status",
    "/help",
    "/quit",
];

/// Classify a line; anything not starting with `/` is a prompt
///
/// Prompts are passed through untouched so blank input reaches the
/// controller's own guard.
pub fn parse_input(line: &str) -> CliResult<Input> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('/') {
        return Ok(Input::Prompt(line.to_string()));
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed.trim_end(), ""),
    };

    let command = match name {
        "/settings" => Command::Settings,
        "/set" => parse_set(rest)?,
        "/models" => Command::Models,
        "/reconnect" => Command::Reconnect,
        "/copy" => Command::Copy(parse_position(rest)?),
        "/status" => Command::Status,
        "/help" | "/?" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => {
            return Err(CliError::CommandNotFound {
                command: other.to_string(),
                suggestion: suggest(other),
            })
        }
    };
    Ok(Input::Command(command))
}

fn parse_set(rest: &str) -> CliResult<Command> {
    let (key, value) = match rest.split_once(char::is_whitespace) {
        Some((key, value)) => (key, value.trim()),
        None => (rest, ""),
    };
    if key.is_empty() {
        return Err(CliError::InvalidArgument {
            message: "Usage: /set <setting> <value>".to_string(),
        });
    }
    Ok(Command::Set {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_position(rest: &str) -> CliResult<usize> {
    rest.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| CliError::InvalidArgument {
            message: format!("Usage: /copy <message number>, got '{}'", rest),
        })
}

fn suggest(name: &str) -> String {
    COMMAND_NAMES
        .iter()
        .max_by_key(|candidate| shared_prefix(candidate, name))
        .filter(|candidate| shared_prefix(candidate, name) > 1)
        .map(|candidate| candidate.to_string())
        .unwrap_or_else(|| "/help".to_string())
}

fn shared_prefix(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}
