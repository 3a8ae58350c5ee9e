use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Re-send messages whose persistence write failed
    Retry,
    /// Show help
    Help,
    /// Exit the application
    Bye,
}

impl SlashCommand {
    pub fn command(&self) -> &'static str {
        (*self).into()
    }

    pub fn description(&self) -> &'static str {
        match self {
            SlashCommand::Retry => "Re-send messages the backend has not stored yet",
            SlashCommand::Help => "Show available commands",
            SlashCommand::Bye => "Exit intervu",
        }
    }
}

pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            command,
            keyword: command.command(),
            description: command.description(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub command: SlashCommand,
    pub keyword: &'static str,
    pub description: &'static str,
}

/// Parse a composer submission as a slash command, if it is one.
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let rest = input.trim().strip_prefix('/')?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let keyword = parts.next()?;
    let command = SlashCommand::from_str(keyword).ok()?;
    let argument = parts
        .next()
        .map(|arg| arg.trim().to_string())
        .filter(|arg| !arg.is_empty());

    Some(ParsedCommand { command, argument })
}

pub fn get_help_text() -> String {
    let entries: Vec<String> = command_entries()
        .iter()
        .map(|entry| format!("/{} — {}", entry.keyword, entry.description))
        .collect();
    entries.join("  ·  ")
}
