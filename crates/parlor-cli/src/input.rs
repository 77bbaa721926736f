//! Line input parsing.
//!
//! Every line typed on stdin is either a slash command or a chat message.
//! Parsing is pure; the terminal driver turns the result into an [`Intent`]
//! or a local notice.

use parlor_app::Intent;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/name <display name>`
    Name {
        /// Requested display name (may contain spaces).
        name: String,
    },
    /// `/join <room>`
    Join {
        /// Room to join.
        room: String,
    },
    /// `/create <room>`
    Create {
        /// Room to create.
        room: String,
    },
    /// `/leave`
    Leave,
    /// `/quit` or `/q`
    Quit,
    /// `/help`
    Help,
    /// Anything not starting with `/`.
    Message {
        /// Message text as typed.
        content: String,
    },
    /// Unrecognized command.
    Unknown {
        /// The command name as typed.
        input: String,
    },
    /// Known command with missing arguments.
    InvalidArgs {
        /// Command name.
        command: &'static str,
        /// What is wrong.
        error: &'static str,
    },
}

impl Command {
    /// The intent this command asks for, if any.
    pub fn into_intent(self) -> Option<Intent> {
        match self {
            Self::Name { name } => Some(Intent::SetDisplayName(name)),
            Self::Join { room } => Some(Intent::JoinRoom(room)),
            Self::Create { room } => Some(Intent::CreateRoom(room)),
            Self::Leave => Some(Intent::LeaveRoom),
            Self::Quit => Some(Intent::Quit),
            Self::Message { content } => Some(Intent::SendMessage(content)),
            Self::Help | Self::Unknown { .. } | Self::InvalidArgs { .. } => None,
        }
    }
}

/// Usage text shown for `/help`.
pub const HELP: &str = "commands: /name <name>, /join <room>, /create <room>, /leave, /quit";

/// Parse one input line. Returns `None` for empty lines.
pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Some(Command::Message { content: line.to_string() });
    };

    let (command, argument) = match rest.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (rest, ""),
    };

    let parsed = match command {
        "name" | "nick" if argument.is_empty() => {
            Command::InvalidArgs { command: "name", error: "usage: /name <display name>" }
        },
        "name" | "nick" => Command::Name { name: argument.to_string() },
        "join" if argument.is_empty() => {
            Command::InvalidArgs { command: "join", error: "usage: /join <room>" }
        },
        "join" => Command::Join { room: argument.to_string() },
        "create" if argument.is_empty() => {
            Command::InvalidArgs { command: "create", error: "usage: /create <room>" }
        },
        "create" => Command::Create { room: argument.to_string() },
        "leave" => Command::Leave,
        "quit" | "q" => Command::Quit,
        "help" | "?" => Command::Help,
        other => Command::Unknown { input: other.to_string() },
    };
    Some(parsed)
}
