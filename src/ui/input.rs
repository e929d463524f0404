//! Input line handling

/// Action requested by one line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send the text as a chat message
    Send(String),
    /// Empty the conversation
    Clear,
    /// Start or stop dictation
    ToggleMic,
    /// Show the command list
    Help,
    /// Leave the program
    Quit,
    /// Nothing to do (blank line)
    Nothing,
    /// A slash command we do not know
    Unknown(String),
}

impl Command {
    /// Interpret one line typed by the user
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Command::Nothing;
        }

        // `//text` sends a message that starts with a slash
        if let Some(rest) = trimmed.strip_prefix("//") {
            return Command::Send(format!("/{rest}"));
        }

        match trimmed {
            "/clear" => Command::Clear,
            "/mic" => Command::ToggleMic,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            other if other.starts_with('/') => Command::Unknown(other.to_string()),
            _ => Command::Send(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// Help text for the input commands
pub const HELP: &str = "\
Type a message and press Enter to send it.
  /mic    start or stop dictation
  /clear  clear the conversation
  /help   show this help
  /quit   exit";
