//! Text rendering of conversation state

use chrono::Local;

use crate::chat::{Message, Sender};

pub const TITLE: &str = "Echo Chat";
pub const SUBTITLE: &str = "Type a message or use speech recognition. /help lists commands.";
pub const EMPTY_STATE: &str = "No messages yet. Start the conversation below.";
pub const SENDING: &str = "Sending...";

/// One line per message: local `HH:MM`, author and content
pub fn message_line(message: &Message) -> String {
    let time = message.timestamp().with_timezone(&Local).format("%H:%M");
    let author = match message.sender() {
        Sender::User => "you",
        Sender::System => "echo",
    };
    format!("[{time}] {author:>4}: {}", message.content())
}

pub fn error_line(error: &str) -> String {
    format!("! {error}")
}

pub fn header() -> String {
    let rule = "=".repeat(SUBTITLE.len());
    format!("{rule}\n{TITLE}\n{SUBTITLE}\n{rule}")
}
