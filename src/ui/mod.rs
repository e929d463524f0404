//! Terminal presentation
//!
//! Purely reactive: renders chat and speech events as they arrive and turns
//! input lines into commands. It never mutates conversation or capture
//! state except through the sequencer and speech machine operations.

mod input;
mod view;

use std::io::{self, Write};

use crate::chat::ChatSnapshot;
use crate::events::{ChatEvent, SpeechEvent};
use crate::speech::SpeechSnapshot;

pub use input::{Command, HELP};

/// Line-oriented renderer
pub struct Terminal<W: Write> {
    out: W,
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Header, current conversation and dictation availability
    pub fn show_intro(&mut self, chat: &ChatSnapshot, speech: &SpeechSnapshot) -> io::Result<()> {
        writeln!(self.out, "{}", view::header())?;
        self.show_conversation(chat)?;
        if let Some(error) = &speech.error {
            writeln!(self.out, "{}", view::error_line(error))?;
        }
        self.out.flush()
    }

    /// Full redraw of the conversation
    pub fn show_conversation(&mut self, chat: &ChatSnapshot) -> io::Result<()> {
        if chat.messages.is_empty() {
            writeln!(self.out, "{}", view::EMPTY_STATE)?;
        }
        for message in &chat.messages {
            writeln!(self.out, "{}", view::message_line(message))?;
        }
        if chat.awaiting_reply {
            writeln!(self.out, "{}", view::SENDING)?;
        }
        if let Some(error) = &chat.last_error {
            writeln!(self.out, "{}", view::error_line(error))?;
        }
        self.out.flush()
    }

    pub fn show_chat_event(&mut self, event: &ChatEvent) -> io::Result<()> {
        match event {
            ChatEvent::MessageAppended { message } => {
                writeln!(self.out, "{}", view::message_line(message))?;
            }
            ChatEvent::ExchangeStarted => writeln!(self.out, "{}", view::SENDING)?,
            ChatEvent::ExchangeFailed { error } => {
                writeln!(self.out, "{}", view::error_line(error))?;
            }
            ChatEvent::Cleared => {
                writeln!(self.out, "-- conversation cleared --")?;
                writeln!(self.out, "{}", view::EMPTY_STATE)?;
            }
            ChatEvent::ExchangeCompleted { .. } | ChatEvent::ReplyDiscarded => {}
        }
        self.out.flush()
    }

    pub fn show_speech_event(&mut self, event: &SpeechEvent) -> io::Result<()> {
        match event {
            SpeechEvent::ListeningStarted => {
                writeln!(self.out, "(listening, /mic to stop)")?;
            }
            SpeechEvent::TranscriptUpdated {
                transcript,
                is_final,
            } => {
                let label = if *is_final { "heard" } else { "hearing" };
                writeln!(self.out, "({label}) {transcript}")?;
            }
            SpeechEvent::ListeningStopped { .. } => writeln!(self.out, "(stopped listening)")?,
            SpeechEvent::SessionEnded { .. } => {}
            SpeechEvent::Error { message } => writeln!(self.out, "{}", view::error_line(message))?,
        }
        self.out.flush()
    }

    pub fn show_text(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }
}
