//! Change notifications emitted by the chat sequencer and speech machine
//!
//! The presentation layer subscribes to these over broadcast channels and
//! re-reads the owning component's snapshot when something changes.

use serde::{Deserialize, Serialize};

use crate::chat::Message;

/// Events emitted by the message exchange sequencer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message was appended to the conversation log
    MessageAppended { message: Message },

    /// A request was sent to the echo endpoint
    ExchangeStarted,

    /// The echo reply was appended
    ExchangeCompleted {
        /// Round trip duration in milliseconds
        duration_ms: u64,
    },

    /// The exchange failed; no reply was appended
    ExchangeFailed { error: String },

    /// A reply arrived for a conversation that was reset in the meantime
    ReplyDiscarded,

    /// The conversation log was emptied
    Cleared,
}

/// Events emitted by the speech capture state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeechEvent {
    /// Capture session began
    ListeningStarted,

    /// The transcript was replaced by a new recognition result
    TranscriptUpdated { transcript: String, is_final: bool },

    /// The machine went back to idle, by request, platform end or error
    ListeningStopped {
        /// Duration in milliseconds that capture was active
        duration_ms: u64,
    },

    /// The platform finished the session cleanly; the transcript is final
    SessionEnded { transcript: String },

    /// A recognition error was surfaced
    Error { message: String },
}

impl std::fmt::Display for ChatEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatEvent::MessageAppended { message } => {
                write!(f, "MESSAGE_APPENDED ({})", message.sender())
            }
            ChatEvent::ExchangeStarted => write!(f, "EXCHANGE_STARTED"),
            ChatEvent::ExchangeCompleted { duration_ms } => {
                write!(f, "EXCHANGE_COMPLETED ({}ms)", duration_ms)
            }
            ChatEvent::ExchangeFailed { error } => write!(f, "EXCHANGE_FAILED ({})", error),
            ChatEvent::ReplyDiscarded => write!(f, "REPLY_DISCARDED"),
            ChatEvent::Cleared => write!(f, "CLEARED"),
        }
    }
}

impl std::fmt::Display for SpeechEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeechEvent::ListeningStarted => write!(f, "LISTENING_STARTED"),
            SpeechEvent::TranscriptUpdated { .. } => write!(f, "TRANSCRIPT_UPDATED"),
            SpeechEvent::ListeningStopped { duration_ms, .. } => {
                write!(f, "LISTENING_STOPPED ({}ms)", duration_ms)
            }
            SpeechEvent::SessionEnded { .. } => write!(f, "SESSION_ENDED"),
            SpeechEvent::Error { message } => write!(f, "SPEECH_ERROR ({})", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ChatEvent::ExchangeCompleted { duration_ms: 42 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("exchange_completed"));
        assert!(json.contains("42"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"transcript_updated","transcript":"hi there","is_final":true}"#;
        let event: SpeechEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event,
            SpeechEvent::TranscriptUpdated { ref transcript, is_final: true } if transcript == "hi there"
        ));
    }

    #[test]
    fn test_display() {
        let event = SpeechEvent::ListeningStopped { duration_ms: 1500 };
        assert_eq!(event.to_string(), "LISTENING_STOPPED (1500ms)");
    }
}
