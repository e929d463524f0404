//! Speech capture
//!
//! Provides a start/stop/toggle state machine over a platform
//! speech-recognition capability:
//! - Unsupported: no recognizer on this platform, start is a no-op
//! - Idle: ready to capture
//! - Listening: capture active, transcript replaced on every result

mod machine;
mod recognizer;

pub use machine::{SpeechMachine, SpeechSnapshot};
pub use recognizer::{RecognitionConfig, UnsupportedProvider};

#[cfg(test)]
pub(crate) use recognizer::RecognitionEvent;

#[cfg(test)]
pub(crate) mod testing;
