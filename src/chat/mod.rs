//! Conversation state
//!
//! - `Message`: immutable conversation entry
//! - `Sequencer`: owns the log and runs one echo exchange at a time

mod message;
mod sequencer;

pub use message::{Message, Sender};
pub use sequencer::{ChatSnapshot, ExchangeOutcome, Sequencer};
