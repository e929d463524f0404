//! Message exchange sequencer
//!
//! Owns the conversation log and drives one round trip to the echo
//! collaborator per submission. Only one exchange may be in flight, which
//! keeps replies in the order their requests were sent.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::echo::EchoClient;
use crate::events::ChatEvent;

use super::message::Message;

/// How a spawned exchange ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The reply was appended to the log
    Replied,
    /// The exchange failed and `last_error` was set
    Failed,
    /// The conversation was reset while the request was in flight
    Discarded,
}

/// Read-only view of the conversation for the presentation layer
#[derive(Debug, Clone, Default)]
pub struct ChatSnapshot {
    pub messages: Vec<Message>,
    pub awaiting_reply: bool,
    pub last_error: Option<String>,
}

#[derive(Default)]
struct Conversation {
    messages: Vec<Message>,
    awaiting_reply: bool,
    last_error: Option<String>,
    /// Advanced by every reset; exchanges from an older epoch are dropped
    epoch: u64,
}

/// `last_error` when an exchange task dies without reporting a result
pub const INTERRUPTED_MESSAGE: &str = "Exchange was interrupted before a reply arrived";

/// Releases the in-flight slot if an exchange task is dropped before it
/// settles, e.g. on panic or abort
struct InFlight {
    conversation: Arc<Mutex<Conversation>>,
    event_tx: broadcast::Sender<ChatEvent>,
    epoch: u64,
    settled: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let mut conversation = self.conversation.lock();
        if conversation.epoch != self.epoch {
            return;
        }
        conversation.awaiting_reply = false;
        conversation.last_error = Some(INTERRUPTED_MESSAGE.to_string());
        drop(conversation);

        warn!(epoch = self.epoch, "exchange ended without a result");
        let _ = self.event_tx.send(ChatEvent::ExchangeFailed {
            error: INTERRUPTED_MESSAGE.to_string(),
        });
    }
}

/// Handle to a conversation; clones share the same log
#[derive(Clone)]
pub struct Sequencer {
    conversation: Arc<Mutex<Conversation>>,
    client: Arc<dyn EchoClient>,
    event_tx: broadcast::Sender<ChatEvent>,
}

impl Sequencer {
    /// Create an empty conversation that sends through `client`
    pub fn new(client: Arc<dyn EchoClient>, event_tx: broadcast::Sender<ChatEvent>) -> Self {
        Self {
            conversation: Arc::new(Mutex::new(Conversation::default())),
            client,
            event_tx,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        let conversation = self.conversation.lock();
        ChatSnapshot {
            messages: conversation.messages.clone(),
            awaiting_reply: conversation.awaiting_reply,
            last_error: conversation.last_error.clone(),
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.conversation.lock().messages.clone()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.conversation.lock().awaiting_reply
    }

    pub fn last_error(&self) -> Option<String> {
        self.conversation.lock().last_error.clone()
    }

    /// Submit a user message
    ///
    /// Blank text and submissions made while an exchange is in flight are
    /// ignored and return `None`. Otherwise the user message is appended
    /// before this returns and the round trip runs on a spawned task whose
    /// handle is returned. Must be called from within a tokio runtime.
    pub fn submit(&self, text: &str) -> Option<JoinHandle<ExchangeOutcome>> {
        if text.trim().is_empty() {
            debug!("ignoring blank submission");
            return None;
        }

        let (message, epoch) = {
            let mut conversation = self.conversation.lock();
            if conversation.awaiting_reply {
                warn!("submission rejected, an exchange is already in flight");
                return None;
            }

            let message = Message::user(text);
            conversation.messages.push(message.clone());
            conversation.awaiting_reply = true;
            conversation.last_error = None;
            (message, conversation.epoch)
        };

        info!(id = %message.id(), epoch, "exchange started");
        self.emit(ChatEvent::MessageAppended { message });
        self.emit(ChatEvent::ExchangeStarted);

        let in_flight = InFlight {
            conversation: Arc::clone(&self.conversation),
            event_tx: self.event_tx.clone(),
            epoch,
            settled: false,
        };

        let sequencer = self.clone();
        let text = text.to_owned();
        Some(tokio::spawn(async move {
            sequencer.exchange(text, in_flight).await
        }))
    }

    /// Empty the conversation and abandon any in-flight exchange
    pub fn reset(&self) {
        let abandoned = {
            let mut conversation = self.conversation.lock();
            let abandoned = conversation.awaiting_reply;
            conversation.messages.clear();
            conversation.awaiting_reply = false;
            conversation.last_error = None;
            conversation.epoch += 1;
            abandoned
        };

        info!(abandoned, "conversation cleared");
        self.emit(ChatEvent::Cleared);
    }

    async fn exchange(self, text: String, mut in_flight: InFlight) -> ExchangeOutcome {
        let epoch = in_flight.epoch;
        let started = Instant::now();
        let result = self.client.send(&text).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let mut conversation = self.conversation.lock();
        in_flight.settled = true;
        if conversation.epoch != epoch {
            drop(conversation);
            info!(epoch, duration_ms, "reply for a cleared conversation discarded");
            self.emit(ChatEvent::ReplyDiscarded);
            return ExchangeOutcome::Discarded;
        }

        conversation.awaiting_reply = false;

        match result {
            Ok(reply) => {
                let message = Message::system(reply);
                conversation.messages.push(message.clone());
                drop(conversation);

                info!(id = %message.id(), duration_ms, "exchange completed");
                self.emit(ChatEvent::MessageAppended { message });
                self.emit(ChatEvent::ExchangeCompleted { duration_ms });
                ExchangeOutcome::Replied
            }
            Err(e) => {
                let error = e.to_string();
                conversation.last_error = Some(error.clone());
                drop(conversation);

                warn!(%error, duration_ms, "exchange failed");
                self.emit(ChatEvent::ExchangeFailed { error });
                ExchangeOutcome::Failed
            }
        }
    }

    fn emit(&self, event: ChatEvent) {
        debug!(%event, "emitting chat event");
        // No subscribers is fine; the snapshot stays authoritative
        let _ = self.event_tx.send(event);
    }
}
