//! Dictation into the conversation
//!
//! A speech session that the platform finished cleanly becomes a chat
//! message. Sessions cut short by an error or abort never emit
//! `SessionEnded`, so their partial transcripts are not sent.

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::chat::{ExchangeOutcome, Sequencer};
use crate::events::SpeechEvent;

/// Submit the final transcript carried by `event`, if any
pub fn forward(sequencer: &Sequencer, event: &SpeechEvent) -> Option<JoinHandle<ExchangeOutcome>> {
    let SpeechEvent::SessionEnded { transcript } = event else {
        return None;
    };

    if transcript.trim().is_empty() {
        debug!("speech session ended without words");
        return None;
    }

    info!(len = transcript.len(), "submitting dictated message");
    sequencer.submit(transcript)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::broadcast;

    use super::*;
    use crate::chat::Sender;
    use crate::echo::{EchoClient, EchoError};
    use crate::speech::testing::{final_result, partial, MockProvider};
    use crate::speech::{RecognitionConfig, RecognitionEvent, SpeechMachine};

    struct EchoBack;

    #[async_trait]
    impl EchoClient for EchoBack {
        async fn send(&self, message: &str) -> Result<String, EchoError> {
            Ok(message.to_owned())
        }
    }

    struct Harness {
        _provider: MockProvider,
        speech: SpeechMachine,
        speech_events: broadcast::Receiver<SpeechEvent>,
        sequencer: Sequencer,
    }

    impl Harness {
        fn new() -> Self {
            let provider = MockProvider::default();
            let (speech_tx, speech_events) = broadcast::channel(32);
            let (speech, _rx) = SpeechMachine::new(&provider, RecognitionConfig::default(), speech_tx);
            let (chat_tx, _) = broadcast::channel(32);
            let sequencer = Sequencer::new(Arc::new(EchoBack), chat_tx);
            Self {
                _provider: provider,
                speech,
                speech_events,
                sequencer,
            }
        }

        /// Forward every pending speech event, waiting for the exchanges
        async fn pump(&mut self) -> usize {
            let mut submitted = 0;
            while let Ok(event) = self.speech_events.try_recv() {
                if let Some(handle) = forward(&self.sequencer, &event) {
                    submitted += 1;
                    handle.await.unwrap();
                }
            }
            submitted
        }
    }

    #[tokio::test]
    async fn test_clean_session_submits_final_transcript() {
        let mut harness = Harness::new();

        harness.speech.start();
        harness.speech.handle_recognition_event(partial("hel"));
        harness.speech.stop();
        harness
            .speech
            .handle_recognition_event(final_result("hello world"));
        harness.speech.handle_recognition_event(RecognitionEvent::End);

        assert_eq!(harness.pump().await, 1);

        let messages = harness.sequencer.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender(), Sender::User);
        assert_eq!(messages[0].content(), "hello world");
    }

    #[tokio::test]
    async fn test_error_session_submits_nothing() {
        let mut harness = Harness::new();

        harness.speech.start();
        harness.speech.handle_recognition_event(partial("half a sen"));
        harness
            .speech
            .handle_recognition_event(RecognitionEvent::Error {
                code: "network".into(),
            });
        harness.speech.handle_recognition_event(RecognitionEvent::End);

        assert_eq!(harness.pump().await, 0);
        assert!(harness.sequencer.messages().is_empty());
    }

    #[tokio::test]
    async fn test_empty_transcript_submits_nothing() {
        let mut harness = Harness::new();

        harness.speech.start();
        harness.speech.handle_recognition_event(partial("   "));
        harness.speech.handle_recognition_event(RecognitionEvent::End);

        assert_eq!(harness.pump().await, 0);
        assert!(harness.sequencer.messages().is_empty());
    }

    #[tokio::test]
    async fn test_other_events_are_ignored() {
        let (chat_tx, _) = broadcast::channel(4);
        let sequencer = Sequencer::new(Arc::new(EchoBack), chat_tx);

        let event = SpeechEvent::TranscriptUpdated {
            transcript: "hello".into(),
            is_final: true,
        };
        assert!(forward(&sequencer, &event).is_none());
        assert!(forward(&sequencer, &SpeechEvent::ListeningStopped { duration_ms: 5 }).is_none());
        assert!(sequencer.messages().is_empty());
    }
}
