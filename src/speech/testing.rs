//! Scripted recognizer for tests

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::recognizer::{
    RecognitionConfig, RecognitionEvent, RecognitionResult, RecognizerError, SpeechProvider,
    SpeechRecognizer,
};

/// What the machine asked the recognizer to do
#[derive(Debug, Default)]
pub struct Calls {
    pub starts: usize,
    pub stops: usize,
    pub aborts: usize,
    /// Whether a capture session is running on the "platform"
    pub running: bool,
}

struct MockRecognizer {
    calls: Arc<Mutex<Calls>>,
    refuse_start: bool,
}

impl SpeechRecognizer for MockRecognizer {
    fn start(&mut self) -> Result<(), RecognizerError> {
        if self.refuse_start {
            return Err(RecognizerError::Unavailable("no microphone".into()));
        }
        let mut calls = self.calls.lock();
        calls.starts += 1;
        calls.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        let mut calls = self.calls.lock();
        calls.stops += 1;
        calls.running = false;
    }

    fn abort(&mut self) {
        let mut calls = self.calls.lock();
        calls.aborts += 1;
        calls.running = false;
    }
}

#[derive(Default)]
pub struct MockProvider {
    pub calls: Arc<Mutex<Calls>>,
    pub refuse_start: bool,
    pub events: Mutex<Option<mpsc::Sender<RecognitionEvent>>>,
    pub seen_config: Mutex<Option<RecognitionConfig>>,
}

impl SpeechProvider for MockProvider {
    fn create(
        &self,
        config: &RecognitionConfig,
        events: mpsc::Sender<RecognitionEvent>,
    ) -> Option<Box<dyn SpeechRecognizer>> {
        *self.events.lock() = Some(events);
        *self.seen_config.lock() = Some(config.clone());
        Some(Box::new(MockRecognizer {
            calls: Arc::clone(&self.calls),
            refuse_start: self.refuse_start,
        }))
    }
}

/// Single-segment interim result
pub fn partial(text: &str) -> RecognitionEvent {
    RecognitionEvent::Result {
        result_index: 0,
        results: vec![RecognitionResult::single(text, false)],
    }
}

/// Single-segment final result
pub fn final_result(text: &str) -> RecognitionEvent {
    RecognitionEvent::Result {
        result_index: 0,
        results: vec![RecognitionResult::single(text, true)],
    }
}
