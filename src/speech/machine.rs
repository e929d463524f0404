//! Speech capture state machine
//!
//! Translates start/stop/toggle requests and the recognizer's event stream
//! into listening/idle state, a transcript and a last error.
//!
//! `stop()` reports idle at once, but the platform may still deliver the
//! final result before its `End`. The transcript is only complete when
//! `SpeechEvent::SessionEnded` is emitted. Sessions ended by an error or
//! an abort never emit it.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::events::SpeechEvent;

use super::recognizer::{
    RecognitionConfig, RecognitionEvent, RecognitionResult, SpeechProvider, SpeechRecognizer,
};

/// Advisory shown when the platform has no speech recognition
pub const UNSUPPORTED_MESSAGE: &str = "Speech recognition is not supported on this platform";

/// Capacity of the recognizer event channel
const RECOGNITION_CHANNEL_SIZE: usize = 32;

/// Capture states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No recognizer on this platform, for the whole session
    Unsupported,
    /// Ready to start capturing
    Idle,
    /// A capture session is active
    Listening,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Unsupported => write!(f, "Unsupported"),
            State::Idle => write!(f, "Idle"),
            State::Listening => write!(f, "Listening"),
        }
    }
}

/// Read-only view of the capture state for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSnapshot {
    pub listening: bool,
    pub transcript: String,
    pub error: Option<String>,
    pub supported: bool,
}

struct Session {
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    state: State,
    transcript: String,
    error: Option<String>,
    /// Time the current capture session started
    listening_since: Option<Instant>,
    /// The platform session is running; stays set after `stop()` until
    /// the recognizer delivers `End`
    capture_open: bool,
    event_tx: broadcast::Sender<SpeechEvent>,
}

/// Handle to the capture state machine; clones share one session
#[derive(Clone)]
pub struct SpeechMachine {
    session: Arc<Mutex<Session>>,
}

impl SpeechMachine {
    /// Create the machine, asking `provider` once for a recognizer
    ///
    /// Returns the receiver for recognizer events, to be driven by
    /// [`SpeechMachine::run`].
    pub fn new(
        provider: &dyn SpeechProvider,
        config: RecognitionConfig,
        event_tx: broadcast::Sender<SpeechEvent>,
    ) -> (Self, mpsc::Receiver<RecognitionEvent>) {
        let (recognition_tx, recognition_rx) = mpsc::channel(RECOGNITION_CHANNEL_SIZE);
        let recognizer = provider.create(&config, recognition_tx);

        let (state, error) = match recognizer {
            Some(_) => (State::Idle, None),
            None => {
                warn!("speech recognition unavailable");
                (State::Unsupported, Some(UNSUPPORTED_MESSAGE.to_string()))
            }
        };

        info!(
            %state,
            continuous = config.continuous,
            language = %config.language,
            "speech machine initialized"
        );

        let session = Session {
            recognizer,
            state,
            transcript: String::new(),
            error,
            listening_since: None,
            capture_open: false,
            event_tx,
        };

        let machine = Self {
            session: Arc::new(Mutex::new(session)),
        };

        (machine, recognition_rx)
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SpeechEvent> {
        self.session.lock().event_tx.subscribe()
    }

    pub fn state(&self) -> State {
        self.session.lock().state
    }

    pub fn snapshot(&self) -> SpeechSnapshot {
        let session = self.session.lock();
        SpeechSnapshot {
            listening: session.state == State::Listening,
            transcript: session.transcript.clone(),
            error: session.error.clone(),
            supported: session.state != State::Unsupported,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.state() == State::Listening
    }

    pub fn is_supported(&self) -> bool {
        self.state() != State::Unsupported
    }

    pub fn transcript(&self) -> String {
        self.session.lock().transcript.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.session.lock().error.clone()
    }

    /// Begin capturing; clears the previous transcript and error
    ///
    /// A previous session still waiting for its `End` is aborted first.
    pub fn start(&self) {
        let mut guard = self.session.lock();
        let session = &mut *guard;

        let Some(recognizer) = session.recognizer.as_mut() else {
            debug!("start ignored, speech recognition unsupported");
            return;
        };

        if session.state == State::Listening {
            debug!("start ignored, already listening");
            return;
        }

        if session.capture_open {
            debug!("aborting previous session still finishing");
            recognizer.abort();
            session.capture_open = false;
        }

        session.transcript.clear();
        session.error = None;

        match recognizer.start() {
            Ok(()) => {
                session.capture_open = true;
                session.transition_to(State::Listening);
            }
            Err(e) => {
                warn!(?e, "recognizer refused to start");
                session.fail(e.to_string());
            }
        }
    }

    /// Stop capturing; never sets the error
    ///
    /// Always forwards to the recognizer so no platform session outlives
    /// an idle report.
    pub fn stop(&self) {
        let mut guard = self.session.lock();
        let session = &mut *guard;

        let Some(recognizer) = session.recognizer.as_mut() else {
            debug!("stop ignored, speech recognition unsupported");
            return;
        };

        recognizer.stop();
        session.transition_to(State::Idle);
    }

    /// Stop if listening, otherwise start
    pub fn toggle(&self) {
        if self.is_listening() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Drive the machine from the recognizer's event stream
    pub async fn run(&self, mut recognition_rx: mpsc::Receiver<RecognitionEvent>) {
        info!("speech machine started");

        while let Some(event) = recognition_rx.recv().await {
            self.handle_recognition_event(event);
        }

        info!("speech machine stopped");
    }

    /// Apply one recognizer event
    pub fn handle_recognition_event(&self, event: RecognitionEvent) {
        let mut session = self.session.lock();

        if session.state == State::Unsupported {
            warn!(?event, "recognition event without a recognizer");
            return;
        }

        match event {
            RecognitionEvent::Result {
                result_index,
                results,
            } => {
                if !session.capture_open {
                    debug!(result_index, "result for a closed session ignored");
                    return;
                }
                session.apply_result(result_index, &results);
            }
            RecognitionEvent::End => {
                if !session.capture_open {
                    debug!("end for a closed session ignored");
                    return;
                }
                debug!("recognizer signaled end of speech");
                session.capture_open = false;
                session.transition_to(State::Idle);
                let transcript = session.transcript.clone();
                session.emit(SpeechEvent::SessionEnded { transcript });
            }
            RecognitionEvent::Error { code } => {
                let code = if code.is_empty() {
                    "Unknown error".to_string()
                } else {
                    code
                };
                warn!(%code, "recognition error");
                session.fail(format!("Speech recognition error: {code}"));
            }
        }
    }
}

impl Session {
    /// Replace the transcript with the newest segment's best alternative
    fn apply_result(&mut self, result_index: usize, results: &[RecognitionResult]) {
        let Some((transcript, is_final)) = results.get(result_index).and_then(|result| {
            result
                .alternatives
                .first()
                .map(|best| (best.clone(), result.is_final))
        }) else {
            warn!(result_index, count = results.len(), "unusable recognition result");
            return;
        };

        self.transcript = transcript.clone();
        self.emit(SpeechEvent::TranscriptUpdated {
            transcript,
            is_final,
        });
    }

    /// Surface an error, tear down the platform session and return to idle
    fn fail(&mut self, message: String) {
        self.error = Some(message.clone());
        self.abort_capture();
        self.transition_to(State::Idle);
        self.emit(SpeechEvent::Error { message });
    }

    fn abort_capture(&mut self) {
        if !self.capture_open {
            return;
        }
        if let Some(recognizer) = self.recognizer.as_mut() {
            debug!("aborting capture session");
            recognizer.abort();
        }
        self.capture_open = false;
    }

    fn transition_to(&mut self, new_state: State) {
        let old_state = self.state;
        if old_state == new_state {
            return;
        }

        let duration_ms = self
            .listening_since
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        info!(
            from = %old_state,
            to = %new_state,
            duration_ms = duration_ms,
            "speech state transition"
        );

        self.state = new_state;
        match new_state {
            State::Listening => {
                self.listening_since = Some(Instant::now());
                self.emit(SpeechEvent::ListeningStarted);
            }
            State::Idle | State::Unsupported => {
                self.listening_since = None;
                self.emit(SpeechEvent::ListeningStopped { duration_ms });
            }
        }
    }

    fn emit(&self, event: SpeechEvent) {
        debug!(%event, "emitting speech event");
        let _ = self.event_tx.send(event);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.abort_capture();
    }
}
