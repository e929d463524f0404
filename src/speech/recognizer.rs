//! Platform speech-recognition capability
//!
//! A recognizer is a narrow adapter over whatever dictation engine the
//! platform offers. It is configured once, controlled with start/stop/abort,
//! and reports back through a channel of `RecognitionEvent`s (results, end
//! of session, errors).

use tokio::sync::mpsc;

/// Recognition settings, fixed for the lifetime of a recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    /// Keep capturing across pauses instead of ending after one utterance
    pub continuous: bool,
    /// Deliver partial results while the user is still speaking
    pub interim_results: bool,
    /// BCP 47 language tag, e.g. `en-US`
    pub language: String,
}

impl RecognitionConfig {
    pub fn new(continuous: bool, language: impl Into<String>) -> Self {
        Self {
            continuous,
            interim_results: true,
            language: language.into(),
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self::new(false, "en-US")
    }
}

/// Recognition result for one speech segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionResult {
    /// Candidate transcripts, most likely first
    pub alternatives: Vec<String>,
    /// Whether the engine will revise this segment further
    pub is_final: bool,
}

impl RecognitionResult {
    /// Result with a single alternative
    #[cfg(test)]
    pub fn single(transcript: impl Into<String>, is_final: bool) -> Self {
        Self {
            alternatives: vec![transcript.into()],
            is_final,
        }
    }
}

/// Events delivered by a recognizer
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    /// Results changed; `result_index` is the first segment that changed
    Result {
        result_index: usize,
        results: Vec<RecognitionResult>,
    },
    /// The capture session ended; results already delivered are final
    End,
    /// The engine reported an error; an `End` may or may not follow
    Error { code: String },
}

/// Control surface of a platform recognizer
pub trait SpeechRecognizer: Send {
    /// Begin a capture session
    fn start(&mut self) -> Result<(), RecognizerError>;

    /// End the session, delivering any pending result and then `End`
    fn stop(&mut self);

    /// End the session immediately, discarding pending results
    fn abort(&mut self);
}

/// Detects the platform capability and creates recognizers
pub trait SpeechProvider {
    /// Create a recognizer, or `None` when the platform has no speech
    /// recognition
    fn create(
        &self,
        config: &RecognitionConfig,
        events: mpsc::Sender<RecognitionEvent>,
    ) -> Option<Box<dyn SpeechRecognizer>>;
}

/// Provider for platforms without a speech-recognition engine
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedProvider;

impl SpeechProvider for UnsupportedProvider {
    fn create(
        &self,
        _config: &RecognitionConfig,
        _events: mpsc::Sender<RecognitionEvent>,
    ) -> Option<Box<dyn SpeechRecognizer>> {
        None
    }
}

/// Errors raised when controlling a recognizer
#[derive(Debug, thiserror::Error)]
pub enum RecognizerError {
    #[error("audio capture unavailable: {0}")]
    Unavailable(String),
}
