use thiserror::Error;

/// Errors reported by an upstream speech recognizer.
///
/// `NoSpeech` and `Aborted` are silence conditions, not failures: a
/// recognizer that hears nothing, or one we cancelled ourselves, has not
/// malfunctioned. The session loop drops them; everything else is surfaced
/// to the event consumer.
#[derive(Debug, Clone, Error)]
pub enum RecognitionError {
    #[error("speech recognition is not supported by this recognizer")]
    Unsupported,
    #[error("recognizer is not running")]
    NotRunning,
    #[error("no speech detected")]
    NoSpeech,
    #[error("recognition aborted")]
    Aborted,
    #[error("recognizer backend failed: {0}")]
    Backend(String),
}

impl RecognitionError {
    /// True for conditions that are ordinary silence rather than failures.
    pub fn is_silence(&self) -> bool {
        matches!(self, RecognitionError::NoSpeech | RecognitionError::Aborted)
    }
}

/// Errors reported by the downstream translation collaborator.
///
/// Local to that collaborator: a failed translation never disturbs the
/// segmentation session that produced the utterance.
#[derive(Debug, Clone, Error)]
pub enum TranslationError {
    #[error("translation backend unreachable: {0}")]
    Unreachable(String),
    #[error("translation backend rejected the request: {0}")]
    Rejected(String),
    #[error("unsupported language pair {src} -> {target}")]
    UnsupportedPair { src: String, target: String },
}
