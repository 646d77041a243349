use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecognitionError;
use crate::language::LanguageCode;

/// One finalized, translatable unit of speech in a single language.
/// Emitted exactly once per completed utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    /// Finalized text; non-empty after trimming
    pub text: String,

    /// Language the utterance was spoken in
    pub language: LanguageCode,

    /// When the utterance was finalized
    pub timestamp: DateTime<Utc>,
}

/// Advisory progress for an utterance still in flight. May be emitted
/// repeatedly for the same utterance as the recognizer revises it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterimUpdate {
    pub text: String,
    pub language: LanguageCode,
    pub timestamp: DateTime<Utc>,
}

/// Events delivered to downstream collaborators (captions UI, translation).
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Interim(InterimUpdate),
    Finalized(Utterance),
    /// A true recognizer failure; silence conditions never surface here.
    RecognitionFailed(RecognitionError),
}
