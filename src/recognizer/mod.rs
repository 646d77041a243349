//! Upstream speech-recognizer collaborator seam
//!
//! The engine consumes already-transcribed text; this module defines the
//! boundary it consumes it through, plus a scripted implementation used by
//! tests and the demo binary.

mod scripted;

pub use scripted::{ScriptedLine, ScriptedRecognizer};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::RecognitionError;
use crate::language::LanguageCode;

/// One transcript fragment from the upstream recognizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptToken {
    /// Transcribed text; non-empty when present.
    pub text: String,

    /// Whether the recognizer will revise this fragment further.
    #[serde(rename = "final")]
    pub is_final: bool,

    /// When the fragment was produced.
    pub timestamp: DateTime<Utc>,

    /// The language the recognizer was listening for.
    pub language_hint: LanguageCode,
}

impl TranscriptToken {
    pub fn interim(text: impl Into<String>, hint: LanguageCode) -> Self {
        Self {
            text: text.into(),
            is_final: false,
            timestamp: Utc::now(),
            language_hint: hint,
        }
    }

    pub fn final_fragment(text: impl Into<String>, hint: LanguageCode) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            timestamp: Utc::now(),
            language_hint: hint,
        }
    }
}

/// What a running recognizer delivers on its event channel.
#[derive(Debug, Clone)]
pub enum RecognizerEvent {
    Token(TranscriptToken),
    /// Implementations should report silence conditions (`NoSpeech`,
    /// `Aborted`) sparingly or not at all; the session treats them as
    /// ordinary silence either way.
    Error(RecognitionError),
}

/// Speech recognizer backend trait
///
/// Implementations own their transport (browser bridge, websocket, local
/// model) and any auto-restart-on-end behavior; the engine only calls
/// `start` and `stop`.
#[async_trait::async_trait]
pub trait Recognizer: Send + Sync {
    /// Start recognizing, hinted to the given BCP-47 language tag.
    ///
    /// Returns a channel receiver that will receive transcript tokens.
    /// Fails with [`RecognitionError::Unsupported`] when no recognition
    /// backend is available.
    async fn start(
        &mut self,
        language_tag: &str,
    ) -> Result<mpsc::Receiver<RecognizerEvent>, RecognitionError>;

    /// Stop recognizing. Stopping an idle recognizer is a no-op.
    async fn stop(&mut self) -> Result<(), RecognitionError>;

    /// Check if the recognizer is currently running
    fn is_running(&self) -> bool;

    /// Get recognizer name for logging
    fn name(&self) -> &str;
}
