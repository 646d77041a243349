pub mod config;
pub mod error;
pub mod language;
pub mod recognizer;
pub mod segment;
pub mod session;
pub mod translate;

pub use config::Config;
pub use error::{RecognitionError, TranslationError};
pub use language::{
    LanguageCode, LanguageDetector, LanguageProfile, ScriptClass, StabilityFilter, WordSpacing,
};
pub use recognizer::{
    Recognizer, RecognizerEvent, ScriptedLine, ScriptedRecognizer, TranscriptToken,
};
pub use segment::{FinalizationScheduler, TimerKind, UtteranceBuffer};
pub use session::{
    InterimUpdate, SessionConfig, SessionController, SessionEvent, SessionStats, Utterance,
};
pub use translate::{
    CaptionEvent, NoopTranslator, TranslatedUtterance, TranslationRelay, Translator,
};
