//! Downstream translation collaborator seam
//!
//! The engine's contract ends at emitting finalized utterances; the relay
//! here is the thin bridge that carries them to a `Translator` and pairs
//! each one with its translation for a captions consumer. Translation
//! failures are logged and never fed back into the segmentation session.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::TranslationError;
use crate::language::LanguageCode;
use crate::session::{InterimUpdate, SessionEvent, Utterance};

/// Translation backend trait
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String, TranslationError>;
}

/// A finalized utterance paired with its translation toward the counterpart
/// language. `translation` is `None` when the backend failed; the utterance
/// itself is still delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedUtterance {
    pub utterance: Utterance,
    pub target_language: LanguageCode,
    pub translation: Option<String>,
}

/// What the relay hands to a captions consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CaptionEvent {
    Interim(InterimUpdate),
    Final(TranslatedUtterance),
}

/// Bridges session events to the translation collaborator.
pub struct TranslationRelay;

impl TranslationRelay {
    /// Spawn the relay task. `pair` names the two configured languages; each
    /// finalized utterance is translated toward the one it was not spoken in.
    pub fn spawn(
        mut events: mpsc::Receiver<SessionEvent>,
        translator: Arc<dyn Translator>,
        pair: (LanguageCode, LanguageCode),
    ) -> (JoinHandle<()>, mpsc::Receiver<CaptionEvent>) {
        let (tx, rx) = mpsc::channel(256);

        let handle = tokio::spawn(async move {
            debug!("Translation relay started ({} <-> {})", pair.0, pair.1);

            while let Some(event) = events.recv().await {
                match event {
                    SessionEvent::Interim(update) => {
                        if tx.send(CaptionEvent::Interim(update)).await.is_err() {
                            break;
                        }
                    }
                    SessionEvent::Finalized(utterance) => {
                        let target = if utterance.language == pair.0 {
                            pair.1.clone()
                        } else {
                            pair.0.clone()
                        };
                        let translation = match translator
                            .translate(&utterance.text, &utterance.language, &target)
                            .await
                        {
                            Ok(text) => Some(text),
                            Err(err) => {
                                warn!("Translation failed, passing utterance through: {}", err);
                                None
                            }
                        };
                        let out = TranslatedUtterance {
                            utterance,
                            target_language: target,
                            translation,
                        };
                        if tx.send(CaptionEvent::Final(out)).await.is_err() {
                            break;
                        }
                    }
                    SessionEvent::RecognitionFailed(err) => {
                        warn!("Recognition failed upstream: {}", err);
                    }
                }
            }

            info!("Translation relay stopped");
        });

        (handle, rx)
    }
}

/// Translator that returns the source text unchanged; stands in for a real
/// backend in the demo and in tests.
pub struct NoopTranslator;

#[async_trait::async_trait]
impl Translator for NoopTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: &LanguageCode,
        _target: &LanguageCode,
    ) -> Result<String, TranslationError> {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct FailingTranslator;

    #[async_trait::async_trait]
    impl Translator for FailingTranslator {
        async fn translate(
            &self,
            _text: &str,
            source: &LanguageCode,
            target: &LanguageCode,
        ) -> Result<String, TranslationError> {
            Err(TranslationError::UnsupportedPair {
                src: source.to_string(),
                target: target.to_string(),
            })
        }
    }

    fn utterance(text: &str, lang: &str) -> Utterance {
        Utterance {
            text: text.to_string(),
            language: LanguageCode::new(lang),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_relay_translates_toward_counterpart() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let pair = (LanguageCode::new("vi"), LanguageCode::new("ja"));
        let (_handle, mut captions) =
            TranslationRelay::spawn(event_rx, Arc::new(NoopTranslator), pair);

        event_tx
            .send(SessionEvent::Finalized(utterance("xin chào.", "vi")))
            .await
            .unwrap();
        drop(event_tx);

        let CaptionEvent::Final(out) = captions.recv().await.unwrap() else {
            panic!("expected a final caption");
        };
        assert_eq!(out.target_language, LanguageCode::new("ja"));
        assert_eq!(out.translation.as_deref(), Some("xin chào."));
    }

    #[tokio::test]
    async fn test_translation_failure_is_not_fatal() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let pair = (LanguageCode::new("vi"), LanguageCode::new("ja"));
        let (_handle, mut captions) =
            TranslationRelay::spawn(event_rx, Arc::new(FailingTranslator), pair);

        event_tx
            .send(SessionEvent::Finalized(utterance("こんにちは。", "ja")))
            .await
            .unwrap();
        event_tx
            .send(SessionEvent::Finalized(utterance("xin chào.", "vi")))
            .await
            .unwrap();
        drop(event_tx);

        // Both utterances still arrive, untranslated
        let CaptionEvent::Final(first) = captions.recv().await.unwrap() else {
            panic!("expected a final caption");
        };
        assert_eq!(first.translation, None);
        assert_eq!(first.utterance.text, "こんにちは。");
        assert_eq!(first.target_language, LanguageCode::new("vi"));

        let CaptionEvent::Final(second) = captions.recv().await.unwrap() else {
            panic!("expected a final caption");
        };
        assert_eq!(second.translation, None);
        assert_eq!(second.utterance.text, "xin chào.");
    }

    #[tokio::test]
    async fn test_relay_passes_interim_updates_through() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let pair = (LanguageCode::new("vi"), LanguageCode::new("ja"));
        let (_handle, mut captions) =
            TranslationRelay::spawn(event_rx, Arc::new(NoopTranslator), pair);

        event_tx
            .send(SessionEvent::Interim(InterimUpdate {
                text: "xin".to_string(),
                language: LanguageCode::new("vi"),
                timestamp: Utc::now(),
            }))
            .await
            .unwrap();
        drop(event_tx);

        let CaptionEvent::Interim(update) = captions.recv().await.unwrap() else {
            panic!("expected an interim caption");
        };
        assert_eq!(update.text, "xin");
    }
}
