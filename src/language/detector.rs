use tracing::debug;

use super::{LanguageCode, LanguageProfile, ScriptClass};

/// Classifies text snippets into one of the configured languages by script
/// membership.
///
/// Stateless: the same snippet always yields the same answer. Ambiguous text
/// (digits, punctuation, undiacritized Latin in a non-Latin pairing) yields
/// `None`, and callers fall back to the active language — the engine is
/// never left without a language assignment.
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    // Ordered by script specificity, not configuration order, so kana beats
    // the bare-ideograph class and the ASCII catch-all goes last.
    classes: Vec<(LanguageCode, ScriptClass)>,
}

impl LanguageDetector {
    pub fn new(profiles: &[LanguageProfile]) -> Self {
        let mut classes: Vec<_> = profiles
            .iter()
            .map(|p| (p.code.clone(), p.script))
            .collect();
        classes.sort_by_key(|(_, script)| script.priority());
        Self { classes }
    }

    /// Classify `text`, or `None` when it contains no distinguishing
    /// characters.
    pub fn detect(&self, text: &str) -> Option<LanguageCode> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let detected = self
            .classes
            .iter()
            .find(|(_, script)| script.matches(text))
            .map(|(code, _)| code.clone());
        debug!("Detected {:?} for {:?}", detected, text);
        detected
    }

    /// Total variant of [`detect`](Self::detect): ambiguous text resolves to
    /// `fallback`.
    pub fn detect_or(&self, text: &str, fallback: &LanguageCode) -> LanguageCode {
        self.detect(text).unwrap_or_else(|| fallback.clone())
    }
}
