use std::collections::HashMap;

use tokio::time::Instant;

use crate::language::{LanguageCode, LanguageProfile, WordSpacing};

/// Accumulation state for one configured language.
///
/// Committed text and the latest interim snapshot are kept strictly apart:
/// interim fragments are revised or replaced by the recognizer, and folding
/// them into the committed buffer would duplicate text once the final
/// fragment for the same speech arrives.
#[derive(Debug, Default)]
struct LanguageBuffer {
    accumulated: String,
    pending_interim: String,
    last_update: Option<Instant>,
}

/// Per-language utterance accumulation with language-specific join rules.
#[derive(Debug)]
pub struct UtteranceBuffer {
    buffers: HashMap<LanguageCode, LanguageBuffer>,
    spacing: HashMap<LanguageCode, WordSpacing>,
}

impl UtteranceBuffer {
    pub fn new(profiles: &[LanguageProfile]) -> Self {
        let buffers = profiles
            .iter()
            .map(|p| (p.code.clone(), LanguageBuffer::default()))
            .collect();
        let spacing = profiles
            .iter()
            .map(|p| (p.code.clone(), p.spacing))
            .collect();
        Self { buffers, spacing }
    }

    /// Append a final fragment under `lang`'s join rule. Unspaced scripts
    /// concatenate directly; spaced scripts get a single separator unless the
    /// buffer already ends in whitespace. Empty fragments are ignored.
    pub fn append(&mut self, lang: &LanguageCode, piece: &str) {
        let piece = piece.trim();
        if piece.is_empty() {
            return;
        }
        let spacing = self
            .spacing
            .get(lang)
            .copied()
            .unwrap_or(WordSpacing::Spaced);
        let Some(buf) = self.buffers.get_mut(lang) else {
            return;
        };
        if spacing == WordSpacing::Spaced
            && !buf.accumulated.is_empty()
            && !buf.accumulated.ends_with(char::is_whitespace)
        {
            buf.accumulated.push(' ');
        }
        buf.accumulated.push_str(piece);
        buf.last_update = Some(Instant::now());
    }

    /// Trimmed committed text for `lang`; non-mutating.
    pub fn snapshot(&self, lang: &LanguageCode) -> String {
        self.buffers
            .get(lang)
            .map(|b| b.accumulated.trim().to_string())
            .unwrap_or_default()
    }

    /// Replace the not-yet-final recognizer output for `lang`.
    pub fn set_pending_interim(&mut self, lang: &LanguageCode, text: &str) {
        if let Some(buf) = self.buffers.get_mut(lang) {
            buf.pending_interim = text.trim().to_string();
            buf.last_update = Some(Instant::now());
        }
    }

    pub fn pending_interim(&self, lang: &LanguageCode) -> String {
        self.buffers
            .get(lang)
            .map(|b| b.pending_interim.clone())
            .unwrap_or_default()
    }

    /// Reset committed text and pending interim to empty.
    pub fn clear(&mut self, lang: &LanguageCode) {
        if let Some(buf) = self.buffers.get_mut(lang) {
            buf.accumulated.clear();
            buf.pending_interim.clear();
        }
    }

    /// True when `lang` has neither committed text nor a pending interim.
    pub fn is_empty(&self, lang: &LanguageCode) -> bool {
        self.buffers
            .get(lang)
            .map(|b| b.accumulated.trim().is_empty() && b.pending_interim.is_empty())
            .unwrap_or(true)
    }

    pub fn last_update(&self, lang: &LanguageCode) -> Option<Instant> {
        self.buffers.get(lang).and_then(|b| b.last_update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageProfile;

    fn buffer() -> UtteranceBuffer {
        UtteranceBuffer::new(&[
            LanguageProfile::vietnamese(),
            LanguageProfile::japanese(),
        ])
    }

    fn vi() -> LanguageCode {
        LanguageCode::new("vi")
    }

    fn ja() -> LanguageCode {
        LanguageCode::new("ja")
    }

    #[test]
    fn test_spaced_join_inserts_single_separator() {
        let mut buf = buffer();
        buf.append(&vi(), "xin");
        buf.append(&vi(), "chào.");
        assert_eq!(buf.snapshot(&vi()), "xin chào.");
    }

    #[test]
    fn test_unspaced_join_concatenates() {
        let mut buf = buffer();
        buf.append(&ja(), "こんにちは");
        buf.append(&ja(), "元気ですか。");
        assert_eq!(buf.snapshot(&ja()), "こんにちは元気ですか。");
    }

    #[test]
    fn test_append_trims_pieces() {
        let mut buf = buffer();
        buf.append(&vi(), "  xin  ");
        buf.append(&vi(), " chào ");
        assert_eq!(buf.snapshot(&vi()), "xin chào");
    }

    #[test]
    fn test_empty_pieces_are_ignored() {
        let mut buf = buffer();
        buf.append(&vi(), "   ");
        assert_eq!(buf.snapshot(&vi()), "");
        assert!(buf.is_empty(&vi()));
    }

    #[test]
    fn test_pending_interim_is_separate_from_committed() {
        let mut buf = buffer();
        buf.append(&vi(), "xin chào");
        buf.set_pending_interim(&vi(), "các bạn");
        assert_eq!(buf.snapshot(&vi()), "xin chào");
        assert_eq!(buf.pending_interim(&vi()), "các bạn");

        buf.set_pending_interim(&vi(), "các bạn thân");
        assert_eq!(buf.pending_interim(&vi()), "các bạn thân");
        assert_eq!(buf.snapshot(&vi()), "xin chào");
    }

    #[test]
    fn test_clear_resets_both_committed_and_interim() {
        let mut buf = buffer();
        buf.append(&ja(), "こんにちは");
        buf.set_pending_interim(&ja(), "元気");
        buf.clear(&ja());
        assert!(buf.is_empty(&ja()));
        assert_eq!(buf.snapshot(&ja()), "");
        assert_eq!(buf.pending_interim(&ja()), "");
    }

    #[test]
    fn test_languages_accumulate_independently() {
        let mut buf = buffer();
        buf.append(&vi(), "xin chào");
        assert!(buf.is_empty(&ja()));
        buf.clear(&vi());
        assert!(buf.is_empty(&vi()));
    }
}
