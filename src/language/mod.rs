//! Language identities and per-language behavior profiles
//!
//! Everything the engine knows about a language lives in its
//! `LanguageProfile`: which characters identify it, how fragments join, which
//! characters end a sentence, and how long a silence means "done talking".

mod detector;
mod stability;

pub use detector::LanguageDetector;
pub use stability::StabilityFilter;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Normalized two-letter language code (e.g. "vi", "ja").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Create a code, normalizing common 3-letter and full-name spellings
    /// ("jpn" -> "ja", "vietnamese" -> "vi").
    pub fn new(code: impl AsRef<str>) -> Self {
        let code = code.as_ref().trim().to_ascii_lowercase();
        let normalized = match code.as_str() {
            "jpn" | "japanese" => "ja",
            "vie" | "vietnamese" => "vi",
            "eng" | "english" => "en",
            "kor" | "korean" => "ko",
            "zho" | "chi" | "chinese" => "zh",
            other => other,
        };
        Self(normalized.to_string())
    }

    /// Create a code from a BCP-47 recognizer tag ("ja-JP" -> "ja").
    pub fn from_recognizer_tag(tag: &str) -> Self {
        Self::new(tag.split('-').next().unwrap_or(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The BCP-47 tag a speech recognizer expects for this code.
    pub fn default_recognizer_tag(&self) -> String {
        match self.0.as_str() {
            "vi" => "vi-VN".to_string(),
            "ja" => "ja-JP".to_string(),
            "en" => "en-US".to_string(),
            "ko" => "ko-KR".to_string(),
            "zh" => "zh-CN".to_string(),
            other => format!("{}-{}", other, other.to_ascii_uppercase()),
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vietnamese letters that carry diacritics; plain ASCII is deliberately
/// excluded so undiacritized text stays ambiguous.
const VIETNAMESE_DIACRITICS: &str =
    "àáảãạăắằẳẵặâấầẩẫậèéẻẽẹêếềểễệìíỉĩịòóỏõọôốồổỗộơớờởỡợùúủũụưứừửữựỳýỷỹỵđĐ";

/// Character class that identifies a language in running text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptClass {
    /// Hiragana, katakana, or CJK ideographs.
    Japanese,
    /// Latin letters carrying Vietnamese diacritics.
    VietnameseLatin,
    /// Hangul syllables and jamo.
    Hangul,
    /// CJK ideographs without kana.
    ChineseIdeograph,
    /// Plain ASCII letters (whole-text match; any non-ASCII disqualifies).
    AsciiLatin,
}

impl ScriptClass {
    /// Matching priority when several configured classes could claim a text.
    /// Kana disambiguates Japanese from Chinese, so Japanese is checked
    /// before the bare-ideograph class; the ASCII catch-all goes last.
    pub(crate) fn priority(self) -> u8 {
        match self {
            ScriptClass::Japanese => 0,
            ScriptClass::VietnameseLatin => 1,
            ScriptClass::Hangul => 2,
            ScriptClass::ChineseIdeograph => 3,
            ScriptClass::AsciiLatin => 4,
        }
    }

    pub fn contains(self, c: char) -> bool {
        match self {
            ScriptClass::Japanese => matches!(c,
                '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{4E00}'..='\u{9FAF}'),
            ScriptClass::VietnameseLatin => VIETNAMESE_DIACRITICS.contains(c),
            ScriptClass::Hangul => matches!(c,
                '\u{AC00}'..='\u{D7A3}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}'),
            ScriptClass::ChineseIdeograph => {
                matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}')
            }
            ScriptClass::AsciiLatin => c.is_ascii_alphabetic(),
        }
    }

    /// Whether `text` belongs to this class. Script classes match on any
    /// distinguishing character; the ASCII class requires the whole text to
    /// be unaccented (letters, digits, basic punctuation) with at least one
    /// letter.
    pub fn matches(self, text: &str) -> bool {
        match self {
            ScriptClass::AsciiLatin => {
                text.chars().any(|c| c.is_ascii_alphabetic())
                    && text.chars().all(|c| {
                        c.is_ascii_alphanumeric()
                            || c.is_ascii_whitespace()
                            || ".,!?'-".contains(c)
                    })
            }
            class => text.chars().any(|c| class.contains(c)),
        }
    }
}

/// How transcript fragments of a language join into an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordSpacing {
    /// Fragments are separated by a single space.
    Spaced,
    /// Fragments concatenate directly (no inter-word spacing in the script).
    Unspaced,
}

/// Per-language behavior bundle used throughout the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageProfile {
    pub code: LanguageCode,
    /// BCP-47 tag passed to the recognizer when this language is active.
    pub recognizer_tag: String,
    pub script: ScriptClass,
    pub spacing: WordSpacing,
    /// Characters that mark a grammatically complete sentence.
    pub terminators: String,
    /// Silence duration after which an utterance is considered finished.
    pub pause_timeout: Duration,
}

impl LanguageProfile {
    pub fn vietnamese() -> Self {
        Self {
            code: LanguageCode::new("vi"),
            recognizer_tag: "vi-VN".to_string(),
            script: ScriptClass::VietnameseLatin,
            spacing: WordSpacing::Spaced,
            terminators: ".!?…".to_string(),
            pause_timeout: Duration::from_millis(1800),
        }
    }

    pub fn japanese() -> Self {
        Self {
            code: LanguageCode::new("ja"),
            recognizer_tag: "ja-JP".to_string(),
            script: ScriptClass::Japanese,
            spacing: WordSpacing::Unspaced,
            terminators: "。．！？!?…".to_string(),
            pause_timeout: Duration::from_millis(3000),
        }
    }

    pub fn english() -> Self {
        Self {
            code: LanguageCode::new("en"),
            recognizer_tag: "en-US".to_string(),
            script: ScriptClass::AsciiLatin,
            spacing: WordSpacing::Spaced,
            terminators: ".!?…".to_string(),
            pause_timeout: Duration::from_millis(1800),
        }
    }

    pub fn korean() -> Self {
        Self {
            code: LanguageCode::new("ko"),
            recognizer_tag: "ko-KR".to_string(),
            script: ScriptClass::Hangul,
            spacing: WordSpacing::Spaced,
            terminators: ".!?…".to_string(),
            pause_timeout: Duration::from_millis(1800),
        }
    }

    pub fn chinese() -> Self {
        Self {
            code: LanguageCode::new("zh"),
            recognizer_tag: "zh-CN".to_string(),
            script: ScriptClass::ChineseIdeograph,
            spacing: WordSpacing::Unspaced,
            terminators: "。！？!?…".to_string(),
            pause_timeout: Duration::from_millis(3000),
        }
    }

    /// Whether `text` ends in one of this language's sentence terminators.
    pub fn ends_with_terminator(&self, text: &str) -> bool {
        text.chars()
            .next_back()
            .is_some_and(|last| self.terminators.contains(last))
    }
}
