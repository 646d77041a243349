use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::language::{LanguageCode, LanguageProfile};

/// Configuration for one conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g. "talk-2026-08-07-lobby")
    pub session_id: String,

    /// The two configured languages; the first is the initial active
    /// language.
    pub languages: Vec<LanguageProfile>,

    /// Capacity N of the recent-detections window
    pub detection_window: usize,

    /// Vote count T required before a language switch is proposed
    pub switch_threshold: usize,

    /// Cooldown between committed language switches
    pub min_switch_interval: Duration,

    /// Absolute ceiling on utterance length regardless of silence
    pub max_utterance: Duration,

    /// Settle delay before restarting the recognizer after a switch
    pub settle_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(LanguageProfile::vietnamese(), LanguageProfile::japanese())
    }
}

impl SessionConfig {
    pub fn new(first: LanguageProfile, second: LanguageProfile) -> Self {
        Self {
            session_id: format!("talk-{}", uuid::Uuid::new_v4()),
            languages: vec![first, second],
            detection_window: 5,
            switch_threshold: 3,
            min_switch_interval: Duration::from_millis(1200),
            max_utterance: Duration::from_secs(10),
            settle_delay: Duration::from_millis(80),
        }
    }

    /// The profile for `code`, if it is one of the configured languages.
    pub fn profile(&self, code: &LanguageCode) -> Option<&LanguageProfile> {
        self.languages.iter().find(|p| &p.code == code)
    }

    /// The other configured language, used as the translation target.
    pub fn counterpart(&self, code: &LanguageCode) -> Option<&LanguageCode> {
        self.languages.iter().map(|p| &p.code).find(|c| *c != code)
    }

    pub fn validate(&self) -> Result<()> {
        if self.languages.len() != 2 {
            bail!(
                "session needs exactly two configured languages, got {}",
                self.languages.len()
            );
        }
        if self.languages[0].code == self.languages[1].code {
            bail!(
                "configured languages must be distinct, got {} twice",
                self.languages[0].code
            );
        }
        if self.switch_threshold == 0 || self.switch_threshold > self.detection_window {
            bail!(
                "switch threshold {} must be between 1 and the detection window {}",
                self.switch_threshold,
                self.detection_window
            );
        }
        Ok(())
    }
}
