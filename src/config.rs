use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::language::{LanguageCode, LanguageProfile, ScriptClass, WordSpacing};
use crate::session::SessionConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub engine: EngineConfig,
    pub languages: LanguagePairConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

/// Segmentation tuning knobs; every default is a heuristic value meant to be
/// re-tuned per deployment.
#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    pub detection_window: usize,
    pub switch_threshold: usize,
    pub min_switch_interval_ms: u64,
    pub max_utterance_ms: u64,
    pub settle_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct LanguagePairConfig {
    pub first: LanguageConfig,
    pub second: LanguageConfig,
}

#[derive(Debug, Deserialize)]
pub struct LanguageConfig {
    pub code: String,
    /// BCP-47 tag for the recognizer; derived from `code` when omitted
    pub recognizer_tag: Option<String>,
    pub script: ScriptClass,
    pub spacing: WordSpacing,
    pub terminators: String,
    pub pause_ms: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Build the runtime session configuration from the loaded file.
    pub fn session_config(&self) -> SessionConfig {
        let mut session = SessionConfig::new(
            self.languages.first.profile(),
            self.languages.second.profile(),
        );
        session.detection_window = self.engine.detection_window;
        session.switch_threshold = self.engine.switch_threshold;
        session.min_switch_interval = Duration::from_millis(self.engine.min_switch_interval_ms);
        session.max_utterance = Duration::from_millis(self.engine.max_utterance_ms);
        session.settle_delay = Duration::from_millis(self.engine.settle_delay_ms);
        session
    }
}

impl LanguageConfig {
    fn profile(&self) -> LanguageProfile {
        let code = LanguageCode::new(&self.code);
        let recognizer_tag = self
            .recognizer_tag
            .clone()
            .unwrap_or_else(|| code.default_recognizer_tag());
        LanguageProfile {
            code,
            recognizer_tag,
            script: self.script,
            spacing: self.spacing,
            terminators: self.terminators.clone(),
            pause_timeout: Duration::from_millis(self.pause_ms),
        }
    }
}
