//! Conversation session management
//!
//! This module provides the `SessionController` abstraction that manages:
//! - Starting/stopping the upstream recognizer
//! - Token routing through language detection and hysteresis
//! - Per-language utterance accumulation and finalization timing
//! - Language switches with forced flush and recognizer restart
//! - Downstream event emission and session statistics

mod config;
mod controller;
mod events;
mod stats;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use events::{InterimUpdate, SessionEvent, Utterance};
pub use stats::SessionStats;
