//! Utterance accumulation and finalization timing
//!
//! `UtteranceBuffer` gathers transcript fragments per language under each
//! language's join rule; `FinalizationScheduler` tracks the pause and
//! max-duration deadlines that decide when a buffer becomes an utterance.

mod buffer;
mod scheduler;

pub use buffer::UtteranceBuffer;
pub use scheduler::{FinalizationScheduler, TimerKind};
