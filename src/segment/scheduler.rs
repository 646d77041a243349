use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::language::LanguageCode;

/// Which finalization deadline fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Language-specific silence ran out.
    Pause,
    /// Absolute ceiling on utterance length, independent of silence.
    MaxUtterance,
}

#[derive(Debug, Clone)]
struct Deadline {
    language: LanguageCode,
    at: Instant,
}

/// Tracks the pause and max-duration deadlines for the active language.
///
/// At most one deadline of each kind exists at a time; arming a kind replaces
/// its predecessor. Deadlines are plain data — the session loop sleeps until
/// the earliest one and pops what has expired, so no timer outlives a
/// language switch or session stop.
#[derive(Debug, Default)]
pub struct FinalizationScheduler {
    pause: Option<Deadline>,
    max: Option<Deadline>,
}

impl FinalizationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)schedule the pause deadline for `lang`, replacing any prior one.
    pub fn arm_pause(&mut self, lang: &LanguageCode, after: Duration) {
        debug!("Arming pause timer for {} ({:?})", lang, after);
        self.pause = Some(Deadline {
            language: lang.clone(),
            at: Instant::now() + after,
        });
    }

    /// (Re)schedule the max-duration deadline for `lang`, replacing any prior
    /// one.
    pub fn arm_max(&mut self, lang: &LanguageCode, after: Duration) {
        debug!("Arming max-utterance timer for {} ({:?})", lang, after);
        self.max = Some(Deadline {
            language: lang.clone(),
            at: Instant::now() + after,
        });
    }

    /// Whether a max-duration deadline is outstanding for `lang`.
    pub fn max_is_armed(&self, lang: &LanguageCode) -> bool {
        self.max.as_ref().is_some_and(|d| &d.language == lang)
    }

    /// Cancel both deadlines scoped to `lang`; called on finalize or switch.
    pub fn cancel_all(&mut self, lang: &LanguageCode) {
        if self.pause.as_ref().is_some_and(|d| &d.language == lang) {
            self.pause = None;
        }
        if self.max.as_ref().is_some_and(|d| &d.language == lang) {
            self.max = None;
        }
    }

    /// Cancel every outstanding deadline regardless of language; called on
    /// session stop before the final flush.
    pub fn reset(&mut self) {
        self.pause = None;
        self.max = None;
    }

    /// Earliest outstanding deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (&self.pause, &self.max) {
            (Some(p), Some(m)) => Some(p.at.min(m.at)),
            (Some(p), None) => Some(p.at),
            (None, Some(m)) => Some(m.at),
            (None, None) => None,
        }
    }

    /// Remove and return the earliest deadline that has expired by `now`.
    /// Call repeatedly to drain everything due.
    pub fn pop_expired(&mut self, now: Instant) -> Option<(TimerKind, LanguageCode)> {
        let pause_due = self.pause.as_ref().is_some_and(|d| d.at <= now);
        let max_due = self.max.as_ref().is_some_and(|d| d.at <= now);
        match (pause_due, max_due) {
            (true, true) => {
                // Both due: fire in deadline order, pause first on a tie
                let p = self.pause.as_ref().map(|d| d.at);
                let m = self.max.as_ref().map(|d| d.at);
                if p <= m {
                    self.pause
                        .take()
                        .map(|d| (TimerKind::Pause, d.language))
                } else {
                    self.max
                        .take()
                        .map(|d| (TimerKind::MaxUtterance, d.language))
                }
            }
            (true, false) => self.pause.take().map(|d| (TimerKind::Pause, d.language)),
            (false, true) => self
                .max
                .take()
                .map(|d| (TimerKind::MaxUtterance, d.language)),
            (false, false) => None,
        }
    }
}
