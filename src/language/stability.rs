use std::collections::{HashMap, VecDeque};

use super::LanguageCode;

/// Hysteresis window over recent language detections.
///
/// A single noisy classification must not flip the active language, so a
/// switch is only proposed once the window holds a clear majority. The
/// minimum-interval cooldown between committed switches is the caller's
/// responsibility; this type is purely a voting mechanism.
#[derive(Debug, Clone)]
pub struct StabilityFilter {
    window: VecDeque<LanguageCode>,
    capacity: usize,
    threshold: usize,
}

impl StabilityFilter {
    /// `capacity` is the window size N, `threshold` the vote count T needed
    /// for a majority verdict.
    pub fn new(capacity: usize, threshold: usize) -> Self {
        debug_assert!(threshold >= 1 && threshold <= capacity);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            threshold,
        }
    }

    /// Record a detection, evicting the oldest entry beyond capacity.
    pub fn push(&mut self, lang: LanguageCode) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(lang);
    }

    /// The majority language, if the window has filled to the threshold and
    /// the majority itself reaches the threshold; `None` otherwise.
    pub fn evaluate(&self) -> Option<LanguageCode> {
        if self.window.len() < self.threshold {
            return None;
        }
        let mut counts: HashMap<&LanguageCode, usize> = HashMap::new();
        for lang in &self.window {
            *counts.entry(lang).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .filter(|(_, count)| *count >= self.threshold)
            .map(|(lang, _)| lang.clone())
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vi() -> LanguageCode {
        LanguageCode::new("vi")
    }

    fn ja() -> LanguageCode {
        LanguageCode::new("ja")
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        let mut filter = StabilityFilter::new(5, 3);
        for i in 0..50 {
            filter.push(if i % 2 == 0 { vi() } else { ja() });
            assert!(filter.len() <= 5);
        }
        assert_eq!(filter.len(), 5);
    }

    #[test]
    fn test_no_verdict_below_fill_threshold() {
        let mut filter = StabilityFilter::new(5, 3);
        filter.push(ja());
        filter.push(ja());
        // Two votes: window too short for any verdict
        assert_eq!(filter.evaluate(), None);
    }

    #[test]
    fn test_no_verdict_without_majority() {
        let mut filter = StabilityFilter::new(5, 3);
        filter.push(vi());
        filter.push(ja());
        filter.push(vi());
        filter.push(ja());
        // 2-2 split never reaches the threshold of 3
        assert_eq!(filter.evaluate(), None);
    }

    #[test]
    fn test_majority_verdict() {
        let mut filter = StabilityFilter::new(5, 3);
        filter.push(vi());
        filter.push(ja());
        filter.push(ja());
        filter.push(ja());
        assert_eq!(filter.evaluate(), Some(ja()));
    }

    #[test]
    fn test_window_does_not_need_to_be_unanimous() {
        let mut filter = StabilityFilter::new(5, 3);
        for lang in [vi(), ja(), vi(), ja(), ja()] {
            filter.push(lang);
        }
        assert_eq!(filter.evaluate(), Some(ja()));
    }

    #[test]
    fn test_eviction_forgets_old_votes() {
        let mut filter = StabilityFilter::new(5, 3);
        for _ in 0..3 {
            filter.push(ja());
        }
        assert_eq!(filter.evaluate(), Some(ja()));
        for _ in 0..5 {
            filter.push(vi());
        }
        assert_eq!(filter.evaluate(), Some(vi()));
    }
}
