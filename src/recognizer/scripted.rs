use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::debug;

use super::{Recognizer, RecognizerEvent, TranscriptToken};
use crate::error::RecognitionError;
use crate::language::LanguageCode;

/// One pre-programmed recognizer emission: wait `delay`, then deliver `text`.
#[derive(Debug, Clone)]
pub struct ScriptedLine {
    pub delay: Duration,
    pub text: String,
    pub is_final: bool,
}

impl ScriptedLine {
    pub fn interim(delay: Duration, text: impl Into<String>) -> Self {
        Self {
            delay,
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_fragment(delay: Duration, text: impl Into<String>) -> Self {
        Self {
            delay,
            text: text.into(),
            is_final: true,
        }
    }
}

/// Recognizer that replays a fixed token script per language tag.
///
/// Each `start` spawns a feed task that plays that tag's script from the
/// beginning, one line at a time with the scripted delays between them.
/// Start/stop calls are recorded so tests can assert on restart behavior,
/// and a number of upcoming `start` calls can be made to fail to exercise
/// the restart-retry path.
pub struct ScriptedRecognizer {
    scripts: HashMap<String, Vec<ScriptedLine>>,
    started_tags: Arc<Mutex<Vec<String>>>,
    stop_count: Arc<AtomicUsize>,
    failing_starts: Arc<AtomicUsize>,
    running: Arc<AtomicBool>,
    feed_handle: Option<JoinHandle<()>>,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            started_tags: Arc::new(Mutex::new(Vec::new())),
            stop_count: Arc::new(AtomicUsize::new(0)),
            failing_starts: Arc::new(AtomicUsize::new(0)),
            running: Arc::new(AtomicBool::new(false)),
            feed_handle: None,
        }
    }

    /// Register the script played when `start` is called with `tag`.
    pub fn with_script(mut self, tag: &str, lines: Vec<ScriptedLine>) -> Self {
        self.scripts.insert(tag.to_string(), lines);
        self
    }

    /// Make the next `count` calls to `start` fail with a backend error.
    pub fn fail_next_starts(&self, count: usize) {
        self.failing_starts.store(count, Ordering::SeqCst);
    }

    /// Handle for injecting `start` failures after the recognizer has been
    /// handed to a session.
    pub fn failure_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.failing_starts)
    }

    /// Handle for observing which tags `start` was called with, usable after
    /// the recognizer has been handed to a session.
    pub fn start_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.started_tags)
    }

    /// Handle for observing how many times `stop` was called.
    pub fn stop_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stop_count)
    }
}

impl Default for ScriptedRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Recognizer for ScriptedRecognizer {
    async fn start(
        &mut self,
        language_tag: &str,
    ) -> Result<mpsc::Receiver<RecognizerEvent>, RecognitionError> {
        if self.failing_starts.load(Ordering::SeqCst) > 0 {
            self.failing_starts.fetch_sub(1, Ordering::SeqCst);
            return Err(RecognitionError::Backend(
                "scripted recognizer unavailable".to_string(),
            ));
        }

        // Starting again replaces any live feed
        if let Some(handle) = self.feed_handle.take() {
            handle.abort();
        }

        if let Ok(mut log) = self.started_tags.lock() {
            log.push(language_tag.to_string());
        }

        let lines = self.scripts.get(language_tag).cloned().unwrap_or_default();
        let hint = LanguageCode::from_recognizer_tag(language_tag);
        let (tx, rx) = mpsc::channel(64);

        debug!(
            "Scripted recognizer started for {} ({} lines)",
            language_tag,
            lines.len()
        );

        self.feed_handle = Some(tokio::spawn(async move {
            for line in lines {
                tokio::time::sleep(line.delay).await;
                let token = if line.is_final {
                    TranscriptToken::final_fragment(line.text, hint.clone())
                } else {
                    TranscriptToken::interim(line.text, hint.clone())
                };
                if tx.send(RecognizerEvent::Token(token)).await.is_err() {
                    break;
                }
            }
        }));

        self.running.store(true, Ordering::SeqCst);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), RecognitionError> {
        self.stop_count.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.feed_handle.take() {
            handle.abort();
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_script_plays_in_order_with_delays() {
        let mut rec = ScriptedRecognizer::new().with_script(
            "vi-VN",
            vec![
                ScriptedLine::final_fragment(Duration::from_millis(100), "xin"),
                ScriptedLine::final_fragment(Duration::from_millis(100), "chào."),
            ],
        );

        let mut rx = rec.start("vi-VN").await.unwrap();

        let RecognizerEvent::Token(first) = rx.recv().await.unwrap() else {
            panic!("expected a token");
        };
        assert_eq!(first.text, "xin");
        assert!(first.is_final);
        assert_eq!(first.language_hint, LanguageCode::new("vi"));

        let RecognizerEvent::Token(second) = rx.recv().await.unwrap() else {
            panic!("expected a token");
        };
        assert_eq!(second.text, "chào.");

        // Script exhausted: channel closes
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_aborts_the_feed() {
        let mut rec = ScriptedRecognizer::new().with_script(
            "ja-JP",
            vec![ScriptedLine::final_fragment(
                Duration::from_secs(60),
                "こんにちは",
            )],
        );

        let mut rx = rec.start("ja-JP").await.unwrap();
        assert!(rec.is_running());
        rec.stop().await.unwrap();
        assert!(!rec.is_running());
        assert!(rx.recv().await.is_none());
        assert_eq!(rec.stop_counter().load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_starts_then_recovery() {
        let mut rec = ScriptedRecognizer::new().with_script("vi-VN", vec![]);
        rec.fail_next_starts(1);

        assert!(rec.start("vi-VN").await.is_err());
        assert!(rec.start("vi-VN").await.is_ok());
        assert_eq!(rec.start_log().lock().unwrap().as_slice(), ["vi-VN"]);
    }
}
