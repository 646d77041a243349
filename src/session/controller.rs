use super::config::SessionConfig;
use super::events::{InterimUpdate, SessionEvent, Utterance};
use super::stats::SessionStats;
use crate::language::{LanguageCode, LanguageDetector, LanguageProfile, StabilityFilter};
use crate::recognizer::{Recognizer, RecognizerEvent, TranscriptToken};
use crate::segment::{FinalizationScheduler, TimerKind, UtteranceBuffer};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, error, info, warn};

/// A conversation session that routes recognizer tokens through language
/// detection, hysteresis, per-language accumulation, and finalization timing,
/// emitting interim progress and finalized utterances downstream.
///
/// One controller per conversation; all mutable session state lives on a
/// single worker task, so token handling and timer expiry never race.
pub struct SessionController {
    /// Session configuration
    config: SessionConfig,

    /// When the session was created
    started_at: chrono::DateTime<Utc>,

    /// Whether the session is currently listening
    is_listening: Arc<AtomicBool>,

    /// Event counters shared with the worker
    counters: Arc<SessionCounters>,

    /// Upstream recognizer, handed to the worker on start
    recognizer: Mutex<Option<Box<dyn Recognizer>>>,

    /// Control channel to the worker task
    command_tx: Mutex<Option<mpsc::Sender<Command>>>,

    /// Handle for the worker task
    worker_handle: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Debug, Default)]
struct SessionCounters {
    tokens: AtomicUsize,
    interims: AtomicUsize,
    utterances: AtomicUsize,
    switches: AtomicUsize,
}

enum Command {
    Stop { ack: oneshot::Sender<()> },
}

impl SessionController {
    /// Create a new session over the given recognizer.
    pub fn new(config: SessionConfig, recognizer: Box<dyn Recognizer>) -> Result<Self> {
        config.validate()?;
        info!("Creating session: {}", config.session_id);
        Ok(Self {
            config,
            started_at: Utc::now(),
            is_listening: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(SessionCounters::default()),
            recognizer: Mutex::new(Some(recognizer)),
            command_tx: Mutex::new(None),
            worker_handle: Mutex::new(None),
        })
    }

    /// Start listening. The first configured language becomes active and the
    /// recognizer is started hinted to it.
    ///
    /// Returns a channel receiver that will receive session events.
    pub async fn start(&self) -> Result<mpsc::Receiver<SessionEvent>> {
        if self.is_listening.load(Ordering::SeqCst) {
            bail!("session {} is already listening", self.config.session_id);
        }

        let mut recognizer = self
            .recognizer
            .lock()
            .await
            .take()
            .context("session has already run; create a new session per conversation")?;

        let first = self.config.languages[0].clone();
        info!(
            "Starting session {} (active language: {})",
            self.config.session_id, first.code
        );

        let tokens = recognizer
            .start(&first.recognizer_tag)
            .await
            .context("Failed to start recognizer")?;

        self.is_listening.store(true, Ordering::SeqCst);

        let (event_tx, event_rx) = mpsc::channel(256);
        let (command_tx, command_rx) = mpsc::channel(4);

        let worker = SessionWorker {
            config: self.config.clone(),
            profiles: self
                .config
                .languages
                .iter()
                .map(|p| (p.code.clone(), p.clone()))
                .collect(),
            detector: LanguageDetector::new(&self.config.languages),
            filter: StabilityFilter::new(
                self.config.detection_window,
                self.config.switch_threshold,
            ),
            buffer: UtteranceBuffer::new(&self.config.languages),
            scheduler: FinalizationScheduler::new(),
            active: first.code,
            last_switch: None,
            recognizer,
            tokens,
            token_source_open: true,
            events: event_tx,
            counters: Arc::clone(&self.counters),
            is_listening: Arc::clone(&self.is_listening),
        };

        let handle = tokio::spawn(worker.run(command_rx));
        *self.command_tx.lock().await = Some(command_tx);
        *self.worker_handle.lock().await = Some(handle);

        Ok(event_rx)
    }

    /// Stop listening: cancel timers, flush every language's non-empty
    /// buffer, and stop the recognizer. Flushing completes before this
    /// returns; calling `stop` again emits nothing.
    pub async fn stop(&self) -> Result<SessionStats> {
        let Some(command_tx) = self.command_tx.lock().await.take() else {
            warn!("Session {} is not listening", self.config.session_id);
            return Ok(self.stats());
        };

        info!("Stopping session: {}", self.config.session_id);

        let (ack_tx, ack_rx) = oneshot::channel();
        if command_tx.send(Command::Stop { ack: ack_tx }).await.is_ok() {
            let _ = ack_rx.await;
        }

        if let Some(handle) = self.worker_handle.lock().await.take() {
            if let Err(err) = handle.await {
                error!("Session worker panicked: {}", err);
            }
        }

        info!("Session stopped: {}", self.config.session_id);
        Ok(self.stats())
    }

    pub fn is_active(&self) -> bool {
        self.is_listening.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current session statistics
    pub fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);
        SessionStats {
            is_listening: self.is_listening.load(Ordering::SeqCst),
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            tokens_processed: self.counters.tokens.load(Ordering::SeqCst),
            interim_updates: self.counters.interims.load(Ordering::SeqCst),
            utterances_finalized: self.counters.utterances.load(Ordering::SeqCst),
            language_switches: self.counters.switches.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum FinalizeReason {
    /// Buffer ends in a sentence terminator
    Terminator,
    /// Pause timeout with no terminator
    Pause,
    /// Absolute utterance ceiling reached
    MaxDuration,
    /// Language switch or session stop
    Forced,
}

/// The single task owning all mutable session state. Tokens and timer
/// expirations are both handled here, so no locking guards the buffers.
struct SessionWorker {
    config: SessionConfig,
    profiles: HashMap<LanguageCode, LanguageProfile>,
    detector: LanguageDetector,
    filter: StabilityFilter,
    buffer: UtteranceBuffer,
    scheduler: FinalizationScheduler,
    active: LanguageCode,
    last_switch: Option<Instant>,
    recognizer: Box<dyn Recognizer>,
    tokens: mpsc::Receiver<RecognizerEvent>,
    token_source_open: bool,
    events: mpsc::Sender<SessionEvent>,
    counters: Arc<SessionCounters>,
    is_listening: Arc<AtomicBool>,
}

impl SessionWorker {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        debug!("Session worker started (active language: {})", self.active);

        loop {
            let deadline = self.scheduler.next_deadline();
            tokio::select! {
                cmd = commands.recv() => {
                    match cmd {
                        Some(Command::Stop { ack }) => {
                            self.shutdown().await;
                            let _ = ack.send(());
                            break;
                        }
                        None => {
                            // Controller dropped without stop(); flush anyway
                            self.shutdown().await;
                            break;
                        }
                    }
                }
                event = self.tokens.recv(), if self.token_source_open => {
                    match event {
                        Some(RecognizerEvent::Token(token)) => self.handle_token(token).await,
                        Some(RecognizerEvent::Error(err)) => self.handle_recognizer_error(err).await,
                        None => {
                            // The recognizer owns its restart-on-end behavior;
                            // a closed stream is just silence from our side.
                            debug!("Recognizer token stream ended");
                            self.token_source_open = false;
                        }
                    }
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.handle_deadlines().await;
                }
            }
        }

        debug!("Session worker finished");
    }

    async fn handle_token(&mut self, token: TranscriptToken) {
        let text = token.text.trim().to_string();
        if text.is_empty() {
            return;
        }
        self.counters.tokens.fetch_add(1, Ordering::SeqCst);

        let detected = self.detector.detect_or(&text, &token.language_hint);
        self.filter.push(detected);

        if let Some(stable) = self.filter.evaluate() {
            if stable != self.active && self.switch_gate_open() {
                // The switch consumes this token; the restarted recognizer
                // re-hears the speech under the correct hint.
                self.switch_language(stable).await;
                return;
            }
        }

        let lang = self.active.clone();
        let Some(profile) = self.profiles.get(&lang).cloned() else {
            error!("Active language {} has no profile; dropping token", lang);
            return;
        };

        if token.is_final {
            self.buffer.append(&lang, &text);
            self.buffer.set_pending_interim(&lang, "");
            if !self.scheduler.max_is_armed(&lang) {
                self.scheduler.arm_max(&lang, self.config.max_utterance);
            }
            let snapshot = self.buffer.snapshot(&lang);
            self.emit_interim(&snapshot, &lang).await;
            if profile.ends_with_terminator(&snapshot) {
                self.finalize(&lang, FinalizeReason::Terminator).await;
            } else {
                self.scheduler.arm_pause(&lang, profile.pause_timeout);
            }
        } else {
            self.buffer.set_pending_interim(&lang, &text);
            self.emit_interim(&text, &lang).await;
            self.scheduler.arm_pause(&lang, profile.pause_timeout);
        }
    }

    fn switch_gate_open(&self) -> bool {
        self.last_switch
            .map_or(true, |at| at.elapsed() >= self.config.min_switch_interval)
    }

    async fn switch_language(&mut self, next: LanguageCode) {
        let outgoing = self.active.clone();
        info!("Language switch: {} -> {}", outgoing, next);

        self.scheduler.cancel_all(&outgoing);
        self.finalize(&outgoing, FinalizeReason::Forced).await;

        self.active = next.clone();
        self.last_switch = Some(Instant::now());
        self.counters.switches.fetch_add(1, Ordering::SeqCst);

        self.restart_recognizer(&next).await;
    }

    /// Restart the recognizer hinted to `lang` after a short settle delay.
    /// Tokens arriving during the gap are dropped with the old channel; the
    /// recognizer's language tag in that window cannot be trusted.
    async fn restart_recognizer(&mut self, lang: &LanguageCode) {
        let Some(tag) = self.profiles.get(lang).map(|p| p.recognizer_tag.clone()) else {
            error!("No profile for {}; recognizer left stopped", lang);
            return;
        };

        if let Err(err) = self.recognizer.stop().await {
            warn!("Failed to stop recognizer before restart: {}", err);
        }
        self.token_source_open = false;

        sleep(self.config.settle_delay).await;

        for attempt in 0..2 {
            match self.recognizer.start(&tag).await {
                Ok(rx) => {
                    self.tokens = rx;
                    self.token_source_open = true;
                    debug!("Recognizer restarted with hint {}", tag);
                    return;
                }
                Err(err) if attempt == 0 => {
                    warn!("Recognizer restart failed ({}); retrying shortly", err);
                    sleep(self.config.settle_delay).await;
                }
                Err(err) => {
                    error!("Recognizer unavailable after language switch: {}", err);
                    let _ = self
                        .events
                        .send(SessionEvent::RecognitionFailed(err))
                        .await;
                }
            }
        }
    }

    async fn handle_recognizer_error(&mut self, err: crate::error::RecognitionError) {
        if err.is_silence() {
            debug!("Recognizer reported '{}'; treating as silence", err);
            return;
        }
        warn!("Recognition error: {}", err);
        if self
            .events
            .send(SessionEvent::RecognitionFailed(err))
            .await
            .is_err()
        {
            debug!("Event receiver dropped; discarding recognition error");
        }
    }

    async fn handle_deadlines(&mut self) {
        let now = Instant::now();
        while let Some((kind, lang)) = self.scheduler.pop_expired(now) {
            match kind {
                TimerKind::Pause => {
                    debug!("Pause timeout for {}", lang);
                    self.finalize(&lang, FinalizeReason::Pause).await;
                }
                TimerKind::MaxUtterance => {
                    debug!("Max-utterance timeout for {}", lang);
                    self.finalize(&lang, FinalizeReason::MaxDuration).await;
                }
            }
        }
    }

    /// Turn `lang`'s accumulated state into a finalized utterance, if there
    /// is anything to emit. Finalizing an empty buffer is a no-op.
    async fn finalize(&mut self, lang: &LanguageCode, reason: FinalizeReason) {
        let committed = self.buffer.snapshot(lang);
        let interim = self.buffer.pending_interim(lang);

        let chosen = match reason {
            FinalizeReason::Terminator => committed,
            // The interim snapshot may hold speech the recognizer never
            // promoted to a final fragment; prefer it when it says more.
            _ => {
                if committed.is_empty() || committed.chars().count() < interim.chars().count() {
                    interim
                } else {
                    committed
                }
            }
        };

        self.scheduler.cancel_all(lang);

        let text = chosen.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.buffer.clear(lang);
        self.counters.utterances.fetch_add(1, Ordering::SeqCst);
        debug!("Finalized {} utterance ({:?}): {:?}", lang, reason, text);

        let utterance = Utterance {
            text,
            language: lang.clone(),
            timestamp: Utc::now(),
        };
        if self
            .events
            .send(SessionEvent::Finalized(utterance))
            .await
            .is_err()
        {
            debug!("Event receiver dropped; discarding finalized utterance");
        }
    }

    async fn emit_interim(&mut self, text: &str, lang: &LanguageCode) {
        self.counters.interims.fetch_add(1, Ordering::SeqCst);
        let update = InterimUpdate {
            text: text.to_string(),
            language: lang.clone(),
            timestamp: Utc::now(),
        };
        if self.events.send(SessionEvent::Interim(update)).await.is_err() {
            debug!("Event receiver dropped; discarding interim update");
        }
    }

    async fn shutdown(&mut self) {
        self.is_listening.store(false, Ordering::SeqCst);

        // Cancel every outstanding timer before flushing so a stale deadline
        // cannot misattribute a finalize after the flush.
        self.scheduler.reset();

        // Flush every configured language, not just the active one: a
        // language active moments before a switch may still hold text.
        let codes: Vec<LanguageCode> =
            self.config.languages.iter().map(|p| p.code.clone()).collect();
        for code in codes {
            self.finalize(&code, FinalizeReason::Forced).await;
        }

        if let Err(err) = self.recognizer.stop().await {
            warn!("Failed to stop recognizer: {}", err);
        }
    }
}
