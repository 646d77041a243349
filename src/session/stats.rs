use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics about a segmentation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Whether the session is currently listening
    pub is_listening: bool,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Number of transcript tokens processed
    pub tokens_processed: usize,

    /// Number of interim progress events emitted
    pub interim_updates: usize,

    /// Number of utterances finalized
    pub utterances_finalized: usize,

    /// Number of committed language switches
    pub language_switches: usize,
}
