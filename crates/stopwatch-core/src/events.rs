use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stopwatch::Lap;

/// Every effective engine command produces an Event.
/// No-op commands produce nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    StopwatchStarted {
        accumulated_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchPaused {
        accumulated_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchReset {
        /// Laps discarded by the reset.
        cleared_laps: usize,
        at: DateTime<Utc>,
    },
    LapRecorded {
        /// 1-based display number of the new lap.
        number: usize,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    LapDeleted {
        /// 0-based position the lap occupied before removal.
        index: usize,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    LapsCleared {
        count: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        is_running: bool,
        current_ms: u64,
        accumulated_ms: u64,
        display: String,
        laps: Vec<Lap>,
        at: DateTime<Utc>,
    },
}
