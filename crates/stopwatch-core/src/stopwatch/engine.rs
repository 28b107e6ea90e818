//! Stopwatch engine implementation.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads; elapsed time is always derived from the difference between the
//! clock and the instant the current run segment began, so it never drifts no
//! matter how often (or rarely) the caller refreshes the display.
//!
//! ## State Transitions
//!
//! ```text
//! Paused --start--> Running --pause--> Paused
//!    ^                 |
//!    +-----reset-------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = StopwatchEngine::new().with_laps(lap_store.load());
//! engine.start();
//! // On every display tick:
//! let shown = format_time(engine.tick());
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::format::format_time;
use crate::events::Event;

/// Callback invoked synchronously after every change to the lap list.
///
/// Receives the full ordered sequence. Implementations must not block for long;
/// slow stores should hand the write off (see `BackgroundWriter`).
pub trait LapsHook: Send {
    fn laps_changed(&self, laps: &[u64]);
}

impl<F> LapsHook for F
where
    F: Fn(&[u64]) + Send,
{
    fn laps_changed(&self, laps: &[u64]) {
        self(laps)
    }
}

/// A lap as presented to the user. The number is derived from position and is
/// never stored, so it shifts down after a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lap {
    pub number: usize,
    pub elapsed_ms: u64,
}

impl fmt::Display for Lap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lap {}: {}", self.number, format_time(self.elapsed_ms))
    }
}

/// Run state that a short-lived shell can save between invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub is_running: bool,
    /// Epoch milliseconds the current run segment began. Only set while running.
    #[serde(default)]
    pub start_epoch_ms: Option<u64>,
    #[serde(default)]
    pub accumulated_ms: u64,
}

/// Core stopwatch engine.
///
/// Operates on wall-clock deltas -- no internal thread.
/// Commands return `Some(Event)` when they took effect and `None` when they
/// were ignored (e.g. `record_lap` while paused).
pub struct StopwatchEngine<C: Clock = SystemClock> {
    clock: C,
    is_running: bool,
    /// Epoch milliseconds the current run segment began.
    start_epoch_ms: u64,
    /// Total of all completed run segments.
    accumulated_ms: u64,
    /// Display value, refreshed by `tick()` and by every command.
    current_ms: u64,
    laps: Vec<u64>,
    on_laps_changed: Option<Box<dyn LapsHook>>,
}

impl StopwatchEngine<SystemClock> {
    /// Create a paused engine on the system clock with no laps.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for StopwatchEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> StopwatchEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            is_running: false,
            start_epoch_ms: 0,
            accumulated_ms: 0,
            current_ms: 0,
            laps: Vec::new(),
            on_laps_changed: None,
        }
    }

    /// Seed the lap list, typically from `LapStore::load`. Does not fire the hook.
    pub fn with_laps(mut self, laps: Vec<u64>) -> Self {
        self.laps = laps;
        self
    }

    /// Install the hook fired after every lap-list change.
    pub fn on_laps_changed(mut self, hook: impl LapsHook + 'static) -> Self {
        self.on_laps_changed = Some(Box::new(hook));
        self
    }

    /// Restore run state saved by [`session`](Self::session).
    ///
    /// A running session without a start instant comes back paused.
    pub fn restore(&mut self, session: Session) {
        self.accumulated_ms = session.accumulated_ms;
        match (session.is_running, session.start_epoch_ms) {
            (true, Some(start)) => {
                self.is_running = true;
                self.start_epoch_ms = start;
            }
            _ => {
                self.is_running = false;
                self.start_epoch_ms = 0;
            }
        }
        self.current_ms = self.elapsed_ms();
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn accumulated_ms(&self) -> u64 {
        self.accumulated_ms
    }

    /// The display value as of the last `tick()` or command.
    pub fn current_ms(&self) -> u64 {
        self.current_ms
    }

    /// Elapsed time computed from the clock right now.
    pub fn elapsed_ms(&self) -> u64 {
        if self.is_running {
            let segment = self.clock.now_ms().saturating_sub(self.start_epoch_ms);
            self.accumulated_ms.saturating_add(segment)
        } else {
            self.accumulated_ms
        }
    }

    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    pub fn lap_entries(&self) -> Vec<Lap> {
        self.laps
            .iter()
            .enumerate()
            .map(|(i, &elapsed_ms)| Lap {
                number: i + 1,
                elapsed_ms,
            })
            .collect()
    }

    pub fn session(&self) -> Session {
        Session {
            is_running: self.is_running,
            start_epoch_ms: self.is_running.then_some(self.start_epoch_ms),
            accumulated_ms: self.accumulated_ms,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let current_ms = self.elapsed_ms();
        Event::StateSnapshot {
            is_running: self.is_running,
            current_ms,
            accumulated_ms: self.accumulated_ms,
            display: format_time(current_ms),
            laps: self.lap_entries(),
            at: self.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.is_running {
            return None;
        }
        self.start_epoch_ms = self.clock.now_ms();
        self.is_running = true;
        self.current_ms = self.accumulated_ms;
        Some(Event::StopwatchStarted {
            accumulated_ms: self.accumulated_ms,
            at: self.now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.accumulated_ms = self.elapsed_ms();
        self.is_running = false;
        self.current_ms = self.accumulated_ms;
        Some(Event::StopwatchPaused {
            accumulated_ms: self.accumulated_ms,
            at: self.now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        let cleared_laps = self.laps.len();
        self.is_running = false;
        self.start_epoch_ms = 0;
        self.accumulated_ms = 0;
        self.current_ms = 0;
        self.laps.clear();
        self.notify_laps_changed();
        Some(Event::StopwatchReset {
            cleared_laps,
            at: self.now(),
        })
    }

    pub fn record_lap(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        let elapsed_ms = self.elapsed_ms();
        self.current_ms = elapsed_ms;
        self.laps.push(elapsed_ms);
        self.notify_laps_changed();
        Some(Event::LapRecorded {
            number: self.laps.len(),
            elapsed_ms,
            at: self.now(),
        })
    }

    /// Remove the lap at a 0-based position. Out-of-range is ignored.
    pub fn delete_lap(&mut self, index: usize) -> Option<Event> {
        if index >= self.laps.len() {
            return None;
        }
        let elapsed_ms = self.laps.remove(index);
        self.notify_laps_changed();
        Some(Event::LapDeleted {
            index,
            elapsed_ms,
            at: self.now(),
        })
    }

    pub fn clear_laps(&mut self) -> Option<Event> {
        let count = self.laps.len();
        self.laps.clear();
        self.notify_laps_changed();
        Some(Event::LapsCleared {
            count,
            at: self.now(),
        })
    }

    /// Refresh the display value. Call on every display tick.
    pub fn tick(&mut self) -> u64 {
        self.current_ms = self.elapsed_ms();
        self.current_ms
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Event timestamp taken from the engine's clock.
    fn now(&self) -> DateTime<Utc> {
        i64::try_from(self.clock.now_ms())
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now)
    }

    fn notify_laps_changed(&self) {
        if let Some(hook) = &self.on_laps_changed {
            hook.laps_changed(&self.laps);
        }
    }
}

impl<C: Clock + fmt::Debug> fmt::Debug for StopwatchEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopwatchEngine")
            .field("clock", &self.clock)
            .field("is_running", &self.is_running)
            .field("start_epoch_ms", &self.start_epoch_ms)
            .field("accumulated_ms", &self.accumulated_ms)
            .field("current_ms", &self.current_ms)
            .field("laps", &self.laps)
            .field("has_hook", &self.on_laps_changed.is_some())
            .finish()
    }
}
