//! Periodic display refresh.
//!
//! A [`Ticker`] only produces signals; it never touches engine state. The
//! presentation loop owns the engine and calls `tick()` on it whenever a
//! signal arrives, which keeps every mutation on one logical task.

use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default refresh cadence, matching a 100 Hz hundredths display.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    period: Duration,
}

impl Ticker {
    /// A zero period is raised to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking. Must be called from within a tokio runtime.
    ///
    /// Ticks the consumer has not picked up yet are coalesced rather than
    /// queued, so a slow renderer never sees a burst.
    pub fn spawn(&self) -> TickHandle {
        let (tx, rx) = mpsc::channel(1);
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match tx.try_send(()) {
                    Ok(()) | Err(TrySendError::Full(())) => {}
                    Err(TrySendError::Closed(())) => break,
                }
            }
        });
        tracing::trace!(period_ms = period.as_millis() as u64, "ticker started");
        TickHandle {
            rx,
            task,
            stopped: false,
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

/// Stop handle for a running [`Ticker`]. Dropping it stops the ticker.
#[derive(Debug)]
pub struct TickHandle {
    rx: mpsc::Receiver<()>,
    task: JoinHandle<()>,
    stopped: bool,
}

impl TickHandle {
    /// Wait for the next tick. Returns `None` once stopped.
    pub async fn recv(&mut self) -> Option<()> {
        if self.stopped {
            return None;
        }
        self.rx.recv().await
    }

    /// Cancel the ticker. Pending ticks are discarded.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.task.abort();
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
        tracing::trace!("ticker stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn delivers_ticks_at_cadence() {
        let mut ticks = Ticker::new(Duration::from_millis(10)).spawn();
        for _ in 0..3 {
            assert_eq!(ticks.recv().await, Some(()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_ticker_delivers_nothing() {
        let mut ticks = Ticker::new(Duration::from_millis(10)).spawn();
        assert_eq!(ticks.recv().await, Some(()));
        tokio::time::sleep(Duration::from_millis(50)).await;

        ticks.stop();
        assert!(ticks.is_stopped());
        assert_eq!(ticks.recv().await, None);
    }

    #[test]
    fn zero_period_is_clamped() {
        assert_eq!(Ticker::new(Duration::ZERO).period(), Duration::from_millis(1));
    }
}
