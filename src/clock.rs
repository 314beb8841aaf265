use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Fixed-interval trigger for re-reading "now". Polled from the event loop
/// rather than run on its own thread, so stopping it leaves nothing behind.
#[derive(Debug, Clone)]
pub struct ClockTicker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Default for ClockTicker {
    fn default() -> Self {
        ClockTicker::new(DEFAULT_TICK_INTERVAL)
    }
}

impl ClockTicker {
    pub fn new(interval: Duration) -> Self {
        ClockTicker {
            interval: interval.max(MIN_TICK_INTERVAL),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() {
            debug!(interval_ms = self.interval.as_millis() as u64, "clock ticker started");
        }
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        if self.next_due.take().is_some() {
            debug!("clock ticker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Fires at most once per call. Missed intervals are not replayed: after a
    /// long stall the next tick is one interval from `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let next = due + self.interval;
        self.next_due = Some(if next > now { next } else { now + self.interval });
        true
    }
}
