use std::time::{Duration, Instant};

/// Decides when the pending playhead tick fires.
///
/// The host calls into the session once per display frame; the scheduler turns those calls into
/// playhead ticks.
pub trait Scheduler: Send {
    /// A new tick chain starts at `now` (play, seek, export start).
    fn arm(&mut self, now: Instant);
    /// Whether a tick is due at `now`. A `true` result consumes the due tick.
    fn due(&mut self, now: Instant) -> bool;
}

/// Paces ticks to wall-clock time: at most one tick per frame interval.
///
/// When the host falls far behind, the backlog is dropped instead of replayed in a burst.
#[derive(Clone, Debug)]
pub struct LiveScheduler {
    interval: Duration,
    next_due: Option<Instant>,
}

impl LiveScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Scheduler for LiveScheduler {
    fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    fn due(&mut self, now: Instant) -> bool {
        let Some(due_at) = self.next_due else {
            self.next_due = Some(now + self.interval);
            return false;
        };
        if now < due_at {
            return false;
        }
        let next = due_at + self.interval;
        self.next_due = Some(if next + self.interval < now {
            now + self.interval
        } else {
            next
        });
        true
    }
}

/// Fires on every call. Used for offline capture and deterministic tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct SteppedScheduler;

impl Scheduler for SteppedScheduler {
    fn arm(&mut self, _now: Instant) {}

    fn due(&mut self, _now: Instant) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/scheduler.rs"]
mod tests;
