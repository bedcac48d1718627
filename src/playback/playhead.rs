use crate::foundation::{
    core::Fps,
    error::{ReelError, ReelResult},
};

/// Identity of one scheduled tick. Only the most recently issued id is live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayheadState {
    Idle,
    Running,
}

/// Result of delivering a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// The playhead moved to `time`; `next` is already scheduled.
    Advanced { time: f64, next: TickId },
    /// The playhead reached the end, was clamped to `time` (= total) and stopped.
    Finished { time: f64 },
    /// The tick was cancelled by a pause/seek or belongs to an earlier chain.
    Stale,
}

/// Play/pause/seek state machine advancing in fixed frame steps.
///
/// Positions are computed as `anchor + n * step` from the last play/seek rather than by
/// repeated addition, so consecutive ticks are exactly one frame apart and never drift.
#[derive(Clone, Debug)]
pub struct Playhead {
    fps: Fps,
    total: f64,
    state: PlayheadState,
    anchor: f64,
    steps: u64,
    time: f64,
    next_id: u64,
    pending: Option<TickId>,
    redraw: bool,
}

impl Playhead {
    pub fn new(fps: Fps, total: f64) -> ReelResult<Self> {
        Fps::new(fps.num, fps.den)?;
        if !total.is_finite() || total < 0.0 {
            return Err(ReelError::validation("timeline total must be finite and >= 0"));
        }
        Ok(Self {
            fps,
            total,
            state: PlayheadState::Idle,
            anchor: 0.0,
            steps: 0,
            time: 0.0,
            next_id: 0,
            pending: None,
            redraw: true,
        })
    }

    pub fn state(&self) -> PlayheadState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlayheadState::Running
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Fixed step between ticks, in seconds.
    pub fn step(&self) -> f64 {
        self.fps.frame_duration_secs()
    }

    /// The tick that will be honored next, if the playhead is running.
    pub fn pending_tick(&self) -> Option<TickId> {
        self.pending
    }

    /// Update the timeline length; the current time is clamped into the new range.
    pub fn set_total(&mut self, total: f64) {
        if !total.is_finite() || total < 0.0 {
            return;
        }
        self.total = total;
        if self.time > total {
            self.reanchor(total);
        }
        self.redraw = true;
    }

    /// Idle -> Running. No-op while already running.
    pub fn play(&mut self) -> Option<TickId> {
        if self.is_running() {
            return None;
        }
        self.state = PlayheadState::Running;
        self.reanchor(self.time);
        Some(self.schedule())
    }

    /// Running -> Idle; cancels the pending tick.
    pub fn pause(&mut self) {
        self.state = PlayheadState::Idle;
        self.pending = None;
    }

    /// Jump to `time`, clamped to `[0, total]`.
    ///
    /// While running, the old tick chain is cancelled and a new one starts from the new
    /// position. While idle, a one-shot redraw is requested.
    pub fn seek(&mut self, time: f64) -> Option<TickId> {
        let t = if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, self.total)
        };
        self.reanchor(t);
        self.redraw = true;
        if self.is_running() {
            Some(self.schedule())
        } else {
            self.pending = None;
            None
        }
    }

    /// Deliver tick `id`.
    pub fn tick(&mut self, id: TickId) -> TickOutcome {
        if !self.is_running() || self.pending != Some(id) {
            return TickOutcome::Stale;
        }
        self.pending = None;
        self.steps += 1;
        let next = self.anchor
            + (self.steps as f64 * f64::from(self.fps.den)) / f64::from(self.fps.num);
        if next >= self.total {
            self.time = self.total;
            self.state = PlayheadState::Idle;
            return TickOutcome::Finished { time: self.total };
        }
        self.time = next;
        TickOutcome::Advanced {
            time: next,
            next: self.schedule(),
        }
    }

    /// Whether an idle redraw was requested since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    fn reanchor(&mut self, t: f64) {
        self.anchor = t;
        self.steps = 0;
        self.time = t;
    }

    fn schedule(&mut self) -> TickId {
        self.next_id += 1;
        let id = TickId(self.next_id);
        self.pending = Some(id);
        id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/playhead.rs"]
mod tests;
