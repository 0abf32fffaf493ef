use std::time::Duration;

use crate::foundation::error::{BarRaceError, BarRaceResult};

/// How a running scrubber schedules its steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Schedule {
    /// One step per animation frame.
    #[default]
    PerFrame,
    /// One step every fixed delay.
    Interval(Duration),
}

/// Scrubber behaviour knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrubberOptions {
    /// Index selected before anything runs.
    pub initial: usize,
    pub schedule: Schedule,
    /// Start running on construction.
    pub autoplay: bool,
    /// Wrap around instead of stopping at the end.
    pub looping: bool,
    /// Pause before wrapping around.
    pub loop_delay: Option<Duration>,
    /// Reverse direction at each end instead of wrapping.
    pub alternate: bool,
}

impl Default for ScrubberOptions {
    fn default() -> Self {
        Self {
            initial: 0,
            schedule: Schedule::PerFrame,
            autoplay: true,
            looping: true,
            loop_delay: None,
            alternate: false,
        }
    }
}

/// The one callback a running scrubber has outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    /// Fires on the first frame strictly after `after`.
    Frame { after: Duration },
    Interval { next_due: Duration, period: Duration },
    /// Loop pause; fires once, steps, then resumes the schedule.
    LoopDelay { due: Duration },
}

/// Play/pause/loop timeline over keyframe indices `0..len`.
///
/// Time is supplied by the caller, so the machine is deterministic. A scrubber is running
/// exactly when it has a pending callback; stopping clears it on the spot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scrubber {
    len: usize,
    index: usize,
    direction: isize,
    opts: ScrubberOptions,
    pending: Option<Pending>,
}

impl Scrubber {
    pub fn new(len: usize, opts: ScrubberOptions, now: Duration) -> BarRaceResult<Self> {
        if len == 0 {
            return Err(BarRaceError::validation("scrubber needs at least one value"));
        }
        if opts.schedule == Schedule::Interval(Duration::ZERO) {
            return Err(BarRaceError::validation("scrubber delay must be > 0"));
        }
        let mut s = Self {
            len,
            index: opts.initial.min(len - 1),
            direction: 1,
            opts,
            pending: None,
        };
        if opts.autoplay {
            s.start(now);
        }
        Ok(s)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; a scrubber has at least one value.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// `1` forwards, `-1` backwards.
    pub fn direction(&self) -> isize {
        self.direction
    }

    /// The play/pause button.
    ///
    /// Pauses a running scrubber. Otherwise steps once (reversing at the end when
    /// alternating), starts the schedule and returns the new index.
    pub fn toggle(&mut self, now: Duration) -> Option<usize> {
        if self.is_running() {
            self.stop();
            return None;
        }
        self.direction = if self.opts.alternate && self.index == self.len - 1 {
            -1
        } else {
            1
        };
        self.step();
        self.start(now);
        Some(self.index)
    }

    /// Resume if stopped. Returns the index the resume stepped to.
    pub fn play(&mut self, now: Duration) -> Option<usize> {
        if self.is_running() {
            return None;
        }
        self.toggle(now)
    }

    /// Stop if running; nothing scheduled survives.
    pub fn pause(&mut self) {
        self.stop();
    }

    /// Manual scrub. Stops a running scrubber and selects `index` (clamped).
    pub fn scrub_to(&mut self, index: usize) -> usize {
        self.stop();
        self.index = index.min(self.len - 1);
        self.index
    }

    /// Fire the pending callback if it is due at `now` and return the new index it selected.
    ///
    /// Call repeatedly until `None` to drain interval catch-up.
    pub fn poll(&mut self, now: Duration) -> Option<usize> {
        match self.pending? {
            Pending::Frame { after } => {
                if now <= after {
                    return None;
                }
                self.pending = Some(Pending::Frame { after: now });
                self.advance(now)
            }
            Pending::Interval { next_due, period } => {
                if now < next_due {
                    return None;
                }
                self.pending = Some(Pending::Interval {
                    next_due: next_due + period,
                    period,
                });
                self.advance(next_due)
            }
            Pending::LoopDelay { due } => {
                if now < due {
                    return None;
                }
                self.pending = None;
                self.step();
                self.start(due);
                Some(self.index)
            }
        }
    }

    fn advance(&mut self, now: Duration) -> Option<usize> {
        let end = if self.direction > 0 { self.len - 1 } else { 0 };
        if self.index == end {
            if !self.opts.looping {
                self.stop();
                return None;
            }
            if self.opts.alternate {
                self.direction = -self.direction;
            }
            if let Some(delay) = self.opts.loop_delay {
                self.pending = Some(Pending::LoopDelay { due: now + delay });
                return None;
            }
        }
        self.step();
        Some(self.index)
    }

    fn step(&mut self) {
        let len = self.len as isize;
        self.index = ((self.index as isize + self.direction + len) % len) as usize;
    }

    fn start(&mut self, now: Duration) {
        self.pending = Some(match self.opts.schedule {
            Schedule::PerFrame => Pending::Frame { after: now },
            Schedule::Interval(period) => Pending::Interval {
                next_due: now + period,
                period,
            },
        });
    }

    fn stop(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/scrubber.rs"]
mod tests;
