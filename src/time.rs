//! Fixed-timestep scheduling using an accumulator pattern.
//!
//! `draw_web()` calls at ~60fps with variable delta. `Scheduler` converts
//! this into discrete 100ms game ticks plus a slower autosave trigger,
//! keeping game logic deterministic and fully testable.

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Triggers produced by one `Scheduler::update` call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Triggers {
    /// Game ticks to process this frame.
    pub ticks: u32,
    /// Whether an autosave interval elapsed.
    pub autosave: bool,
}

pub struct Scheduler {
    /// Milliseconds per tick (e.g. 100ms = 10 ticks/sec)
    ms_per_tick: f64,
    /// Milliseconds between autosaves
    autosave_ms: f64,
    /// Accumulated milliseconds not yet consumed as ticks
    accumulator: f64,
    /// Milliseconds since the last autosave trigger
    since_autosave: f64,
    /// Total elapsed ticks since creation
    pub total_ticks: u64,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
    stopped: bool,
}

impl Scheduler {
    /// `ticks_per_sec`: game ticks per real-time second (e.g. 10).
    /// `autosave_ms`: interval between autosave triggers (e.g. 30000).
    pub fn new(ticks_per_sec: u32, autosave_ms: f64) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            autosave_ms,
            accumulator: 0.0,
            since_autosave: 0.0,
            total_ticks: 0,
            last_timestamp: None,
            stopped: false,
        }
    }

    /// Seconds of game time in one tick.
    pub fn seconds_per_tick(&self) -> f64 {
        self.ms_per_tick / 1000.0
    }

    /// Feed a frame timestamp (from `performance.now()` or similar).
    ///
    /// A long gap (backgrounded tab) is not clamped: every elapsed tick is
    /// returned, since processing N ticks is a single multiplication.
    /// Several missed autosave intervals collapse into one trigger.
    pub fn update(&mut self, now_ms: f64) -> Triggers {
        if self.stopped {
            return Triggers::default();
        }
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).max(0.0),
            None => 0.0, // First frame: no delta
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;

        self.since_autosave += delta;
        let autosave = self.autosave_ms > 0.0 && self.since_autosave >= self.autosave_ms;
        if autosave {
            self.since_autosave %= self.autosave_ms;
        }

        Triggers { ticks, autosave }
    }

    /// Halt both timers for good (page teardown).
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Restart after `stop()`. The time spent stopped is not replayed: the
    /// next `update` only sets the baseline.
    pub fn resume(&mut self) {
        self.stopped = false;
        self.last_timestamp = None;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

/// Settable clock for tests.
#[cfg(test)]
pub struct ManualClock {
    now: std::cell::Cell<u64>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: std::cell::Cell::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.set(now);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
