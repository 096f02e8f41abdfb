/// The scheduler's virtual clock.
///
/// Time is a non-negative `f64` in simulated seconds and never moves
/// backwards. The clock also counts how many events have fired, which the
/// driver reports and tests use to assert exactly-once execution.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: f64,
    fired: u64,
}

impl SimClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Total number of events executed so far.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Move the clock to `time`. Earlier times are ignored.
    pub fn advance_to(&mut self, time: f64) {
        debug_assert!(time >= self.now, "clock moved backwards: {time} < {}", self.now);
        if time > self.now {
            self.now = time;
        }
    }

    /// Count one executed event.
    pub fn record_fire(&mut self) {
        self.fired += 1;
    }
}
