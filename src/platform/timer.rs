//! Fixed-interval tick timer
//!
//! Turns variable frame times into a whole number of fixed ticks. At most one
//! timer is ever armed: `start` on an armed timer and `stop` on a disarmed one
//! are refused, so rapid input can't stack a second tick source.

use crate::consts::{MAX_CATCH_UP_TICKS, TICK_INTERVAL_MS};

#[derive(Debug, Clone)]
pub struct TickTimer {
    interval_ms: f64,
    max_catch_up: u32,
    accumulator: f64,
    armed: bool,
    starts: u32,
    stops: u32,
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new(TICK_INTERVAL_MS)
    }
}

impl TickTimer {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            max_catch_up: MAX_CATCH_UP_TICKS,
            accumulator: 0.0,
            armed: false,
            starts: 0,
            stops: 0,
        }
    }

    /// Arm the timer. Returns false if it was already running.
    pub fn start(&mut self) -> bool {
        if self.armed {
            return false;
        }
        self.armed = true;
        self.accumulator = 0.0;
        self.starts += 1;
        log::debug!("Tick timer started ({} ms)", self.interval_ms);
        true
    }

    /// Disarm the timer. Returns false if it wasn't running.
    pub fn stop(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.armed = false;
        self.accumulator = 0.0;
        self.stops += 1;
        log::debug!("Tick timer stopped");
        true
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Times the timer went from disarmed to armed
    pub fn starts(&self) -> u32 {
        self.starts
    }

    /// Times the timer went from armed to disarmed
    pub fn stops(&self) -> u32 {
        self.stops
    }

    /// Feed elapsed wall time, get the number of ticks now due
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        if !self.armed || elapsed_ms.is_nan() || elapsed_ms <= 0.0 {
            return 0;
        }
        self.accumulator += elapsed_ms;

        let mut due = 0;
        while self.accumulator >= self.interval_ms && due < self.max_catch_up {
            self.accumulator -= self.interval_ms;
            due += 1;
        }
        // Drop the backlog after a long stall (tab hidden, debugger)
        if due == self.max_catch_up && self.accumulator >= self.interval_ms {
            log::debug!("Dropping {:.0} ms of tick backlog", self.accumulator);
            self.accumulator = 0.0;
        }
        due
    }
}
