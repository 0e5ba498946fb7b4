//! Platform glue between the simulation and whatever hosts it
//!
//! Handles:
//! - Fixed-interval ticking from variable frame times
//! - Starting/stopping the tick source exactly once per run
//! - Mount/unmount lifecycle of the embedded game
//! - Idle/demo mode input

pub mod timer;

pub use timer::TickTimer;

use crate::sim::autopilot;
use crate::sim::{Difficulty, Engine, RunPhase, SimEvent, Snapshot};

/// One mounted game: the engine plus the single timer that ticks it
///
/// All calls must come from the same thread/event loop.
#[derive(Debug, Clone)]
pub struct Session {
    engine: Engine,
    timer: TickTimer,
    autopilot: bool,
    mounted: bool,
}

impl Session {
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        let mut engine = Engine::with_seed(seed);
        engine.set_difficulty(difficulty);
        Self {
            engine,
            timer: TickTimer::default(),
            autopilot: false,
            mounted: true,
        }
    }

    /// Player input. Starts a run from Idle/Over, flaps while Running.
    pub fn impulse(&mut self) {
        if !self.mounted {
            return;
        }
        self.engine.apply_impulse();
        if self.engine.phase() == RunPhase::Running {
            // Refused when already armed, so repeated taps never add a second timer
            self.timer.start();
        }
    }

    /// Feed elapsed wall time; runs due ticks and returns what happened
    pub fn frame(&mut self, elapsed_ms: f64) -> Vec<SimEvent> {
        if !self.mounted {
            return Vec::new();
        }
        if self.autopilot && self.engine.phase() != RunPhase::Running {
            self.impulse();
        }

        let due = self.timer.advance(elapsed_ms);
        for _ in 0..due {
            if self.autopilot
                && autopilot::should_impulse(&self.engine.snapshot(), &self.engine.profile())
            {
                self.engine.apply_impulse();
            }
            self.engine.tick();
            if self.engine.phase() != RunPhase::Running {
                self.timer.stop();
                break;
            }
        }
        self.engine.drain_events()
    }

    /// Changing mid-run is allowed; placed obstacles keep their gap
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.engine.set_difficulty(difficulty);
    }

    pub fn difficulty(&self) -> Difficulty {
        self.engine.difficulty()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    pub fn phase(&self) -> RunPhase {
        self.engine.phase()
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        if self.autopilot != enabled {
            log::info!("Autopilot: {}", enabled);
        }
        self.autopilot = enabled;
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn timer(&self) -> &TickTimer {
        &self.timer
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Component teardown: stop ticking and drop the run
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.timer.stop();
        self.engine.reset();
        self.mounted = false;
        log::debug!("Session unmounted");
    }

    /// Re-attach after `unmount`; the game waits in Idle
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        log::debug!("Session mounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn run_until_over(session: &mut Session) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            events.extend(session.frame(TICK_INTERVAL_MS));
            if session.phase() == RunPhase::Over {
                break;
            }
        }
        events
    }

    #[test]
    fn test_idle_session_does_not_tick() {
        let mut session = Session::new(1, Difficulty::Normal);
        let before = session.snapshot();
        session.frame(500.0);
        assert_eq!(session.snapshot(), before);
        assert!(!session.timer().is_armed());
    }

    #[test]
    fn test_rapid_impulses_start_one_timer() {
        let mut session = Session::new(1, Difficulty::Normal);
        session.impulse();
        session.impulse();
        session.impulse();
        assert!(session.timer().is_armed());
        assert_eq!(session.timer().starts(), 1);
    }

    #[test]
    fn test_over_stops_timer_once() {
        let mut session = Session::new(1, Difficulty::Normal);
        session.impulse();
        let events = run_until_over(&mut session);
        assert_eq!(session.phase(), RunPhase::Over);
        assert!(!session.timer().is_armed());
        assert_eq!(session.timer().stops(), 1);
        assert!(matches!(events.last(), Some(SimEvent::Crashed { .. })));

        // No ticks after the crash, even with plenty of elapsed time
        let frozen = session.snapshot();
        session.frame(1000.0);
        session.frame(1000.0);
        assert_eq!(session.snapshot(), frozen);
        assert_eq!(session.timer().stops(), 1);
    }

    #[test]
    fn test_one_timer_per_run() {
        let mut session = Session::new(9, Difficulty::Hard);
        for run in 1..=3 {
            session.impulse();
            session.impulse();
            assert_eq!(session.timer().starts(), run);
            run_until_over(&mut session);
            assert_eq!(session.timer().stops(), run);
        }
    }

    #[test]
    fn test_crash_mid_frame_stops_remaining_ticks() {
        let mut session = Session::new(3, Difficulty::Normal);
        session.impulse();
        // Huge frames deliver capped batches; the batch that crashes stops early
        loop {
            session.frame(10_000.0);
            if session.phase() == RunPhase::Over {
                break;
            }
        }
        let ticks = session.snapshot().time_ticks;
        session.frame(10_000.0);
        assert_eq!(session.snapshot().time_ticks, ticks);
    }

    #[test]
    fn test_unmount_stops_and_resets() {
        let mut session = Session::new(1, Difficulty::Easy);
        session.impulse();
        session.frame(100.0);
        session.unmount();
        assert!(!session.timer().is_armed());
        assert_eq!(session.phase(), RunPhase::Idle);

        // Input while unmounted is ignored
        session.impulse();
        assert_eq!(session.phase(), RunPhase::Idle);
        assert!(session.frame(100.0).is_empty());

        session.mount();
        session.impulse();
        assert_eq!(session.phase(), RunPhase::Running);
        assert_eq!(session.timer().starts(), 2);
        assert_eq!(session.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn test_autopilot_starts_and_plays() {
        let mut session = Session::new(77, Difficulty::Easy);
        session.set_autopilot(true);
        let events = session.frame(TICK_INTERVAL_MS);
        assert_eq!(session.phase(), RunPhase::Running);
        assert!(matches!(events.first(), Some(SimEvent::Started { .. })));
        for _ in 0..100 {
            session.frame(TICK_INTERVAL_MS);
        }
        assert!(session.snapshot().time_ticks > 0);
    }

    #[test]
    fn test_difficulty_selected_before_run() {
        let mut session = Session::new(1, Difficulty::Normal);
        session.set_difficulty(Difficulty::Hard);
        session.impulse();
        assert_eq!(session.snapshot().agent_vel_y, -7.5);
        assert_eq!(session.snapshot().difficulty, Difficulty::Hard);
    }
}
