//! The simulation engine: the only owner and mutator of `SimState`
//!
//! Front ends talk to the engine through four calls: `apply_impulse`,
//! `set_difficulty`, `tick` and `snapshot`. The snapshot is an owned copy so
//! renderers never hold references into live state.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::{Difficulty, DifficultyProfile};
use super::state::{RunPhase, SimEvent, SimState};
use super::tick;

/// Obstacle as seen by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: u32,
    pub x: f32,
    pub gap_top: f32,
    pub gap: f32,
}

/// Immutable view of the simulation for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: RunPhase,
    pub difficulty: Difficulty,
    pub score: u32,
    pub time_ticks: u64,
    pub agent_y: f32,
    pub agent_vel_y: f32,
    /// Sprite rotation in degrees
    pub agent_tilt: f32,
    /// Left to right
    pub obstacles: Vec<ObstacleView>,
}

/// Deterministic obstacle-avoidance simulation
#[derive(Debug, Clone)]
pub struct Engine {
    state: SimState,
    rng: Pcg32,
}

impl Engine {
    /// Create an idle engine whose obstacle layout is fully determined by `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: SimState::new(seed),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Start a run (from Idle/Over) or flap (while Running)
    pub fn apply_impulse(&mut self) {
        tick::apply_impulse(&mut self.state);
    }

    /// Select the profile for future ticks and spawns.
    ///
    /// Obstacles already on screen keep the gap they spawned with.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        if self.state.difficulty != difficulty {
            log::info!(
                "Difficulty {} -> {} ({:?})",
                self.state.difficulty.as_str(),
                difficulty.as_str(),
                self.state.phase
            );
        }
        self.state.difficulty = difficulty;
    }

    /// Advance one fixed step. No-op unless Running.
    pub fn tick(&mut self) {
        tick::tick(&mut self.state, &mut self.rng);
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        Snapshot {
            phase: state.phase,
            difficulty: state.difficulty,
            score: state.score,
            time_ticks: state.time_ticks,
            agent_y: state.agent.y,
            agent_vel_y: state.agent.vel_y,
            agent_tilt: state.agent.tilt_degrees(),
            obstacles: state
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    x: o.x,
                    gap_top: o.gap_top,
                    gap: o.gap,
                })
                .collect(),
        }
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.state.events)
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.state.difficulty
    }

    pub fn profile(&self) -> DifficultyProfile {
        self.state.difficulty.profile()
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn seed(&self) -> u64 {
        self.state.seed
    }

    /// Drop the current run and go back to Idle, keeping difficulty and RNG stream
    pub fn reset(&mut self) {
        self.state.reset_run();
        self.state.phase = RunPhase::Idle;
        self.state.events.clear();
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut SimState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::{CrashCause, MAX_PENDING_EVENTS, Obstacle};
    use proptest::prelude::*;

    /// Keep the agent parked in the first obstacle's gap so a run survives
    fn hold_in_gap(engine: &mut Engine) {
        let state = engine.state_mut();
        let target = state
            .obstacles
            .iter()
            .find(|o| o.right() >= AGENT_X)
            .map(|o| o.gap_top + o.gap / 2.0 - AGENT_SIZE / 2.0)
            .unwrap_or(AGENT_START_Y);
        state.agent.y = target;
        state.agent.vel_y = -state.difficulty.profile().gravity;
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut engine = Engine::with_seed(3);
        let before = engine.snapshot();
        for _ in 0..10 {
            engine.tick();
        }
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_over_tick_is_noop() {
        let mut engine = Engine::with_seed(3);
        engine.apply_impulse();
        while engine.phase() == RunPhase::Running {
            engine.tick();
        }
        assert_eq!(engine.phase(), RunPhase::Over);
        let before = engine.snapshot();
        for _ in 0..10 {
            engine.tick();
        }
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_scenario_normal_first_tick() {
        let mut engine = Engine::with_seed(11);
        engine.set_difficulty(Difficulty::Normal);
        engine.apply_impulse();
        engine.tick();
        let snap = engine.snapshot();
        assert!((snap.agent_vel_y - -6.45).abs() < 1e-4);
        assert!((snap.agent_y - 193.55).abs() < 1e-4);
    }

    #[test]
    fn test_scenario_floor_at_471() {
        let mut engine = Engine::with_seed(11);
        engine.apply_impulse();
        {
            let state = engine.state_mut();
            state.agent.y = 471.0;
            state.agent.vel_y = 0.0;
        }
        engine.tick();
        assert_eq!(engine.phase(), RunPhase::Over);
    }

    #[test]
    fn test_difficulty_change_applies_on_next_run() {
        let mut engine = Engine::with_seed(5);
        engine.set_difficulty(Difficulty::Hard);
        engine.apply_impulse();
        assert_eq!(engine.snapshot().agent_vel_y, -7.5);

        engine.tick();
        let snap = engine.snapshot();
        assert!((snap.agent_vel_y - (-7.5 + 0.45)).abs() < 1e-4);
        assert_eq!(snap.obstacles.len(), 1);
        assert_eq!(snap.obstacles[0].gap, 155.0);

        engine.tick();
        let snap = engine.snapshot();
        assert!((snap.obstacles[0].x - (FIELD_WIDTH - 5.2)).abs() < 1e-3);
    }

    #[test]
    fn test_mid_run_difficulty_keeps_placed_gaps() {
        let mut engine = Engine::with_seed(5);
        engine.apply_impulse();
        engine.tick();
        assert_eq!(engine.snapshot().obstacles[0].gap, 180.0);

        engine.set_difficulty(Difficulty::Easy);
        engine.tick();
        let snap = engine.snapshot();
        assert_eq!(snap.obstacles[0].gap, 180.0);
        // Speed switched immediately
        assert!((snap.obstacles[0].x - (FIELD_WIDTH - 2.2)).abs() < 1e-3);
    }

    #[test]
    fn test_restart_resets_position() {
        let mut engine = Engine::with_seed(8);
        engine.apply_impulse();
        while engine.phase() == RunPhase::Running {
            engine.tick();
        }
        engine.apply_impulse();
        let snap = engine.snapshot();
        assert_eq!(snap.phase, RunPhase::Running);
        assert_eq!(snap.agent_y, AGENT_START_Y);
        assert_eq!(snap.score, 0);
        assert!(snap.obstacles.is_empty());
    }

    #[test]
    fn test_unattended_run_falls_to_floor() {
        let mut engine = Engine::with_seed(8);
        engine.apply_impulse();
        engine.drain_events();
        let mut ticks = 0;
        while engine.phase() == RunPhase::Running && ticks < 1000 {
            engine.tick();
            ticks += 1;
        }
        let events = engine.drain_events();
        // Either the floor or the first obstacle stops it; it never scores
        assert_eq!(engine.score(), 0);
        assert!(matches!(
            events.last(),
            Some(SimEvent::Crashed {
                cause: CrashCause::Floor | CrashCause::Obstacle { .. },
                score: 0
            })
        ));
    }

    #[test]
    fn test_held_run_scores_and_prunes() {
        let mut engine = Engine::with_seed(21);
        engine.apply_impulse();
        let mut seen_ids = Vec::new();
        let mut last_score = 0;
        for _ in 0..2000 {
            hold_in_gap(&mut engine);
            engine.tick();
            assert_eq!(engine.phase(), RunPhase::Running);
            let snap = engine.snapshot();
            assert!(snap.score >= last_score && snap.score <= last_score + 1);
            last_score = snap.score;

            for ob in &snap.obstacles {
                assert!(ob.x + OBSTACLE_WIDTH >= 0.0);
                if !seen_ids.contains(&ob.id) {
                    seen_ids.push(ob.id);
                }
            }
            // Spawn order is left-to-right order
            assert!(snap.obstacles.windows(2).all(|w| w[0].x < w[1].x));
        }
        // Every obstacle fully passed scored exactly once
        let on_screen_unpassed = engine
            .snapshot()
            .obstacles
            .iter()
            .filter(|o| o.x >= AGENT_X)
            .count() as u32;
        assert_eq!(last_score, seen_ids.len() as u32 - on_screen_unpassed);
    }

    #[test]
    fn test_pruned_obstacles_never_return() {
        let mut engine = Engine::with_seed(4);
        engine.apply_impulse();
        let mut gone: Vec<u32> = Vec::new();
        let mut prev: Vec<u32> = Vec::new();
        for _ in 0..1500 {
            hold_in_gap(&mut engine);
            engine.tick();
            let ids: Vec<u32> = engine.snapshot().obstacles.iter().map(|o| o.id).collect();
            for id in &prev {
                if !ids.contains(id) {
                    gone.push(*id);
                }
            }
            assert!(ids.iter().all(|id| !gone.contains(id)));
            prev = ids;
        }
        assert!(!gone.is_empty());
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut a = Engine::with_seed(99);
        let mut b = Engine::with_seed(99);
        a.apply_impulse();
        b.apply_impulse();
        for _ in 0..300 {
            hold_in_gap(&mut a);
            hold_in_gap(&mut b);
            a.tick();
            b.tick();
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut engine = Engine::with_seed(1);
        engine.apply_impulse();
        engine.tick();
        let snap = engine.snapshot();
        engine.tick();
        assert_ne!(snap.time_ticks, engine.snapshot().time_ticks);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut engine = Engine::with_seed(1);
        engine.apply_impulse();
        engine.tick();
        let json = serde_json::to_string(&engine.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Running\""));
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, engine.snapshot());
    }

    #[test]
    fn test_undrained_events_stay_bounded() {
        let mut engine = Engine::with_seed(1);
        for _ in 0..100_000 {
            engine.apply_impulse();
        }
        assert!(engine.state_mut().events.len() <= MAX_PENDING_EVENTS);

        engine.state_mut().agent.y = FIELD_HEIGHT;
        engine.tick();
        assert_eq!(engine.phase(), RunPhase::Over);
        engine.apply_impulse();

        let events = engine.drain_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        assert!(matches!(
            events[events.len() - 2],
            SimEvent::Crashed {
                cause: CrashCause::Floor,
                ..
            }
        ));
        assert!(matches!(events.last(), Some(SimEvent::Started { .. })));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut engine = Engine::with_seed(1);
        engine.set_difficulty(Difficulty::Easy);
        engine.apply_impulse();
        engine.tick();
        engine.reset();
        assert_eq!(engine.phase(), RunPhase::Idle);
        assert_eq!(engine.difficulty(), Difficulty::Easy);
        assert!(engine.snapshot().obstacles.is_empty());
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_fast_obstacle_still_scores() {
        let mut engine = Engine::with_seed(1);
        engine.set_difficulty(Difficulty::Hard);
        engine.apply_impulse();
        {
            let state = engine.state_mut();
            state.obstacles.push(Obstacle {
                id: 500,
                x: AGENT_X + 0.1,
                gap_top: 150.0,
                gap: 155.0,
                scored: false,
            });
            state.agent.y = 200.0;
            state.agent.vel_y = -0.45;
        }
        engine.tick();
        assert_eq!(engine.score(), 1);
    }

    proptest! {
        #[test]
        fn prop_impulse_schedule_never_double_counts(
            seed in any::<u64>(),
            flaps in proptest::collection::vec(any::<bool>(), 1..400),
        ) {
            let mut engine = Engine::with_seed(seed);
            engine.apply_impulse();
            let mut prev_score = 0;
            let mut scored_events = 0;
            for flap in flaps {
                if engine.phase() != RunPhase::Running {
                    break;
                }
                if flap {
                    let y = engine.snapshot().agent_y;
                    engine.apply_impulse();
                    prop_assert_eq!(engine.snapshot().agent_y, y);
                }
                engine.tick();
                let score = engine.score();
                prop_assert!(score >= prev_score && score <= prev_score + 1);
                prev_score = score;
                scored_events += engine
                    .drain_events()
                    .iter()
                    .filter(|e| matches!(e, SimEvent::Scored { .. }))
                    .count() as u32;
            }
            prop_assert_eq!(scored_events, engine.score());
        }

        #[test]
        fn prop_ticks_after_over_change_nothing(seed in any::<u64>(), extra in 1usize..50) {
            let mut engine = Engine::with_seed(seed);
            engine.apply_impulse();
            while engine.phase() == RunPhase::Running {
                engine.tick();
            }
            let frozen = engine.snapshot();
            for _ in 0..extra {
                engine.tick();
            }
            prop_assert_eq!(engine.snapshot(), frozen);
        }
    }
}
