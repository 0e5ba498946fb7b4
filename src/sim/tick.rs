//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation one step at a time.

use rand::Rng;

use super::collision::{agent_hitbox, crossed_agent, hits_obstacle};
use super::difficulty::DifficultyProfile;
use super::state::{CrashCause, Obstacle, RunPhase, SimEvent, SimState};
use crate::consts::*;

/// Apply the single player input (tap/click/key)
pub fn apply_impulse(state: &mut SimState) {
    let profile = state.difficulty.profile();
    match state.phase {
        RunPhase::Idle | RunPhase::Over => {
            state.reset_run();
            state.agent.vel_y = profile.impulse;
            state.phase = RunPhase::Running;
            state.push_event(SimEvent::Started {
                difficulty: state.difficulty,
            });
            log::debug!("Run started ({})", state.difficulty.as_str());
        }
        RunPhase::Running => {
            state.agent.vel_y = profile.impulse;
            state.push_event(SimEvent::Impulse);
        }
    }
}

/// Advance the simulation by one tick. Does nothing unless running.
pub fn tick<R: Rng>(state: &mut SimState, rng: &mut R) {
    if state.phase != RunPhase::Running {
        return;
    }

    let profile = state.difficulty.profile();
    state.time_ticks += 1;

    if let Some(cause) = step_physics(state, &profile) {
        state.crash(cause);
        return;
    }

    advance_obstacles(&mut state.obstacles, profile.speed);
    maybe_spawn(state, &profile, rng);
    resolve_collisions(state, profile.speed);
}

/// Gravity and integration. Returns the crash cause if the agent left the field.
///
/// The out-of-bounds position is kept as the final reported state.
pub(crate) fn step_physics(state: &mut SimState, profile: &DifficultyProfile) -> Option<CrashCause> {
    state.agent.vel_y += profile.gravity;
    state.agent.y += state.agent.vel_y;
    state.agent.out_of_bounds()
}

/// Move obstacles left and drop the ones fully off screen
pub(crate) fn advance_obstacles(obstacles: &mut Vec<Obstacle>, speed: f32) {
    for obstacle in obstacles.iter_mut() {
        obstacle.x -= speed;
    }
    obstacles.retain(|o| !o.off_screen());
}

/// Append a new obstacle at the right edge once the newest one has moved far enough
pub(crate) fn maybe_spawn<R: Rng>(state: &mut SimState, profile: &DifficultyProfile, rng: &mut R) {
    let due = state
        .obstacles
        .last()
        .map(|last| last.x < profile.spawn_threshold)
        .unwrap_or(true);
    if !due {
        return;
    }

    let (lo, hi) = profile.gap_top_range();
    let gap_top = rng.random_range(lo..=hi);
    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        x: FIELD_WIDTH,
        gap_top,
        gap: profile.gap,
        scored: false,
    });
}

/// Hit test every obstacle against the agent, and count newly passed ones
pub(crate) fn resolve_collisions(state: &mut SimState, speed: f32) {
    let hitbox = agent_hitbox(&state.agent);
    let mut crashed_into = None;
    let mut passed = 0;

    // Left to right; obstacles after the first hit are neither hit tested nor
    // scored. Spawn spacing keeps them right of the agent, so none could score.
    for obstacle in state.obstacles.iter_mut() {
        if hits_obstacle(&hitbox, obstacle) {
            crashed_into = Some(obstacle.id);
            break;
        }
        if !obstacle.scored && crossed_agent(obstacle.x + speed, obstacle.x) {
            obstacle.scored = true;
            passed += 1;
        }
    }

    for _ in 0..passed {
        state.score += 1;
        state.push_event(SimEvent::Scored { score: state.score });
    }

    if let Some(id) = crashed_into {
        state.crash(CrashCause::Obstacle { id });
    }
}
