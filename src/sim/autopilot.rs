//! Idle/demo mode controller
//!
//! Decides from a snapshot whether to flap this tick. Aims to keep the agent
//! just above the bottom of the next gap, which leaves a full flap of
//! headroom before the top.

use super::difficulty::DifficultyProfile;
use super::engine::Snapshot;
use super::state::RunPhase;
use crate::consts::*;

/// Clearance kept between the sprite bottom and the gap bottom
const FLOOR_CLEARANCE: f32 = 8.0;

/// Don't re-flap until the previous one has mostly worn off
const REFLAP_FRACTION: f32 = 0.5;

/// Lowest y the agent should sink to before flapping
pub fn target_floor(snapshot: &Snapshot) -> f32 {
    let hitbox_left = AGENT_X + (AGENT_SIZE - AGENT_HITBOX) / 2.0;
    snapshot
        .obstacles
        .iter()
        .find(|o| o.x + OBSTACLE_WIDTH >= hitbox_left)
        .map(|o| o.gap_top + o.gap - AGENT_SIZE - FLOOR_CLEARANCE)
        .unwrap_or(FIELD_HEIGHT / 2.0)
}

/// Whether the autopilot wants an impulse before the next tick
pub fn should_impulse(snapshot: &Snapshot, profile: &DifficultyProfile) -> bool {
    match snapshot.phase {
        // Idle and Over: start a new run
        RunPhase::Idle | RunPhase::Over => true,
        RunPhase::Running => {
            let predicted = snapshot.agent_y + snapshot.agent_vel_y + profile.gravity;
            predicted > target_floor(snapshot)
                && snapshot.agent_vel_y > profile.impulse * REFLAP_FRACTION
        }
    }
}
