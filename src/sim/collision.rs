//! Hitbox overlap and pass detection
//!
//! The agent's hitbox is a square inset from its sprite. Obstacles are a
//! full-height column with a hole; a hit is any overlap with the column
//! outside the hole.

use glam::Vec2;

use super::state::{Agent, Obstacle};
use crate::consts::*;

/// Axis-aligned rectangle, y grows downward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Strict overlap on the x axis (touching edges don't count)
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        self.max.x > left && self.min.x < right
    }
}

/// Inset between the sprite edge and the hitbox edge
#[inline]
pub fn hitbox_inset() -> f32 {
    (AGENT_SIZE - AGENT_HITBOX) / 2.0
}

/// The agent's collision rectangle
pub fn agent_hitbox(agent: &Agent) -> Rect {
    let inset = hitbox_inset();
    Rect::new(
        Vec2::new(AGENT_X + inset, agent.y + inset),
        Vec2::new(AGENT_X + AGENT_SIZE - inset, agent.y + AGENT_SIZE - inset),
    )
}

/// Whether the hitbox touches the solid part of an obstacle
pub fn hits_obstacle(hitbox: &Rect, obstacle: &Obstacle) -> bool {
    hitbox.overlaps_x(obstacle.x, obstacle.right())
        && (hitbox.min.y < obstacle.gap_top || hitbox.max.y > obstacle.gap_bottom())
}

/// Whether an obstacle's left edge moved past the agent column during this tick
///
/// Swept over the whole step, so no crossing is missed at high speed.
#[inline]
pub fn crossed_agent(prev_x: f32, x: f32) -> bool {
    prev_x >= AGENT_X && x < AGENT_X
}
