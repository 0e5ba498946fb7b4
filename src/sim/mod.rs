//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Obstacles kept in spawn order
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod difficulty;
pub mod engine;
pub mod state;
pub mod tick;

pub use collision::{Rect, agent_hitbox, crossed_agent, hits_obstacle};
pub use difficulty::{Difficulty, DifficultyProfile};
pub use engine::{Engine, ObstacleView, Snapshot};
pub use state::{Agent, CrashCause, Obstacle, RunPhase, SimEvent, SimState};
pub use tick::{apply_impulse, tick};
