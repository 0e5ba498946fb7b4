//! Sky Hop - a flappy-style obstacle-avoidance mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collisions, scoring)
//! - `platform`: Fixed-interval tick timer and the session that drives the engine
//! - `renderer`: WebGPU rendering pipeline
//! - `settings`: Persisted player preferences
//! - `highscores`: Best scores per difficulty

pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use platform::{Session, TickTimer};
pub use settings::Settings;
pub use sim::{Difficulty, Engine, RunPhase, Snapshot};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation tick interval in milliseconds
    pub const TICK_INTERVAL_MS: f64 = 20.0;
    /// Maximum ticks delivered per frame to prevent spiral of death
    pub const MAX_CATCH_UP_TICKS: u32 = 8;

    /// Play field dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 600.0;
    pub const FIELD_HEIGHT: f32 = 500.0;

    /// Agent geometry - fixed column, only moves vertically
    pub const AGENT_X: f32 = 80.0;
    pub const AGENT_SIZE: f32 = 32.0;
    /// Hitbox is smaller than the sprite so grazes don't count
    pub const AGENT_HITBOX: f32 = 22.0;
    pub const AGENT_START_Y: f32 = 200.0;
    /// Height used for the floor check; the sprite may dip slightly into the floor
    pub const AGENT_BOUNDS_SIZE: f32 = 30.0;

    /// Obstacle geometry
    pub const OBSTACLE_WIDTH: f32 = 60.0;
    /// Keep the gap away from the field edges
    pub const GAP_MARGIN_TOP: f32 = 50.0;
    pub const GAP_MARGIN_BOTTOM: f32 = 50.0;

    /// Agent tilt (degrees) = velocity * factor, clamped
    pub const TILT_PER_VELOCITY: f32 = 3.0;
    pub const TILT_MIN_DEG: f32 = -30.0;
    pub const TILT_MAX_DEG: f32 = 40.0;
}
