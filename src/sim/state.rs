//! Simulation state and core entity types
//!
//! Everything the tick mutates lives in `SimState`; the engine owns exactly one.

use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use crate::consts::*;

/// Undrained events kept per engine; the oldest are dropped past this
pub const MAX_PENDING_EVENTS: usize = 64;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunPhase {
    /// Nothing started yet, waiting for the first impulse
    #[default]
    Idle,
    /// Active gameplay, ticks are processed
    Running,
    /// Run ended, frozen until the next impulse
    Over,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrashCause {
    Ceiling,
    Floor,
    Obstacle { id: u32 },
}

/// Things that happened during a tick or impulse, drained by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A new run started
    Started { difficulty: Difficulty },
    /// Impulse applied mid-run
    Impulse,
    /// An obstacle was passed
    Scored { score: u32 },
    /// Run ended
    Crashed { score: u32, cause: CrashCause },
}

/// The controlled entity; horizontal position is fixed at `AGENT_X`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub y: f32,
    /// Pixels per tick, positive is down
    pub vel_y: f32,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            y: AGENT_START_Y,
            vel_y: 0.0,
        }
    }
}

impl Agent {
    /// Sprite rotation for the renderer (degrees, nose down is positive)
    pub fn tilt_degrees(&self) -> f32 {
        (self.vel_y * TILT_PER_VELOCITY).clamp(TILT_MIN_DEG, TILT_MAX_DEG)
    }

    /// True if the agent has left the legal vertical range
    pub fn out_of_bounds(&self) -> Option<CrashCause> {
        if self.y < 0.0 {
            Some(CrashCause::Ceiling)
        } else if self.y > FIELD_HEIGHT - AGENT_BOUNDS_SIZE {
            Some(CrashCause::Floor)
        } else {
            None
        }
    }
}

/// A pair of barriers with a passable vertical gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Unique render key, never reused
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Where the passable gap begins
    pub gap_top: f32,
    /// Gap size captured at spawn so difficulty changes don't move placed obstacles
    pub gap: f32,
    /// Already counted toward the score
    #[serde(default)]
    pub scored: bool,
}

impl Obstacle {
    pub fn right(&self) -> f32 {
        self.x + OBSTACLE_WIDTH
    }

    pub fn gap_bottom(&self) -> f32 {
        self.gap_top + self.gap
    }

    /// Fully past the left edge of the field
    pub fn off_screen(&self) -> bool {
        self.right() < 0.0
    }
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    /// Seed the engine RNG was created with
    pub seed: u64,
    pub phase: RunPhase,
    pub difficulty: Difficulty,
    pub score: u32,
    /// Ticks processed in the current run
    pub time_ticks: u64,
    pub agent: Agent,
    /// Spawn order, which is also left-to-right order
    pub obstacles: Vec<Obstacle>,
    /// Pending events for the front end
    #[serde(skip)]
    pub events: Vec<SimEvent>,
    /// Next entity ID
    next_id: u32,
}

impl SimState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            phase: RunPhase::Idle,
            difficulty: Difficulty::default(),
            score: 0,
            time_ticks: 0,
            agent: Agent::default(),
            obstacles: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Reset run data for a fresh start. Entity IDs keep counting.
    pub fn reset_run(&mut self) {
        self.score = 0;
        self.time_ticks = 0;
        self.agent = Agent::default();
        self.obstacles.clear();
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    /// Queue an event for the front end, dropping the oldest when full
    pub(crate) fn push_event(&mut self, event: SimEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    pub(crate) fn crash(&mut self, cause: CrashCause) {
        self.phase = RunPhase::Over;
        self.push_event(SimEvent::Crashed {
            score: self.score,
            cause,
        });
        log::debug!(
            "Run over after {} ticks: score {} ({:?})",
            self.time_ticks,
            self.score,
            cause
        );
    }
}
