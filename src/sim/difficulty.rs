//! Difficulty levels and their tuning constants

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Selectable difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Physics and pacing constants for one difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Downward acceleration (px/tick²)
    pub gravity: f32,
    /// Velocity set on impulse (negative is up)
    pub impulse: f32,
    /// Vertical gap between obstacle segments
    pub gap: f32,
    /// Obstacle horizontal speed (px/tick)
    pub speed: f32,
    /// Spawn the next obstacle once the newest one is left of this x
    pub spawn_threshold: f32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "med" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                gravity: 0.25,
                impulse: -5.8,
                gap: 210.0,
                speed: 2.2,
                spawn_threshold: 360.0,
            },
            Difficulty::Normal => DifficultyProfile {
                gravity: 0.35,
                impulse: -6.8,
                gap: 180.0,
                speed: 3.5,
                spawn_threshold: 300.0,
            },
            Difficulty::Hard => DifficultyProfile {
                gravity: 0.45,
                impulse: -7.5,
                gap: 155.0,
                speed: 5.2,
                spawn_threshold: 240.0,
            },
        }
    }
}

impl DifficultyProfile {
    /// Inclusive range a spawned obstacle's gap top is drawn from
    pub fn gap_top_range(&self) -> (f32, f32) {
        (GAP_MARGIN_TOP, FIELD_HEIGHT - self.gap - GAP_MARGIN_BOTTOM)
    }
}
