//! Horde Survivor - a top-down wave survival shooter core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, steering, combat, progression)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Session leaderboard for finished runs

pub mod highscores;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use tuning::{CameraMode, ConfigError, SpawnPattern, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Ticks per simulated second
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Viewport dimensions (also the playfield in fixed-camera mode)
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 15.0;
    pub const PLAYER_SPEED: f32 = 300.0;
    pub const PLAYER_MAX_HP: u32 = 100;
    pub const FIRST_LEVEL_EXP: u32 = 10;

    /// Damage taken from touching an enemy
    pub const CONTACT_DAMAGE: u32 = 10;
    /// Invulnerability after a hit (1 second)
    pub const DAMAGE_COOLDOWN_TICKS: u32 = 60;

    /// Inventory capacity
    pub const MAX_INVENTORY: usize = 6;
    /// Upgrade choices offered per level-up
    pub const UPGRADE_CHOICES: usize = 3;

    /// Cosmetic cap (oldest dropped first)
    pub const MAX_COSMETICS: usize = 256;
    /// Damage text lifetime
    pub const DAMAGE_TEXT_TICKS: u32 = 40;
    /// Explosion lifetime
    pub const EXPLOSION_TICKS: u32 = 24;

    pub const PICKUP_RADIUS: f32 = 6.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Angle of the vector from `from` to `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Straight up in screen space (y grows downward)
pub const UP_ANGLE: f32 = -std::f32::consts::FRAC_PI_2;

/// Fixed-timestep accumulator for hosts driving the simulation from a
/// variable-rate frame callback.
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed elapsed frame time, returns how many `SIM_DT` ticks to run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        use consts::{MAX_SUBSTEPS, SIM_DT};

        self.accumulator += frame_dt.clamp(0.0, 0.25);
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        // Drop the backlog once the substep cap is hit
        if steps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
        steps
    }
}
