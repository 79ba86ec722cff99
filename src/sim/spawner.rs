//! Enemy spawn scheduling
//!
//! Fixed-interval cadence on a tick countdown. The interval shrinks with
//! elapsed time and score, and groups grow over time, so difficulty ramps
//! without ever spawning inside the visible frame.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{ARCHETYPES, Camera, EnemyKind};
use super::store::NewEnemy;
use crate::polar_to_cartesian;
use crate::tuning::{SpawnPattern, Tuning};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    /// Ticks until the next group
    pub countdown_ticks: u32,
}

impl Spawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            countdown_ticks: tuning.spawn_interval_ticks,
        }
    }

    /// Ticks between groups at the given difficulty
    pub fn current_interval(elapsed_secs: f32, score: u64, tuning: &Tuning) -> u32 {
        let shaved =
            elapsed_secs * tuning.spawn_time_ramp + score as f32 * tuning.spawn_score_ramp;
        let interval = tuning.spawn_interval_ticks as f32 - shaved;
        (interval.max(tuning.spawn_interval_min_ticks as f32)) as u32
    }

    /// Enemies per group at the given elapsed time
    pub fn group_size(elapsed_secs: f32, tuning: &Tuning) -> u32 {
        let extra = if tuning.spawn_group_growth_secs > 0.0 {
            (elapsed_secs / tuning.spawn_group_growth_secs) as u32
        } else {
            0
        };
        (1 + extra).min(tuning.spawn_group_max)
    }

    /// Advance one tick; returns the enemies to create this tick
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        elapsed_secs: f32,
        score: u64,
        live_enemies: usize,
        camera: &Camera,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Vec<NewEnemy> {
        self.countdown_ticks = self.countdown_ticks.saturating_sub(1);
        if self.countdown_ticks > 0 {
            return Vec::new();
        }
        self.countdown_ticks = Self::current_interval(elapsed_secs, score, tuning);

        let room = tuning.max_enemies.saturating_sub(live_enemies);
        let count = (Self::group_size(elapsed_secs, tuning) as usize).min(room);
        // Late arrivals get tougher: +1 hp per minute survived
        let hp_bonus = (elapsed_secs / 60.0) as u32;

        (0..count)
            .map(|_| {
                let arch = pick_archetype(rng).archetype();
                NewEnemy {
                    kind: arch.kind,
                    pos: spawn_position(tuning.spawn_pattern, camera, tuning.spawn_margin, rng),
                    radius: arch.radius,
                    speed: arch.speed * rng.random_range(0.9..1.1),
                    hp: arch.hp + hp_bonus,
                }
            })
            .collect()
    }
}

/// Weighted pick from the archetype table
pub fn pick_archetype<R: Rng + ?Sized>(rng: &mut R) -> EnemyKind {
    let total: u32 = ARCHETYPES.iter().map(|a| a.weight).sum();
    let mut roll = rng.random_range(0..total);
    for arch in &ARCHETYPES {
        if roll < arch.weight {
            return arch.kind;
        }
        roll -= arch.weight;
    }
    ARCHETYPES[0].kind
}

/// World position just outside the camera's view
pub fn spawn_position<R: Rng + ?Sized>(
    pattern: SpawnPattern,
    camera: &Camera,
    margin: f32,
    rng: &mut R,
) -> Vec2 {
    let view = camera.view_rect();
    match pattern {
        SpawnPattern::Ring => {
            // Half-diagonal clears every corner of the viewport
            let radius = camera.viewport.length() * 0.5 + margin;
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            camera.center() + polar_to_cartesian(radius, angle)
        }
        SpawnPattern::Edges => {
            let (min, max) = (view.min, view.max());
            match rng.random_range(0..4u8) {
                0 => Vec2::new(rng.random_range(min.x..=max.x), min.y - margin),
                1 => Vec2::new(rng.random_range(min.x..=max.x), max.y + margin),
                2 => Vec2::new(min.x - margin, rng.random_range(min.y..=max.y)),
                _ => Vec2::new(max.x + margin, rng.random_range(min.y..=max.y)),
            }
        }
    }
}
