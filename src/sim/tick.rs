//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::combat;
use super::progression::{self, select_upgrade};
use super::state::{GameEvent, GamePhase, GameState};
use super::steering::{move_bullets, move_player, steer_enemies, update_camera, update_cosmetics};
use super::weapon::fire_weapons;

/// Autopilot flees enemies closer than this
const IDLE_DANGER_RADIUS: f32 = 160.0;
/// Autopilot ignores heading components smaller than this
const IDLE_DEAD_ZONE: f32 = 4.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement directions
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Held auto-fire
    pub fire: bool,
    /// Explicit aim angle; nearest enemy when absent
    pub aim: Option<f32>,
    /// Upgrade menu selection
    pub choice: Option<usize>,
    /// Pause toggle
    pub pause: bool,
    /// Start a new run after game over
    pub restart: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

impl TickInput {
    /// Held directions as a (not yet normalized) vector, y down
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| pos as i8 as f32 - neg as i8 as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    if input.restart && state.phase == GamePhase::GameOver {
        state.restart();
        return;
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    let input = if input.idle_mode {
        autopilot(state)
    } else {
        input.clone()
    };

    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        GamePhase::LevelUp => {
            // Modal: only the menu choice is read
            if let Some(choice) = input.choice {
                select_upgrade(state, choice);
            }
            return;
        }
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;

    // Spawn
    let elapsed = state.elapsed_secs();
    let batch = state.spawner.tick(
        elapsed,
        state.score,
        state.store.enemies.live_count(),
        &state.camera,
        &state.tuning,
        &mut state.rng,
    );
    for new in batch {
        let kind = new.kind;
        let id = state.store.spawn_enemy(new);
        log::debug!("Spawned {:?} {} at tick {}", kind, id, state.time_ticks);
        state.emit(GameEvent::EnemySpawned { id, kind });
    }

    // Move
    move_player(&mut state.player, input.direction(), dt, &state.tuning);
    update_camera(&mut state.camera, &state.player, &state.tuning);
    fire_weapons(state, input.fire, input.aim);
    steer_enemies(
        &mut state.store.enemies,
        state.player.pos,
        state.score,
        dt,
        &state.tuning,
    );
    move_bullets(&mut state.store.bullets, &state.camera, dt, &state.tuning);
    update_cosmetics(&mut state.store.cosmetics, dt);

    // Collide
    combat::resolve(state);

    if state.phase != GamePhase::GameOver {
        progression::update(state);
    }

    state.store.compact();
}

/// Input the demo autopilot would give this tick: flee the nearest close
/// enemy, otherwise drift toward the nearest pickup, always fire, and take
/// the first upgrade offered.
pub fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput {
        fire: true,
        idle_mode: true,
        ..Default::default()
    };
    if state.phase == GamePhase::LevelUp {
        input.choice = Some(0);
        return input;
    }

    let pos = state.player.pos;
    let threat = nearest_to(
        pos,
        state.store.enemies.live().filter(|e| e.is_alive()).map(|e| e.pos),
    );
    let heading = match threat {
        Some(enemy) if enemy.distance(pos) < IDLE_DANGER_RADIUS => pos - enemy,
        _ => nearest_to(pos, state.store.pickups.live().map(|p| p.pos))
            .map(|pickup| pickup - pos)
            .unwrap_or(Vec2::ZERO),
    };

    input.left = heading.x < -IDLE_DEAD_ZONE;
    input.right = heading.x > IDLE_DEAD_ZONE;
    input.up = heading.y < -IDLE_DEAD_ZONE;
    input.down = heading.y > IDLE_DEAD_ZONE;
    input
}

fn nearest_to(origin: Vec2, points: impl Iterator<Item = Vec2>) -> Option<Vec2> {
    points.min_by(|a, b| {
        a.distance_squared(origin)
            .partial_cmp(&b.distance_squared(origin))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}
