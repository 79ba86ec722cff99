//! Game state and core simulation types
//!
//! Everything the simulation mutates lives in [`GameState`]; systems receive
//! it by `&mut` and renderers read it through [`RenderView`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, Circle};
use super::progression::{UpgradeHistory, UpgradeOption};
use super::spawner::Spawner;
use super::store::EntityStore;
use super::weapon::{Inventory, WeaponKind};
use crate::consts::*;
use crate::tuning::Tuning;

/// Unique across every entity collection for the lifetime of a run
pub type EntityId = u32;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Upgrade menu is open, simulation frozen until a choice is made
    LevelUp,
    /// Game is paused
    Paused,
    /// Player died, waiting for restart
    GameOver,
}

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    Runner,
    Brute,
}

/// Fixed stats for an enemy archetype
#[derive(Debug, Clone, Copy)]
pub struct Archetype {
    pub kind: EnemyKind,
    pub radius: f32,
    /// Base pursuit speed (px/s)
    pub speed: f32,
    pub hp: u32,
    /// Relative spawn weight
    pub weight: u32,
    pub exp: u32,
    pub gold: u32,
}

/// Spawn table
pub const ARCHETYPES: [Archetype; 3] = [
    Archetype { kind: EnemyKind::Grunt, radius: 15.0, speed: 120.0, hp: 3, weight: 5, exp: 1, gold: 1 },
    Archetype { kind: EnemyKind::Runner, radius: 10.0, speed: 180.0, hp: 2, weight: 3, exp: 1, gold: 1 },
    Archetype { kind: EnemyKind::Brute, radius: 20.0, speed: 90.0, hp: 5, weight: 2, exp: 3, gold: 2 },
];

impl EnemyKind {
    pub fn archetype(self) -> &'static Archetype {
        match self {
            EnemyKind::Grunt => &ARCHETYPES[0],
            EnemyKind::Runner => &ARCHETYPES[1],
            EnemyKind::Brute => &ARCHETYPES[2],
        }
    }
}

/// Enemy lifecycle: Alive -> Vanishing -> removed once alpha hits zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyPhase {
    Alive,
    /// Death fade in progress, no longer collides
    Vanishing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Velocity committed last tick (for rendering facing)
    pub vel: Vec2,
    pub radius: f32,
    pub base_speed: f32,
    pub hp: u32,
    pub max_hp: u32,
    pub phase: EnemyPhase,
    /// Fade alpha, 1.0 while alive
    pub alpha: f32,
    #[serde(skip)]
    pub(crate) removed: bool,
}

impl Enemy {
    /// Alive and not already marked for removal
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.phase == EnemyPhase::Alive && !self.removed
    }

    #[inline]
    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    /// Pursuit speed ramps with score up to the tuning cap
    pub fn current_speed(&self, score: u64, tuning: &Tuning) -> f32 {
        (self.base_speed + score as f32 * tuning.enemy_speed_ramp).min(tuning.enemy_max_speed)
    }

    pub fn start_vanishing(&mut self) {
        if self.phase == EnemyPhase::Alive {
            self.phase = EnemyPhase::Vanishing;
            self.alpha = 1.0;
            self.vel = Vec2::ZERO;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    pub weapon: WeaponKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub attack: u32,
    /// Extra enemies this bullet may pass through (0 = stops at first hit)
    pub penetrate: u32,
    /// Enemies already damaged, so a piercing bullet hits each only once
    pub hit: Vec<EntityId>,
    #[serde(skip)]
    pub(crate) removed: bool,
}

impl Bullet {
    #[inline]
    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Experience,
    Gold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: EntityId,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub radius: f32,
    pub value: u32,
    #[serde(skip)]
    pub(crate) removed: bool,
}

/// Purely visual effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CosmeticKind {
    DamageText { amount: u32 },
    Explosion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cosmetic {
    pub id: EntityId,
    pub kind: CosmeticKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub life_ticks: u32,
    pub max_life_ticks: u32,
    #[serde(skip)]
    pub(crate) removed: bool,
}

impl Cosmetic {
    /// Remaining life as 0-1 opacity
    pub fn alpha(&self) -> f32 {
        if self.max_life_ticks == 0 {
            0.0
        } else {
            self.life_ticks as f32 / self.max_life_ticks as f32
        }
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Movement speed (px/s)
    pub speed: f32,
    pub hp: u32,
    pub max_hp: u32,
    pub level: u32,
    pub exp: u32,
    pub exp_to_next_level: u32,
    pub gold: u32,
    pub kills: u32,
    pub inventory: Inventory,
    /// Ticks of invulnerability left after taking contact damage
    pub damage_cooldown_ticks: u32,
    pub upgrade_history: UpgradeHistory,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.view_width / 2.0, tuning.view_height / 2.0),
            vel: Vec2::ZERO,
            radius: tuning.player_radius,
            speed: tuning.player_speed,
            hp: tuning.player_max_hp,
            max_hp: tuning.player_max_hp,
            level: 1,
            exp: 0,
            exp_to_next_level: tuning.first_level_exp,
            gold: 0,
            kills: 0,
            inventory: Inventory::starting(WeaponKind::Gun),
            damage_cooldown_ticks: 0,
            upgrade_history: UpgradeHistory::default(),
        }
    }

    #[inline]
    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }
}

/// World-to-screen translation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Camera {
    /// World position of the viewport's top-left corner
    pub offset: Vec2,
    pub viewport: Vec2,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport,
        }
    }

    /// Visible region in world coordinates
    pub fn view_rect(&self) -> Aabb {
        Aabb::new(self.offset, self.viewport)
    }

    pub fn center(&self) -> Vec2 {
        self.offset + self.viewport * 0.5
    }

    /// Center the viewport on `target`
    pub fn follow(&mut self, target: Vec2) {
        self.offset = target - self.viewport * 0.5;
    }

    #[inline]
    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        p - self.offset
    }

    #[inline]
    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        p + self.offset
    }
}

/// Things that happened during the last tick, for HUD/audio hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned { id: EntityId, kind: EnemyKind },
    EnemyKilled { id: EntityId, kind: EnemyKind, pos: Vec2 },
    PlayerDamaged { amount: u32, hp: u32 },
    PickupCollected { kind: PickupKind, value: u32 },
    LevelUp { level: u32 },
    ScoreThreshold { score: u64 },
    UpgradeApplied { option: UpgradeOption },
    GameOver { score: u64, level: u32 },
}

/// The three choices currently offered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeMenu {
    pub options: [UpgradeOption; UPGRADE_CHOICES],
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Serialized with the state so a saved run resumes identically
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Playing ticks elapsed (frozen while paused or in a menu)
    pub time_ticks: u64,
    /// Enemies killed this run
    pub score: u64,
    pub player: Player,
    pub camera: Camera,
    pub store: EntityStore,
    pub spawner: Spawner,
    /// Upgrade choices earned but not yet taken
    pub pending_choices: u32,
    pub upgrade_menu: Option<UpgradeMenu>,
    /// How many entries of `tuning.score_thresholds` have fired
    pub thresholds_fired: usize,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        if let Err(err) = tuning.validate() {
            log::warn!("Starting run with out-of-range tuning: {}", err);
        }
        let viewport = Vec2::new(tuning.view_width, tuning.view_height);
        let player = Player::new(&tuning);
        let mut camera = Camera::new(viewport);
        if tuning.camera_mode == crate::CameraMode::Follow {
            camera.follow(player.pos);
        }

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            spawner: Spawner::new(&tuning),
            tuning,
            phase: GamePhase::Playing,
            time_ticks: 0,
            score: 0,
            player,
            camera,
            store: EntityStore::default(),
            pending_choices: 0,
            upgrade_menu: None,
            thresholds_fired: 0,
            events: Vec::new(),
        }
    }

    /// Full reset after game over; keeps tuning, advances the seed
    pub fn restart(&mut self) {
        let seed = self.seed.wrapping_add(1);
        log::info!("Restarting run with seed {}", seed);
        *self = GameState::new(seed, self.tuning.clone());
    }

    /// Simulated seconds of play
    pub fn elapsed_secs(&self) -> f32 {
        self.time_ticks as f32 / TICKS_PER_SECOND as f32
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Options shown by the menu collaborator while in `LevelUp`
    pub fn upgrade_menu(&self) -> Option<&UpgradeMenu> {
        self.upgrade_menu.as_ref()
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Read-only snapshot for the render collaborator
    pub fn view(&self) -> RenderView<'_> {
        RenderView {
            phase: self.phase,
            score: self.score,
            player: &self.player,
            enemies: self.store.enemies.as_slice(),
            bullets: self.store.bullets.as_slice(),
            pickups: self.store.pickups.as_slice(),
            cosmetics: self.store.cosmetics.as_slice(),
            camera: &self.camera,
        }
    }
}

/// Borrowed frame data handed to a renderer
#[derive(Debug, Clone, Copy)]
pub struct RenderView<'a> {
    pub phase: GamePhase,
    pub score: u64,
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub bullets: &'a [Bullet],
    pub pickups: &'a [Pickup],
    pub cosmetics: &'a [Cosmetic],
    pub camera: &'a Camera,
}

impl RenderView<'_> {
    /// Player position in screen space
    pub fn player_screen_pos(&self) -> Vec2 {
        self.camera.world_to_screen(self.player.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(7, Tuning::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.level, 1);
        assert_eq!(state.player.hp, state.player.max_hp);
        assert_eq!(state.player.inventory.len(), 1);
        assert!(state.store.enemies.is_empty());
    }

    #[test]
    fn test_follow_camera_centers_player() {
        let state = GameState::new(7, Tuning::default());
        let screen = state.view().player_screen_pos();
        assert!((screen - state.camera.viewport * 0.5).length() < 0.001);
    }

    #[test]
    fn test_enemy_speed_is_capped() {
        let tuning = Tuning::default();
        let enemy = Enemy {
            id: 1,
            kind: EnemyKind::Runner,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: 10.0,
            base_speed: 180.0,
            hp: 2,
            max_hp: 2,
            phase: EnemyPhase::Alive,
            alpha: 1.0,
            removed: false,
        };
        assert_eq!(enemy.current_speed(0, &tuning), 180.0);
        assert_eq!(enemy.current_speed(40, &tuning), 200.0);
        assert_eq!(enemy.current_speed(10_000, &tuning), tuning.enemy_max_speed);
    }

    #[test]
    fn test_restart_resets_and_advances_seed() {
        let mut state = GameState::new(7, Tuning::default());
        state.score = 42;
        state.phase = GamePhase::GameOver;
        state.restart();
        assert_eq!(state.seed, 8);
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
    }
}
