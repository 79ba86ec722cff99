//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod combat;
pub mod geometry;
pub mod progression;
pub mod spawner;
pub mod state;
pub mod steering;
pub mod store;
pub mod tick;
pub mod weapon;

pub use geometry::{Aabb, Circle, Shape, intersects, within};
pub use progression::{
    UpgradeHistory, UpgradeOption, apply_option, gain_experience, generate_upgrade_options,
    select_upgrade,
};
pub use spawner::Spawner;
pub use state::{
    Bullet, Camera, Cosmetic, CosmeticKind, Enemy, EnemyKind, EnemyPhase, EntityId, GameEvent,
    GamePhase, GameState, Pickup, PickupKind, Player, RenderView, UpgradeMenu,
};
pub use store::{Collection, Entity, EntityStore, NewBullet, NewEnemy, Spawn};
pub use tick::{TickInput, autopilot, tick};
pub use weapon::{Inventory, InventoryError, MAX_WEAPON_LEVEL, WeaponKind, WeaponSlot, fire};
