//! Weapons, the inventory, and firing
//!
//! A weapon is a [`WeaponKind`] plus a level. Firing is a pure function of
//! both; the per-slot timers (fire interval, vulcan burst) live on
//! [`WeaponSlot`] and only advance when the simulation ticks.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::GameState;
use super::store::NewBullet;
use crate::consts::MAX_INVENTORY;
use crate::{UP_ANGLE, angle_between, polar_to_cartesian};

/// Weapons stop upgrading here
pub const MAX_WEAPON_LEVEL: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Gun,
    Vulcan,
    Shotgun,
    Rifle,
    SniperGun,
    Bomb,
    Laser,
}

/// Timed firing window followed by a forced recharge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub duration_ticks: u32,
    pub recharge_ticks: u32,
}

/// Per-kind firing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub base_attack: u32,
    pub attack_per_level: u32,
    /// Bullet speed (px/s)
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    pub penetrate: u32,
    /// Ticks between shots
    pub interval_ticks: u32,
    /// Bullets per shot
    pub pellets: u32,
    /// Total fan angle across all pellets (radians)
    pub spread: f32,
    pub burst: Option<Burst>,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 7] = [
        WeaponKind::Gun,
        WeaponKind::Vulcan,
        WeaponKind::Shotgun,
        WeaponKind::Rifle,
        WeaponKind::SniperGun,
        WeaponKind::Bomb,
        WeaponKind::Laser,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WeaponKind::Gun => "gun",
            WeaponKind::Vulcan => "vulcan",
            WeaponKind::Shotgun => "shotgun",
            WeaponKind::Rifle => "rifle",
            WeaponKind::SniperGun => "sniper gun",
            WeaponKind::Bomb => "bomb",
            WeaponKind::Laser => "laser",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn stats(self) -> WeaponStats {
        let single = WeaponStats {
            base_attack: 1,
            attack_per_level: 1,
            bullet_speed: 420.0,
            bullet_radius: 5.0,
            penetrate: 0,
            interval_ticks: 30,
            pellets: 1,
            spread: 0.0,
            burst: None,
        };
        match self {
            WeaponKind::Gun => single,
            WeaponKind::Vulcan => WeaponStats {
                bullet_speed: 540.0,
                bullet_radius: 4.0,
                interval_ticks: 6,
                pellets: 6,
                spread: 0.5,
                burst: Some(Burst {
                    duration_ticks: 180,
                    recharge_ticks: 600,
                }),
                ..single
            },
            WeaponKind::Shotgun => WeaponStats {
                base_attack: 2,
                bullet_speed: 360.0,
                bullet_radius: 4.0,
                interval_ticks: 45,
                pellets: 5,
                spread: 0.6,
                ..single
            },
            WeaponKind::Rifle => WeaponStats {
                base_attack: 3,
                attack_per_level: 2,
                bullet_speed: 700.0,
                bullet_radius: 3.0,
                penetrate: 1,
                interval_ticks: 40,
                ..single
            },
            WeaponKind::SniperGun => WeaponStats {
                base_attack: 8,
                attack_per_level: 4,
                bullet_speed: 1000.0,
                bullet_radius: 3.0,
                penetrate: 3,
                interval_ticks: 90,
                ..single
            },
            WeaponKind::Bomb => WeaponStats {
                base_attack: 6,
                attack_per_level: 3,
                bullet_speed: 240.0,
                bullet_radius: 12.0,
                interval_ticks: 120,
                ..single
            },
            WeaponKind::Laser => WeaponStats {
                bullet_speed: 900.0,
                bullet_radius: 2.0,
                penetrate: 8,
                interval_ticks: 20,
                ..single
            },
        }
    }

    /// Damage per bullet at `level`
    pub fn attack(self, level: u32) -> u32 {
        let stats = self.stats();
        stats.base_attack + stats.attack_per_level * level.saturating_sub(1)
    }
}

impl fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bullets produced by one shot of `kind` at `level`, fanned around `angle`
pub fn fire(kind: WeaponKind, level: u32, origin: Vec2, angle: f32) -> Vec<NewBullet> {
    let stats = kind.stats();
    let attack = kind.attack(level);
    let n = stats.pellets.max(1);

    (0..n)
        .map(|i| {
            let offset = if n == 1 {
                0.0
            } else {
                -stats.spread / 2.0 + stats.spread * i as f32 / (n - 1) as f32
            };
            NewBullet {
                weapon: kind,
                pos: origin,
                vel: polar_to_cartesian(stats.bullet_speed, angle + offset),
                radius: stats.bullet_radius,
                attack,
                penetrate: stats.penetrate,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("inventory is full")]
    Full,
    #[error("{0} is already in the inventory")]
    AlreadyOwned(WeaponKind),
    #[error("{0} is not in the inventory")]
    NotOwned(WeaponKind),
    #[error("{0} is already at max level")]
    MaxLevel(WeaponKind),
}

/// An owned weapon and its fire timers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSlot {
    pub kind: WeaponKind,
    pub level: u32,
    /// Ticks until the next shot is allowed
    pub cooldown_ticks: u32,
    /// Ticks left in an active burst
    pub burst_ticks: u32,
    /// Ticks until a new burst may start
    pub recharge_ticks: u32,
}

impl WeaponSlot {
    pub fn new(kind: WeaponKind) -> Self {
        Self {
            kind,
            level: 1,
            cooldown_ticks: 0,
            burst_ticks: 0,
            recharge_ticks: 0,
        }
    }

    pub fn attack(&self) -> u32 {
        self.kind.attack(self.level)
    }

    /// Advance timers by one tick; returns true if the weapon shoots now.
    /// A started burst keeps firing after the trigger is released.
    pub fn update(&mut self, trigger: bool) -> bool {
        let stats = self.kind.stats();
        self.cooldown_ticks = self.cooldown_ticks.saturating_sub(1);

        if let Some(burst) = stats.burst {
            if self.recharge_ticks > 0 {
                self.recharge_ticks -= 1;
                return false;
            }
            if self.burst_ticks == 0 {
                if !trigger {
                    return false;
                }
                self.burst_ticks = burst.duration_ticks;
            }
            self.burst_ticks -= 1;
            if self.burst_ticks == 0 {
                self.recharge_ticks = burst.recharge_ticks;
            }
        } else if !trigger {
            return false;
        }

        if self.cooldown_ticks == 0 {
            self.cooldown_ticks = stats.interval_ticks;
            true
        } else {
            false
        }
    }
}

/// Ordered weapon slots, unique by kind, at most [`MAX_INVENTORY`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<WeaponSlot>,
}

impl Inventory {
    pub fn starting(kind: WeaponKind) -> Self {
        Self {
            slots: vec![WeaponSlot::new(kind)],
        }
    }

    pub fn add(&mut self, kind: WeaponKind) -> Result<(), InventoryError> {
        if self.contains(kind) {
            return Err(InventoryError::AlreadyOwned(kind));
        }
        if self.is_full() {
            return Err(InventoryError::Full);
        }
        self.slots.push(WeaponSlot::new(kind));
        Ok(())
    }

    /// Raise a weapon's level, returns the new level
    pub fn upgrade(&mut self, kind: WeaponKind) -> Result<u32, InventoryError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.kind == kind)
            .ok_or(InventoryError::NotOwned(kind))?;
        if slot.level >= MAX_WEAPON_LEVEL {
            return Err(InventoryError::MaxLevel(kind));
        }
        slot.level += 1;
        Ok(slot.level)
    }

    pub fn contains(&self, kind: WeaponKind) -> bool {
        self.slots.iter().any(|s| s.kind == kind)
    }

    pub fn get(&self, kind: WeaponKind) -> Option<&WeaponSlot> {
        self.slots.iter().find(|s| s.kind == kind)
    }

    pub fn slots(&self) -> &[WeaponSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [WeaponSlot] {
        &mut self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= MAX_INVENTORY
    }
}

/// Tick every owned weapon and spawn whatever fires this tick.
/// With no explicit aim, shots go at the nearest live enemy, else straight up.
pub fn fire_weapons(state: &mut GameState, trigger: bool, aim: Option<f32>) {
    let origin = state.player.pos;
    let angle = aim.unwrap_or_else(|| {
        state
            .store
            .enemies
            .live()
            .filter(|e| e.is_alive())
            .min_by(|a, b| {
                a.pos
                    .distance_squared(origin)
                    .partial_cmp(&b.pos.distance_squared(origin))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|e| angle_between(origin, e.pos))
            .unwrap_or(UP_ANGLE)
    });

    let mut shots = Vec::new();
    for slot in state.player.inventory.slots_mut() {
        if slot.update(trigger) {
            shots.extend(fire(slot.kind, slot.level, origin, angle));
        }
    }
    for bullet in shots {
        state.store.spawn_bullet(bullet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_scales_with_level() {
        assert_eq!(WeaponKind::Gun.attack(1), 1);
        assert_eq!(WeaponKind::Gun.attack(3), 3);
        assert_eq!(WeaponKind::Rifle.attack(2), 5);
    }

    #[test]
    fn test_fire_shotgun_fans_symmetrically() {
        let bullets = fire(WeaponKind::Shotgun, 1, Vec2::ZERO, UP_ANGLE);
        assert_eq!(bullets.len(), 5);
        // Middle pellet goes straight up
        let mid = bullets[2].vel.normalize();
        assert!((mid - Vec2::new(0.0, -1.0)).length() < 0.001);
        // Outer pellets mirror each other
        assert!((bullets[0].vel.x + bullets[4].vel.x).abs() < 0.001);
    }

    #[test]
    fn test_fire_uses_kind_stats() {
        let bullets = fire(WeaponKind::SniperGun, 2, Vec2::new(5.0, 5.0), 0.0);
        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0].penetrate, 3);
        assert_eq!(bullets[0].attack, 12);
        assert_eq!(bullets[0].pos, Vec2::new(5.0, 5.0));
        assert!((bullets[0].vel.x - 1000.0).abs() < 0.01);
    }

    #[test]
    fn test_gun_respects_interval() {
        let mut slot = WeaponSlot::new(WeaponKind::Gun);
        let interval = WeaponKind::Gun.stats().interval_ticks;
        assert!(slot.update(true));
        let shots = (0..interval).filter(|_| slot.update(true)).count();
        assert_eq!(shots, 1);
    }

    #[test]
    fn test_idle_trigger_does_not_fire() {
        let mut slot = WeaponSlot::new(WeaponKind::Gun);
        assert!(!slot.update(false));
    }

    #[test]
    fn test_vulcan_burst_then_recharge() {
        let mut slot = WeaponSlot::new(WeaponKind::Vulcan);
        let burst = WeaponKind::Vulcan.stats().burst.expect("vulcan bursts");
        // One trigger pull starts the whole burst
        assert!(slot.update(true));
        let burst_shots = (1..burst.duration_ticks)
            .filter(|_| slot.update(false))
            .count();
        assert!(burst_shots > 0);
        assert_eq!(slot.burst_ticks, 0);
        assert_eq!(slot.recharge_ticks, burst.recharge_ticks);
        // Recharging ignores the trigger
        assert!(!slot.update(true));
    }

    #[test]
    fn test_inventory_rejects_duplicates_and_overflow() {
        let mut inv = Inventory::starting(WeaponKind::Gun);
        assert_eq!(
            inv.add(WeaponKind::Gun),
            Err(InventoryError::AlreadyOwned(WeaponKind::Gun))
        );
        for kind in &WeaponKind::ALL[1..MAX_INVENTORY] {
            assert!(inv.add(*kind).is_ok());
        }
        assert!(inv.is_full());
        assert_eq!(inv.add(WeaponKind::Laser), Err(InventoryError::Full));
        assert_eq!(inv.len(), MAX_INVENTORY);
    }

    #[test]
    fn test_upgrade_caps_at_max_level() {
        let mut inv = Inventory::starting(WeaponKind::Gun);
        for expected in 2..=MAX_WEAPON_LEVEL {
            assert_eq!(inv.upgrade(WeaponKind::Gun), Ok(expected));
        }
        assert_eq!(
            inv.upgrade(WeaponKind::Gun),
            Err(InventoryError::MaxLevel(WeaponKind::Gun))
        );
        assert_eq!(
            inv.upgrade(WeaponKind::Bomb),
            Err(InventoryError::NotOwned(WeaponKind::Bomb))
        );
    }

    #[test]
    fn test_weapon_names_round_trip() {
        assert_eq!(WeaponKind::from_name("Sniper Gun"), Some(WeaponKind::SniperGun));
        assert_eq!(WeaponKind::from_name("armor"), None);
    }
}
