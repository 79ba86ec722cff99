//! Entity storage
//!
//! Each entity kind lives in its own [`Collection`], kept sorted by id for
//! deterministic iteration. Removal only marks an entity; marked entities are
//! invisible to live iteration and are dropped by [`EntityStore::compact`]
//! at the end of the tick, so systems never skip or double-visit while
//! something dies mid-loop.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{
    Bullet, Cosmetic, CosmeticKind, Enemy, EnemyKind, EnemyPhase, EntityId, Pickup, PickupKind,
};
use super::weapon::WeaponKind;
use crate::consts::*;

/// Common surface of everything held in a [`Collection`]
pub trait Entity {
    fn id(&self) -> EntityId;
    fn is_removed(&self) -> bool;
    fn mark_removed(&mut self);
}

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Entity for $ty {
                #[inline]
                fn id(&self) -> EntityId {
                    self.id
                }

                #[inline]
                fn is_removed(&self) -> bool {
                    self.removed
                }

                #[inline]
                fn mark_removed(&mut self) {
                    self.removed = true;
                }
            }
        )*
    };
}

impl_entity!(Enemy, Bullet, Pickup, Cosmetic);

/// Mark-and-compact list of one entity kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Collection<T> {
    /// Append; ids come from a monotonic counter so order stays sorted
    fn insert(&mut self, item: T) {
        debug_assert!(self.items.last().is_none_or(|last| last.id() < item.id()));
        self.items.push(item);
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.items.binary_search_by_key(&id, |e| e.id()).ok()
    }

    /// Live entity by id
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.index_of(id)
            .map(|i| &self.items[i])
            .filter(|e| !e.is_removed())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        match self.index_of(id) {
            Some(i) if !self.items[i].is_removed() => Some(&mut self.items[i]),
            _ => None,
        }
    }

    /// Mark for removal at the next compaction. Returns false if unknown or
    /// already removed.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(e) => {
                e.mark_removed();
                true
            }
            None => false,
        }
    }

    pub fn live(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|e| !e.is_removed())
    }

    pub fn live_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut().filter(|e| !e.is_removed())
    }

    /// Visit every live entity. Entities marked during the walk are skipped
    /// from then on; nothing shifts underneath the iteration.
    pub fn for_each_live(&mut self, mut f: impl FnMut(&mut T)) {
        for item in self.items.iter_mut() {
            if !item.is_removed() {
                f(item);
            }
        }
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    /// Drop marked entities, returns how many were dropped
    pub fn compact(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|e| !e.is_removed());
        before - self.items.len()
    }
}

impl<T> Collection<T> {
    /// All slots including ones marked this tick
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Index-addressable access for passes that read neighbors while writing
    pub(crate) fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Spawn request for an enemy
#[derive(Debug, Clone, PartialEq)]
pub struct NewEnemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub hp: u32,
}

/// Spawn request for a bullet
#[derive(Debug, Clone, PartialEq)]
pub struct NewBullet {
    pub weapon: WeaponKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub attack: u32,
    pub penetrate: u32,
}

/// Deferred creation of any entity kind
#[derive(Debug, Clone, PartialEq)]
pub enum Spawn {
    Enemy(NewEnemy),
    Bullet(NewBullet),
    Pickup { kind: PickupKind, pos: Vec2, value: u32 },
    Cosmetic { kind: CosmeticKind, pos: Vec2 },
}

impl Spawn {
    pub fn damage_text(pos: Vec2, amount: u32) -> Self {
        Spawn::Cosmetic {
            kind: CosmeticKind::DamageText { amount },
            pos,
        }
    }

    pub fn explosion(pos: Vec2) -> Self {
        Spawn::Cosmetic {
            kind: CosmeticKind::Explosion,
            pos,
        }
    }
}

/// Owns every non-player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    pub enemies: Collection<Enemy>,
    pub bullets: Collection<Bullet>,
    pub pickups: Collection<Pickup>,
    pub cosmetics: Collection<Cosmetic>,
    next_id: EntityId,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self {
            enemies: Collection::default(),
            bullets: Collection::default(),
            pickups: Collection::default(),
            cosmetics: Collection::default(),
            next_id: 1,
        }
    }
}

impl EntityStore {
    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create any entity kind, returns its id
    pub fn spawn(&mut self, spawn: Spawn) -> EntityId {
        match spawn {
            Spawn::Enemy(e) => self.spawn_enemy(e),
            Spawn::Bullet(b) => self.spawn_bullet(b),
            Spawn::Pickup { kind, pos, value } => self.spawn_pickup(kind, pos, value),
            Spawn::Cosmetic { kind, pos } => self.spawn_cosmetic(kind, pos),
        }
    }

    pub fn spawn_enemy(&mut self, new: NewEnemy) -> EntityId {
        let id = self.next_entity_id();
        self.enemies.insert(Enemy {
            id,
            kind: new.kind,
            pos: new.pos,
            vel: Vec2::ZERO,
            radius: new.radius,
            base_speed: new.speed,
            hp: new.hp,
            max_hp: new.hp,
            phase: EnemyPhase::Alive,
            alpha: 1.0,
            removed: false,
        });
        id
    }

    pub fn spawn_bullet(&mut self, new: NewBullet) -> EntityId {
        let id = self.next_entity_id();
        self.bullets.insert(Bullet {
            id,
            weapon: new.weapon,
            pos: new.pos,
            vel: new.vel,
            radius: new.radius,
            attack: new.attack,
            penetrate: new.penetrate,
            hit: Vec::new(),
            removed: false,
        });
        id
    }

    pub fn spawn_pickup(&mut self, kind: PickupKind, pos: Vec2, value: u32) -> EntityId {
        let id = self.next_entity_id();
        self.pickups.insert(Pickup {
            id,
            kind,
            pos,
            radius: PICKUP_RADIUS,
            value,
            removed: false,
        });
        id
    }

    /// Cosmetics are capped; the oldest live one makes room
    pub fn spawn_cosmetic(&mut self, kind: CosmeticKind, pos: Vec2) -> EntityId {
        if self.cosmetics.live_count() >= MAX_COSMETICS {
            if let Some(oldest) = self.cosmetics.live_mut().next() {
                oldest.mark_removed();
            }
        }

        let (vel, life) = match kind {
            // Damage numbers float upward
            CosmeticKind::DamageText { .. } => (Vec2::new(0.0, -30.0), DAMAGE_TEXT_TICKS),
            CosmeticKind::Explosion => (Vec2::ZERO, EXPLOSION_TICKS),
        };
        let id = self.next_entity_id();
        self.cosmetics.insert(Cosmetic {
            id,
            kind,
            pos,
            vel,
            life_ticks: life,
            max_life_ticks: life,
            removed: false,
        });
        id
    }

    /// Mark any entity by id. Ids are unique across kinds.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.enemies.remove(id)
            || self.bullets.remove(id)
            || self.pickups.remove(id)
            || self.cosmetics.remove(id)
    }

    /// End-of-tick sweep of everything marked
    pub fn compact(&mut self) -> usize {
        self.enemies.compact()
            + self.bullets.compact()
            + self.pickups.compact()
            + self.cosmetics.compact()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grunt_at(x: f32, y: f32) -> NewEnemy {
        NewEnemy {
            kind: EnemyKind::Grunt,
            pos: Vec2::new(x, y),
            radius: 15.0,
            speed: 120.0,
            hp: 3,
        }
    }

    #[test]
    fn test_ids_are_unique_across_kinds() {
        let mut store = EntityStore::default();
        let a = store.spawn_enemy(grunt_at(0.0, 0.0));
        let b = store.spawn_pickup(PickupKind::Gold, Vec2::ZERO, 1);
        let c = store.spawn(Spawn::explosion(Vec2::ZERO));
        assert!(a < b && b < c);
        assert!(store.remove(b));
        assert!(store.enemies.get(a).is_some());
        assert!(store.pickups.get(b).is_none());
    }

    #[test]
    fn test_removal_during_walk_visits_each_once() {
        let mut store = EntityStore::default();
        let ids: Vec<_> = (0..5)
            .map(|i| store.spawn_enemy(grunt_at(i as f32, 0.0)))
            .collect();

        let mut visited = Vec::new();
        store.enemies.for_each_live(|e| {
            visited.push(e.id);
            if e.id % 2 == 0 {
                e.mark_removed();
            }
        });
        assert_eq!(visited, ids);
        assert_eq!(store.enemies.live_count(), 3);
        assert_eq!(store.compact(), 2);
        assert!(store.enemies.live().all(|e| e.id % 2 == 1));
    }

    #[test]
    fn test_marked_entities_are_skipped_until_compaction() {
        let mut store = EntityStore::default();
        let a = store.spawn_enemy(grunt_at(0.0, 0.0));
        let b = store.spawn_enemy(grunt_at(1.0, 0.0));
        store.remove(a);
        assert!(!store.remove(a));
        assert_eq!(store.enemies.live().map(|e| e.id).collect::<Vec<_>>(), vec![b]);
        assert_eq!(store.enemies.len(), 2);
        store.compact();
        assert_eq!(store.enemies.len(), 1);
    }

    #[test]
    fn test_cosmetics_are_capped() {
        let mut store = EntityStore::default();
        let first = store.spawn(Spawn::damage_text(Vec2::ZERO, 1));
        for _ in 0..MAX_COSMETICS {
            store.spawn(Spawn::damage_text(Vec2::ZERO, 1));
        }
        assert_eq!(store.cosmetics.live_count(), MAX_COSMETICS);
        assert!(store.cosmetics.get(first).is_none());
    }
}
