//! Movement for every moving thing in the arena
//!
//! Enemies seek the player and push away from overlapping neighbors.
//! Separation is sequential: enemies move in id order and each one sees the
//! positions its lower-id neighbors already committed this tick.

use glam::Vec2;

use super::geometry::{Aabb, circles_overlap};
use super::state::{Bullet, Camera, Cosmetic, Enemy, EntityId, Player};
use super::store::{Collection, Entity};
use crate::polar_to_cartesian;
use crate::tuning::{CameraMode, Tuning};

/// Below this squared distance two centers count as coincident
const COINCIDENT_EPSILON_SQ: f32 = 1e-6;
const GOLDEN_ANGLE: f32 = 2.399_963;

/// Move the player along the held direction. Diagonals are normalized.
pub fn move_player(player: &mut Player, direction: Vec2, dt: f32, tuning: &Tuning) {
    player.vel = direction.normalize_or_zero() * player.speed;
    player.pos += player.vel * dt;

    if tuning.camera_mode == CameraMode::Fixed {
        let field = Aabb::new(Vec2::ZERO, Vec2::new(tuning.view_width, tuning.view_height));
        player.pos = field.expanded(-player.radius).clamp_point(player.pos);
    }
}

pub fn update_camera(camera: &mut Camera, player: &Player, tuning: &Tuning) {
    if tuning.camera_mode == CameraMode::Follow {
        camera.follow(player.pos);
    }
}

/// Unit vector from enemy `me` toward neighbor `other` when their centers
/// coincide. Derived from the pair's ids so the pair always splits along
/// opposite directions.
pub fn fallback_axis(me: EntityId, other: EntityId) -> Vec2 {
    let axis = polar_to_cartesian(1.0, me.min(other) as f32 * GOLDEN_ANGLE);
    if me < other { axis } else { -axis }
}

/// Seek `target` and separate from overlapping live neighbors
pub fn steer_enemies(
    enemies: &mut Collection<Enemy>,
    target: Vec2,
    score: u64,
    dt: f32,
    tuning: &Tuning,
) {
    let items = enemies.items_mut();
    for i in 0..items.len() {
        if !items[i].is_alive() {
            continue;
        }
        let me = items[i].circle();
        let id = items[i].id;
        let speed = items[i].current_speed(score, tuning);

        let mut vel = (target - me.center).normalize_or_zero() * speed;
        for (j, other) in items.iter().enumerate() {
            if j == i || !other.is_alive() || !circles_overlap(&me, &other.circle()) {
                continue;
            }
            let offset = other.pos - me.center;
            let toward = if offset.length_squared() < COINCIDENT_EPSILON_SQ {
                fallback_axis(id, other.id)
            } else {
                offset.normalize()
            };
            vel -= toward * speed;
        }

        let enemy = &mut items[i];
        enemy.vel = vel;
        enemy.pos += vel * dt;
    }
}

/// Advance bullets and cull the ones that left the camera envelope
pub fn move_bullets(bullets: &mut Collection<Bullet>, camera: &Camera, dt: f32, tuning: &Tuning) {
    let envelope = camera.view_rect().expanded(tuning.bullet_cull_margin);
    bullets.for_each_live(|b| {
        b.pos += b.vel * dt;
        if !envelope.contains_point(b.pos) {
            b.mark_removed();
        }
    });
}

pub fn update_cosmetics(cosmetics: &mut Collection<Cosmetic>, dt: f32) {
    cosmetics.for_each_live(|c| {
        c.pos += c.vel * dt;
        c.life_ticks = c.life_ticks.saturating_sub(1);
        if c.life_ticks == 0 {
            c.mark_removed();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::state::{CosmeticKind, EnemyKind};
    use crate::sim::store::{EntityStore, NewBullet, NewEnemy, Spawn};
    use crate::sim::weapon::WeaponKind;

    fn grunt_at(pos: Vec2) -> NewEnemy {
        NewEnemy {
            kind: EnemyKind::Grunt,
            pos,
            radius: 15.0,
            speed: 120.0,
            hp: 3,
        }
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        let start = player.pos;
        move_player(&mut player, Vec2::new(1.0, 1.0), 1.0, &tuning);
        assert!(((player.pos - start).length() - tuning.player_speed).abs() < 0.01);
    }

    #[test]
    fn test_fixed_mode_clamps_player() {
        let tuning = Tuning {
            camera_mode: CameraMode::Fixed,
            ..Tuning::default()
        };
        let mut player = Player::new(&tuning);
        move_player(&mut player, Vec2::new(-1.0, 0.0), 10.0, &tuning);
        assert_eq!(player.pos.x, player.radius);
    }

    #[test]
    fn test_follow_mode_is_unbounded() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        let mut camera = Camera::new(Vec2::new(tuning.view_width, tuning.view_height));
        move_player(&mut player, Vec2::new(-1.0, 0.0), 10.0, &tuning);
        update_camera(&mut camera, &player, &tuning);
        assert!(player.pos.x < 0.0);
        assert!((camera.center() - player.pos).length() < 0.001);
    }

    #[test]
    fn test_enemy_seeks_target() {
        let tuning = Tuning::default();
        let mut store = EntityStore::default();
        let id = store.spawn_enemy(grunt_at(Vec2::new(100.0, 0.0)));
        steer_enemies(&mut store.enemies, Vec2::ZERO, 0, SIM_DT, &tuning);
        let enemy = store.enemies.get(id).expect("live");
        assert!((enemy.pos.x - (100.0 - 120.0 * SIM_DT)).abs() < 0.001);
        assert_eq!(enemy.pos.y, 0.0);
    }

    #[test]
    fn test_stacked_enemies_split_apart() {
        let tuning = Tuning::default();
        let mut store = EntityStore::default();
        let a = store.spawn_enemy(grunt_at(Vec2::new(100.0, 100.0)));
        let b = store.spawn_enemy(grunt_at(Vec2::new(100.0, 100.0)));
        steer_enemies(&mut store.enemies, Vec2::new(400.0, 300.0), 0, SIM_DT, &tuning);
        let pa = store.enemies.get(a).expect("live").pos;
        let pb = store.enemies.get(b).expect("live").pos;
        assert!(pa.distance(pb) > 0.01);
    }

    #[test]
    fn test_stacked_on_target_still_split() {
        let tuning = Tuning::default();
        let mut store = EntityStore::default();
        let a = store.spawn_enemy(grunt_at(Vec2::ZERO));
        let b = store.spawn_enemy(grunt_at(Vec2::ZERO));
        steer_enemies(&mut store.enemies, Vec2::ZERO, 0, SIM_DT, &tuning);
        let pa = store.enemies.get(a).expect("live").pos;
        let pb = store.enemies.get(b).expect("live").pos;
        assert!(pa.distance(pb) > 0.01);
    }

    #[test]
    fn test_fallback_axis_is_opposite_per_pair() {
        let ab = fallback_axis(3, 9);
        let ba = fallback_axis(9, 3);
        assert!((ab + ba).length() < 1e-6);
        assert!((ab.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_vanishing_enemies_hold_still() {
        let tuning = Tuning::default();
        let mut store = EntityStore::default();
        let id = store.spawn_enemy(grunt_at(Vec2::new(100.0, 0.0)));
        if let Some(e) = store.enemies.get_mut(id) {
            e.start_vanishing();
        }
        steer_enemies(&mut store.enemies, Vec2::ZERO, 0, SIM_DT, &tuning);
        assert_eq!(store.enemies.get(id).map(|e| e.pos), Some(Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn test_bullets_culled_outside_envelope() {
        let tuning = Tuning::default();
        let camera = Camera::new(Vec2::new(800.0, 600.0));
        let mut store = EntityStore::default();
        let inside = store.spawn_bullet(NewBullet {
            weapon: WeaponKind::Gun,
            pos: Vec2::new(400.0, 300.0),
            vel: Vec2::new(0.0, -60.0),
            radius: 5.0,
            attack: 1,
            penetrate: 0,
        });
        let leaving = store.spawn_bullet(NewBullet {
            weapon: WeaponKind::Gun,
            pos: Vec2::new(400.0, -tuning.bullet_cull_margin + 0.5),
            vel: Vec2::new(0.0, -60.0),
            radius: 5.0,
            attack: 1,
            penetrate: 0,
        });
        move_bullets(&mut store.bullets, &camera, SIM_DT, &tuning);
        assert!(store.bullets.get(inside).is_some());
        assert!(store.bullets.get(leaving).is_none());
    }

    #[test]
    fn test_cosmetics_expire() {
        let mut store = EntityStore::default();
        let id = store.spawn(Spawn::explosion(Vec2::ZERO));
        let life = match store.cosmetics.get(id).map(|c| (c.kind, c.life_ticks)) {
            Some((CosmeticKind::Explosion, life)) => life,
            other => panic!("unexpected cosmetic {other:?}"),
        };
        for _ in 0..life - 1 {
            update_cosmetics(&mut store.cosmetics, SIM_DT);
        }
        assert!(store.cosmetics.get(id).is_some());
        update_cosmetics(&mut store.cosmetics, SIM_DT);
        assert!(store.cosmetics.get(id).is_none());
    }
}
