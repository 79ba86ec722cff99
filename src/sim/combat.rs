//! Collision consequences
//!
//! Runs after movement each tick: fade out dying enemies, apply bullet hits,
//! apply contact damage to the player, then collect pickups.

use glam::Vec2;
use rand::Rng;

use super::geometry::{circles_overlap, within};
use super::progression::award_experience;
use super::state::{
    Enemy, EnemyKind, EnemyPhase, EntityId, GameEvent, GamePhase, GameState, PickupKind,
};
use super::store::{Collection, Entity, Spawn};

/// Resolve every collision for this tick
pub fn resolve(state: &mut GameState) {
    fade_vanishing(&mut state.store.enemies, state.tuning.vanish_fade_per_tick);
    resolve_bullet_hits(state);
    resolve_player_contacts(state);
    if state.phase != GamePhase::GameOver {
        collect_pickups(state);
    }
}

/// Vanishing enemies lose alpha and are removed once fully faded
pub fn fade_vanishing(enemies: &mut Collection<Enemy>, fade: f32) {
    enemies.for_each_live(|e| {
        if e.phase == EnemyPhase::Vanishing {
            e.alpha -= fade;
            if e.alpha <= 0.0 {
                e.alpha = 0.0;
                e.mark_removed();
            }
        }
    });
}

fn resolve_bullet_hits(state: &mut GameState) {
    let store = &mut state.store;
    let enemies = &mut store.enemies;
    let mut spawns = Vec::new();
    let mut kills: Vec<(EntityId, EnemyKind, Vec2)> = Vec::new();

    store.bullets.for_each_live(|bullet| {
        for enemy in enemies.live_mut() {
            if !enemy.is_alive() || bullet.hit.contains(&enemy.id) {
                continue;
            }
            if !circles_overlap(&bullet.circle(), &enemy.circle()) {
                continue;
            }

            enemy.hp = enemy.hp.saturating_sub(bullet.attack);
            bullet.hit.push(enemy.id);
            spawns.push(Spawn::damage_text(enemy.pos, bullet.attack));
            if enemy.hp == 0 {
                enemy.start_vanishing();
                kills.push((enemy.id, enemy.kind, enemy.pos));
            }

            if bullet.penetrate == 0 {
                bullet.mark_removed();
                break;
            }
            bullet.penetrate -= 1;
        }
    });

    for (id, kind, pos) in kills {
        state.score += 1;
        state.player.kills += 1;
        spawns.push(Spawn::explosion(pos));

        let arch = kind.archetype();
        if roll(&mut state.rng, state.tuning.exp_drop_chance) {
            spawns.push(Spawn::Pickup {
                kind: PickupKind::Experience,
                pos,
                value: arch.exp,
            });
        }
        if roll(&mut state.rng, state.tuning.gold_drop_chance) {
            spawns.push(Spawn::Pickup {
                kind: PickupKind::Gold,
                pos,
                value: arch.gold,
            });
        }
        log::debug!("Enemy {} ({:?}) killed, score {}", id, kind, state.score);
        state.emit(GameEvent::EnemyKilled { id, kind, pos });
    }

    for spawn in spawns {
        state.store.spawn(spawn);
    }
}

/// Drop roll; chances outside [0, 1] saturate, NaN never drops
fn roll<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    if chance.is_nan() {
        return false;
    }
    rng.random_bool(chance.clamp(0.0, 1.0))
}

fn resolve_player_contacts(state: &mut GameState) {
    let player = &mut state.player;
    player.damage_cooldown_ticks = player.damage_cooldown_ticks.saturating_sub(1);
    if player.damage_cooldown_ticks > 0 {
        return;
    }

    let body = player.circle();
    let touching = state
        .store
        .enemies
        .live()
        .any(|e| e.is_alive() && circles_overlap(&body, &e.circle()));
    if !touching {
        return;
    }

    let amount = state.tuning.contact_damage;
    player.hp = player.hp.saturating_sub(amount);
    player.damage_cooldown_ticks = state.tuning.damage_cooldown_ticks;
    let (pos, hp) = (player.pos, player.hp);
    state.store.spawn(Spawn::damage_text(pos, amount));
    state.emit(GameEvent::PlayerDamaged { amount, hp });

    if hp == 0 {
        state.phase = GamePhase::GameOver;
        state.upgrade_menu = None;
        let (score, level) = (state.score, state.player.level);
        log::info!("Game over: score {} at level {}", score, level);
        state.emit(GameEvent::GameOver { score, level });
    }
}

fn collect_pickups(state: &mut GameState) {
    let (origin, range) = (state.player.pos, state.tuning.pickup_range);
    let mut collected = Vec::new();
    state.store.pickups.for_each_live(|p| {
        if within(origin, p.pos, range) {
            p.mark_removed();
            collected.push((p.kind, p.value));
        }
    });

    for (kind, value) in collected {
        match kind {
            PickupKind::Gold => state.player.gold += value,
            PickupKind::Experience => award_experience(state, value),
        }
        state.emit(GameEvent::PickupCollected { kind, value });
    }
}
