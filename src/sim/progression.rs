//! Experience, level-ups and the upgrade menu
//!
//! Every level gained (and every score threshold crossed) queues one pending
//! choice. While any are pending the game sits in [`GamePhase::LevelUp`] with
//! three options on offer; [`select_upgrade`] consumes them one at a time.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GamePhase, GameState, Player, UpgradeMenu};
use super::weapon::{InventoryError, MAX_WEAPON_LEVEL, WeaponKind};
use crate::consts::UPGRADE_CHOICES;
use crate::tuning::Tuning;

/// One entry in the level-up menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeOption {
    UpgradeWeapon(WeaponKind),
    UnlockWeapon(WeaponKind),
    RaiseMaxHealth,
}

impl UpgradeOption {
    /// Menu text
    pub fn label(&self) -> String {
        match self {
            UpgradeOption::UpgradeWeapon(kind) => format!("Upgrade {kind}"),
            UpgradeOption::UnlockWeapon(kind) => format!("Unlock {kind}"),
            UpgradeOption::RaiseMaxHealth => "Raise max health".to_string(),
        }
    }
}

/// How many times each upgrade category was taken this run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeHistory {
    pub weapon_upgrades: u32,
    pub unlocks: u32,
    pub health: u32,
}

/// Add experience, returns the number of levels gained.
/// Excess carries over and each threshold grows by `exp_growth`, rounded up.
pub fn gain_experience(player: &mut Player, amount: u32, tuning: &Tuning) -> u32 {
    player.exp = player.exp.saturating_add(amount);
    let mut gained = 0;
    while player.exp >= player.exp_to_next_level {
        player.exp -= player.exp_to_next_level;
        player.level += 1;
        gained += 1;

        let grown = (player.exp_to_next_level as f32 * tuning.exp_growth).ceil() as u32;
        player.exp_to_next_level = grown.max(player.exp_to_next_level).max(1);
    }
    gained
}

/// Three options drawn from what the player can actually take.
/// Options are distinct whenever the pool has at least three entries;
/// any shortfall is padded with [`UpgradeOption::RaiseMaxHealth`].
pub fn generate_upgrade_options<R: Rng + ?Sized>(
    player: &Player,
    rng: &mut R,
) -> [UpgradeOption; UPGRADE_CHOICES] {
    let inventory = &player.inventory;
    let mut pool: Vec<UpgradeOption> = inventory
        .slots()
        .iter()
        .filter(|slot| slot.level < MAX_WEAPON_LEVEL)
        .map(|slot| UpgradeOption::UpgradeWeapon(slot.kind))
        .collect();
    if !inventory.is_full() {
        pool.extend(
            WeaponKind::ALL
                .into_iter()
                .filter(|kind| !inventory.contains(*kind))
                .map(UpgradeOption::UnlockWeapon),
        );
    }
    pool.push(UpgradeOption::RaiseMaxHealth);
    pool.shuffle(rng);

    let mut options = [UpgradeOption::RaiseMaxHealth; UPGRADE_CHOICES];
    for (slot, option) in options.iter_mut().zip(pool) {
        *slot = option;
    }
    options
}

/// Apply one option to the player
pub fn apply_option(
    player: &mut Player,
    option: UpgradeOption,
    tuning: &Tuning,
) -> Result<(), InventoryError> {
    match option {
        UpgradeOption::UpgradeWeapon(kind) => {
            let level = player.inventory.upgrade(kind)?;
            player.upgrade_history.weapon_upgrades += 1;
            log::debug!("{} upgraded to level {}", kind, level);
        }
        UpgradeOption::UnlockWeapon(kind) => {
            player.inventory.add(kind)?;
            player.upgrade_history.unlocks += 1;
            log::debug!("{} unlocked", kind);
        }
        UpgradeOption::RaiseMaxHealth => {
            let step = tuning.max_health_step;
            player.max_hp = player.max_hp.saturating_add(step);
            player.hp = player.hp.saturating_add(step).min(player.max_hp);
            player.upgrade_history.health += 1;
            log::debug!("Max health raised to {}", player.max_hp);
        }
    }
    Ok(())
}

/// Feed experience into the player and queue a choice per level gained
pub fn award_experience(state: &mut GameState, amount: u32) {
    let gained = gain_experience(&mut state.player, amount, &state.tuning);
    if gained == 0 {
        return;
    }
    let top = state.player.level;
    for level in (top + 1 - gained)..=top {
        log::info!("Level up! Now level {}", level);
        state.emit(GameEvent::LevelUp { level });
    }
    state.pending_choices += gained;
}

/// Queue a choice for each newly crossed score threshold. Each fires once.
pub fn check_score_thresholds(state: &mut GameState) {
    while let Some(&threshold) = state.tuning.score_thresholds.get(state.thresholds_fired) {
        if state.score < threshold {
            break;
        }
        state.thresholds_fired += 1;
        state.pending_choices += 1;
        log::info!("Score threshold {} reached", threshold);
        state.emit(GameEvent::ScoreThreshold { score: threshold });
    }
}

fn refresh_menu(state: &mut GameState) {
    state.upgrade_menu = Some(UpgradeMenu {
        options: generate_upgrade_options(&state.player, &mut state.rng),
    });
}

/// Enter the level-up menu if choices are waiting
pub fn open_menu_if_pending(state: &mut GameState) {
    if state.pending_choices > 0 && state.phase == GamePhase::Playing {
        state.phase = GamePhase::LevelUp;
        refresh_menu(state);
    }
}

/// End-of-tick progression step
pub fn update(state: &mut GameState) {
    check_score_thresholds(state);
    open_menu_if_pending(state);
}

/// Take menu option `index`. Returns false (and changes nothing) outside
/// the level-up menu or for an index past the offered options.
pub fn select_upgrade(state: &mut GameState, index: usize) -> bool {
    if state.phase != GamePhase::LevelUp {
        return false;
    }
    let Some(option) = state
        .upgrade_menu
        .as_ref()
        .and_then(|menu| menu.options.get(index).copied())
    else {
        return false;
    };

    if let Err(err) = apply_option(&mut state.player, option, &state.tuning) {
        // Options are drawn from the current inventory, so this means the
        // menu went stale; offer a fresh set instead
        log::warn!("Discarding stale upgrade menu: {}", err);
        refresh_menu(state);
        return false;
    }

    state.pending_choices = state.pending_choices.saturating_sub(1);
    state.emit(GameEvent::UpgradeApplied { option });

    if state.pending_choices > 0 {
        refresh_menu(state);
    } else {
        state.upgrade_menu = None;
        state.phase = GamePhase::Playing;
    }
    true
}
