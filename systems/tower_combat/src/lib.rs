#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns tower targets into bullet firing commands.
//!
//! A tower fires only when its cooldown has fully elapsed. Each bullet is
//! aimed at the pixel centre the critter occupied when the tower chose it.

use critter_defence_core::{Command, TowerCooldownView, TowerId, TowerTarget};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    ready: Vec<TowerId>,
}

impl TowerCombat {
    /// Creates a new tower combat system with an empty readiness buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireBullet` for every targeted tower that is ready to fire.
    ///
    /// Targets naming a tower absent from `tower_cooldowns` are skipped.
    pub fn handle(
        &mut self,
        tower_cooldowns: &TowerCooldownView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        self.ready.clear();
        if tower_targets.is_empty() {
            return;
        }

        // The view is sorted by tower id, so the buffer is too.
        self.ready.extend(
            tower_cooldowns
                .iter()
                .filter(|cooldown| cooldown.ready_in.is_zero())
                .map(|cooldown| cooldown.tower),
        );
        if self.ready.is_empty() {
            return;
        }

        let ready = &self.ready;
        out.extend(
            tower_targets
                .iter()
                .filter(|target| ready.binary_search(&target.tower).is_ok())
                .map(|target| Command::FireBullet {
                    tower: target.tower,
                    target: target.critter,
                    aim: target.critter_center,
                }),
        );
    }
}
