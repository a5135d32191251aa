#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Critter Defence.

mod critters;
mod grid;
mod towers;

use critter_defence_core::{
    CellCoord, CellKind, Command, CritterId, Direction, Event, FireError, PlacementError, TowerId,
    TowerKind,
};
use glam::Vec2;

use crate::{critters::CritterRoster, grid::GridMap, towers::TowerRegistry};

/// Represents the authoritative Critter Defence world state.
#[derive(Debug)]
pub struct World {
    grid: GridMap,
    critters: CritterRoster,
    towers: TowerRegistry,
}

impl World {
    /// Creates an empty world. The grid has no cells until it is configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: GridMap::new(0, 0),
            critters: CritterRoster::new(),
            towers: TowerRegistry::new(),
        }
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.towers
            .resolve_bullets(&mut self.critters, out_events);
        self.critters.purge_dead();
        self.towers.purge_bullets();
        self.critters.advance_cadence();
    }

    fn step_critter(
        &mut self,
        critter_id: CritterId,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) {
        let Some(critter) = self.critters.get_mut(critter_id) else {
            return;
        };
        if !critter.move_due {
            return;
        }

        let from = critter.cell;
        let destination = from
            .step(direction)
            .filter(|cell| Some(*cell) != critter.last_cell);
        let Some((to, kind)) = destination.and_then(|cell| {
            self.grid
                .kind(cell)
                .filter(|kind| kind.is_walkable())
                .map(|kind| (cell, kind))
        }) else {
            critter.move_due = false;
            return;
        };

        critter.step_to(to);
        out_events.push(Event::CritterMoved {
            critter: critter_id,
            from,
            to,
        });

        if kind == CellKind::Exit {
            if let Some(exited) = self.critters.remove(critter_id) {
                tracing::debug!(
                    critter = exited.id.get(),
                    reward = exited.reward,
                    power = exited.power,
                    "critter reached the exit"
                );
                out_events.push(Event::CritterExited {
                    critter: exited.id,
                    kind: exited.kind,
                    reward: exited.reward,
                    power: exited.power,
                });
            }
        }
    }

    fn place_tower(&mut self, kind: TowerKind, position: Vec2, out_events: &mut Vec<Event>) {
        let outcome = CellCoord::from_pixel(position)
            .ok_or(PlacementError::OutOfBounds)
            .and_then(|cell| match self.grid.kind(cell) {
                None => Err(PlacementError::OutOfBounds),
                Some(CellKind::Scenery) if self.towers.occupies(cell) => {
                    Err(PlacementError::Occupied)
                }
                Some(CellKind::Scenery) => Ok(cell),
                Some(_) => Err(PlacementError::NotScenery),
            });

        match outcome {
            Ok(cell) => {
                let tower = self.towers.insert(kind, cell);
                tracing::info!(tower = tower.get(), ?kind, ?cell, "tower placed");
                out_events.push(Event::TowerPlaced { tower, kind, cell });
            }
            Err(reason) => {
                tracing::debug!(?kind, %reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected {
                    kind,
                    position,
                    reason,
                });
            }
        }
    }

    fn fire_bullet(
        &mut self,
        tower_id: TowerId,
        target: CritterId,
        aim: Vec2,
        out_events: &mut Vec<Event>,
    ) {
        let target_alive = self
            .critters
            .get(target)
            .is_some_and(|critter| !critter.is_dead());

        let outcome = match self.towers.get_mut(tower_id) {
            None => Err(FireError::MissingTower),
            Some(tower) if !tower.is_ready() => Err(FireError::CoolingDown),
            Some(_) if !target_alive => Err(FireError::MissingTarget),
            Some(tower) => {
                tower.fire_at(aim);
                Ok(())
            }
        };

        match outcome {
            Ok(()) => out_events.push(Event::BulletFired {
                tower: tower_id,
                target,
            }),
            Err(reason) => out_events.push(Event::FireRejected {
                tower: tower_id,
                reason,
            }),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { columns, rows } => {
            world.grid = GridMap::new(columns, rows);
            world.critters.clear();
            world.towers.clear();
            out_events.push(Event::GridConfigured { columns, rows });
        }
        Command::SetCell { cell, kind } => {
            if world.grid.set_cell(cell, kind) {
                out_events.push(Event::CellChanged { cell, kind });
            } else {
                out_events.push(Event::CellEditRejected { cell });
            }
        }
        Command::SetEntry { cell } => {
            if world.grid.set_entry(cell) {
                out_events.push(Event::CellChanged {
                    cell,
                    kind: CellKind::Entry,
                });
            } else {
                out_events.push(Event::CellEditRejected { cell });
            }
        }
        Command::SetExit { cell } => {
            if world.grid.set_exit(cell) {
                out_events.push(Event::CellChanged {
                    cell,
                    kind: CellKind::Exit,
                });
            } else {
                out_events.push(Event::CellEditRejected { cell });
            }
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.towers.advance_cooldowns(dt);
            world.tick(out_events);
        }
        Command::StepCritter { critter, direction } => {
            world.step_critter(critter, direction, out_events);
        }
        Command::SpawnCritter { kind, level } => {
            let entry = world
                .grid
                .entry()
                .filter(|cell| world.grid.kind(*cell) == Some(CellKind::Entry));
            match entry {
                Some(cell) => {
                    let critter = world.critters.spawn(kind, level, cell);
                    tracing::debug!(critter = critter.get(), ?kind, level, "critter spawned");
                    out_events.push(Event::CritterSpawned {
                        critter,
                        kind,
                        cell,
                        level,
                    });
                }
                None => {
                    tracing::warn!(?kind, "spawn requested without an entry cell");
                    out_events.push(Event::CritterSpawnRejected { kind });
                }
            }
        }
        Command::RemoveCritter { critter } => {
            if world.critters.remove(critter).is_some() {
                out_events.push(Event::CritterRemoved { critter });
            } else {
                tracing::debug!(critter = critter.get(), "critter not found");
                out_events.push(Event::CritterRemovalIgnored { critter });
            }
        }
        Command::PlaceTower { kind, position } => {
            world.place_tower(kind, position, out_events);
        }
        Command::SellTower { tower } => match world.towers.remove(tower) {
            Some(sold) => {
                let refund = sold.stats.sell_value();
                tracing::info!(tower = tower.get(), refund, "tower sold");
                out_events.push(Event::TowerSold { tower, refund });
            }
            None => {
                tracing::warn!(tower = tower.get(), "sell requested for unknown tower");
                out_events.push(Event::TowerLookupMissed { tower });
            }
        },
        Command::UpgradeTower { tower } => match world.towers.get_mut(tower) {
            Some(state) => {
                state.stats.apply_upgrade(state.kind.upgrade_delta());
                let level = state.stats.level;
                tracing::info!(tower = tower.get(), level, "tower upgraded");
                out_events.push(Event::TowerUpgraded { tower, level });
            }
            None => {
                tracing::warn!(tower = tower.get(), "upgrade requested for unknown tower");
                out_events.push(Event::TowerLookupMissed { tower });
            }
        },
        Command::FireBullet { tower, target, aim } => {
            world.fire_bullet(tower, target, aim, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use critter_defence_core::{
        CellCoord, CellKind, CritterView, GridView, TowerCooldownView, TowerSnapshot, TowerId,
        TowerView,
    };

    /// Exposes a read-only view of the cell grid.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Kind of a single cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn cell(world: &World, cell: CellCoord) -> Option<CellKind> {
        world.grid.kind(cell)
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.grid.columns(), world.grid.rows())
    }

    /// Most recently placed entry cell.
    #[must_use]
    pub fn entry(world: &World) -> Option<CellCoord> {
        world.grid.entry()
    }

    /// Most recently placed exit cell.
    #[must_use]
    pub fn exit(world: &World) -> Option<CellCoord> {
        world.grid.exit()
    }

    /// Captures a read-only view of the critters inhabiting the grid.
    #[must_use]
    pub fn critter_view(world: &World) -> CritterView {
        CritterView::from_snapshots(
            world
                .critters
                .iter()
                .map(|critter| critter.snapshot())
                .collect(),
        )
    }

    /// Number of live critters.
    #[must_use]
    pub fn critter_count(world: &World) -> usize {
        world.critters.len()
    }

    /// Captures a read-only view of every placed tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Snapshot of a single tower.
    #[must_use]
    pub fn tower(world: &World, tower: TowerId) -> Option<TowerSnapshot> {
        world
            .towers
            .iter()
            .find(|state| state.id == tower)
            .map(|state| state.snapshot())
    }

    /// Captures the cooldown state of every placed tower.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| tower.cooldown_snapshot())
                .collect(),
        )
    }
}
