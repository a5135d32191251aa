#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick driver that owns the world, every system and the player's purse.
//!
//! Adapters edit the map, call [`Simulation::start`] once the map validates,
//! and then advance time one [`Simulation::tick`] at a time. Tower purchases go
//! through the driver so the purse stays consistent with the world.

use critter_defence_core::{
    CellCoord, CellKind, Command, CritterView, Event, PlacementError, TowerId, TowerKind,
    TowerLookupError, TowerTarget, TowerView, UpgradeError, ValidationError, TICK_DURATION,
};
use critter_defence_system_movement::Movement;
use critter_defence_system_path_validation::PathValidator;
use critter_defence_system_tower_combat::TowerCombat;
use critter_defence_system_tower_targeting::TowerTargeting;
use critter_defence_system_waves::{WaveConfig, WavePhase, Waves};
use critter_defence_world::{self as world, query, World};
use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

const WAVE_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Starting conditions of the player's economy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Money available before the first purchase.
    pub starting_money: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_money: 500,
        }
    }
}

/// Everything needed to construct a [`Simulation`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for critter movement and wave composition.
    pub seed: u64,
    /// Wave progression tuning.
    pub waves: WaveConfig,
    /// Purse tuning.
    pub economy: EconomyConfig,
}

/// Errors raised by the simulation driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The map does not form a single corridor from entry to exit.
    #[error("map is not playable: {0}")]
    InvalidMap(#[from] ValidationError),
    /// Time cannot advance before a successful [`Simulation::start`].
    #[error("simulation has not been started")]
    NotStarted,
}

/// Aggregate counters collected over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RunStats {
    /// Ticks processed since the run started.
    pub ticks: u64,
    /// Critters killed by towers.
    pub kills: u32,
    /// Critters that reached the exit.
    pub exits: u32,
    /// Summed power of the critters that reached the exit.
    pub power_leaked: u64,
    /// Rewards credited to the purse.
    pub money_earned: u64,
}

/// Authoritative game loop.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    validator: PathValidator,
    movement: Movement,
    waves: Waves,
    targeting: TowerTargeting,
    combat: TowerCombat,
    purse: u32,
    stats: RunStats,
    started: bool,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a simulation over an empty grid.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            world: World::new(),
            validator: PathValidator::new(),
            movement: Movement::new(config.seed),
            waves: Waves::new(config.waves, config.seed ^ WAVE_SEED_SALT),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            purse: config.economy.starting_money,
            stats: RunStats::default(),
            started: false,
            targets: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Replaces the grid with `columns × rows` scenery cells.
    ///
    /// Critters and towers are discarded and towers are not refunded. Wave
    /// progression, the movement seed and the run statistics start over; the
    /// purse carries across.
    pub fn configure_grid(&mut self, columns: u32, rows: u32) {
        let _ = self.edit(Command::ConfigureGrid { columns, rows });
        self.movement = Movement::new(self.config.seed);
        self.waves = Waves::new(self.config.waves, self.config.seed ^ WAVE_SEED_SALT);
        self.stats = RunStats::default();
        self.targets.clear();
    }

    /// Overwrites one cell. Returns `false` when the cell is out of range.
    pub fn set_cell(&mut self, cell: CellCoord, kind: CellKind) -> bool {
        self.edit(Command::SetCell { cell, kind })
    }

    /// Places the entry. Returns `false` when the cell is out of range.
    pub fn set_entry(&mut self, cell: CellCoord) -> bool {
        self.edit(Command::SetEntry { cell })
    }

    /// Places the exit. Returns `false` when the cell is out of range.
    pub fn set_exit(&mut self, cell: CellCoord) -> bool {
        self.edit(Command::SetExit { cell })
    }

    /// Map edits pause the run until it is started again.
    fn edit(&mut self, command: Command) -> bool {
        self.started = false;
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        !events
            .iter()
            .any(|event| matches!(event, Event::CellEditRejected { .. }))
    }

    /// Checks the current map without starting the run.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.validator.validate(query::grid_view(&self.world))
    }

    /// Validates the map and allows time to advance.
    pub fn start(&mut self) -> Result<(), SimulationError> {
        if let Err(error) = self.validate() {
            tracing::warn!(%error, "refusing to start on an invalid map");
            return Err(error.into());
        }
        self.started = true;
        tracing::info!(
            wave = self.waves.current_wave(),
            critters = self.waves.total_this_wave(),
            purse = self.purse,
            "simulation started"
        );
        Ok(())
    }

    /// Advances the run by one tick and returns the events it produced.
    ///
    /// Order: bullets and cadences, targeting, firing, movement, waves.
    pub fn tick(&mut self) -> Result<&[Event], SimulationError> {
        if !self.started {
            return Err(SimulationError::NotStarted);
        }

        self.events.clear();
        world::apply(
            &mut self.world,
            Command::Tick { dt: TICK_DURATION },
            &mut self.events,
        );

        self.targeting.handle(
            &query::tower_view(&self.world),
            &query::critter_view(&self.world),
            query::exit(&self.world),
            &mut self.targets,
        );
        self.combat.handle(
            &query::tower_cooldowns(&self.world),
            &self.targets,
            &mut self.commands,
        );
        self.flush_commands();

        self.movement.handle(
            &self.events,
            &query::critter_view(&self.world),
            query::grid_view(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        self.waves.handle(
            &self.events,
            query::critter_count(&self.world),
            &mut self.commands,
        );
        self.flush_commands();
        self.waves.record_spawns(&self.events);

        self.settle();
        Ok(&self.events)
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn settle(&mut self) {
        self.stats.ticks = self.stats.ticks.saturating_add(1);
        for event in &self.events {
            let reward = match event {
                Event::CritterKilled { reward, .. } => {
                    self.stats.kills = self.stats.kills.saturating_add(1);
                    *reward
                }
                Event::CritterExited { reward, power, .. } => {
                    self.stats.exits = self.stats.exits.saturating_add(1);
                    self.stats.power_leaked =
                        self.stats.power_leaked.saturating_add(u64::from(*power));
                    *reward
                }
                _ => continue,
            };
            self.purse = self.purse.saturating_add(reward);
            self.stats.money_earned = self.stats.money_earned.saturating_add(u64::from(reward));
        }
    }

    /// Buys a tower and places it on the scenery cell containing `position`.
    pub fn place_tower(&mut self, kind: TowerKind, position: Vec2) -> Result<TowerId, PlacementError> {
        let cost = kind.base_stats().cost;
        if self.purse < cost {
            return Err(PlacementError::InsufficientFunds {
                cost,
                available: self.purse,
            });
        }

        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::PlaceTower { kind, position },
            &mut events,
        );
        match events.first() {
            Some(Event::TowerPlaced { tower, .. }) => {
                self.purse -= cost;
                Ok(*tower)
            }
            Some(Event::TowerPlacementRejected { reason, .. }) => Err(*reason),
            _ => Err(PlacementError::OutOfBounds),
        }
    }

    /// Sells a tower and returns the refund credited to the purse.
    pub fn sell_tower(&mut self, tower: TowerId) -> Result<u32, TowerLookupError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::SellTower { tower }, &mut events);
        match events.first() {
            Some(Event::TowerSold { refund, .. }) => {
                self.purse = self.purse.saturating_add(*refund);
                Ok(*refund)
            }
            _ => Err(TowerLookupError::MissingTower { tower }),
        }
    }

    /// Pays the tower's cost to raise it one level.
    pub fn upgrade_tower(&mut self, tower: TowerId) -> Result<(), UpgradeError> {
        let Some(snapshot) = query::tower(&self.world, tower) else {
            tracing::warn!(tower = tower.get(), "upgrade requested for unknown tower");
            return Err(UpgradeError::MissingTower { tower });
        };

        let cost = snapshot.stats.cost;
        if self.purse < cost {
            return Err(UpgradeError::InsufficientFunds {
                cost,
                available: self.purse,
            });
        }

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::UpgradeTower { tower }, &mut events);
        self.purse -= cost;
        Ok(())
    }

    /// Money currently available to the player.
    #[must_use]
    pub const fn purse(&self) -> u32 {
        self.purse
    }

    /// Counters collected since the grid was last configured.
    #[must_use]
    pub const fn stats(&self) -> RunStats {
        self.stats
    }

    /// Number of the wave in progress.
    #[must_use]
    pub fn current_wave(&self) -> u32 {
        self.waves.current_wave()
    }

    /// Critters spawned so far during the wave in progress.
    #[must_use]
    pub fn spawned_this_wave(&self) -> u32 {
        self.waves.spawned_this_wave()
    }

    /// Quota of the wave in progress.
    #[must_use]
    pub fn total_this_wave(&self) -> u32 {
        self.waves.total_this_wave()
    }

    /// Phase of the wave in progress.
    #[must_use]
    pub fn wave_phase(&self) -> WavePhase {
        self.waves.phase(query::critter_count(&self.world))
    }

    /// Reports whether the final configured wave is over.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.wave_phase() == WavePhase::Finished
    }

    /// Reports whether time may advance.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Snapshot of every live critter.
    #[must_use]
    pub fn critters(&self) -> CritterView {
        query::critter_view(&self.world)
    }

    /// Snapshot of every tower.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Read-only access to the underlying world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor(config: SimulationConfig) -> Simulation {
        let mut simulation = Simulation::new(config);
        simulation.configure_grid(5, 2);
        assert!(simulation.set_entry(CellCoord::new(0, 0)));
        for column in 1..4 {
            assert!(simulation.set_cell(CellCoord::new(column, 0), CellKind::Path));
        }
        assert!(simulation.set_exit(CellCoord::new(4, 0)));
        simulation
    }

    #[test]
    fn ticking_requires_start() {
        let mut simulation = corridor(SimulationConfig::default());
        assert_eq!(simulation.tick().err(), Some(SimulationError::NotStarted));
        simulation.start().expect("corridor is valid");
        assert!(simulation.tick().is_ok());
        assert_eq!(simulation.stats().ticks, 1);
    }

    #[test]
    fn invalid_map_is_refused() {
        let mut simulation = Simulation::new(SimulationConfig::default());
        simulation.configure_grid(3, 1);
        assert!(simulation.set_entry(CellCoord::new(0, 0)));
        assert_eq!(
            simulation.start(),
            Err(SimulationError::InvalidMap(
                ValidationError::MultipleOrMissingExit { count: 0 }
            ))
        );
        assert!(!simulation.is_started());
    }

    #[test]
    fn editing_pauses_the_run() {
        let mut simulation = corridor(SimulationConfig::default());
        simulation.start().expect("corridor is valid");
        assert!(!simulation.set_cell(CellCoord::new(9, 9), CellKind::Path));
        assert!(!simulation.is_started());
    }

    #[test]
    fn purchases_respect_the_purse() {
        let mut simulation = corridor(SimulationConfig {
            economy: EconomyConfig {
                starting_money: 250,
            },
            ..SimulationConfig::default()
        });

        let sniper = simulation
            .place_tower(TowerKind::Sniper, CellCoord::new(1, 1).center())
            .expect("affordable");
        assert_eq!(simulation.purse(), 50);

        assert_eq!(
            simulation.place_tower(TowerKind::Basic, CellCoord::new(2, 1).center()),
            Err(PlacementError::InsufficientFunds {
                cost: 100,
                available: 50,
            })
        );
        assert_eq!(simulation.towers().into_vec().len(), 1);

        assert_eq!(
            simulation.upgrade_tower(sniper),
            Err(UpgradeError::InsufficientFunds {
                cost: 200,
                available: 50,
            })
        );

        assert_eq!(simulation.sell_tower(sniper), Ok(140));
        assert_eq!(simulation.purse(), 190);
        assert_eq!(
            simulation.sell_tower(sniper),
            Err(TowerLookupError::MissingTower { tower: sniper })
        );
    }

    #[test]
    fn rejected_placement_keeps_the_money() {
        let mut simulation = corridor(SimulationConfig::default());
        assert_eq!(
            simulation.place_tower(TowerKind::Basic, CellCoord::new(2, 0).center()),
            Err(PlacementError::NotScenery)
        );
        assert_eq!(simulation.purse(), 500);
    }

    #[test]
    fn upgrade_charges_the_tower_cost() {
        let mut simulation = corridor(SimulationConfig::default());
        let tower = simulation
            .place_tower(TowerKind::Slow, CellCoord::new(0, 1).center())
            .expect("affordable");
        simulation.upgrade_tower(tower).expect("affordable");
        assert_eq!(simulation.purse(), 500 - 120 - 120);

        let snapshot = simulation.towers().into_vec().remove(0);
        assert_eq!(snapshot.stats.level, 2);
        assert_eq!(snapshot.stats.power, 20);
        assert_eq!(
            simulation.upgrade_tower(TowerId::new(77)),
            Err(UpgradeError::MissingTower {
                tower: TowerId::new(77)
            })
        );
    }

    #[test]
    fn reconfiguring_the_grid_restarts_waves_and_statistics() {
        let config = SimulationConfig::default();
        let mut simulation = corridor(config);
        simulation.start().expect("corridor is valid");
        for _ in 0..5_000 {
            if simulation.current_wave() > config.waves.first_wave {
                break;
            }
            let _ = simulation.tick().expect("started");
        }
        assert_eq!(simulation.current_wave(), config.waves.first_wave + 1);
        assert_ne!(simulation.stats(), RunStats::default());
        let purse = simulation.purse();

        simulation.configure_grid(5, 2);

        assert_eq!(simulation.current_wave(), config.waves.first_wave);
        assert_eq!(simulation.spawned_this_wave(), 0);
        assert_eq!(
            simulation.total_this_wave(),
            config.waves.total_for(config.waves.first_wave)
        );
        assert_eq!(simulation.stats(), RunStats::default());
        assert!(simulation.critters().iter().next().is_none());
        assert_eq!(simulation.purse(), purse);
    }

    #[test]
    fn configuration_loads_from_toml_with_defaults() {
        let config: SimulationConfig = toml::from_str(
            r#"
            seed = 42

            [waves]
            spawn_interval_ticks = 30
            last_wave = 3
            "#,
        )
        .expect("valid configuration");

        assert_eq!(config.seed, 42);
        assert_eq!(config.waves.spawn_interval_ticks, 30);
        assert_eq!(config.waves.last_wave, Some(3));
        assert_eq!(config.waves.base_critters, 5);
        assert_eq!(config.economy, EconomyConfig::default());
    }
}
