#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Critter Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of simulation ticks that make up one second of simulated time.
pub const TICKS_PER_SECOND: u32 = 60;

/// Simulated time covered by a single tick.
pub const TICK_DURATION: Duration = Duration::from_nanos(16_666_667);

/// Edge length of a grid cell measured in pixels.
pub const CELL_SIZE: f32 = 40.0;

/// Distance a bullet travels per tick, in pixels.
pub const BULLET_SPEED: f32 = 5.0;

/// Maximum distance a bullet may travel from its tower before expiring.
pub const BULLET_MAX_RANGE: f32 = 300.0;

/// Radius around a critter centre inside which a bullet registers a hit.
pub const BULLET_COLLISION_RADIUS: f32 = 5.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the grid with a fresh one filled with scenery.
    ///
    /// Clears every critter and tower.
    ConfigureGrid {
        /// Number of cell columns in the grid.
        columns: u32,
        /// Number of cell rows in the grid.
        rows: u32,
    },
    /// Overwrites the kind of a single cell.
    SetCell {
        /// Cell being edited.
        cell: CellCoord,
        /// Kind assigned to the cell.
        kind: CellKind,
    },
    /// Marks the provided cell as the critter entry.
    SetEntry {
        /// Cell that becomes the entry.
        cell: CellCoord,
    },
    /// Marks the provided cell as the critter exit.
    SetExit {
        /// Cell that becomes the exit.
        cell: CellCoord,
    },
    /// Advances the simulation by one frame.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a critter with a due move step in the given direction.
    StepCritter {
        /// Identifier of the critter attempting to move.
        critter: CritterId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that a critter of the given kind enter the grid at the entry.
    SpawnCritter {
        /// Kind of critter to create.
        kind: CritterKind,
        /// Level used to scale the critter's stats.
        level: u32,
    },
    /// Removes a critter without crediting any reward.
    RemoveCritter {
        /// Identifier of the critter to remove.
        critter: CritterId,
    },
    /// Requests placement of a tower at the provided pixel position.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Pixel position inside the cell that should host the tower.
        position: Vec2,
    },
    /// Requests that an existing tower be sold and removed.
    SellTower {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
    /// Requests a single-level upgrade of an existing tower.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Requests that a tower fire a bullet at a critter.
    FireBullet {
        /// Tower that fires.
        tower: TowerId,
        /// Critter the bullet is aimed at.
        target: CritterId,
        /// Pixel position the bullet flies toward.
        aim: Vec2,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a fresh grid was created.
    GridConfigured {
        /// Number of cell columns in the grid.
        columns: u32,
        /// Number of cell rows in the grid.
        rows: u32,
    },
    /// Confirms that a cell changed kind.
    CellChanged {
        /// Cell that was edited.
        cell: CellCoord,
        /// Kind now stored in the cell.
        kind: CellKind,
    },
    /// Reports that a cell edit addressed a coordinate outside the grid.
    CellEditRejected {
        /// Coordinate provided in the edit request.
        cell: CellCoord,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a critter entered the grid.
    CritterSpawned {
        /// Identifier assigned to the critter.
        critter: CritterId,
        /// Kind of the critter.
        kind: CritterKind,
        /// Cell the critter occupies after spawning.
        cell: CellCoord,
        /// Level the critter's stats were scaled to.
        level: u32,
    },
    /// Reports that a spawn request failed because the grid has no entry.
    CritterSpawnRejected {
        /// Kind of critter requested.
        kind: CritterKind,
    },
    /// Confirms that a critter moved between two cells.
    CritterMoved {
        /// Identifier of the critter that moved.
        critter: CritterId,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Announces that a critter reached the exit and left the grid.
    CritterExited {
        /// Identifier of the critter that exited.
        critter: CritterId,
        /// Kind of the critter.
        kind: CritterKind,
        /// Reward value carried by the critter.
        reward: u32,
        /// Power of the critter.
        power: u32,
    },
    /// Reports that a bullet hit a critter without killing it.
    CritterDamaged {
        /// Critter that was hit.
        critter: CritterId,
        /// Tower whose bullet landed the hit.
        tower: TowerId,
        /// Damage applied by the bullet.
        damage: u32,
        /// Health left after the hit.
        remaining: i32,
    },
    /// Announces that a critter was killed by a tower.
    CritterKilled {
        /// Critter that died.
        critter: CritterId,
        /// Kind of the critter.
        kind: CritterKind,
        /// Tower credited with the kill.
        tower: TowerId,
        /// Reward value carried by the critter.
        reward: u32,
    },
    /// Confirms that a critter was removed on request.
    CritterRemoved {
        /// Identifier of the removed critter.
        critter: CritterId,
    },
    /// Reports that a removal targeted a critter that no longer exists.
    CritterRemovalIgnored {
        /// Identifier provided in the removal request.
        critter: CritterId,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell hosting the tower.
        cell: CellCoord,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Pixel position provided in the placement request.
        position: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Identifier of the sold tower.
        tower: TowerId,
        /// Refund paid for the tower (`refund_value × level`).
        refund: u32,
    },
    /// Confirms that a tower gained a level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level reached after the upgrade.
        level: u32,
    },
    /// Reports that a sell, upgrade or fire request named an unknown tower.
    TowerLookupMissed {
        /// Identifier provided in the request.
        tower: TowerId,
    },
    /// Confirms that a tower fired a bullet.
    BulletFired {
        /// Tower that fired.
        tower: TowerId,
        /// Critter the bullet was aimed at.
        target: CritterId,
    },
    /// Reports that a fire request was declined.
    FireRejected {
        /// Tower named in the request.
        tower: TowerId,
        /// Specific reason the request was declined.
        reason: FireError,
    },
}

/// Kind of content stored in a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Walkable corridor cell.
    Path,
    /// Non-walkable decoration; towers are built here.
    Scenery,
    /// Cell where critters enter the grid.
    Entry,
    /// Cell where critters leave the grid.
    Exit,
}

impl CellKind {
    /// Reports whether critters may step onto a cell of this kind.
    ///
    /// The entry is deliberately excluded so critters never walk back into it.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Path | Self::Exit)
    }
}

/// Cardinal movement directions available to critters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Neighbour enumeration order shared by validation and movement.
    pub const SCAN_ORDER: [Direction; 4] = [Self::East, Self::South, Self::West, Self::North];
}

/// Unique identifier assigned to a critter.
///
/// Identifiers grow monotonically, so ordering by id is spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CritterId(u32);

impl CritterId {
    /// Creates a new critter identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Returns the adjacent cell in the given direction.
    ///
    /// `None` when the step would leave the non-negative quadrant; the upper
    /// bounds are the caller's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::South => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
        }
    }

    /// Direction leading from `self` to an orthogonally adjacent cell.
    #[must_use]
    pub fn direction_to(self, to: CellCoord) -> Option<Direction> {
        let column_diff = self.column.abs_diff(to.column);
        let row_diff = self.row.abs_diff(to.row);
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column > self.column {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if to.row > self.row {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }

    /// Pixel position of the cell centre.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(
            (self.column as f32 + 0.5) * CELL_SIZE,
            (self.row as f32 + 0.5) * CELL_SIZE,
        )
    }

    /// Cell containing the provided pixel position.
    ///
    /// Returns `None` for negative or non-finite coordinates.
    #[must_use]
    pub fn from_pixel(position: Vec2) -> Option<CellCoord> {
        if !position.is_finite() || position.x < 0.0 || position.y < 0.0 {
            return None;
        }

        let column = (position.x / CELL_SIZE).floor();
        let row = (position.y / CELL_SIZE).floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }

        Some(Self::new(column as u32, row as u32))
    }
}

/// Archetypes of critters that traverse the corridor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CritterKind {
    /// Fragile, fast critter.
    Speedy,
    /// Durable, slow critter.
    Tanky,
    /// Hard-hitting critter of medium pace.
    Strong,
    /// All-round critter.
    Balanced,
}

impl CritterKind {
    /// Every critter kind in table order.
    pub const ALL: [CritterKind; 4] = [Self::Speedy, Self::Tanky, Self::Strong, Self::Balanced];

    /// Computes the stats of a critter of this kind spawned at `level`.
    ///
    /// Health, power and reward grow linearly with the level; the movement
    /// cadence is fixed per kind.
    #[must_use]
    pub fn stats(self, level: u32) -> CritterStats {
        let level = i32::try_from(level).unwrap_or(i32::MAX);
        let (health, power, reward, move_interval_ticks) = match self {
            Self::Speedy => ((30, 5), (4, 2), (10, 4), 30),
            Self::Tanky => ((100, 15), (5, 2), (15, 6), 90),
            Self::Strong => ((50, 10), (7, 2), (12, 5), 60),
            Self::Balanced => ((50, 10), (5, 2), (12, 5), 40),
        };

        let linear = |(base, per_level): (i32, i32)| {
            base.saturating_add(per_level.saturating_mul(level))
        };

        CritterStats {
            max_health: linear(health),
            power: linear(power).unsigned_abs(),
            reward: linear(reward).unsigned_abs(),
            move_interval_ticks,
        }
    }
}

/// Level-scaled stats assigned to a critter when it spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CritterStats {
    /// Health the critter starts with.
    pub max_health: i32,
    /// Damage the critter represents when it escapes.
    pub power: u32,
    /// Money credited when the critter is killed or exits.
    pub reward: u32,
    /// Number of waiting frames between two moves. Lower is faster.
    pub move_interval_ticks: u32,
}

/// Rule a tower applies to choose among critters in range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetingPolicy {
    /// Closest critter to the tower.
    Nearest,
    /// Critter with the shortest Manhattan distance to the exit.
    ExitPriority,
    /// Critter with the least current health.
    Weakest,
    /// Critter with the most current health.
    Strongest,
}

/// Types of towers that can be built on scenery cells of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Balanced direct-damage tower.
    Basic,
    /// Short-range tower that prioritises critters close to the exit.
    Splash,
    /// Rapid, weak tower that finishes off wounded critters.
    Slow,
    /// Long-range tower that focuses the sturdiest critter.
    Sniper,
}

impl TowerKind {
    /// Stats of a freshly built level-one tower of this kind.
    #[must_use]
    pub const fn base_stats(self) -> TowerStats {
        let (cost, refund_value, range_cells, power, rate_of_fire) = match self {
            Self::Basic => (100, 70, 3, 25, 1.0),
            Self::Splash => (150, 100, 2, 20, 0.8),
            Self::Slow => (120, 80, 3, 15, 1.2),
            Self::Sniper => (200, 140, 6, 50, 0.5),
        };

        TowerStats {
            level: 1,
            cost,
            refund_value,
            range_cells,
            power,
            rate_of_fire,
        }
    }

    /// Stat increments applied on every upgrade of this kind.
    #[must_use]
    pub const fn upgrade_delta(self) -> UpgradeDelta {
        match self {
            Self::Basic | Self::Splash | Self::Slow => UpgradeDelta {
                power: 5,
                range_cells: 1,
                refund_divisor: 10,
            },
            Self::Sniper => UpgradeDelta {
                power: 10,
                range_cells: 1,
                refund_divisor: 10,
            },
        }
    }

    /// Targeting rule used by towers of this kind.
    #[must_use]
    pub const fn targeting_policy(self) -> TargetingPolicy {
        match self {
            Self::Basic => TargetingPolicy::Nearest,
            Self::Splash => TargetingPolicy::ExitPriority,
            Self::Slow => TargetingPolicy::Weakest,
            Self::Sniper => TargetingPolicy::Strongest,
        }
    }
}

/// Mutable combat and economy stats carried by a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Current upgrade level, starting at one.
    pub level: u32,
    /// Purchase price; also the price of each upgrade.
    pub cost: u32,
    /// Refund per level paid when the tower is sold.
    pub refund_value: u32,
    /// Targeting radius measured in cells.
    pub range_cells: u32,
    /// Damage carried by each bullet.
    pub power: u32,
    /// Shots per second.
    pub rate_of_fire: f32,
}

impl TowerStats {
    /// Targeting radius measured in pixels.
    #[must_use]
    pub fn range_px(&self) -> f32 {
        self.range_cells as f32 * CELL_SIZE
    }

    /// Simulated time that must elapse between two shots.
    ///
    /// A non-positive rate never becomes ready.
    #[must_use]
    pub fn fire_cooldown(&self) -> Duration {
        if self.rate_of_fire <= 0.0 || !self.rate_of_fire.is_finite() {
            return Duration::MAX;
        }
        Duration::from_secs_f32(1.0 / self.rate_of_fire)
    }

    /// Money paid back when the tower is sold.
    #[must_use]
    pub fn sell_value(&self) -> u32 {
        self.refund_value.saturating_mul(self.level)
    }

    /// Applies one upgrade step.
    pub fn apply_upgrade(&mut self, delta: UpgradeDelta) {
        self.level = self.level.saturating_add(1);
        self.power = self.power.saturating_add(delta.power);
        self.range_cells = self.range_cells.saturating_add(delta.range_cells);
        if delta.refund_divisor > 0 {
            self.refund_value = self
                .refund_value
                .saturating_add(self.cost / delta.refund_divisor);
        }
    }
}

/// Stat increments applied by a single tower upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UpgradeDelta {
    /// Added bullet damage.
    pub power: u32,
    /// Added targeting radius in cells.
    pub range_cells: u32,
    /// The refund grows by `cost / refund_divisor`. Zero disables the bonus.
    pub refund_divisor: u32,
}

/// Reasons a grid fails path validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ValidationError {
    /// The grid does not hold exactly one entry cell.
    #[error("there must be exactly one entry tile, found {count}")]
    MultipleOrMissingEntry {
        /// Number of entry cells found.
        count: usize,
    },
    /// The grid does not hold exactly one exit cell.
    #[error("there must be exactly one exit tile, found {count}")]
    MultipleOrMissingExit {
        /// Number of exit cells found.
        count: usize,
    },
    /// The exit cannot be reached from the entry.
    #[error("path is not connected between entry and exit")]
    Disconnected,
    /// The corridor branches or ends somewhere other than the exit.
    #[error("there can only be one path; dead end at ({}, {})", cell.column(), cell.row())]
    BranchingOrDeadEnd {
        /// First dead-end cell discovered by the traversal.
        cell: CellCoord,
    },
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PlacementError {
    /// The player cannot afford the tower.
    #[error("tower costs {cost} but only {available} is available")]
    InsufficientFunds {
        /// Price of the tower.
        cost: u32,
        /// Money available to the player.
        available: u32,
    },
    /// The position lies outside the grid.
    #[error("position lies outside the grid")]
    OutOfBounds,
    /// Towers may only be built on scenery.
    #[error("towers can only be built on scenery")]
    NotScenery,
    /// The cell already hosts a tower.
    #[error("cell already hosts a tower")]
    Occupied,
}

/// Reasons a tower upgrade request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum UpgradeError {
    /// The player cannot afford the upgrade.
    #[error("upgrade costs {cost} but only {available} is available")]
    InsufficientFunds {
        /// Price of the upgrade.
        cost: u32,
        /// Money available to the player.
        available: u32,
    },
    /// No tower with the provided identifier exists.
    #[error("tower {} does not exist", tower.get())]
    MissingTower {
        /// Identifier named in the request.
        tower: TowerId,
    },
}

/// Failure to resolve a tower identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum TowerLookupError {
    /// No tower with the provided identifier exists.
    #[error("tower {} does not exist", tower.get())]
    MissingTower {
        /// Identifier named in the request.
        tower: TowerId,
    },
}

/// Reasons a fire request may be declined by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum FireError {
    /// No tower with the provided identifier exists.
    #[error("tower does not exist")]
    MissingTower,
    /// The tower's cooldown has not elapsed.
    #[error("tower is still cooling down")]
    CoolingDown,
    /// The target critter is gone.
    #[error("target critter does not exist")]
    MissingTarget,
}

/// Read-only view over the cell grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [CellKind],
    columns: u32,
    rows: u32,
    entry: Option<CellCoord>,
    exit: Option<CellCoord>,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(
        cells: &'a [CellKind],
        columns: u32,
        rows: u32,
        entry: Option<CellCoord>,
        exit: Option<CellCoord>,
    ) -> Self {
        Self {
            cells,
            columns,
            rows,
            entry,
            exit,
        }
    }

    /// Kind of the provided cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Most recently placed entry cell.
    #[must_use]
    pub const fn entry(&self) -> Option<CellCoord> {
        self.entry
    }

    /// Most recently placed exit cell.
    #[must_use]
    pub const fn exit(&self) -> Option<CellCoord> {
        self.exit
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Iterates every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + 'a {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, kind)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *kind)
        })
    }

    /// In-bounds orthogonal neighbours of `cell` in [`Direction::SCAN_ORDER`].
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        Direction::SCAN_ORDER
            .into_iter()
            .filter_map(move |direction| cell.step(direction))
            .filter(move |neighbor| self.contains(*neighbor))
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Immutable representation of a single critter's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CritterSnapshot {
    /// Unique identifier assigned to the critter.
    pub id: CritterId,
    /// Kind of the critter.
    pub kind: CritterKind,
    /// Grid cell currently occupied by the critter.
    pub cell: CellCoord,
    /// Cell occupied before the most recent move, if any.
    pub last_cell: Option<CellCoord>,
    /// Current health. Zero or below means dead.
    pub health: i32,
    /// Health the critter spawned with.
    pub max_health: i32,
    /// Damage the critter represents when it escapes.
    pub power: u32,
    /// Money credited when the critter is killed or exits.
    pub reward: u32,
    /// Level the critter's stats were scaled to.
    pub level: u32,
    /// Indicates whether the critter's movement cadence allows a step this tick.
    pub move_due: bool,
}

impl CritterSnapshot {
    /// Pixel position of the critter's centre.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.cell.center()
    }
}

/// Read-only snapshot describing all live critters.
#[derive(Clone, Debug, Default)]
pub struct CritterView {
    snapshots: Vec<CritterSnapshot>,
}

impl CritterView {
    /// Creates a new critter view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CritterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured critter snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &CritterSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured critters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no critters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CritterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an in-flight bullet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSnapshot {
    /// Current pixel position.
    pub position: Vec2,
    /// Displacement applied every tick.
    pub velocity: Vec2,
    /// Damage applied on impact.
    pub damage: u32,
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell hosting the tower.
    pub cell: CellCoord,
    /// Pixel position of the tower centre.
    pub position: Vec2,
    /// Current combat and economy stats.
    pub stats: TowerStats,
    /// Bullets fired by the tower that are still in flight.
    pub bullets: Vec<BulletSnapshot>,
    /// Number of critters killed by the tower.
    pub kills: u32,
}

/// Read-only snapshot describing all towers placed within the grid.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Cooldown state of a single tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Identifier of the tower.
    pub tower: TowerId,
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Simulated time left before the tower may fire. Zero means ready.
    pub ready_in: Duration,
}

/// Read-only snapshot of every tower's cooldown, sorted by tower id.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in tower id order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Target chosen by a tower's policy for the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that selected the target.
    pub tower: TowerId,
    /// Critter chosen as target.
    pub critter: CritterId,
    /// Pixel position of the critter centre when it was selected.
    pub critter_center: Vec2,
}
