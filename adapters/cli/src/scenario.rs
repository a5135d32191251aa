//! TOML scenario files describing a map, its towers and the run tuning.

use std::{fs, path::Path};

use anyhow::{bail, ensure, Context, Result};
use critter_defence_core::{CellCoord, CellKind, TowerKind};
use critter_defence_simulation::{Simulation, SimulationConfig};
use serde::Deserialize;

/// Parsed scenario file.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Scenario {
    #[serde(default)]
    pub(crate) simulation: SimulationConfig,
    map: MapLayout,
    #[serde(default)]
    towers: Vec<TowerPlacement>,
}

/// Map drawn as text, one string per row.
///
/// `E` entry, `X` exit, `#` path, `.` scenery.
#[derive(Clone, Debug, Deserialize)]
struct MapLayout {
    rows: Vec<String>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct TowerPlacement {
    kind: TowerKind,
    cell: CellCoord,
    #[serde(default)]
    upgrades: u32,
}

impl Scenario {
    /// Reads and parses the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load scenario {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let scenario: Scenario =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        let width = scenario.map.rows.first().map_or(0, |row| row.chars().count());
        ensure!(width > 0, "scenario map has no cells");
        ensure!(
            scenario
                .map
                .rows
                .iter()
                .all(|row| row.chars().count() == width),
            "scenario map rows must all be {width} cells wide"
        );
        Ok(scenario)
    }

    /// Builds a started simulation: map drawn, towers bought, map validated.
    pub(crate) fn build(&self) -> Result<Simulation> {
        let mut simulation = Simulation::new(self.simulation);
        let columns = u32::try_from(self.map.rows[0].chars().count())?;
        let rows = u32::try_from(self.map.rows.len())?;
        simulation.configure_grid(columns, rows);

        for (row, line) in self.map.rows.iter().enumerate() {
            for (column, symbol) in line.chars().enumerate() {
                let cell = CellCoord::new(u32::try_from(column)?, u32::try_from(row)?);
                let accepted = match symbol {
                    'E' => simulation.set_entry(cell),
                    'X' => simulation.set_exit(cell),
                    '#' => simulation.set_cell(cell, CellKind::Path),
                    '.' => true,
                    other => bail!("unknown map symbol {other:?} at ({column}, {row})"),
                };
                ensure!(accepted, "cell ({column}, {row}) lies outside the grid");
            }
        }

        for placement in &self.towers {
            let tower = simulation
                .place_tower(placement.kind, placement.cell.center())
                .with_context(|| {
                    format!(
                        "failed to place {:?} tower at ({}, {})",
                        placement.kind,
                        placement.cell.column(),
                        placement.cell.row()
                    )
                })?;
            for _ in 0..placement.upgrades {
                simulation
                    .upgrade_tower(tower)
                    .with_context(|| format!("failed to upgrade {:?} tower", placement.kind))?;
            }
        }

        simulation.start().context("scenario map is not playable")?;
        Ok(simulation)
    }
}
