#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides whether a grid forms a single navigable corridor.
//!
//! A grid is valid when it holds exactly one entry and one exit, the exit is
//! reachable from the entry over walkable cells, and the walkable region
//! reachable from the entry neither branches nor ends anywhere but the exit.

use critter_defence_core::{CellCoord, CellKind, GridView, ValidationError};

/// Path validator that reuses its traversal buffers between runs.
#[derive(Debug, Default)]
pub struct PathValidator {
    visited: Vec<bool>,
    stack: Vec<CellCoord>,
}

impl PathValidator {
    /// Creates a new validator with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the provided grid.
    ///
    /// Checks run in order: entry count, exit count, connectivity, then the
    /// dead-end traversal. The first failing check determines the error.
    pub fn validate(&mut self, grid: GridView<'_>) -> Result<(), ValidationError> {
        let mut entries = grid
            .iter()
            .filter(|(_, kind)| *kind == CellKind::Entry)
            .map(|(cell, _)| cell);
        let entry = entries.next();
        let entry_count = usize::from(entry.is_some()) + entries.count();
        let exit_count = grid
            .iter()
            .filter(|(_, kind)| *kind == CellKind::Exit)
            .count();

        let entry = match entry {
            Some(cell) if entry_count == 1 => cell,
            _ => {
                return Err(ValidationError::MultipleOrMissingEntry { count: entry_count });
            }
        };
        if exit_count != 1 {
            return Err(ValidationError::MultipleOrMissingExit { count: exit_count });
        }

        if !self.reaches_exit(&grid, entry) {
            return Err(ValidationError::Disconnected);
        }

        match self.first_dead_end(&grid, entry) {
            Some(cell) => Err(ValidationError::BranchingOrDeadEnd { cell }),
            None => Ok(()),
        }
    }

    fn reaches_exit(&mut self, grid: &GridView<'_>, entry: CellCoord) -> bool {
        self.reset(grid, entry);
        while let Some(cell) = self.stack.pop() {
            if grid.kind(cell) == Some(CellKind::Exit) {
                return true;
            }
            let _ = self.push_unvisited_neighbors(grid, cell);
        }
        false
    }

    fn first_dead_end(&mut self, grid: &GridView<'_>, entry: CellCoord) -> Option<CellCoord> {
        self.reset(grid, entry);
        while let Some(cell) = self.stack.pop() {
            let discovered = self.push_unvisited_neighbors(grid, cell);
            if discovered == 0 && grid.kind(cell) != Some(CellKind::Exit) {
                return Some(cell);
            }
        }
        None
    }

    fn reset(&mut self, grid: &GridView<'_>, entry: CellCoord) {
        let (columns, rows) = grid.dimensions();
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        self.visited.clear();
        self.visited.resize(capacity, false);
        self.stack.clear();
        let _ = self.mark(grid, entry);
        self.stack.push(entry);
    }

    /// Pushes walkable, unvisited neighbours and returns how many were pushed.
    fn push_unvisited_neighbors(&mut self, grid: &GridView<'_>, cell: CellCoord) -> usize {
        let mut discovered = 0;
        for neighbor in grid.neighbors(cell) {
            let walkable = grid.kind(neighbor).is_some_and(CellKind::is_walkable);
            if walkable && self.mark(grid, neighbor) {
                self.stack.push(neighbor);
                discovered += 1;
            }
        }
        discovered
    }

    /// Marks a cell visited. Returns `false` if it already was.
    fn mark(&mut self, grid: &GridView<'_>, cell: CellCoord) -> bool {
        let (columns, _) = grid.dimensions();
        let index = cell.row() as usize * columns as usize + cell.column() as usize;
        match self.visited.get_mut(index) {
            Some(slot) if !*slot => {
                *slot = true;
                true
            }
            _ => false,
        }
    }
}

/// Validates a grid using a throwaway [`PathValidator`].
pub fn validate(grid: GridView<'_>) -> Result<(), ValidationError> {
    PathValidator::new().validate(grid)
}
