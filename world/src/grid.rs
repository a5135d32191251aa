//! Cell storage for the playing field.

use critter_defence_core::{CellCoord, CellKind, GridView};

/// Row-major grid of cell kinds with remembered entry and exit coordinates.
#[derive(Clone, Debug)]
pub(crate) struct GridMap {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
    entry: Option<CellCoord>,
    exit: Option<CellCoord>,
}

impl GridMap {
    /// Creates a grid of the given dimensions filled with scenery.
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![CellKind::Scenery; capacity],
            entry: None,
            exit: None,
        }
    }

    pub(crate) const fn columns(&self) -> u32 {
        self.columns
    }

    pub(crate) const fn rows(&self) -> u32 {
        self.rows
    }

    pub(crate) const fn entry(&self) -> Option<CellCoord> {
        self.entry
    }

    pub(crate) const fn exit(&self) -> Option<CellCoord> {
        self.exit
    }

    pub(crate) fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites a single cell. Returns `false` when the cell is out of range.
    ///
    /// Writing an entry or exit kind remembers the cell. Overwriting the
    /// remembered entry or exit falls back to the first remaining cell of
    /// that kind in row-major order, if any.
    pub(crate) fn set_cell(&mut self, cell: CellCoord, kind: CellKind) -> bool {
        match self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            Some(slot) => *slot = kind,
            None => return false,
        }

        match kind {
            CellKind::Entry => self.entry = Some(cell),
            CellKind::Exit => self.exit = Some(cell),
            CellKind::Path | CellKind::Scenery => {}
        }
        if self.entry == Some(cell) && kind != CellKind::Entry {
            self.entry = self.first_of(CellKind::Entry);
        }
        if self.exit == Some(cell) && kind != CellKind::Exit {
            self.exit = self.first_of(CellKind::Exit);
        }
        true
    }

    /// Marks the entry cell. A previously placed entry keeps its kind.
    pub(crate) fn set_entry(&mut self, cell: CellCoord) -> bool {
        self.set_cell(cell, CellKind::Entry)
    }

    /// Marks the exit cell. A previously placed exit keeps its kind.
    pub(crate) fn set_exit(&mut self, cell: CellCoord) -> bool {
        self.set_cell(cell, CellKind::Exit)
    }

    fn first_of(&self, kind: CellKind) -> Option<CellCoord> {
        self.view()
            .iter()
            .find(|(_, candidate)| *candidate == kind)
            .map(|(cell, _)| cell)
    }

    pub(crate) fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.columns, self.rows, self.entry, self.exit)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
