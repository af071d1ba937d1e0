use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::TabularSource;
use std::collections::HashMap;

/// A worksheet held in memory, cells stored in insertion order with a
/// position index for random access.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    /// Sheet name
    pub name: String,
    /// All non-empty cells
    cells: Vec<Cell>,
    /// (row, col) => position in `cells`
    indexes: HashMap<(usize, usize), usize>,
    /// Actual data range (determined from cell data)
    pub row_lower_bound: Option<usize>,
    pub row_upper_bound: Option<usize>,
    pub col_lower_bound: Option<usize>,
    pub col_upper_bound: Option<usize>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Sheet {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Builds a sheet from 1-based `(row, col, value)` triples.
    pub fn from_values<'a, I>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, &'a str)>,
    {
        let mut sheet = Sheet::new(name);
        for (row, col, value) in values {
            sheet.push(Cell::text(row, col, value));
        }
        sheet
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Adds a cell, replacing any previous cell at the same position.
    /// Cells at row or column 0 are ignored.
    pub fn push(&mut self, cell: Cell) {
        if cell.row == 0 || cell.col == 0 {
            return;
        }
        self.update_bound(cell.row, cell.col);
        match self.indexes.get(&(cell.row, cell.col)) {
            Some(index) => self.cells[*index] = cell,
            None => {
                self.indexes.insert((cell.row, cell.col), self.cells.len());
                self.cells.push(cell);
            }
        }
    }

    /// Gets the cell at a 1-based position.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.indexes
            .get(&(row, col))
            .and_then(|index| self.cells.get(*index))
    }

    /// Iterates cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Updates the data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|lower| row < lower).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|upper| upper < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|lower| col < lower).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|upper| upper < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }
}

impl TabularSource for Sheet {
    fn cell(&self, row: usize, col: usize) -> Option<String> {
        self.get(row, col).map(|cell| cell.to_string())
    }

    fn row_count(&self) -> usize {
        self.row_upper_bound.unwrap_or(0)
    }
}
