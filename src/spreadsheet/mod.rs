//! # Spreadsheet Access Module
//!
//! Rectangular cell access over a single worksheet, plus the workbook sink the
//! report is written to. Two seams are defined here:
//!
//! - [`TabularSource`]: 1-based `cell(row, col)` lookups and a row count. The
//!   in-memory [`Sheet`] and the xlsx-backed [`XlsxSource`] implement it.
//! - [`WorkbookSink`]: add a sheet, write cells, persist to a path.
//!   [`XlsxWorkbook`] implements it.
use crate::error::LinkReportError;
use std::path::Path;
use thiserror::Error;

pub(crate) mod cell;
pub(crate) mod excel;
pub mod reference;
pub(crate) mod sheet;
pub(crate) mod writer;
pub(crate) mod xlsx;

pub use cell::{Cell, CellType};
pub use sheet::Sheet;
pub use writer::XlsxWorkbook;
pub use xlsx::XlsxSource;

/// Errors raised while opening, reading, or writing workbooks.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Backing workbook cannot be opened or read
    #[error("Source '{path}' is unavailable: {message}")]
    SourceUnavailable { path: String, message: String },

    /// A required part is missing from the xlsx package
    #[error("Missing package part '{path}'")]
    MissingPart { path: String },

    /// The workbook declares no worksheets
    #[error("Workbook '{path}' contains no worksheets")]
    EmptyWorkbook { path: String },

    /// A cell was written before any sheet was added
    #[error("No sheet to write cell {reference} to")]
    NoSheet { reference: String },

    /// Cells are 1-based; row or column 0 cannot be written
    #[error("Invalid cell position ({row}, {col})")]
    InvalidCellPosition { row: usize, col: usize },

    /// A sheet with the same name already exists
    #[error("Sheet '{name}' already exists")]
    DuplicateSheet { name: String },
}

/// Read access to a single worksheet.
///
/// Rows and columns are 1-based. Out-of-range and empty positions return
/// `None`; a lookup never fails.
pub trait TabularSource {
    /// String-converted value at `(row, col)`, `None` when absent.
    fn cell(&self, row: usize, col: usize) -> Option<String>;

    /// Number of the last row holding data, 0 for an empty sheet.
    fn row_count(&self) -> usize;
}

impl<T: TabularSource + ?Sized> TabularSource for &T {
    fn cell(&self, row: usize, col: usize) -> Option<String> {
        (**self).cell(row, col)
    }

    fn row_count(&self) -> usize {
        (**self).row_count()
    }
}

/// Write access to an output workbook.
pub trait WorkbookSink {
    /// Adds a sheet; subsequent writes target it.
    fn add_sheet(&mut self, name: &str) -> Result<(), LinkReportError>;

    /// Writes a string value at 1-based `(row, col)` of the current sheet.
    fn write_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), LinkReportError>;

    /// Saves the workbook to `path`.
    fn persist(&mut self, path: &Path) -> Result<(), LinkReportError>;
}
