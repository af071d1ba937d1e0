//! Column layout of the link worksheet.
//!
//! The identifier and URL columns are fixed positions of the source layout.
//! They live here as named constants so a differently shaped workbook only
//! needs a different [`ColumnLayout`].
use crate::spreadsheet::reference::col_to_index;
use crate::spreadsheet::reference::index_to_col;
use thiserror::Error;

/// Column A: BR number
pub const IDENTIFIER_COLUMN: usize = 1;
/// Column AL: report URL
pub const PRIMARY_URL_COLUMN: usize = 38;
/// Column AM: fallback report URL
pub const SECONDARY_URL_COLUMN: usize = 39;
/// Row holding the column titles
pub const HEADER_ROW: usize = 1;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid column letters '{0}'")]
    InvalidColumn(String),

    #[error("Column numbers are 1-based, got 0 for the {0} column")]
    ZeroColumn(&'static str),
}

/// Positions of the columns a row is extracted from, and where the header is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    pub identifier: usize,
    pub primary_url: usize,
    pub secondary_url: usize,
    /// `None` when the sheet has no header row
    pub header_row: Option<usize>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        ColumnLayout {
            identifier: IDENTIFIER_COLUMN,
            primary_url: PRIMARY_URL_COLUMN,
            secondary_url: SECONDARY_URL_COLUMN,
            header_row: Some(HEADER_ROW),
        }
    }
}

impl ColumnLayout {
    /// Builds a layout from 1-based column numbers.
    pub fn new(identifier: usize, primary_url: usize, secondary_url: usize) -> Result<Self, LayoutError> {
        for (column, role) in [(identifier, "identifier"), (primary_url, "primary URL"), (secondary_url, "secondary URL")] {
            if column == 0 {
                return Err(LayoutError::ZeroColumn(role));
            }
        }
        Ok(ColumnLayout {
            identifier,
            primary_url,
            secondary_url,
            header_row: Some(HEADER_ROW),
        })
    }

    /// Builds a layout from column letters, e.g. `("A", "AL", "AM")`.
    pub fn from_letters(identifier: &str, primary_url: &str, secondary_url: &str) -> Result<Self, LayoutError> {
        let parse = |letters: &str| col_to_index(letters).ok_or_else(|| LayoutError::InvalidColumn(letters.to_owned()));
        Self::new(parse(identifier)?, parse(primary_url)?, parse(secondary_url)?)
    }

    pub fn with_header_row(mut self, row: usize) -> Self {
        self.header_row = Some(row).filter(|row| *row > 0);
        self
    }

    pub fn without_header_row(mut self) -> Self {
        self.header_row = None;
        self
    }

    /// True when `row` is the header slot that is never read from the source.
    pub fn is_header_row(&self, row: usize) -> bool {
        self.header_row == Some(row)
    }

    /// Column letters as `(identifier, primary, secondary)`, for log output.
    pub fn letters(&self) -> (String, String, String) {
        (
            index_to_col(self.identifier),
            index_to_col(self.primary_url),
            index_to_col(self.secondary_url),
        )
    }
}
