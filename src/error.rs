use thiserror::Error;

/// Main error type for the link report crate.
/// Aggregates errors from the standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum LinkReportError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    #[error("{0}")]
    JoinError(#[from] tokio::task::JoinError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Core module errors
    #[error("{0}")]
    LayoutError(#[from] crate::layout::LayoutError),

    #[error("{0}")]
    RangeError(#[from] crate::range_reader::RangeError),
}

impl LinkReportError {
    /// True when a range read was rejected because `start >= end`.
    pub fn is_invalid_range(&self) -> bool {
        matches!(self, Self::RangeError(crate::range_reader::RangeError::InvalidRange { .. }))
    }

    /// True when the backing workbook could not be opened or read.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Self::SpreadsheetError(crate::spreadsheet::SpreadsheetError::SourceUnavailable { .. }))
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, LinkReportError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| LinkReportError::WithContextError(format!("{}: {}", message, e)))
    }
}
