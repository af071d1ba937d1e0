//! # Link Report
//!
//! Extracts identifier/URL pairs from the rows of a worksheet and summarises
//! which rows yielded a usable link.
//!
//! ## Pipeline
//!
//! - [`extract_row`]: identifier from a fixed column, URL from the primary
//!   column or, when that is empty, the secondary column
//! - [`read_range`]: ordered batch extraction over `start..end`, with a
//!   placeholder for the header row so positions follow row numbers
//! - [`build_report`]: one [`ReportRow`] per extracted row plus a
//!   [`ReportSummary`]; [`write_report`] lays it out on a [`WorkbookSink`]
//!
//! The worksheet is reached through [`TabularSource`]. [`XlsxSource`] reads
//! the first sheet of an xlsx file and [`Sheet`] holds cells in memory.
//! [`XlsxWorkbook`] writes the report as xlsx.
//!
//! ```no_run
//! use link_report::{read_range_from_file, write_report, CancelToken, ColumnLayout, XlsxWorkbook};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), link_report::LinkReportError> {
//! let links = read_range_from_file("GRI_2017_2020.xlsx", ColumnLayout::default(), 1, 100, CancelToken::new()).await?;
//! let summary = write_report(&mut XlsxWorkbook::new(), &links, Path::new("Rapport.xlsx"))?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```
mod error;
mod helpers;

pub mod bootstrap;
pub mod extractor;
pub mod layout;
pub mod range_reader;
pub mod report;
pub mod spreadsheet;

pub use bootstrap::{Bootstrap, ReportConfig};
pub use error::LinkReportError;
pub use extractor::{extract_row, extract_row_from_file, RowLink};
pub use helpers::xml::XmlError;
pub use layout::{ColumnLayout, LayoutError};
pub use range_reader::{read_range, read_range_from_file, CancelToken, RangeError};
pub use report::{build_report, build_report_with, write_report, write_report_rows, DownloadStatus, ReportRow, ReportSummary};
pub use spreadsheet::{Sheet, SpreadsheetError, TabularSource, WorkbookSink, XlsxSource, XlsxWorkbook};
