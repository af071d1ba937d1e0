//! Aggregation of extracted rows into the download report.
//!
//! [`build_report`] only produces data. [`write_report_rows`] owns the
//! physical layout on a [`WorkbookSink`]:
//!
//! | row | A         | B               | C   | D | E                     |
//! |-----|-----------|-----------------|-----|---|-----------------------|
//! | 1   | BR_Number | Download Status | URL |   | Successful download   |
//! | 2.. | id        | status          | url |   | `{success} / {total}` |
use crate::error::LinkReportError;
use crate::extractor::RowLink;
use crate::spreadsheet::WorkbookSink;
use std::fmt::Display;
use std::path::Path;
use tracing::info;

pub const HEADER_LABELS: [&str; 3] = ["BR_Number", "Download Status", "URL"];
pub const SUMMARY_LABEL: &str = "Successful download";
pub const SUMMARY_COLUMN: usize = 5;
pub const FIRST_DATA_ROW: usize = 2;
pub const REPORT_SHEET_NAME: &str = "rapport";
pub const REPORT_FILE_NAME: &str = "Rapport.xlsx";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DownloadStatus {
    Downloaded,
    Failed,
}

impl DownloadStatus {
    pub const fn from_success(success: bool) -> Self {
        if success {
            Self::Downloaded
        } else {
            Self::Failed
        }
    }

    /// Label written to the report.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Downloaded => "Downloaded",
            Self::Failed => "Failed to download",
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Downloaded)
    }
}

impl Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output line: identifier, status, URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub identifier: String,
    pub status: DownloadStatus,
    pub url: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub success_count: usize,
    /// Number of report rows produced
    pub total_rows: usize,
}

impl Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.success_count, self.total_rows)
    }
}

/// Builds one report row per input, using `has_link` as the success signal.
pub fn build_report(rows: &[RowLink]) -> (Vec<ReportRow>, ReportSummary) {
    build_report_with(rows, |row| row.has_link)
}

/// Builds one report row per input, asking `downloaded` whether each row's
/// download succeeded.
pub fn build_report_with<F>(rows: &[RowLink], mut downloaded: F) -> (Vec<ReportRow>, ReportSummary)
where
    F: FnMut(&RowLink) -> bool,
{
    let mut summary = ReportSummary::default();
    let report = rows
        .iter()
        .map(|row| {
            let status = DownloadStatus::from_success(downloaded(row));
            if status.is_success() {
                summary.success_count += 1;
            }
            ReportRow {
                identifier: row.identifier.to_owned(),
                status,
                url: row.url.to_owned(),
            }
        })
        .collect::<Vec<_>>();
    summary.total_rows = report.len();
    (report, summary)
}

/// Lays the report out on a fresh sheet of `sink` and persists it to `path`.
pub fn write_report_rows<W: WorkbookSink + ?Sized>(
    sink: &mut W,
    rows: &[ReportRow],
    summary: &ReportSummary,
    path: &Path,
) -> Result<(), LinkReportError> {
    sink.add_sheet(REPORT_SHEET_NAME)?;
    for (index, label) in HEADER_LABELS.iter().enumerate() {
        sink.write_cell(1, index + 1, label)?;
    }
    for (offset, row) in rows.iter().enumerate() {
        let line = FIRST_DATA_ROW + offset;
        sink.write_cell(line, 1, &row.identifier)?;
        sink.write_cell(line, 2, row.status.as_str())?;
        sink.write_cell(line, 3, &row.url)?;
    }
    sink.write_cell(1, SUMMARY_COLUMN, SUMMARY_LABEL)?;
    sink.write_cell(2, SUMMARY_COLUMN, &summary.to_string())?;
    sink.persist(path)?;
    info!(path = %path.display(), summary = %summary, "report written");
    Ok(())
}

/// Builds the report from `rows` and writes it to `sink` at `path`.
pub fn write_report<W: WorkbookSink + ?Sized>(
    sink: &mut W,
    rows: &[RowLink],
    path: &Path,
) -> Result<ReportSummary, LinkReportError> {
    let (report, summary) = build_report(rows);
    write_report_rows(sink, &report, &summary, path)?;
    Ok(summary)
}
