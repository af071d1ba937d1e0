//! Setup that sits outside the extraction core: where the input workbooks
//! live, whether they exist, and where the report goes.
use crate::error::LinkReportError;
use crate::extractor::RowLink;
use crate::layout::ColumnLayout;
use crate::range_reader::read_range_from_file;
use crate::range_reader::CancelToken;
use crate::report::write_report;
use crate::report::ReportSummary;
use crate::report::REPORT_FILE_NAME;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::XlsxSource;
use crate::spreadsheet::XlsxWorkbook;
use anyhow::Context;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;
use tracing::warn;

/// Workbook holding the 2017-2020 GRI rows with report links
pub const GRI_DATA_FILE_NAME: &str = "GRI_2017_2020.xlsx";
/// Workbook holding the 2006-2016 metadata rows
pub const METADATA_FILE_NAME: &str = "Metadata2006_2016.xlsx";

#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Workbook the link range is read from
    pub data_path: PathBuf,
    /// Companion workbook that must be present alongside the data
    pub metadata_path: PathBuf,
    /// Directory `Rapport.xlsx` is written to
    pub output_dir: PathBuf,
    pub layout: ColumnLayout,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl ReportConfig {
    /// Default file names resolved against `directory` for inputs and output.
    pub fn in_dir<P: AsRef<Path>>(directory: P) -> Self {
        let directory = directory.as_ref();
        ReportConfig {
            data_path: directory.join(GRI_DATA_FILE_NAME),
            metadata_path: directory.join(METADATA_FILE_NAME),
            output_dir: directory.to_path_buf(),
            layout: ColumnLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }
}

/// A validated configuration: both input workbooks were found.
#[derive(Clone, Debug)]
pub struct Bootstrap {
    config: ReportConfig,
}

impl Bootstrap {
    /// Checks that the configured input workbooks exist.
    ///
    /// # Errors
    /// The first missing workbook is reported as
    /// [`SpreadsheetError::SourceUnavailable`].
    pub fn new(config: ReportConfig) -> Result<Self, LinkReportError> {
        for path in [&config.data_path, &config.metadata_path] {
            if !path.is_file() {
                warn!(path = %path.display(), "input workbook not found");
                Err(SpreadsheetError::SourceUnavailable {
                    path: path.display().to_string(),
                    message: "file not found".to_owned(),
                })?
            }
        }
        Ok(Bootstrap { config })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Number of rows in the data workbook.
    pub fn row_count(&self) -> Result<usize, LinkReportError> {
        XlsxSource::row_count_of(&self.config.data_path)
    }

    /// Reads `start..end` of the data workbook.
    pub async fn read_range(&self, start: usize, end: usize, cancel: CancelToken) -> Result<Vec<RowLink>, LinkReportError> {
        read_range_from_file(self.config.data_path.clone(), self.config.layout, start, end, cancel).await
    }

    /// Reads `start..end` of the data workbook and writes the report for the
    /// data rows found there. The header placeholder is not reported.
    pub async fn run(&self, start: usize, end: usize, cancel: CancelToken) -> anyhow::Result<ReportSummary> {
        let links = self
            .read_range(start, end, cancel)
            .await
            .with_context(|| format!("Read rows {start}..{end} of '{}'", self.config.data_path.display()))?;
        let rows: Vec<RowLink> = links.into_iter().filter(|link| !link.is_placeholder()).collect();

        let path = self.config.report_path();
        let mut workbook = XlsxWorkbook::new();
        let summary = write_report(&mut workbook, &rows, &path)
            .with_context(|| format!("Write report '{}'", path.display()))?;
        info!(start, end, summary = %summary, "link report complete");
        Ok(summary)
    }
}

/// Validates `config` and runs the report over `start..end`.
pub async fn run(config: ReportConfig, start: usize, end: usize, cancel: CancelToken) -> anyhow::Result<ReportSummary> {
    let bootstrap = Bootstrap::new(config).context("Bootstrap link report")?;
    bootstrap.run(start, end, cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::TabularSource;
    use crate::spreadsheet::WorkbookSink;

    fn write_inputs(directory: &Path) {
        let mut data = XlsxWorkbook::new();
        data.add_sheet("GRI").unwrap();
        for (row, identifier, primary, secondary) in [
            (1, "H", "", ""),
            (2, "BR001", "http://a", ""),
            (3, "BR002", "", "http://b"),
        ] {
            data.write_cell(row, 1, identifier).unwrap();
            data.write_cell(row, 38, primary).unwrap();
            data.write_cell(row, 39, secondary).unwrap();
        }
        data.persist(&directory.join(GRI_DATA_FILE_NAME)).unwrap();

        let mut metadata = XlsxWorkbook::new();
        metadata.add_sheet("Metadata").unwrap();
        metadata.write_cell(1, 1, "BR_Number").unwrap();
        metadata.persist(&directory.join(METADATA_FILE_NAME)).unwrap();
    }

    #[test]
    fn default_paths() {
        let config = ReportConfig::in_dir("/data");
        assert_eq!(config.data_path, PathBuf::from("/data/GRI_2017_2020.xlsx"));
        assert_eq!(config.metadata_path, PathBuf::from("/data/Metadata2006_2016.xlsx"));
        assert_eq!(config.report_path(), PathBuf::from("/data/Rapport.xlsx"));
        assert_eq!(config.layout, ColumnLayout::default());
    }

    #[test]
    fn missing_inputs_are_unavailable() {
        let directory = tempfile::tempdir().unwrap();
        let error = Bootstrap::new(ReportConfig::in_dir(directory.path())).unwrap_err();
        assert!(error.is_source_unavailable());
        assert!(error.to_string().contains(GRI_DATA_FILE_NAME));
    }

    #[test]
    fn counts_data_rows() {
        let directory = tempfile::tempdir().unwrap();
        write_inputs(directory.path());
        let bootstrap = Bootstrap::new(ReportConfig::in_dir(directory.path())).unwrap();
        assert_eq!(bootstrap.row_count().unwrap(), 3);
    }

    #[tokio::test]
    async fn end_to_end_report() {
        let directory = tempfile::tempdir().unwrap();
        write_inputs(directory.path());
        let config = ReportConfig::in_dir(directory.path());
        let bootstrap = Bootstrap::new(config.clone()).unwrap();

        let links = bootstrap.read_range(1, 4, CancelToken::new()).await.unwrap();
        assert_eq!(links, vec![
            RowLink::header(),
            RowLink { identifier: "BR001".to_string(), url: "http://a".to_string(), has_link: true },
            RowLink { identifier: "BR002".to_string(), url: "http://b".to_string(), has_link: true },
        ]);

        let summary = run(config.clone(), 1, 4, CancelToken::new()).await.unwrap();
        assert_eq!(summary, ReportSummary { success_count: 2, total_rows: 2 });

        let report = XlsxSource::open(config.report_path()).unwrap();
        assert_eq!(report.row_count(), 3);
        assert_eq!(report.cell(2, 1).as_deref(), Some("BR001"));
        assert_eq!(report.cell(2, 2).as_deref(), Some("Downloaded"));
        assert_eq!(report.cell(2, 3).as_deref(), Some("http://a"));
        assert_eq!(report.cell(3, 1).as_deref(), Some("BR002"));
        assert_eq!(report.cell(3, 3).as_deref(), Some("http://b"));
        assert_eq!(report.cell(1, 5).as_deref(), Some("Successful download"));
        assert_eq!(report.cell(2, 5).as_deref(), Some("2 / 2"));
    }

    #[tokio::test]
    async fn run_reports_invalid_range() {
        let directory = tempfile::tempdir().unwrap();
        write_inputs(directory.path());
        let error = run(ReportConfig::in_dir(directory.path()), 5, 3, CancelToken::new()).await.unwrap_err();
        let cause = error.downcast_ref::<LinkReportError>().unwrap();
        assert!(cause.is_invalid_range());
        assert!(!directory.path().join(REPORT_FILE_NAME).exists());
    }
}
