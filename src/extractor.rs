//! Per-row extraction of the identifier and report URL.
use crate::error::LinkReportError;
use crate::layout::ColumnLayout;
use crate::spreadsheet::TabularSource;
use crate::spreadsheet::XlsxSource;
use std::path::Path;

/// The identifier and URL found on one worksheet row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowLink {
    /// Identifier column value, empty when the cell is absent
    pub identifier: String,
    /// First non-empty of the primary and secondary URL columns, else empty
    pub url: String,
    /// True for data rows that went through extraction, false for the header slot
    pub has_link: bool,
}

impl RowLink {
    /// The slot reserved for the header row. Never read from the source.
    pub fn header() -> Self {
        RowLink::default()
    }

    /// True for the header slot produced by [`RowLink::header`].
    pub fn is_placeholder(&self) -> bool {
        !self.has_link && self.identifier.is_empty() && self.url.is_empty()
    }
}

/// Extracts the identifier and URL of `row`.
///
/// The URL is the primary column value when non-empty, otherwise the
/// secondary column value when non-empty, otherwise `""`. Absent cells read
/// as empty strings.
pub fn extract_row<S: TabularSource + ?Sized>(source: &S, layout: &ColumnLayout, row: usize) -> RowLink {
    let identifier = source.cell(row, layout.identifier).unwrap_or_default();
    let url = [layout.primary_url, layout.secondary_url]
        .into_iter()
        .find_map(|col| source.cell(row, col).filter(|value| !value.is_empty()))
        .unwrap_or_default();
    RowLink {
        identifier,
        url,
        has_link: true,
    }
}

/// Opens the workbook at `path`, extracts one row, and releases the workbook.
pub fn extract_row_from_file<P: AsRef<Path>>(path: P, layout: &ColumnLayout, row: usize) -> Result<RowLink, LinkReportError> {
    let source = XlsxSource::open(path)?;
    Ok(extract_row(&source, layout, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::Cell;
    use crate::spreadsheet::CellType;
    use crate::spreadsheet::Sheet;
    use crate::spreadsheet::WorkbookSink;
    use crate::spreadsheet::XlsxWorkbook;

    fn layout() -> ColumnLayout {
        ColumnLayout::new(1, 2, 3).unwrap()
    }

    #[test]
    fn primary_url_wins() {
        let sheet = Sheet::from_values("data", [(2, 1, "BR001"), (2, 2, "http://a"), (2, 3, "http://b")]);
        let link = extract_row(&sheet, &layout(), 2);
        assert_eq!(link, RowLink {
            identifier: "BR001".to_string(),
            url: "http://a".to_string(),
            has_link: true,
        });
    }

    #[test]
    fn falls_back_to_secondary_url() {
        let sheet = Sheet::from_values("data", [(2, 1, "BR002"), (2, 2, ""), (2, 3, "http://b")]);
        assert_eq!(extract_row(&sheet, &layout(), 2).url, "http://b");

        let sheet = Sheet::from_values("data", [(2, 1, "BR002"), (2, 3, "http://b")]);
        assert_eq!(extract_row(&sheet, &layout(), 2).url, "http://b");
    }

    #[test]
    fn date_typed_identifier_out_of_range() {
        let mut sheet = Sheet::from_values("data", [(2, 2, "http://a")]);
        sheet.push(Cell {
            row: 2,
            col: 1,
            kind: CellType::NumberDate1900,
            value: "1e9".to_owned(),
        });
        let link = extract_row(&sheet, &layout(), 2);
        assert_eq!(link.identifier, "1e9");
        assert_eq!(link.url, "http://a");
    }

    #[test]
    fn both_urls_empty() {
        let sheet = Sheet::from_values("data", [(2, 1, "BR003"), (2, 2, "")]);
        let link = extract_row(&sheet, &layout(), 2);
        assert_eq!(link.url, "");
        assert!(link.has_link);
    }

    #[test]
    fn whitespace_counts_as_content() {
        let sheet = Sheet::from_values("data", [(2, 2, " "), (2, 3, "http://b")]);
        assert_eq!(extract_row(&sheet, &layout(), 2).url, " ");
    }

    #[test]
    fn absent_row_is_empty_not_error() {
        let sheet = Sheet::new("data");
        let link = extract_row(&sheet, &layout(), 500);
        assert_eq!(link.identifier, "");
        assert_eq!(link.url, "");
        assert!(!link.is_placeholder());
    }

    #[test]
    fn extraction_is_idempotent() {
        let sheet = Sheet::from_values("data", [(4, 1, "BR004"), (4, 3, "http://c")]);
        assert_eq!(extract_row(&sheet, &layout(), 4), extract_row(&sheet, &layout(), 4));
    }

    #[test]
    fn default_layout_reads_al_then_am() {
        let sheet = Sheet::from_values("GRI", [(2, 1, "BR001"), (2, 39, "http://am"), (3, 1, "BR002"), (3, 38, "http://al"), (3, 39, "http://am")]);
        let layout = ColumnLayout::default();
        assert_eq!(extract_row(&sheet, &layout, 2).url, "http://am");
        assert_eq!(extract_row(&sheet, &layout, 3).url, "http://al");
    }

    #[test]
    fn header_placeholder() {
        assert!(RowLink::header().is_placeholder());
        assert!(!RowLink::header().has_link);
    }

    #[test]
    fn extracts_from_file() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("GRI_2017_2020.xlsx");
        let mut workbook = XlsxWorkbook::new();
        workbook.add_sheet("GRI").unwrap();
        workbook.write_cell(2, 1, "BR001").unwrap();
        workbook.write_cell(2, 3, "http://b").unwrap();
        workbook.persist(&path).unwrap();

        let link = extract_row_from_file(&path, &layout(), 2).unwrap();
        assert_eq!(link.identifier, "BR001");
        assert_eq!(link.url, "http://b");

        let missing = extract_row_from_file(directory.path().join("missing.xlsx"), &layout(), 2);
        assert!(missing.unwrap_err().is_source_unavailable());
    }
}
