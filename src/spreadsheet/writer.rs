//! Minimal xlsx package writer backing the report sink.

use crate::error::LinkReportError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::WorkbookSink;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Writer;
use std::borrow::Cow;
use std::fs::File;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const DOCUMENT_RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const OFFICE_DOCUMENT_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const WORKSHEET_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const WORKBOOK_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const WORKSHEET_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

/// An output workbook kept in memory until [`WorkbookSink::persist`] writes it
/// as an xlsx package. Every value is stored as an inline string.
#[derive(Clone, Debug, Default)]
pub struct XlsxWorkbook {
    sheets: Vec<Sheet>,
}

impl XlsxWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the added sheets, in order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    /// Value written at `(row, col)` of the named sheet.
    pub fn cell(&self, sheet: &str, row: usize, col: usize) -> Option<&str> {
        self.sheets
            .iter()
            .find(|candidate| candidate.name == sheet)
            .and_then(|sheet| sheet.get(row, col))
            .map(|cell| cell.value.as_str())
    }

    /// Writes the package to any seekable writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<(), LinkReportError> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        self.write_content_types(&mut Writer::new(&mut zip))?;
        zip.start_file("_rels/.rels", options)?;
        write_root_relationships(&mut Writer::new(&mut zip))?;
        zip.start_file("xl/workbook.xml", options)?;
        self.write_workbook(&mut Writer::new(&mut zip))?;
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        self.write_workbook_relationships(&mut Writer::new(&mut zip))?;
        for (index, sheet) in self.sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;
            write_worksheet(&mut Writer::new(&mut zip), sheet)?;
        }

        zip.finish()?;
        Ok(())
    }

    fn write_content_types<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), LinkReportError> {
        write_declaration(writer)?;
        let mut types = BytesStart::new("Types");
        types.push_attribute(("xmlns", CONTENT_TYPES_NS));
        writer.write_event(Event::Start(types))?;

        let mut rels = BytesStart::new("Default");
        rels.push_attribute(("Extension", "rels"));
        rels.push_attribute(("ContentType", "application/vnd.openxmlformats-package.relationships+xml"));
        writer.write_event(Event::Empty(rels))?;
        let mut xml = BytesStart::new("Default");
        xml.push_attribute(("Extension", "xml"));
        xml.push_attribute(("ContentType", "application/xml"));
        writer.write_event(Event::Empty(xml))?;

        let mut workbook = BytesStart::new("Override");
        workbook.push_attribute(("PartName", "/xl/workbook.xml"));
        workbook.push_attribute(("ContentType", WORKBOOK_CONTENT_TYPE));
        writer.write_event(Event::Empty(workbook))?;
        for index in 1..=self.sheets.len() {
            let part_name = format!("/xl/worksheets/sheet{index}.xml");
            let mut worksheet = BytesStart::new("Override");
            worksheet.push_attribute(("PartName", part_name.as_str()));
            worksheet.push_attribute(("ContentType", WORKSHEET_CONTENT_TYPE));
            writer.write_event(Event::Empty(worksheet))?;
        }

        writer.write_event(Event::End(BytesEnd::new("Types")))?;
        Ok(())
    }

    fn write_workbook<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), LinkReportError> {
        write_declaration(writer)?;
        let mut workbook = BytesStart::new("workbook");
        workbook.push_attribute(("xmlns", SPREADSHEET_NS));
        workbook.push_attribute(("xmlns:r", DOCUMENT_RELATIONSHIPS_NS));
        writer.write_event(Event::Start(workbook))?;
        writer.write_event(Event::Start(BytesStart::new("sheets")))?;

        for (index, sheet) in self.sheets.iter().enumerate() {
            let sheet_id = (index + 1).to_string();
            let relationship_id = format!("rId{}", index + 1);
            let name = xml_text(&sheet.name);
            let mut element = BytesStart::new("sheet");
            element.push_attribute(("name", name.as_ref()));
            element.push_attribute(("sheetId", sheet_id.as_str()));
            element.push_attribute(("r:id", relationship_id.as_str()));
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new("sheets")))?;
        writer.write_event(Event::End(BytesEnd::new("workbook")))?;
        Ok(())
    }

    fn write_workbook_relationships<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), LinkReportError> {
        write_declaration(writer)?;
        let mut relationships = BytesStart::new("Relationships");
        relationships.push_attribute(("xmlns", RELATIONSHIPS_NS));
        writer.write_event(Event::Start(relationships))?;

        for index in 1..=self.sheets.len() {
            let id = format!("rId{index}");
            let target = format!("worksheets/sheet{index}.xml");
            write_relationship(writer, &id, WORKSHEET_TYPE, &target)?;
        }

        writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
        Ok(())
    }
}

fn write_declaration<W: Write>(writer: &mut Writer<W>) -> Result<(), LinkReportError> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(())
}

fn write_relationship<W: Write>(writer: &mut Writer<W>, id: &str, kind: &str, target: &str) -> Result<(), LinkReportError> {
    let mut relationship = BytesStart::new("Relationship");
    relationship.push_attribute(("Id", id));
    relationship.push_attribute(("Type", kind));
    relationship.push_attribute(("Target", target));
    writer.write_event(Event::Empty(relationship))?;
    Ok(())
}

fn write_root_relationships<W: Write>(writer: &mut Writer<W>) -> Result<(), LinkReportError> {
    write_declaration(writer)?;
    let mut relationships = BytesStart::new("Relationships");
    relationships.push_attribute(("xmlns", RELATIONSHIPS_NS));
    writer.write_event(Event::Start(relationships))?;
    write_relationship(writer, "rId1", OFFICE_DOCUMENT_TYPE, "xl/workbook.xml")?;
    writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
    Ok(())
}

/// Writes one worksheet part; cells sorted row-major as SpreadsheetML requires.
fn write_worksheet<W: Write>(writer: &mut Writer<W>, sheet: &Sheet) -> Result<(), LinkReportError> {
    let mut cells: Vec<&Cell> = sheet.cells().collect();
    cells.sort_by_key(|cell| (cell.row, cell.col));

    write_declaration(writer)?;
    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", SPREADSHEET_NS));
    writer.write_event(Event::Start(worksheet))?;
    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    let mut current_row = None;
    for cell in cells {
        if current_row != Some(cell.row) {
            if current_row.is_some() {
                writer.write_event(Event::End(BytesEnd::new("row")))?;
            }
            let number = cell.row.to_string();
            let mut row = BytesStart::new("row");
            row.push_attribute(("r", number.as_str()));
            writer.write_event(Event::Start(row))?;
            current_row = Some(cell.row);
        }

        let reference = cell.reference();
        let mut element = BytesStart::new("c");
        element.push_attribute(("r", reference.as_str()));
        element.push_attribute(("t", "inlineStr"));
        writer.write_event(Event::Start(element))?;
        writer.write_event(Event::Start(BytesStart::new("is")))?;
        let mut text = BytesStart::new("t");
        text.push_attribute(("xml:space", "preserve"));
        writer.write_event(Event::Start(text))?;
        writer.write_event(Event::Text(BytesText::new(&xml_text(&cell.value))))?;
        writer.write_event(Event::End(BytesEnd::new("t")))?;
        writer.write_event(Event::End(BytesEnd::new("is")))?;
        writer.write_event(Event::End(BytesEnd::new("c")))?;
    }
    if current_row.is_some() {
        writer.write_event(Event::End(BytesEnd::new("row")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(())
}

/// Drops characters XML 1.0 cannot carry, such as C0 controls other than tab,
/// line feed and carriage return.
fn xml_text(value: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
    }
    if value.chars().all(allowed) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.chars().filter(|c| allowed(*c)).collect())
    }
}

impl WorkbookSink for XlsxWorkbook {
    fn add_sheet(&mut self, name: &str) -> Result<(), LinkReportError> {
        if self.sheets.iter().any(|sheet| sheet.name.eq_ignore_ascii_case(name)) {
            Err(SpreadsheetError::DuplicateSheet { name: name.to_owned() })?
        }
        self.sheets.push(Sheet::new(name));
        Ok(())
    }

    fn write_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), LinkReportError> {
        if row == 0 || col == 0 {
            Err(SpreadsheetError::InvalidCellPosition { row, col })?
        }
        let sheet = self.sheets.last_mut().ok_or_else(|| SpreadsheetError::NoSheet {
            reference: index_to_reference(row, col),
        })?;
        sheet.push(Cell::text(row, col, value));
        Ok(())
    }

    fn persist(&mut self, path: &Path) -> Result<(), LinkReportError> {
        let file = File::create(path)?;
        self.write_to(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::xlsx::XlsxSource;
    use crate::spreadsheet::TabularSource;
    use std::io::Cursor;

    #[test]
    fn writes_require_a_sheet() {
        let mut workbook = XlsxWorkbook::new();
        let error = workbook.write_cell(1, 1, "BR_Number").unwrap_err();
        assert!(matches!(error, LinkReportError::SpreadsheetError(SpreadsheetError::NoSheet { .. })));
    }

    #[test]
    fn rejects_zero_positions_and_duplicate_sheets() {
        let mut workbook = XlsxWorkbook::new();
        workbook.add_sheet("rapport").unwrap();
        assert!(workbook.write_cell(0, 1, "x").is_err());
        assert!(workbook.add_sheet("Rapport").is_err());
    }

    #[test]
    fn keeps_written_values() {
        let mut workbook = XlsxWorkbook::new();
        workbook.add_sheet("rapport").unwrap();
        workbook.write_cell(1, 1, "BR_Number").unwrap();
        workbook.write_cell(1, 1, "BR_Number2").unwrap();

        assert_eq!(workbook.sheet_names(), vec!["rapport"]);
        assert_eq!(workbook.cell("rapport", 1, 1), Some("BR_Number2"));
        assert_eq!(workbook.cell("other", 1, 1), None);
    }

    #[test]
    fn round_trips_through_xlsx_source() {
        let mut workbook = XlsxWorkbook::new();
        workbook.add_sheet("rapport").unwrap();
        workbook.write_cell(2, 3, "http://a?x=1&y=<2>").unwrap();
        workbook.write_cell(1, 5, "Successful download").unwrap();
        workbook.write_cell(1, 1, "  BR_Number ").unwrap();

        let mut buffer = Cursor::new(Vec::new());
        workbook.write_to(&mut buffer).unwrap();
        buffer.set_position(0);
        let source = XlsxSource::from_reader(buffer, "rapport.xlsx").unwrap();

        assert_eq!(source.sheet_name(), "rapport");
        assert_eq!(source.row_count(), 2);
        assert_eq!(source.cell(1, 1).as_deref(), Some("  BR_Number "));
        assert_eq!(source.cell(1, 5).as_deref(), Some("Successful download"));
        assert_eq!(source.cell(2, 3).as_deref(), Some("http://a?x=1&y=<2>"));
    }

    #[test]
    fn persists_to_disk() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("Rapport.xlsx");
        let mut workbook = XlsxWorkbook::new();
        workbook.add_sheet("rapport").unwrap();
        workbook.write_cell(1, 1, "BR_Number").unwrap();
        workbook.persist(&path).unwrap();

        let source = XlsxSource::open(&path).unwrap();
        assert_eq!(source.cell(1, 1).as_deref(), Some("BR_Number"));
    }

    #[test]
    fn drops_characters_xml_cannot_carry() {
        assert_eq!(xml_text("http://a"), "http://a");
        assert_eq!(xml_text("http://a\u{1}b\u{1F}\tc"), "http://ab\tc");

        let mut workbook = XlsxWorkbook::new();
        workbook.add_sheet("rapport").unwrap();
        workbook.write_cell(2, 3, "http://a\u{1}?q=\u{B}1").unwrap();

        let mut buffer = Cursor::new(Vec::new());
        workbook.write_to(&mut buffer).unwrap();
        buffer.set_position(0);
        let source = XlsxSource::from_reader(buffer, "rapport.xlsx").unwrap();
        assert_eq!(source.cell(2, 3).as_deref(), Some("http://a?q=1"));
    }
}
