use crate::error::LinkReportError;
use crate::error::ResultMessage;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::reference::row_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::TabularSource;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

// XML tag names of the SpreadsheetML parts
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr");
const TAG_SHEET: QName = QName(b"sheet");
const TAG_ROW: QName = QName(b"row");
const TAG_CELL: QName = QName(b"c");
const TAG_INLINE_STRING: QName = QName(b"is");
const TAG_VALUE: QName = QName(b"v");

/// The first worksheet of an xlsx file, loaded into memory.
///
/// The file handle is only held inside [`XlsxSource::open`]; once it returns
/// the package is closed and lookups are served from memory.
#[derive(Clone, Debug)]
pub struct XlsxSource {
    /// Path the workbook was read from
    pub path: String,
    sheet: Sheet,
}

impl XlsxSource {
    /// Opens an xlsx workbook and loads its first worksheet.
    ///
    /// # Errors
    /// Any failure to open or parse the package is reported as
    /// [`SpreadsheetError::SourceUnavailable`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<XlsxSource, LinkReportError> {
        let path = path.as_ref().to_string_lossy().to_string();
        debug!(path = %path, "opening xlsx source");
        let sheet = File::open(&path)
            .map_err(LinkReportError::from)
            .and_then(|file| load_first_sheet(BufReader::new(file), &path))
            .map_err(|error| SpreadsheetError::SourceUnavailable {
                path: path.to_owned(),
                message: error.to_string(),
            })?;
        debug!(path = %path, sheet = %sheet.name, rows = sheet.row_count(), "loaded xlsx source");
        Ok(XlsxSource { path, sheet })
    }

    /// Loads a workbook from any seekable reader, e.g. an in-memory buffer.
    pub fn from_reader<RS: Read + Seek>(reader: RS, name: &str) -> Result<XlsxSource, LinkReportError> {
        let sheet = load_first_sheet(reader, name)?;
        Ok(XlsxSource {
            path: name.to_owned(),
            sheet,
        })
    }

    /// Counts the rows of the first worksheet of the workbook at `path`.
    pub fn row_count_of<P: AsRef<Path>>(path: P) -> Result<usize, LinkReportError> {
        Ok(Self::open(path)?.row_count())
    }

    /// Name of the loaded worksheet.
    pub fn sheet_name(&self) -> &str {
        &self.sheet.name
    }

    /// The loaded worksheet.
    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }
}

impl TabularSource for XlsxSource {
    fn cell(&self, row: usize, col: usize) -> Option<String> {
        self.sheet.cell(row, col)
    }

    fn row_count(&self) -> usize {
        self.sheet.row_count()
    }
}

fn load_first_sheet<RS: Read + Seek>(reader: RS, name: &str) -> Result<Sheet, LinkReportError> {
    let mut zip = ZipArchive::new(reader)?;
    let (sheets, is_1904) = load_workbook(&mut zip).with_prefix("Load workbook")?;
    let (sheet_name, zip_path) = sheets
        .into_iter()
        .next()
        .ok_or_else(|| SpreadsheetError::EmptyWorkbook { path: name.to_owned() })?;
    let number_formats = load_number_formats(&mut zip, is_1904).with_prefix("Load styles")?;
    let shared_strings = load_shared_strings(&mut zip).with_prefix("Load shared strings")?;
    read_sheet(&mut zip, &sheet_name, &zip_path, &number_formats, &shared_strings)
        .with_prefix(&format!("Read sheet '{sheet_name}'"))
}

/// Loads workbook structure: worksheet (name, zip_path) pairs in workbook order
/// and whether the 1904 date system is used.
fn load_workbook<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<(Vec<(String, String)>, bool), LinkReportError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::MissingPart { path: "xl/workbook.xml".to_string() })?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&*id) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Loads number formats from styles.xml, indexed by style ID
fn load_number_formats<RS: Read + Seek>(zip: &mut ZipArchive<RS>, is_1904: bool) -> Result<Vec<CellType>, LinkReportError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                custom_formats.insert(id.to_string(), CellType::parse_custom_number_format(&format, is_1904));
            }
        }
        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => break,
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let id = event.get_attribute_value("numFmtId")?;
            format_indexes.push(id.map(|id| id.to_string()).unwrap_or_else(|| "0".to_string()));
        }
    });

    Ok(excel::load_number_formats(format_indexes, custom_formats, is_1904))
}

/// Loads the shared string table, empty when the part is absent
fn load_shared_strings<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, LinkReportError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            shared_strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(shared_strings)
}

/// Reads every non-empty cell of one worksheet part
fn read_sheet<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    sheet_name: &str,
    zip_path: &str,
    number_formats: &[CellType],
    shared_strings: &[String],
) -> Result<Sheet, LinkReportError> {
    let mut sheet = Sheet::new(sheet_name);
    let mut reader = zip.xml_reader(zip_path)?
        .ok_or_else(|| SpreadsheetError::MissingPart { path: zip_path.to_owned() })?;
    let mut row_count = 0usize;
    let mut col_count = 0usize;
    let mut row = 0usize;
    let mut col = 0usize;
    let mut kind = CellType::default();
    let mut value = String::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_ROW => {
            row_count = event.get_attribute_value("r")?
                .and_then(|reference| row_to_index(&reference))
                .unwrap_or(row_count + 1);
            col_count = 0;
        }
        Event::Start(event) if event.name() == TAG_CELL => {
            (row, col) = event.get_attribute_value("r")?
                .and_then(|reference| reference_to_index(&reference))
                .unwrap_or((row_count, col_count + 1));
            col_count = col;
            value.clear();
            kind = event.get_attribute_value("t")?.map(|t| {
                match t.as_ref() {
                    "inlineStr" | "str" => CellType::InlineString,
                    "s" => CellType::SharedString,
                    "d" => CellType::IsoDateTime,
                    "b" => CellType::Boolean,
                    "e" => CellType::Error,
                    _ => CellType::Number,
                }
            }).unwrap_or(CellType::Number);
            if let Some(format_id) = event.get_attribute_value("s")? {
                if kind == CellType::Number && !format_id.is_empty() {
                    let index = format_id.parse::<usize>()?;
                    kind = number_formats.get(index).copied().unwrap_or(CellType::Number);
                }
            }
        }
        Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
            value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
        }
        Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
            value = read_string_value(&mut reader, TAG_VALUE, true)?;
        }
        Event::End(event) if event.name() == TAG_CELL => {
            if kind == CellType::SharedString && !value.is_empty() {
                let index = value.parse::<usize>()?;
                value = shared_strings.get(index).cloned().unwrap_or_default();
            }
            if kind != CellType::Empty && !value.is_empty() {
                sheet.push(Cell {
                    row,
                    col,
                    kind,
                    value: std::mem::take(&mut value),
                });
            }
            kind = CellType::Empty;
        }
    });
    Ok(sheet)
}

/// Reads a string value, skipping phonetic annotations
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, LinkReportError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = is_text_content,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
