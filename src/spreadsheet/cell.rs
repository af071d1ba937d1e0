use crate::error::LinkReportError;
use crate::spreadsheet::reference::index_to_reference;
use chrono::Duration;
use chrono::NaiveDate;
use std::fmt::Display;

/// Types of cell data in xlsx worksheets.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 0/1
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as day fractions
    NumberTime,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references, resolved while loading
    SharedString,
    /// Error values such as `#N/A`
    Error,
}

impl CellType {
    /// Parses built-in number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(Self::NumberTime),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Analyzes format codes for date/time patterns.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_escaped => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_literal && !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_color && !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, _) => Self::NumberTime,
            (false, false, _) => Self::Number,
        }
    }
}

/// A single worksheet cell with 1-based position, type, and raw value.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub kind: CellType,
    /// Raw value; shared strings are already resolved to their text
    pub value: String,
}

impl Cell {
    /// Creates a plain text cell.
    pub fn text(row: usize, col: usize, value: impl Into<String>) -> Self {
        Cell {
            row,
            col,
            kind: CellType::InlineString,
            value: value.into(),
        }
    }

    /// Returns the A1-style reference of this cell (e.g. "AL2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    fn render(&self) -> Result<String, LinkReportError> {
        let value = match self.kind {
            CellType::Boolean => if self.value == "1" { "TRUE" } else { "FALSE" }.to_owned(),
            CellType::NumberDateTime1900 => to_datetime_string(&self.value, false)?,
            CellType::NumberDateTime1904 => to_datetime_string(&self.value, true)?,
            CellType::NumberDate1900 => to_date_string(&self.value, false)?,
            CellType::NumberDate1904 => to_date_string(&self.value, true)?,
            CellType::NumberTime => to_time_string(&self.value)?,
            CellType::IsoDateTime => self.value.replace('T', " "),
            _ => self.value.to_owned(),
        };
        Ok(value)
    }
}

impl Display for Cell {
    /// Renders the value the way a spreadsheet user would read it; date-typed
    /// numbers that fail to convert fall back to the raw value.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.render() {
            Ok(value) => write!(f, "{}", value),
            Err(_) => write!(f, "{}", self.value),
        }
    }
}

/// Converts a numeric date to an ISO date string.
/// Handles the Lotus 1-2-3 leap year bug for the 1900 epoch.
fn to_date_string(value: &str, is_1904: bool) -> Result<String, LinkReportError> {
    let out_of_range = || LinkReportError::WithContextError(format!("Date serial '{value}' is out of range"));
    let serial = value.parse::<f64>()?.trunc();
    if !serial.is_finite() || serial.abs() > i64::MAX as f64 {
        return Err(out_of_range());
    }
    let days = serial as i64;
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let duration = days.checked_add(offset).and_then(Duration::try_days).ok_or_else(out_of_range)?;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).ok_or_else(|| {
        LinkReportError::WithContextError("Invalid date epoch".to_owned())
    })?;
    let date = epoch.checked_add_signed(duration).ok_or_else(out_of_range)?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Converts a numeric day fraction to an ISO time string.
fn to_time_string(value: &str) -> Result<String, LinkReportError> {
    let factor = value.parse::<f64>()?.fract();
    let mut hours = (factor * 86_400_000f64).round() as i64;
    let milliseconds = hours % 1_000; hours /= 1_000;
    let seconds = hours % 60; hours /= 60;
    let minutes = hours % 60; hours /= 60;
    let timestamp = if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    };
    Ok(timestamp)
}

/// Converts a numeric datetime to an ISO datetime string.
fn to_datetime_string(value: &str, is_1904: bool) -> Result<String, LinkReportError> {
    let date = to_date_string(value, is_1904)?;
    let time = to_time_string(value)?;
    Ok(format!("{date} {time}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            row: 2,
            col: 38,
            kind,
            value: value.to_owned(),
        }
    }

    #[test]
    fn renders_plain_values() {
        assert_eq!(cell(CellType::InlineString, "http://a").to_string(), "http://a");
        assert_eq!(cell(CellType::Number, "42").to_string(), "42");
        assert_eq!(cell(CellType::Boolean, "1").to_string(), "TRUE");
        assert_eq!(cell(CellType::Boolean, "0").to_string(), "FALSE");
        assert_eq!(cell(CellType::Error, "#N/A").to_string(), "#N/A");
    }

    #[test]
    fn out_of_range_dates_fall_back_to_raw_value() {
        assert_eq!(cell(CellType::NumberDate1900, "1e9").to_string(), "1e9");
        assert_eq!(cell(CellType::NumberDate1904, "-1e300").to_string(), "-1e300");
        assert_eq!(cell(CellType::NumberDateTime1900, "inf").to_string(), "inf");
        assert_eq!(cell(CellType::NumberDate1900, "NaN").to_string(), "NaN");
        assert!(to_date_string("1e9", false).is_err());
    }

    #[test]
    fn renders_dates_and_times() {
        assert_eq!(cell(CellType::NumberDate1900, "44927").to_string(), "2023-01-01");
        assert_eq!(cell(CellType::NumberDate1904, "0").to_string(), "1904-01-01");
        assert_eq!(cell(CellType::NumberTime, "0.5").to_string(), "12:00:00");
        assert_eq!(cell(CellType::NumberDateTime1900, "44927.25").to_string(), "2023-01-01 06:00:00");
        assert_eq!(cell(CellType::IsoDateTime, "2023-01-01T06:00:00").to_string(), "2023-01-01 06:00:00");
    }

    #[test]
    fn unparsable_date_falls_back_to_raw() {
        assert_eq!(cell(CellType::NumberDate1900, "soon").to_string(), "soon");
    }

    #[test]
    fn custom_formats() {
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd hh:mm", true), CellType::NumberDateTime1904);
        assert_eq!(CellType::parse_custom_number_format("hh:mm", false), CellType::NumberTime);
        assert_eq!(CellType::parse_custom_number_format("\"days\" 0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.00", false), CellType::Number);
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("2", false), None);
    }

    #[test]
    fn reference() {
        assert_eq!(cell(CellType::Number, "1").reference(), "AL2");
        assert_eq!(Cell::text(1, 1, "H").reference(), "A1");
    }
}
