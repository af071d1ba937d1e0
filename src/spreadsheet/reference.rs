//! Conversions between A1-style cell references and 1-based row/column numbers.
use regex::Regex;
use std::sync::OnceLock;

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\$?([A-Za-z]{1,3})\$?([1-9]\d*)$").expect("Hardcode regex pattern"))
}

/// Converts column letters ("A", "AL", "xfd") to a 1-based column number.
pub fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.bytes().all(|byte| byte.is_ascii_alphabetic()) {
        return None;
    }
    letters.bytes().try_fold(0usize, |index, byte| {
        let digit = (byte.to_ascii_uppercase() - b'A') as usize + 1;
        index.checked_mul(26)?.checked_add(digit)
    })
}

/// Parses a 1-based row number, rejecting zero.
pub fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().filter(|row| *row > 0)
}

/// Converts a 1-based column number to letters (1 => "A", 38 => "AL").
pub fn index_to_col(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        col -= 1;
        letters.push(b'A' + (col % 26) as u8);
        col /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Parses an A1-style reference into 1-based `(row, col)`.
pub fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let captures = reference_pattern().captures(reference)?;
    let col = captures.get(1).and_then(|matcher| col_to_index(matcher.as_str()))?;
    let row = captures.get(2).and_then(|matcher| row_to_index(matcher.as_str()))?;
    Some((row, col))
}

/// Formats 1-based `(row, col)` as an A1-style reference.
pub fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(col_to_index("A"), Some(1));
        assert_eq!(col_to_index("Z"), Some(26));
        assert_eq!(col_to_index("AL"), Some(38));
        assert_eq!(col_to_index("am"), Some(39));
        assert_eq!(col_to_index(""), None);
        assert_eq!(col_to_index("A1"), None);
        assert_eq!(index_to_col(38), "AL");
        assert_eq!(index_to_col(39), "AM");
        assert_eq!(index_to_col(703), "AAA");
        assert_eq!(index_to_col(0), "");
    }

    #[test]
    fn references() {
        assert_eq!(reference_to_index("A1"), Some((1, 1)));
        assert_eq!(reference_to_index("AL12"), Some((12, 38)));
        assert_eq!(reference_to_index("$AM$3"), Some((3, 39)));
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("12"), None);
        assert_eq!(index_to_reference(2, 5), "E2");
    }
}
