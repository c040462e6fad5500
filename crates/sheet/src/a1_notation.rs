use crate::error::{Result, SheetError};

/// Highest row number an XLSX worksheet can hold
pub const MAX_ROWS: u32 = 1_048_576;

/// Highest column number an XLSX worksheet can hold (XFD)
pub const MAX_COLUMNS: u32 = 16_384;

/// Parse A1-style cell notation (e.g., "A1", "Z99", "AA1")
/// Returns (row, column) as 1-based indices
pub fn parse_a1(notation: &str) -> Result<(u32, u32)> {
    let split_pos = notation
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| SheetError::InvalidCellNotation(notation.to_string()))?;

    let (col_part, row_part) = notation.split_at(split_pos);
    let col = column_number(col_part)?;
    let row = row_part
        .parse::<u32>()
        .map_err(|_| SheetError::InvalidCellNotation(notation.to_string()))?;

    if row == 0 {
        return Err(SheetError::InvalidCellNotation(notation.to_string()));
    }

    Ok((row, col))
}

/// Convert column letters to a 1-based column number (case-insensitive)
/// A=1, B=2, ... Z=26, AA=27, AB=28, ...
///
/// Only overflow is rejected here; callers that write cells check the
/// result against [`MAX_COLUMNS`].
pub fn column_number(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(SheetError::InvalidCellNotation(letters.to_string()));
    }

    let mut col: u32 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return Err(SheetError::InvalidCellNotation(letters.to_string()));
        }
        let digit = u32::from(b.to_ascii_uppercase() - b'A') + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(digit))
            .ok_or_else(|| SheetError::InvalidCellNotation(letters.to_string()))?;
    }

    Ok(col)
}

/// Convert a 1-based column number to column letters
/// 1=A, 2=B, ... 26=Z, 27=AA, 28=AB, ...
/// Returns an empty string for 0.
pub fn column_name(mut col: u32) -> String {
    let mut result = String::new();

    while col > 0 {
        col -= 1;
        result.insert(0, char::from((col % 26) as u8 + b'A'));
        col /= 26;
    }

    result
}

/// Convert 1-based (row, col) to A1 notation
/// (1, 1) = "A1", (1, 2) = "B1", etc.
pub fn to_a1_notation(row: u32, col: u32) -> String {
    format!("{}{}", column_name(col), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_a1() {
        assert_eq!(parse_a1("A1").unwrap(), (1, 1));
        assert_eq!(parse_a1("B1").unwrap(), (1, 2));
        assert_eq!(parse_a1("A2").unwrap(), (2, 1));
        assert_eq!(parse_a1("Z1").unwrap(), (1, 26));
        assert_eq!(parse_a1("AA1").unwrap(), (1, 27));
        assert_eq!(parse_a1("ZZ1").unwrap(), (1, 702));
        assert_eq!(parse_a1("C5").unwrap(), (5, 3));

        // Test case insensitive
        assert_eq!(parse_a1("a1").unwrap(), (1, 1));
        assert_eq!(parse_a1("aA1").unwrap(), (1, 27));
    }

    #[test]
    fn test_parse_a1_errors() {
        assert!(parse_a1("").is_err());
        assert!(parse_a1("A").is_err());
        assert!(parse_a1("1").is_err());
        assert!(parse_a1("A0").is_err()); // Row must be >= 1
        assert!(parse_a1("A1B").is_err());
        assert!(parse_a1("ABC").is_err());
    }

    #[test]
    fn test_column_number() {
        assert_eq!(column_number("A").unwrap(), 1);
        assert_eq!(column_number("C").unwrap(), 3);
        assert_eq!(column_number("Z").unwrap(), 26);
        assert_eq!(column_number("AA").unwrap(), 27);
        assert_eq!(column_number("az").unwrap(), 52);
        assert_eq!(column_number("XFD").unwrap(), 16384);

        assert!(column_number("").is_err());
        assert!(column_number("A1").is_err());
        assert!(column_number("Ä").is_err());
        assert!(column_number("ZZZZZZZZZZ").is_err()); // overflow
    }

    #[test]
    fn test_limits_match_last_xlsx_cell() {
        assert_eq!(parse_a1("XFD1048576").unwrap(), (MAX_ROWS, MAX_COLUMNS));
        assert_eq!(column_name(MAX_COLUMNS), "XFD");
        assert!(column_number("XFE").unwrap() > MAX_COLUMNS);
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "");
        assert_eq!(column_name(1), "A");
        assert_eq!(column_name(26), "Z");
        assert_eq!(column_name(27), "AA");
        assert_eq!(column_name(52), "AZ");
        assert_eq!(column_name(53), "BA");
        assert_eq!(column_name(702), "ZZ");
        assert_eq!(column_name(703), "AAA");
    }

    #[test]
    fn test_to_a1_notation() {
        assert_eq!(to_a1_notation(1, 1), "A1");
        assert_eq!(to_a1_notation(5, 3), "C5");
        assert_eq!(to_a1_notation(100, 26), "Z100");
    }
}
