//! A1-style cell reference helpers.

/// Converts a 0-based column index to Excel-style column letters (0 → "A", 26 → "AA").
pub(crate) fn col_to_letters(col: usize) -> String {
    let mut column = col + 1;
    let mut letters = String::new();
    while column > 0 {
        column -= 1;
        let digit = char::from(b'A' + (column % 26) as u8);
        letters.insert(0, digit);
        column /= 26;
    }
    letters
}

/// Converts 0-based row and column indexes to an A1 reference (e.g. (1, 2) → "C2").
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", col_to_letters(col), row + 1)
}

/// Quotes a sheet title for use in an A1 range, doubling embedded single quotes.
pub(crate) fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Builds the range covering `rows` × `cols` cells from A1 on the given sheet.
pub(crate) fn sheet_range(title: &str, rows: usize, cols: usize) -> String {
    let title = quote_sheet_title(title);
    if rows == 0 || cols == 0 {
        title
    } else {
        format!("{}!A1:{}", title, index_to_reference(rows - 1, cols - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(col_to_letters(0), "A");
        assert_eq!(col_to_letters(25), "Z");
        assert_eq!(col_to_letters(26), "AA");
        assert_eq!(col_to_letters(701), "ZZ");
        assert_eq!(col_to_letters(702), "AAA");
    }

    #[test]
    fn references() {
        assert_eq!(index_to_reference(0, 0), "A1");
        assert_eq!(index_to_reference(9, 27), "AB10");
    }

    #[test]
    fn ranges() {
        assert_eq!(sheet_range("data", 3, 2), "'data'!A1:B3");
        assert_eq!(sheet_range("it's", 0, 0), "'it''s'");
    }
}
