use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::reference::index_to_reference;
use crate::table::TableError;
use std::collections::HashSet;

/// Ordered list of column names forming the first row of a sheet.
///
/// Names are non-blank and unique; every data row is checked against the
/// header width before it is accepted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    columns: Vec<String>,
}

impl Header {
    /// Creates a header, rejecting blank and duplicate column names.
    pub fn new(columns: Vec<String>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for (index, name) in columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(TableError::InvalidHeader {
                    position: index_to_reference(0, index),
                    message: "blank column name".to_owned(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(TableError::InvalidHeader {
                    position: index_to_reference(0, index),
                    message: format!("duplicate column name '{}'", name),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Builds a header from the first row of a sheet.
    pub(crate) fn from_cells(cells: &[CellValue]) -> Result<Self, TableError> {
        Self::new(cells.iter().map(CellValue::to_cell_string).collect())
    }

    /// Union of column names in first-seen order.
    pub(crate) fn union<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, TableError> {
        let mut columns: Vec<String> = Vec::new();
        for name in names {
            if !columns.iter().any(|column| column == name) {
                columns.push(name.to_owned());
            }
        }
        Self::new(columns)
    }

    pub fn names(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the index of a column.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns the index of a column, failing when the header lacks it.
    pub fn require(&self, name: &str) -> Result<usize, TableError> {
        self.position(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_owned()))
    }

    /// Fits a data row to the header width.
    ///
    /// Short rows are padded with empty cells since sheets drop trailing
    /// blanks; rows wider than the header are rejected. `row` is the 0-based
    /// data row number used in the error.
    pub(crate) fn align(&self, row: usize, mut cells: Vec<CellValue>) -> Result<Vec<CellValue>, TableError> {
        if cells.len() > self.columns.len() {
            return Err(TableError::RowWidthMismatch {
                row,
                expected: self.columns.len(),
                actual: cells.len(),
            });
        }
        cells.resize(self.columns.len(), CellValue::Empty);
        Ok(cells)
    }

    /// Header cells as written to the first sheet row.
    pub(crate) fn to_cells(&self) -> Vec<CellValue> {
        self.columns.iter().map(|name| CellValue::Text(name.to_owned())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Result<Header, TableError> {
        Header::new(names.iter().map(|name| name.to_string()).collect())
    }

    #[test]
    fn rejects_duplicate_names() {
        let error = header(&["id", "name", "id"]).unwrap_err();
        assert_eq!(
            error,
            TableError::InvalidHeader {
                position: "C1".to_owned(),
                message: "duplicate column name 'id'".to_owned(),
            }
        );
    }

    #[test]
    fn rejects_blank_names() {
        let error = header(&["id", " "]).unwrap_err();
        assert!(matches!(error, TableError::InvalidHeader { position, .. } if position == "B1"));
    }

    #[test]
    fn union_keeps_first_seen_order() {
        let header = Header::union(["a", "b", "a", "c", "b"]).unwrap();
        assert_eq!(header.names(), &["a", "b", "c"]);
    }

    #[test]
    fn align_pads_short_rows() {
        let header = header(&["a", "b", "c"]).unwrap();
        let row = header.align(0, vec![CellValue::Integer(1)]).unwrap();
        assert_eq!(row, vec![CellValue::Integer(1), CellValue::Empty, CellValue::Empty]);
    }

    #[test]
    fn align_rejects_wide_rows() {
        let header = header(&["a"]).unwrap();
        let error = header.align(4, vec![CellValue::Integer(1), CellValue::Integer(2)]).unwrap_err();
        assert_eq!(error, TableError::RowWidthMismatch { row: 4, expected: 1, actual: 2 });
    }

    #[test]
    fn require_missing_column() {
        let header = header(&["a"]).unwrap();
        assert_eq!(header.require("a"), Ok(0));
        assert_eq!(header.require("z"), Err(TableError::MissingColumn("z".to_owned())));
    }
}
