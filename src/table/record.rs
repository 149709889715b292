use crate::spreadsheet::cell::CellValue;

/// One row expressed as an ordered column → value mapping.
///
/// Column order is insertion order; it decides the value order when the
/// record is appended to a sheet as a raw row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column's value, replacing any previous value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Builder-style variant of [`Record::insert`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Returns the value of a column, if the record carries it.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Iterates column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates values in column order.
    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders every date/time value with the canonical string format.
    pub fn normalized(self) -> Self {
        Self {
            fields: self
                .fields
                .into_iter()
                .map(|(name, value)| (name, value.normalized()))
                .collect(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn insert_keeps_order_and_replaces() {
        let mut record = Record::new();
        record.insert("b", 1i64);
        record.insert("a", "x");
        record.insert("b", 2i64);

        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(record.get("b"), Some(&CellValue::Integer(2)));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn normalized_renders_dates() {
        let record = Record::new()
            .with("day", NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
            .with("count", 3i64)
            .normalized();

        assert_eq!(record.get("day"), Some(&CellValue::from("2024-02-29 00:00:00")));
        assert_eq!(record.get("count"), Some(&CellValue::Integer(3)));
    }

    #[test]
    fn collect_from_pairs() {
        let record: Record = vec![("id", 1i64), ("n", 2i64)].into_iter().collect();
        assert_eq!(record.values().cloned().collect::<Vec<_>>(), vec![CellValue::Integer(1), CellValue::Integer(2)]);
    }
}
