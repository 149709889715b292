use crate::spreadsheet::cell::CellValue;
use crate::table::column::Header;
use crate::table::record::Record;
use crate::table::TableError;
use std::collections::HashMap;
use std::collections::HashSet;

/// Rectangular table: a header and rows of exactly header width.
///
/// Columns missing from a record surface as [`CellValue::Empty`] cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    header: Header,
    rows: Vec<Vec<CellValue>>,
}

impl Frame {
    /// Builds a frame from records; the column set is the union of all
    /// record columns in first-seen order.
    pub fn from_records(records: &[Record]) -> Result<Self, TableError> {
        let header = Header::union(records.iter().flat_map(Record::columns))?;
        let rows = records
            .iter()
            .map(|record| {
                header
                    .names()
                    .iter()
                    .map(|name| record.get(name).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        Ok(Self { header, rows })
    }

    /// Builds a frame from raw sheet values; the first row is the header.
    /// An empty grid yields an empty frame.
    pub fn from_values(values: Vec<Vec<CellValue>>) -> Result<Self, TableError> {
        let mut values = values.into_iter();
        let Some(header) = values.next() else {
            return Ok(Self::default());
        };
        let header = Header::from_cells(&header)?;
        let rows = values
            .enumerate()
            .map(|(row, cells)| header.align(row, cells))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { header, rows })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Converts rows back into records; every record carries every header column.
    pub fn into_records(self) -> Vec<Record> {
        let Self { header, rows } = self;
        rows.into_iter()
            .map(|row| header.names().iter().cloned().zip(row).collect())
            .collect()
    }

    /// Appends another frame's rows after this frame's rows.
    /// The column set becomes the union of both headers, this frame's columns first.
    pub fn concat(self, other: Frame) -> Result<Self, TableError> {
        let header = Header::union(
            self.header
                .names()
                .iter()
                .chain(other.header.names())
                .map(String::as_str),
        )?;
        let mut rows = Vec::with_capacity(self.rows.len() + other.rows.len());
        for frame in [self, other] {
            let mapping: Vec<Option<usize>> = header
                .names()
                .iter()
                .map(|name| frame.header.position(name))
                .collect();
            for row in frame.rows {
                rows.push(
                    mapping
                        .iter()
                        .map(|index| index.map(|index| row[index].clone()).unwrap_or_default())
                        .collect(),
                );
            }
        }
        Ok(Self { header, rows })
    }

    /// Drops rows sharing the same values across `keys`, keeping the last
    /// occurrence at its position. With no keys the whole row is the identity.
    pub fn drop_duplicates(self, keys: &[String]) -> Result<Self, TableError> {
        let indexes: Vec<usize> = if keys.is_empty() {
            (0..self.header.len()).collect()
        } else {
            keys.iter()
                .map(|key| self.header.require(key))
                .collect::<Result<_, _>>()?
        };
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(self.rows.len());
        for row in self.rows.into_iter().rev() {
            let key: Vec<String> = indexes.iter().map(|index| row[*index].key_text()).collect();
            if seen.insert(key) {
                kept.push(row);
            }
        }
        kept.reverse();
        Ok(Self {
            header: self.header,
            rows: kept,
        })
    }

    /// Keeps one row per value of `group`: the row with the greatest `order`
    /// value, later input rows winning ties. A row without an `order` value
    /// only wins when no row of its group has one. Rows with an empty group
    /// value are dropped. The result is ordered by group value and `group`
    /// becomes the first column.
    pub fn latest_per_group(self, group: &str, order: &str) -> Result<Self, TableError> {
        let group_index = self.header.require(group)?;
        let order_index = self.header.require(order)?;

        let mut sorted: Vec<Vec<CellValue>> = self.rows;
        sorted.sort_by(|a, b| match (a[order_index].is_empty(), b[order_index].is_empty()) {
            (false, false) => a[order_index].sort_cmp(&b[order_index]),
            (left, right) => right.cmp(&left),
        });

        let mut latest: HashMap<String, Vec<CellValue>> = HashMap::new();
        for row in sorted {
            if row[group_index].is_empty() {
                continue;
            }
            latest.insert(row[group_index].key_text(), row);
        }
        let mut rows: Vec<Vec<CellValue>> = latest.into_values().collect();
        rows.sort_by(|a, b| a[group_index].sort_cmp(&b[group_index]));

        let order: Vec<usize> = std::iter::once(group_index)
            .chain((0..self.header.len()).filter(|index| *index != group_index))
            .collect();
        let header = Header::new(order.iter().map(|index| self.header.names()[*index].clone()).collect())?;
        let rows = rows
            .into_iter()
            .map(|row| order.iter().map(|index| row[*index].clone()).collect())
            .collect();
        Ok(Self { header, rows })
    }

    /// Header row followed by data rows, date/time values rendered as canonical strings.
    pub fn to_values(&self) -> Vec<Vec<CellValue>> {
        std::iter::once(self.header.to_cells())
            .chain(
                self.rows
                    .iter()
                    .map(|row| row.iter().cloned().map(CellValue::normalized).collect()),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, value: &str) -> Record {
        Record::new().with("id", id).with("value", value)
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn from_records_fills_missing_columns() {
        let records = vec![
            Record::new().with("a", 1i64),
            Record::new().with("b", 2i64).with("a", 3i64),
        ];
        let frame = Frame::from_records(&records).unwrap();

        assert_eq!(frame.header().names(), &["a", "b"]);
        assert_eq!(
            frame.rows(),
            &[
                vec![CellValue::Integer(1), CellValue::Empty],
                vec![CellValue::Integer(3), CellValue::Integer(2)],
            ]
        );
    }

    #[test]
    fn from_values_empty_grid() {
        let frame = Frame::from_values(Vec::new()).unwrap();
        assert!(frame.is_empty());
        assert!(frame.header().is_empty());
        assert!(frame.into_records().is_empty());
    }

    #[test]
    fn from_values_header_only() {
        let frame = Frame::from_values(vec![vec!["id".into(), "name".into()]]).unwrap();
        assert_eq!(frame.header().len(), 2);
        assert!(frame.is_empty());
    }

    #[test]
    fn from_values_rejects_wide_row() {
        let error = Frame::from_values(vec![
            vec!["id".into()],
            vec![CellValue::Integer(1)],
            vec![CellValue::Integer(2), "extra".into()],
        ])
        .unwrap_err();
        assert_eq!(error, TableError::RowWidthMismatch { row: 1, expected: 1, actual: 2 });
    }

    #[test]
    fn concat_unions_columns() {
        let left = Frame::from_records(&[Record::new().with("id", 1i64).with("a", "x")]).unwrap();
        let right = Frame::from_records(&[Record::new().with("b", "y").with("id", 2i64)]).unwrap();
        let frame = left.concat(right).unwrap();

        assert_eq!(frame.header().names(), &["id", "a", "b"]);
        assert_eq!(
            frame.rows(),
            &[
                vec![CellValue::Integer(1), "x".into(), CellValue::Empty],
                vec![CellValue::Integer(2), CellValue::Empty, "y".into()],
            ]
        );
    }

    #[test]
    fn drop_duplicates_keeps_last() {
        let frame = Frame::from_records(&[
            record(1, "old"),
            record(2, "kept"),
            record(1, "new"),
            record(1, "newest"),
        ])
        .unwrap();
        let frame = frame.drop_duplicates(&keys(&["id"])).unwrap();

        assert_eq!(frame.into_records(), vec![record(2, "kept"), record(1, "newest")]);
    }

    #[test]
    fn drop_duplicates_matches_integral_numbers() {
        let existing = Frame::from_records(&[Record::new().with("id", 7.0).with("value", "old")]).unwrap();
        let incoming = Frame::from_records(&[record(7, "new")]).unwrap();
        let frame = existing.concat(incoming).unwrap().drop_duplicates(&keys(&["id"])).unwrap();

        assert_eq!(frame.into_records(), vec![record(7, "new")]);
    }

    #[test]
    fn drop_duplicates_without_keys_uses_whole_row() {
        let frame = Frame::from_records(&[record(1, "a"), record(1, "b"), record(1, "a")]).unwrap();
        let frame = frame.drop_duplicates(&[]).unwrap();

        assert_eq!(frame.into_records(), vec![record(1, "b"), record(1, "a")]);
    }

    #[test]
    fn drop_duplicates_missing_key() {
        let frame = Frame::from_records(&[record(1, "a")]).unwrap();
        assert_eq!(
            frame.drop_duplicates(&keys(&["nope"])).unwrap_err(),
            TableError::MissingColumn("nope".to_owned())
        );
    }

    #[test]
    fn latest_per_group_orders_by_group() {
        let rows = vec![
            Record::new().with("views", 10i64).with("channel_id", "b").with("processed_at", "2024-01-01 10:00:00"),
            Record::new().with("views", 20i64).with("channel_id", "a").with("processed_at", "2024-01-02 10:00:00"),
            Record::new().with("views", 5i64).with("channel_id", "a").with("processed_at", "2024-01-01 10:00:00"),
            Record::new().with("views", 1i64).with("channel_id", CellValue::Empty).with("processed_at", "2024-01-03 10:00:00"),
        ];
        let frame = Frame::from_records(&rows).unwrap().latest_per_group("channel_id", "processed_at").unwrap();

        assert_eq!(frame.header().names(), &["channel_id", "views", "processed_at"]);
        assert_eq!(
            frame.rows(),
            &[
                vec!["a".into(), CellValue::Integer(20), "2024-01-02 10:00:00".into()],
                vec!["b".into(), CellValue::Integer(10), "2024-01-01 10:00:00".into()],
            ]
        );
    }

    #[test]
    fn latest_per_group_ties_prefer_later_rows() {
        let rows = vec![
            Record::new().with("channel_id", "a").with("processed_at", 1i64).with("n", "first"),
            Record::new().with("channel_id", "a").with("processed_at", 1i64).with("n", "second"),
        ];
        let frame = Frame::from_records(&rows).unwrap().latest_per_group("channel_id", "processed_at").unwrap();

        assert_eq!(frame.into_records(), vec![rows[1].clone()]);
    }

    #[test]
    fn latest_per_group_skips_missing_order_values() {
        let rows = vec![
            Record::new().with("channel_id", "A").with("subs", 1i64).with("processed_at", "2024-01-02 00:00:00"),
            Record::new().with("channel_id", "A").with("subs", 2i64).with("processed_at", CellValue::Empty),
            Record::new().with("channel_id", "B").with("subs", 3i64).with("processed_at", CellValue::Empty),
            Record::new().with("channel_id", "B").with("subs", 4i64).with("processed_at", CellValue::Empty),
        ];
        let frame = Frame::from_records(&rows).unwrap().latest_per_group("channel_id", "processed_at").unwrap();

        assert_eq!(
            frame.rows(),
            &[
                vec!["A".into(), CellValue::Integer(1), "2024-01-02 00:00:00".into()],
                vec!["B".into(), CellValue::Integer(4), CellValue::Empty],
            ]
        );
    }

    #[test]
    fn to_values_renders_dates() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let frame = Frame::from_records(&[Record::new().with("day", day)]).unwrap();

        assert_eq!(
            frame.to_values(),
            vec![vec![CellValue::from("day")], vec![CellValue::from("2024-05-06 00:00:00")]]
        );
    }
}
