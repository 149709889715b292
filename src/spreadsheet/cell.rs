use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use std::cmp::Ordering;
use std::fmt::Display;

/// Canonical text layout for every date/time value persisted to a sheet.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single scalar cell value.
///
/// `Empty` is the explicit missing value: it stands for a column a record does
/// not carry, and for blank cells read back from a sheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean(bool),
    /// 64-bit signed integers
    Integer(i64),
    /// Double-precision floating point numbers
    Number(f64),
    /// Plain text
    Text(String),
    /// Date without time component, persisted at midnight
    Date(NaiveDate),
    /// Date and time, persisted with second precision
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Returns true if the cell carries no value.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Replaces date/time values with their canonical string rendering.
    /// Every other variant is returned unchanged.
    pub fn normalized(self) -> Self {
        match self {
            CellValue::Date(date) => CellValue::Text(to_datetime_string(&date.and_time(NaiveTime::MIN))),
            CellValue::DateTime(datetime) => CellValue::Text(to_datetime_string(&datetime)),
            other => other,
        }
    }

    /// Renders the value as the text a sheet displays for it.
    /// Empty cells render as an empty string.
    pub fn to_cell_string(&self) -> String {
        self.to_string()
    }

    /// Text used to compare values for row identity.
    ///
    /// Integral floats share the rendering of the matching integer so `5` and
    /// `5.0` identify the same row, whichever side of the sheet produced them.
    pub fn key_text(&self) -> String {
        match self {
            CellValue::Number(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                (*value as i64).to_string()
            }
            _ => self.clone().normalized().to_string(),
        }
    }

    /// Rank of the variant in the sort order; numbers first, missing values last.
    fn rank(&self) -> u8 {
        match self {
            CellValue::Integer(_) | CellValue::Number(_) => 0,
            CellValue::Boolean(_) => 1,
            CellValue::Text(_) | CellValue::Date(_) | CellValue::DateTime(_) => 2,
            CellValue::Empty => 3,
        }
    }

    /// Total order used when sorting rows by a column.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
            (CellValue::Integer(a), CellValue::Number(b)) => (*a as f64).total_cmp(b),
            (CellValue::Number(a), CellValue::Integer(b)) => a.total_cmp(&(*b as f64)),
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a.cmp(b),
            (a, b) if a.rank() == 2 && b.rank() == 2 => a.to_string().cmp(&b.to_string()),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(value) => write!(f, "{}", if *value { "TRUE" } else { "FALSE" }),
            CellValue::Integer(value) => write!(f, "{}", value),
            CellValue::Number(value) => write!(f, "{}", value),
            CellValue::Text(value) => write!(f, "{}", value),
            CellValue::Date(date) => write!(f, "{}", to_datetime_string(&date.and_time(NaiveTime::MIN))),
            CellValue::DateTime(datetime) => write!(f, "{}", to_datetime_string(datetime)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Formats a date/time with the canonical `YYYY-MM-DD HH:MM:SS` layout.
/// Sub-second precision is dropped.
pub(crate) fn to_datetime_string(datetime: &NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}
