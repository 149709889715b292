//! # Sheet Store Module
//!
//! The narrow interface through which the syncer reaches a spreadsheet
//! backend, plus the backends shipped with the crate:
//!
//! - [`memory::MemoryStore`]: in-process sheets for tests and development
//! - [`google::GoogleSheetsStore`]: Google Sheets v4 REST API over blocking HTTP
use crate::config::SheetCapacity;
use crate::spreadsheet::cell::CellValue;
use crate::table::{Frame, Record, TableError};
use thiserror::Error;

pub mod google;
pub mod memory;

/// Errors reported by sheet stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The referenced worksheet does not exist
    #[error("Worksheet '{0}' not found")]
    NotFound(String),

    /// The backend rejected a request
    #[error("Remote store responded with {status}: {message}")]
    Remote { status: u16, message: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a body that could not be understood
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Credentials could not be obtained
    #[error("Authentication failed: {0}")]
    Authentication(#[source] anyhow::Error),

    /// Spreadsheet URL or key could not be resolved
    #[error("Invalid spreadsheet url '{0}'")]
    InvalidSpreadsheetUrl(String),

    /// Sheet content violates the header contract
    #[error("{0}")]
    Table(#[from] TableError),
}

/// A spreadsheet holding named worksheets.
pub trait SheetStore {
    type Worksheet: Worksheet;

    /// Opens an existing worksheet by title.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no worksheet carries the title.
    fn worksheet(&self, title: &str) -> Result<Self::Worksheet, StoreError>;

    /// Creates a worksheet sized to `capacity`.
    fn add_worksheet(&self, title: &str, capacity: SheetCapacity) -> Result<Self::Worksheet, StoreError>;
}

/// A single worksheet: a grid whose first row is the header.
pub trait Worksheet {
    fn title(&self) -> &str;

    /// Reads every non-trailing-blank row of the sheet, header included.
    fn read_values(&self) -> Result<Vec<Vec<CellValue>>, StoreError>;

    /// Appends one row after the last row holding data.
    fn append_row(&self, values: &[CellValue]) -> Result<(), StoreError>;

    /// Removes every value, header included.
    fn clear(&self) -> Result<(), StoreError>;

    /// Writes `rows` starting at A1; the first row is the header.
    fn write_rows(&self, rows: &[Vec<CellValue>]) -> Result<(), StoreError>;

    /// Reads all data rows as records keyed by the header row.
    fn read_all_records(&self) -> Result<Vec<Record>, StoreError> {
        Ok(Frame::from_values(self.read_values()?)?.into_records())
    }
}
