//! # Table Module
//!
//! In-memory tabular representation shared by the syncer and the stores:
//! records, the header contract rows are validated against, and rectangular
//! frames with the deduplication rules used by merges.
use thiserror::Error;

pub mod column;
pub mod frame;
pub mod record;

pub use column::Header;
pub use frame::Frame;
pub use record::Record;

/// Errors raised when rows violate the header contract.
#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    /// A row carries more cells than the header has columns
    #[error("Row {row} has {actual} cells but the header has {expected} columns")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Header cell is blank or repeats an earlier column name
    #[error("Invalid header at '{position}': {message}")]
    InvalidHeader { position: String, message: String },

    /// A column required by the operation is absent
    #[error("Missing column '{0}'")]
    MissingColumn(String),
}
