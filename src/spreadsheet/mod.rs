//! # Spreadsheet Cell Module
//!
//! Scalar cell values as they travel between records and a sheet, together
//! with the A1 reference helpers used to address sheet ranges.
pub mod cell;
pub(crate) mod reference;

pub use cell::{CellValue, DATETIME_FORMAT};
