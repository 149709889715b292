//! # Sheet Sync
//!
//! Synchronizes tabular records into a spreadsheet-backed store.
//!
//! ## Features
//!
//! - **Append**: write records as new rows at the end of a sheet, in input order
//! - **Merge**: combine a batch with a sheet's existing rows, deduplicated by key
//!   columns with new records winning, then rewrite the sheet
//! - **Latest per channel**: the `channels_daily` sheet keeps only the most recent
//!   observation per channel of each batch
//! - **Stable dates**: date/time values are always persisted as
//!   `YYYY-MM-DD HH:MM:SS` text
//! - **Lazy sheets**: sheets are created on first reference with a bounded size
//! - **Pluggable stores**: an in-memory store and a Google Sheets REST store
//!
//! ## Example
//!
//! ```rust,no_run
//! use sheet_sync::config::MergeConfig;
//! use sheet_sync::store::memory::MemoryStore;
//! use sheet_sync::sync::TableSyncer;
//! use sheet_sync::table::Record;
//!
//! # fn main() -> sheet_sync::Result<()> {
//! let syncer = TableSyncer::new(MemoryStore::new());
//! let batch = vec![Record::new().with("video_id", 1i64).with("views", 10i64)];
//! syncer.merge("videos", &batch, &MergeConfig::with_keys(["video_id"]))?;
//! syncer.append("log", &batch)?;
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod error;
pub mod spreadsheet;
pub mod store;
pub mod sync;
pub mod table;

pub use error::{Result, SheetSyncError};
