use thiserror::Error;

/// Main error type for the sheet sync crate.
/// Aggregates errors from the store, table and configuration modules; each is
/// carried unchanged so callers can match on the underlying variant.
#[derive(Error, Debug)]
pub enum SheetSyncError {
    // Store module errors
    #[error("{0}")]
    StoreError(#[from] crate::store::StoreError),

    // Table module errors
    #[error("{0}")]
    TableError(#[from] crate::table::TableError),

    // Configuration errors
    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

pub type Result<T, E = SheetSyncError> = std::result::Result<T, E>;
