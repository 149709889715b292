use crate::config::{MergeConfig, SheetCapacity, SyncConfig};
use crate::error::Result;
use crate::spreadsheet::cell::CellValue;
use crate::store::{SheetStore, StoreError, Worksheet};
use crate::sync::MergePolicy;
use crate::table::{Frame, Record};
use tracing::{debug, info, info_span, warn, Span};

/// Reconciles batches of records with named worksheets of a store.
///
/// Every call is independent: the only state carried between calls is the
/// content of the sheets themselves. Log events are emitted inside the span
/// the syncer was built with.
pub struct TableSyncer<S> {
    store: S,
    capacity: SheetCapacity,
    span: Span,
}

impl<S: SheetStore> TableSyncer<S> {
    /// Creates a syncer logging under a default `table_syncer` span.
    pub fn new(store: S) -> Self {
        Self::with_span(store, info_span!("table_syncer"))
    }

    /// Creates a syncer logging under the given span.
    pub fn with_span(store: S, span: Span) -> Self {
        Self {
            store,
            capacity: SheetCapacity::default(),
            span,
        }
    }

    /// Creates a syncer sized by a validated [`SyncConfig`].
    pub fn from_config(store: S, config: &SyncConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(store).with_capacity(config.capacity))
    }

    /// Sets the size of worksheets created on first reference.
    pub fn with_capacity(mut self, capacity: SheetCapacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Store the syncer writes to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Opens a worksheet, creating it when the store reports it missing.
    fn get_or_create(&self, table_name: &str) -> Result<S::Worksheet, StoreError> {
        match self.store.worksheet(table_name) {
            Err(StoreError::NotFound(_)) => {
                info!("Creating sheet '{}'", table_name);
                self.store.add_worksheet(table_name, self.capacity)
            }
            other => other,
        }
    }

    /// Appends each record as a new row at the end of the sheet, in input order.
    ///
    /// Existing rows are left untouched and nothing is deduplicated. Values
    /// follow each record's column order; date/time values are written as
    /// canonical strings.
    ///
    /// # Errors
    ///
    /// The first failing row write aborts the call; rows written before it
    /// stay in the sheet.
    pub fn append(&self, table_name: &str, records: &[Record]) -> Result<()> {
        let _entered = self.span.enter();
        let sheet = self.get_or_create(table_name)?;
        for (index, record) in records.iter().enumerate() {
            let values: Vec<CellValue> = record.values().cloned().map(CellValue::normalized).collect();
            sheet.append_row(&values)?;
            debug!("Appended row {} to '{}'", index + 1, sheet.title());
        }
        info!("Appended {} rows to '{}'", records.len(), table_name);
        Ok(())
    }

    /// Merges a batch into the sheet and rewrites the sheet with the result.
    ///
    /// The policy comes from [`MergePolicy::for_table`]:
    ///
    /// - [`MergePolicy::DeduplicateByKey`]: existing rows followed by the batch,
    ///   deduplicated by `config.key_columns` keeping the last occurrence, so
    ///   new records replace existing ones with the same key. A sheet without
    ///   data rows receives the batch deduplicated the same way.
    /// - [`MergePolicy::LatestPerGroup`]: the sheet is replaced by the latest
    ///   record per group of the batch alone; `config` is ignored.
    ///
    /// An empty batch is logged and leaves the sheet untouched.
    ///
    /// # Errors
    ///
    /// Read and validation failures leave the sheet untouched. The sheet is
    /// cleared before the merged rows are written, so a failing write leaves
    /// it empty.
    pub fn merge(&self, table_name: &str, records: &[Record], config: &MergeConfig) -> Result<()> {
        let _entered = self.span.enter();
        info!("Starting merge for sheet '{}'", table_name);
        let sheet = self.get_or_create(table_name)?;

        if records.is_empty() {
            warn!("No data to update in sheet '{}'", table_name);
            return Ok(());
        }

        let records: Vec<Record> = records.iter().cloned().map(Record::normalized).collect();
        let incoming = Frame::from_records(&records)?;

        let merged = match MergePolicy::for_table(table_name) {
            MergePolicy::LatestPerGroup { group, order } => incoming.latest_per_group(group, order)?,
            MergePolicy::DeduplicateByKey => {
                let existing: Vec<Record> = sheet
                    .read_all_records()?
                    .into_iter()
                    .map(Record::normalized)
                    .collect();
                if existing.is_empty() {
                    incoming.drop_duplicates(&config.key_columns)?
                } else {
                    debug!("Merging {} existing rows of '{}'", existing.len(), table_name);
                    Frame::from_records(&existing)?
                        .concat(incoming)?
                        .drop_duplicates(&config.key_columns)?
                }
            }
        };

        let values = merged.to_values();
        sheet.clear()?;
        sheet.write_rows(&values)?;
        info!("Successfully updated '{}' with {} rows", table_name, merged.len());
        Ok(())
    }
}
