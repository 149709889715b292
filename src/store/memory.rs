use crate::config::SheetCapacity;
use crate::spreadsheet::cell::CellValue;
use crate::store::{SheetStore, StoreError, Worksheet};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Worksheet operations that can be counted and made to fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    AddWorksheet,
    Read,
    Append,
    Clear,
    Write,
}

#[derive(Debug)]
struct Grid {
    capacity: SheetCapacity,
    values: Vec<Vec<CellValue>>,
}

#[derive(Debug, Default)]
struct Inner {
    sheets: BTreeMap<String, Grid>,
    calls: HashMap<Operation, usize>,
    /// Remaining successful calls before an operation starts failing
    failures: HashMap<Operation, usize>,
}

impl Inner {
    fn record(&mut self, operation: Operation) -> Result<(), StoreError> {
        *self.calls.entry(operation).or_default() += 1;
        match self.failures.get_mut(&operation) {
            Some(0) => Err(StoreError::Remote {
                status: 500,
                message: format!("injected {:?} failure", operation),
            }),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn grid(&mut self, title: &str) -> Result<&mut Grid, StoreError> {
        self.sheets
            .get_mut(title)
            .ok_or_else(|| StoreError::NotFound(title.to_owned()))
    }
}

/// In-memory spreadsheet for tests and development.
///
/// Values are kept exactly as written, so callers can observe what a remote
/// store would have received. Reads drop trailing blank cells the way the
/// Sheets API does. Clones share the same sheets.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates a store with no worksheets.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of a worksheet's grid, if it exists.
    pub fn values(&self, title: &str) -> Option<Vec<Vec<CellValue>>> {
        self.lock().sheets.get(title).map(|grid| grid.values.clone())
    }

    /// Returns the capacity a worksheet was created with.
    pub fn capacity(&self, title: &str) -> Option<SheetCapacity> {
        self.lock().sheets.get(title).map(|grid| grid.capacity)
    }

    /// Titles of all worksheets.
    pub fn titles(&self) -> Vec<String> {
        self.lock().sheets.keys().cloned().collect()
    }

    /// Number of times an operation was attempted, failed attempts included.
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Makes `operation` fail once it has succeeded `successes` more times.
    pub fn fail_after(&self, operation: Operation, successes: usize) {
        self.lock().failures.insert(operation, successes);
    }

    /// Removes every injected failure.
    pub fn heal(&self) {
        self.lock().failures.clear();
    }
}

impl SheetStore for MemoryStore {
    type Worksheet = MemoryWorksheet;

    fn worksheet(&self, title: &str) -> Result<MemoryWorksheet, StoreError> {
        if self.lock().sheets.contains_key(title) {
            Ok(MemoryWorksheet {
                title: title.to_owned(),
                inner: self.inner.clone(),
            })
        } else {
            Err(StoreError::NotFound(title.to_owned()))
        }
    }

    fn add_worksheet(&self, title: &str, capacity: SheetCapacity) -> Result<MemoryWorksheet, StoreError> {
        let mut inner = self.lock();
        inner.record(Operation::AddWorksheet)?;
        if inner.sheets.contains_key(title) {
            return Err(StoreError::Remote {
                status: 400,
                message: format!("A sheet with the name \"{}\" already exists", title),
            });
        }
        debug!("adding worksheet '{}' ({}x{})", title, capacity.rows, capacity.columns);
        inner.sheets.insert(
            title.to_owned(),
            Grid {
                capacity,
                values: Vec::new(),
            },
        );
        Ok(MemoryWorksheet {
            title: title.to_owned(),
            inner: self.inner.clone(),
        })
    }
}

/// Handle to one worksheet of a [`MemoryStore`].
#[derive(Clone, Debug)]
pub struct MemoryWorksheet {
    title: String,
    inner: Arc<Mutex<Inner>>,
}

impl MemoryWorksheet {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Worksheet for MemoryWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn read_values(&self) -> Result<Vec<Vec<CellValue>>, StoreError> {
        let mut inner = self.lock();
        inner.record(Operation::Read)?;
        let grid = inner.grid(&self.title)?;
        let mut values: Vec<Vec<CellValue>> = grid
            .values
            .iter()
            .map(|row| {
                let width = row.iter().rposition(|cell| !cell.is_empty()).map_or(0, |index| index + 1);
                row[..width].to_vec()
            })
            .collect();
        while values.last().is_some_and(Vec::is_empty) {
            values.pop();
        }
        Ok(values)
    }

    fn append_row(&self, values: &[CellValue]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.record(Operation::Append)?;
        let grid = inner.grid(&self.title)?;
        grid.values.push(values.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.record(Operation::Clear)?;
        inner.grid(&self.title)?.values.clear();
        Ok(())
    }

    fn write_rows(&self, rows: &[Vec<CellValue>]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.record(Operation::Write)?;
        let grid = inner.grid(&self.title)?;
        for (index, row) in rows.iter().enumerate() {
            match grid.values.get_mut(index) {
                Some(existing) => {
                    if existing.len() < row.len() {
                        existing.resize(row.len(), CellValue::Empty);
                    }
                    existing[..row.len()].clone_from_slice(row);
                }
                None => grid.values.push(row.clone()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Record;

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|cell| CellValue::from(*cell)).collect()
    }

    #[test]
    fn worksheet_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.worksheet("missing"), Err(StoreError::NotFound(title)) if title == "missing"));
    }

    #[test]
    fn add_worksheet_records_capacity() {
        let store = MemoryStore::new();
        store.add_worksheet("data", SheetCapacity::default()).unwrap();

        assert_eq!(store.capacity("data"), Some(SheetCapacity { rows: 1000, columns: 26 }));
        assert!(store.worksheet("data").is_ok());
        assert!(store.add_worksheet("data", SheetCapacity::default()).is_err());
    }

    #[test]
    fn write_then_read_records() {
        let store = MemoryStore::new();
        let sheet = store.add_worksheet("data", SheetCapacity::default()).unwrap();
        sheet
            .write_rows(&[row(&["id", "name"]), row(&["1", "a"]), vec!["2".into(), CellValue::Empty]])
            .unwrap();

        let records = sheet.read_all_records().unwrap();
        assert_eq!(
            records,
            vec![
                Record::new().with("id", "1").with("name", "a"),
                Record::new().with("id", "2").with("name", CellValue::Empty),
            ]
        );
    }

    #[test]
    fn write_overlays_existing_cells() {
        let store = MemoryStore::new();
        let sheet = store.add_worksheet("data", SheetCapacity::default()).unwrap();
        sheet.write_rows(&[row(&["a", "b", "c"]), row(&["1", "2", "3"])]).unwrap();
        sheet.write_rows(&[row(&["x"])]).unwrap();

        assert_eq!(store.values("data").unwrap(), vec![row(&["x", "b", "c"]), row(&["1", "2", "3"])]);
    }

    #[test]
    fn append_and_clear() {
        let store = MemoryStore::new();
        let sheet = store.add_worksheet("data", SheetCapacity::default()).unwrap();
        sheet.append_row(&row(&["a"])).unwrap();
        sheet.append_row(&row(&["b"])).unwrap();
        assert_eq!(store.values("data").unwrap().len(), 2);
        assert_eq!(store.calls(Operation::Append), 2);

        sheet.clear().unwrap();
        assert!(sheet.read_values().unwrap().is_empty());
    }

    #[test]
    fn read_trims_trailing_blanks() {
        let store = MemoryStore::new();
        let sheet = store.add_worksheet("data", SheetCapacity::default()).unwrap();
        sheet.append_row(&[CellValue::from("a"), CellValue::Empty]).unwrap();
        sheet.append_row(&[CellValue::Empty]).unwrap();

        assert_eq!(sheet.read_values().unwrap(), vec![row(&["a"])]);
    }

    #[test]
    fn injected_failures() {
        let store = MemoryStore::new();
        let sheet = store.add_worksheet("data", SheetCapacity::default()).unwrap();
        store.fail_after(Operation::Append, 1);

        assert!(sheet.append_row(&row(&["a"])).is_ok());
        assert!(matches!(sheet.append_row(&row(&["b"])), Err(StoreError::Remote { status: 500, .. })));
        assert_eq!(store.values("data").unwrap(), vec![row(&["a"])]);

        store.heal();
        assert!(sheet.append_row(&row(&["b"])).is_ok());
    }
}
