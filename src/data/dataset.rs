use crate::data::row_builder::Row;
use crate::data::table::Table;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Holder of the most recently loaded table.
///
/// The table and its header live behind one `Arc`, so `replace` swaps both at
/// once and a snapshot taken by a reader stays consistent however many loads
/// happen while it is in use.
#[derive(Debug)]
pub struct Dataset<T = Row> {
    current: RwLock<Option<Arc<Table<T>>>>,
}

impl<T> Default for Dataset<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Dataset<T> {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Swap in a freshly loaded table, dropping whatever was there
    pub fn replace(&self, table: Table<T>) {
        let rows = table.row_count();
        let has_header = table.header().is_some();
        let table = Arc::new(table);

        // The guarded value is a single Option<Arc<_>>; a poisoned lock
        // cannot hold a half-written table.
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(table);

        info!("Dataset replaced: {} rows, header: {}", rows, has_header);
    }

    /// The current table, or `None` before the first successful load
    pub fn snapshot(&self) -> Option<Arc<Table<T>>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_table(&self) -> Option<Arc<Table<T>>> {
        self.snapshot()
    }

    /// Outer `None` means nothing has been loaded; `Some(None)` means the
    /// loaded table was declared without a header.
    pub fn current_header(&self) -> Option<Option<Row>> {
        self.snapshot().map(|table| table.header().cloned())
    }

    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
