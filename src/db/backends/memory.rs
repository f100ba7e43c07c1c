use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::models::{records_from_table, table_from_records, PersonRecord};
use crate::db::RosterStore;
use crate::error::AppError;

/// Process-local roster, kept as a raw table so it goes through the same
/// header/column conversion as the persistent backends.
#[derive(Default)]
pub struct MemoryRosterStore {
    table: Mutex<Vec<Vec<String>>>,
    writes: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: &[PersonRecord]) -> Self {
        let store = Self::new();
        *store.table.lock().unwrap_or_else(|e| e.into_inner()) = table_from_records(records);
        store
    }

    /// Number of successful `write_all` / `append_row` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Make every subsequent call fail with a storage error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.fail.store(unavailable, Ordering::Relaxed);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(AppError::Storage("memory store marked unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RosterStore for MemoryRosterStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn read_all(&self) -> Result<Vec<PersonRecord>, AppError> {
        self.check_available()?;
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records_from_table(&table))
    }

    async fn write_all(&self, records: &[PersonRecord]) -> Result<(), AppError> {
        self.check_available()?;
        *self.table.lock().unwrap_or_else(|e| e.into_inner()) = table_from_records(records);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn append_row(&self, record: &PersonRecord) -> Result<(), AppError> {
        self.check_available()?;
        self.table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.to_row());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
