pub mod backends;
pub mod models;
pub mod repos;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::error::AppError;
use models::PersonRecord;

/// Ordered-table view over the persistent roster resource.
///
/// Backends only provide whole-table read/replace and single-row append;
/// everything else is composed on top in [`repos::roster`]. There is no
/// locking: two overlapping read-modify-write cycles can lose an update.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;

    /// All rows, header excluded. Empty when the resource is empty or has no header row.
    async fn read_all(&self) -> Result<Vec<PersonRecord>, AppError>;

    /// Replace the resource with the canonical header plus one row per record.
    async fn write_all(&self, records: &[PersonRecord]) -> Result<(), AppError>;

    /// Append one row in canonical column order without rewriting the table.
    async fn append_row(&self, record: &PersonRecord) -> Result<(), AppError>;
}

pub type SharedStore = Arc<dyn RosterStore>;

/// Construct the store selected by configuration.
pub fn open_store(config: &StoreConfig) -> Result<SharedStore, AppError> {
    let store: SharedStore = match config {
        StoreConfig::Sheets(sheets) => Arc::new(backends::SheetsRosterStore::new(sheets)?),
        StoreConfig::Csv { path } => Arc::new(backends::CsvRosterStore::new(path.clone())),
        StoreConfig::Memory => Arc::new(backends::MemoryRosterStore::new()),
    };
    tracing::info!(backend = store.backend_name(), "Roster store ready");
    Ok(store)
}
