use async_trait::async_trait;

use crate::config::SheetsConfig;
use crate::db::models::{records_from_table, table_from_records, PersonRecord};
use crate::db::RosterStore;
use crate::error::AppError;
use crate::sheets::client::SheetsClient;

/// Roster stored in a spreadsheet range addressed by sheet id + A1 range.
pub struct SheetsRosterStore {
    client: SheetsClient,
    range: String,
}

impl SheetsRosterStore {
    pub fn new(config: &SheetsConfig) -> Result<Self, AppError> {
        let client = SheetsClient::new(config)?;
        if !client.can_write() {
            tracing::warn!("Sheets store configured with an API key; writes will be rejected");
        }
        tracing::info!(
            spreadsheet_id = %config.spreadsheet_id,
            range = %config.range,
            auth = %client.auth_description(),
            "Sheets roster store configured"
        );
        Ok(Self {
            client,
            range: config.range.clone(),
        })
    }

    pub fn from_client(client: SheetsClient, range: impl Into<String>) -> Self {
        Self {
            client,
            range: range.into(),
        }
    }
}

#[async_trait]
impl RosterStore for SheetsRosterStore {
    fn backend_name(&self) -> &'static str {
        "sheets"
    }

    async fn read_all(&self) -> Result<Vec<PersonRecord>, AppError> {
        let rows = self.client.get_values(&self.range).await?;
        Ok(records_from_table(&rows))
    }

    async fn write_all(&self, records: &[PersonRecord]) -> Result<(), AppError> {
        self.client
            .update_values(&self.range, &table_from_records(records))
            .await
    }

    async fn append_row(&self, record: &PersonRecord) -> Result<(), AppError> {
        self.client
            .append_values(&self.range, &[record.to_row()])
            .await
    }
}
