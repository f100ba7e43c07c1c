use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::db::models::{header_row, records_from_table, table_from_records, PersonRecord};
use crate::db::RosterStore;
use crate::error::AppError;

/// Roster stored as a CSV file on disk. A missing file reads as an empty roster.
pub struct CsvRosterStore {
    path: PathBuf,
}

impl CsvRosterStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Existing file contents, or `None` when the file does not exist yet.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>, AppError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Sibling file the next full rewrite is staged in.
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Replace the whole file. Contents are staged next to it and renamed into
    /// place, so readers see either the old roster or the new one.
    async fn replace_contents(&self, bytes: &[u8]) -> Result<(), AppError> {
        self.ensure_parent_dir().await?;
        let staging = self.staging_path();
        if let Err(e) = write_synced(&staging, bytes).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(AppError::Storage(format!("Failed to write {}: {}", staging.display(), e)));
        }
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(AppError::Storage(format!("Failed to replace {}: {}", self.path.display(), e)));
        }
        Ok(())
    }

    async fn ensure_parent_dir(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

fn parse_table(bytes: &[u8]) -> Result<Vec<Vec<String>>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn encode_rows(rows: &[Vec<String>]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Storage(format!("Failed to encode CSV: {e}")))
}

#[async_trait]
impl RosterStore for CsvRosterStore {
    fn backend_name(&self) -> &'static str {
        "csv"
    }

    async fn read_all(&self) -> Result<Vec<PersonRecord>, AppError> {
        match self.read_bytes().await? {
            Some(bytes) => Ok(records_from_table(&parse_table(&bytes)?)),
            None => Ok(Vec::new()),
        }
    }

    async fn write_all(&self, records: &[PersonRecord]) -> Result<(), AppError> {
        let bytes = encode_rows(&table_from_records(records))?;
        self.replace_contents(&bytes).await
    }

    async fn append_row(&self, record: &PersonRecord) -> Result<(), AppError> {
        let existing = self.read_bytes().await?.unwrap_or_default();

        let mut rows = Vec::with_capacity(2);
        if existing.iter().all(|b| b.is_ascii_whitespace()) {
            // Empty resource: lay down the header so the row stays readable.
            rows.push(header_row());
        }
        rows.push(record.to_row());

        let mut chunk = Vec::new();
        if !existing.is_empty() && !existing.ends_with(b"\n") {
            chunk.push(b'\n');
        }
        chunk.extend(encode_rows(&rows)?);

        if rows.len() == 2 {
            return self.replace_contents(&chunk).await;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&chunk).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn store_in(dir: &tempfile::TempDir) -> CsvRosterStore {
        CsvRosterStore::new(dir.path().join("scoreboard.csv"))
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut quoted = PersonRecord::new_member("2", "O'Neil, \"Bo\"", "FALSE");
        quoted.points = "7".into();
        let records = vec![PersonRecord::new_member("1", "Ann", "TRUE"), quoted];

        store.write_all(&records).await.unwrap();
        assert_eq!(store.read_all().await.unwrap(), records);

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with(
            "Id,Name,isDev,questionsAsked,questionsMissed,questionsAnsweredCorrectly,points,isRemoved\n"
        ));
    }

    #[tokio::test]
    async fn test_rewrite_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.write_all(&[PersonRecord::new_member("1", "Ann", "TRUE")]).await.unwrap();
        store.write_all(&[PersonRecord::new_member("2", "Bo", "FALSE")]).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("scoreboard.csv")]);
        assert_eq!(store.read_all().await.unwrap()[0].name, "Bo");
    }

    #[tokio::test]
    async fn test_failed_rewrite_keeps_previous_roster() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let before = vec![PersonRecord::new_member("1", "Ann", "TRUE")];
        store.write_all(&before).await.unwrap();

        // A directory squatting on the staging path makes the write fail.
        std::fs::create_dir(dir.path().join("scoreboard.csv.tmp")).unwrap();
        let err = store
            .write_all(&[PersonRecord::new_member("2", "Bo", "FALSE")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "storage");
        assert_eq!(store.read_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_append_to_missing_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .append_row(&PersonRecord::new_member("1", "Ann", "TRUE"))
            .await
            .unwrap();
        let all = store.read_all().await.unwrap();
        assert_eq!(all, vec![PersonRecord::new_member("1", "Ann", "TRUE")]);
    }

    #[tokio::test]
    async fn test_append_after_file_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            "Id,Name,isDev,questionsAsked,questionsMissed,questionsAnsweredCorrectly,points,isRemoved\n1,Ann,TRUE,2,0,1,1,FALSE",
        )
        .unwrap();

        store
            .append_row(&PersonRecord::new_member("2", "Bo", "FALSE"))
            .await
            .unwrap();
        let all = store.read_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].questions_asked, "2");
        assert_eq!(all[1].name, "Bo");
    }

    #[tokio::test]
    async fn test_short_rows_and_reordered_headers() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "Name,Id,points\nAnn,4\n").unwrap();
        let all = store.read_all().await.unwrap();
        assert_eq!(all[0].id, "4");
        assert_eq!(all[0].name, "Ann");
        assert_eq!(all[0].points, "");
    }

    fn field() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 ,\"'-]{1,12}"
    }

    fn record() -> impl Strategy<Value = PersonRecord> {
        proptest::collection::vec(field(), 8).prop_map(|f| PersonRecord {
            id: f[0].clone(),
            name: f[1].clone(),
            is_dev: f[2].clone(),
            questions_asked: f[3].clone(),
            questions_missed: f[4].clone(),
            questions_answered_correctly: f[5].clone(),
            points: f[6].clone(),
            is_removed: f[7].clone(),
        })
    }

    proptest! {
        #[test]
        fn prop_csv_round_trip(records in proptest::collection::vec(record(), 0..8)) {
            let bytes = encode_rows(&table_from_records(&records)).unwrap();
            let back = records_from_table(&parse_table(&bytes).unwrap());
            prop_assert_eq!(back, records);
        }
    }
}
