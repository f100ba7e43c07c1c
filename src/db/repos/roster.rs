//! Composed roster operations: read the whole table, change it in memory,
//! write the whole table back. Not atomic against concurrent writers.

use crate::config::RecordScope;
use crate::db::models::{PersonRecord, RecordPatch, FLAG_TRUE};
use crate::db::RosterStore;
use crate::engine::scoreboard::{self, CounterPatch, UpdateOutcome};
use crate::error::AppError;
use crate::validation::require_valid_id;

/// Apply `modify` to the record whose `Id` equals `id` and persist the table.
/// Returns the updated record.
pub async fn find_and_modify<F>(
    store: &dyn RosterStore,
    id: &str,
    modify: F,
) -> Result<PersonRecord, AppError>
where
    F: FnOnce(&mut PersonRecord),
{
    require_valid_id("id", id)?;
    let mut records = store.read_all().await?;
    let record = records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::NotFound(id.to_string()))?;
    modify(record);
    let updated = record.clone();
    store.write_all(&records).await?;
    Ok(updated)
}

/// Overwrite the patched fields of one record.
pub async fn find_and_update(
    store: &dyn RosterStore,
    id: &str,
    patch: &RecordPatch,
) -> Result<PersonRecord, AppError> {
    find_and_modify(store, id, |record| patch.apply_to(record)).await
}

/// Mark one record removed. The row stays in storage.
pub async fn soft_delete(store: &dyn RosterStore, id: &str) -> Result<PersonRecord, AppError> {
    find_and_modify(store, id, |record| record.is_removed = FLAG_TRUE.to_string()).await
}

/// Validate and persist a new roster member. Nothing is written when the
/// name is missing or taken.
///
/// The row is appended when the roster already has rows; an empty roster is
/// written whole so the header row exists.
pub async fn insert_person(
    store: &dyn RosterStore,
    name: &str,
    is_dev: &str,
    duplicate_scope: RecordScope,
) -> Result<PersonRecord, AppError> {
    let records = store.read_all().await?;
    let person = scoreboard::prepare_insert(&records, name, is_dev, duplicate_scope)?;
    if records.is_empty() {
        store.write_all(std::slice::from_ref(&person)).await?;
    } else {
        store.append_row(&person).await?;
    }
    Ok(person)
}

/// Soft-delete `selected_ids`, merge `patches`, and persist the whole roster.
pub async fn apply_update(
    store: &dyn RosterStore,
    selected_ids: &[String],
    patches: &[CounterPatch],
) -> Result<UpdateOutcome, AppError> {
    let records = store.read_all().await?;
    let outcome = scoreboard::apply_update(records, selected_ids, patches);
    store.write_all(&outcome.records).await?;
    Ok(outcome)
}

/// Apply a counter patch to one record, recomputing points.
pub async fn patch_counters(store: &dyn RosterStore, patch: &CounterPatch) -> Result<PersonRecord, AppError> {
    find_and_modify(store, &patch.id, |record| patch.apply_to(record)).await
}

/// Zero counters and points on every record in `scope`. Returns how many
/// records were reset.
pub async fn reset_counters(store: &dyn RosterStore, scope: RecordScope) -> Result<usize, AppError> {
    let mut records = store.read_all().await?;
    let cleared = scoreboard::reset_counters(&mut records, scope);
    store.write_all(&records).await?;
    Ok(cleared)
}
