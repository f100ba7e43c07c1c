//! Scoreboard mutations over in-memory rosters: partial counter updates,
//! points derivation, soft-delete marking, insertion and reset.
//!
//! Everything here is pure. Callers read the roster, run one of these and
//! persist the result, so validation and conflict errors are raised before
//! any write happens.

use std::collections::HashMap;

use crate::config::RecordScope;
use crate::db::models::{PersonRecord, FLAG_TRUE};
use crate::error::AppError;
use crate::validation::parse_int_or_zero;

// ============================================================================
// Points
// ============================================================================

/// `max(0, answeredCorrectly - missed)`, with unparseable values read as 0.
pub fn derive_points(answered_correctly: &str, missed: &str) -> String {
    let correct = parse_int_or_zero(answered_correctly);
    let missed = parse_int_or_zero(missed);
    correct.saturating_sub(missed).max(0).to_string()
}

// ============================================================================
// Update reconciliation
// ============================================================================

/// Client-submitted partial counter update for one record. `None` fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterPatch {
    pub id: String,
    pub questions_asked: Option<String>,
    pub questions_missed: Option<String>,
    pub questions_answered_correctly: Option<String>,
    /// Explicit override; wins over the derived value.
    pub points: Option<String>,
}

impl CounterPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Overwrite the provided counters, then recompute points from the
    /// post-patch values unless an explicit override is present.
    pub fn apply_to(&self, record: &mut PersonRecord) {
        if let Some(v) = &self.questions_asked {
            record.questions_asked = v.clone();
        }
        if let Some(v) = &self.questions_missed {
            record.questions_missed = v.clone();
        }
        if let Some(v) = &self.questions_answered_correctly {
            record.questions_answered_correctly = v.clone();
        }
        record.points = derive_points(&record.questions_answered_correctly, &record.questions_missed);
        if let Some(points) = &self.points {
            record.points = points.clone();
        }
    }
}

/// Result of [`apply_update`]: the full roster to persist plus request counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub records: Vec<PersonRecord>,
    pub removed_count: usize,
    pub updated_count: usize,
}

impl UpdateOutcome {
    pub fn message(&self) -> String {
        update_message(self.removed_count, self.updated_count)
    }
}

/// Human-readable summary for an update request.
pub fn update_message(removed_count: usize, updated_count: usize) -> String {
    match (removed_count > 0, updated_count > 0) {
        (true, true) => format!(
            "Successfully removed {} people and updated {} entries",
            removed_count, updated_count
        ),
        (true, false) => format!("Successfully marked {} people as removed", removed_count),
        (false, true) => format!("Successfully updated {} entries", updated_count),
        (false, false) => "No changes made".to_string(),
    }
}

/// Mark `selected_ids` removed and merge `patches` into the roster. Order and
/// length are preserved; records not addressed are returned unchanged. When a
/// record has several patches, the first one applies.
pub fn apply_update(records: Vec<PersonRecord>, selected_ids: &[String], patches: &[CounterPatch]) -> UpdateOutcome {
    let mut by_id: HashMap<&str, &CounterPatch> = HashMap::with_capacity(patches.len());
    for patch in patches {
        by_id.entry(patch.id.as_str()).or_insert(patch);
    }

    let records = records
        .into_iter()
        .map(|mut record| {
            if selected_ids.iter().any(|id| *id == record.id) {
                record.is_removed = FLAG_TRUE.to_string();
            }
            if let Some(patch) = by_id.get(record.id.as_str()) {
                patch.apply_to(&mut record);
            }
            record
        })
        .collect();

    UpdateOutcome {
        records,
        removed_count: selected_ids.len(),
        updated_count: patches.len(),
    }
}

// ============================================================================
// Insertion
// ============================================================================

/// `max(numeric Ids, default 0) + 1`. Non-numeric Ids count as 0.
///
/// Fails when the largest Id is already at the top of the integer range, so
/// an Id is never wrapped around or handed out twice.
pub fn next_id(records: &[PersonRecord]) -> Result<String, AppError> {
    let max = records
        .iter()
        .map(|r| parse_int_or_zero(&r.id))
        .max()
        .unwrap_or(0)
        .max(0);
    max.checked_add(1)
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::Validation("Cannot generate a new Id: existing Ids are out of range".into()))
}

/// Validate and build the record for a new roster member. The caller persists it.
///
/// Names are compared exactly (case-sensitive). `scope` decides whether
/// soft-deleted records still reserve their name.
pub fn prepare_insert(
    records: &[PersonRecord],
    name: &str,
    is_dev: &str,
    scope: RecordScope,
) -> Result<PersonRecord, AppError> {
    if name.trim().is_empty() || is_dev.trim().is_empty() {
        return Err(AppError::Validation("name and isDev are required".into()));
    }

    let taken = records
        .iter()
        .filter(|r| scope == RecordScope::All || !r.is_removed())
        .any(|r| r.name == name);
    if taken {
        return Err(AppError::Conflict("Person with this name already exists".into()));
    }

    Ok(PersonRecord::new_member(next_id(records)?, name, is_dev))
}

// ============================================================================
// Reset / standings
// ============================================================================

/// Zero counters and points on every record in `scope`; returns how many were reset.
pub fn reset_counters(records: &mut [PersonRecord], scope: RecordScope) -> usize {
    let mut cleared = 0;
    for record in records.iter_mut() {
        if scope == RecordScope::Active && record.is_removed() {
            continue;
        }
        record.reset_counters();
        cleared += 1;
    }
    cleared
}

/// Visible records ordered by points, highest first. Ties keep roster order.
pub fn standings(records: &[PersonRecord]) -> Vec<PersonRecord> {
    let mut visible: Vec<PersonRecord> = records.iter().filter(|r| !r.is_removed()).cloned().collect();
    visible.sort_by_key(|r| std::cmp::Reverse(parse_int_or_zero(&r.points)));
    visible
}
