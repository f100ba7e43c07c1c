use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commands::{json_body, stringify_field};
use crate::db::models::{PersonRecord, FLAG_FALSE, FLAG_TRUE};
use crate::db::repos::roster as roster_repo;
use crate::engine::scoreboard::{update_message, CounterPatch};
use crate::error::ApiError;
use crate::AppState;

const READ_FAILED: &str = "Failed to read scoreboard data";
const UPDATE_FAILED: &str = "Failed to update scoreboard data";
const ADD_FAILED: &str = "Failed to add person to scoreboard";
const CLEAR_FAILED: &str = "Failed to clear scoreboard data";

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// One entry of `updatedData`. Counters may arrive as strings or numbers.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterPatchBody {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub questions_asked: Option<Value>,
    #[serde(default)]
    pub questions_missed: Option<Value>,
    #[serde(default)]
    pub questions_answered_correctly: Option<Value>,
    #[serde(default)]
    pub points: Option<Value>,
}

impl CounterPatchBody {
    fn into_patch(self, id: String) -> CounterPatch {
        CounterPatch {
            id,
            questions_asked: stringify_field(self.questions_asked),
            questions_missed: stringify_field(self.questions_missed),
            questions_answered_correctly: stringify_field(self.questions_answered_correctly),
            points: stringify_field(self.points),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// Ids (not names) of people to soft-delete.
    #[serde(default)]
    pub selected_names: Option<Vec<Value>>,
    #[serde(default)]
    pub updated_data: Option<Vec<CounterPatchBody>>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub success: bool,
    pub message: String,
    pub removed_count: usize,
    pub updated_count: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// `"TRUE"` / `"FALSE"` or a JSON boolean.
    #[serde(default)]
    pub is_dev: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddResponse {
    pub success: bool,
    pub message: String,
    pub new_person: PersonRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub cleared_count: usize,
}

#[derive(Debug, Serialize)]
pub struct PersonResponse {
    pub success: bool,
    pub message: String,
    pub person: PersonRecord,
}

fn role_flag(value: Option<Value>) -> String {
    match value {
        Some(Value::Bool(true)) => FLAG_TRUE.to_string(),
        Some(Value::Bool(false)) => FLAG_FALSE.to_string(),
        other => stringify_field(other).unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /api/scoreboard`: every row, soft-deleted ones included.
pub async fn get_scoreboard(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PersonRecord>>, ApiError> {
    let records = state
        .store
        .read_all()
        .await
        .map_err(|e| ApiError::from_app(e, READ_FAILED))?;
    tracing::debug!(rows = records.len(), "Scoreboard read");
    Ok(Json(records))
}

/// `POST /api/scoreboard/update`. `removedCount` reports every submitted
/// selection, including entries that match no row.
pub async fn update_scoreboard(
    State(state): State<Arc<AppState>>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let body = json_body(body, StatusCode::BAD_REQUEST)?;
    let submitted = body.selected_names.unwrap_or_default();
    let removed_count = submitted.len();
    let selected: Vec<String> = submitted
        .into_iter()
        .filter_map(|v| stringify_field(Some(v)))
        .collect();
    let patches: Vec<CounterPatch> = body
        .updated_data
        .unwrap_or_default()
        .into_iter()
        .map(|mut entry| {
            let id = stringify_field(entry.id.take()).unwrap_or_default();
            entry.into_patch(id)
        })
        .collect();

    let outcome = roster_repo::apply_update(state.store.as_ref(), &selected, &patches)
        .await
        .map_err(|e| ApiError::from_app(e, UPDATE_FAILED))?;

    tracing::info!(
        removed = removed_count,
        updated = outcome.updated_count,
        "Scoreboard updated"
    );
    Ok(Json(UpdateResponse {
        success: true,
        message: update_message(removed_count, outcome.updated_count),
        removed_count,
        updated_count: outcome.updated_count,
    }))
}

/// `POST /api/scoreboard/add`
pub async fn add_person(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AddRequest>, JsonRejection>,
) -> Result<Json<AddResponse>, ApiError> {
    let body = json_body(body, StatusCode::BAD_REQUEST)?;
    let name = body.name.unwrap_or_default();
    let is_dev = role_flag(body.is_dev);

    let person = roster_repo::insert_person(
        state.store.as_ref(),
        &name,
        &is_dev,
        state.engine.duplicate_name_scope,
    )
    .await
    .map_err(|e| ApiError::from_app(e, ADD_FAILED))?;

    tracing::info!(id = %person.id, name = %person.name, "Person added to scoreboard");
    Ok(Json(AddResponse {
        success: true,
        message: format!("Successfully added {} to the scoreboard", person.name),
        new_person: person,
    }))
}

/// `POST /api/scoreboard/clear`
pub async fn clear_scoreboard(State(state): State<Arc<AppState>>) -> Result<Json<ClearResponse>, ApiError> {
    let cleared = roster_repo::reset_counters(state.store.as_ref(), state.engine.clear_scope)
        .await
        .map_err(|e| ApiError::from_app(e, CLEAR_FAILED))?;

    tracing::info!(cleared, scope = ?state.engine.clear_scope, "Scoreboard cleared");
    Ok(Json(ClearResponse {
        success: true,
        message: "Scoreboard cleared successfully".into(),
        cleared_count: cleared,
    }))
}

/// `POST /api/scoreboard/{id}/remove`
pub async fn remove_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PersonResponse>, ApiError> {
    let person = roster_repo::soft_delete(state.store.as_ref(), &id)
        .await
        .map_err(|e| ApiError::from_app(e, UPDATE_FAILED))?;

    tracing::info!(id = %person.id, "Person marked removed");
    Ok(Json(PersonResponse {
        success: true,
        message: format!("Successfully marked {} as removed", person.name),
        person,
    }))
}

/// `PATCH /api/scoreboard/{id}`: counter patch for one person. The path Id wins
/// over any `id` in the body.
pub async fn patch_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<CounterPatchBody>, JsonRejection>,
) -> Result<Json<PersonResponse>, ApiError> {
    let body = json_body(body, StatusCode::BAD_REQUEST)?;
    let patch = body.into_patch(id);
    let person = roster_repo::patch_counters(state.store.as_ref(), &patch)
        .await
        .map_err(|e| ApiError::from_app(e, UPDATE_FAILED))?;

    tracing::info!(id = %person.id, points = %person.points, "Person counters updated");
    Ok(Json(PersonResponse {
        success: true,
        message: format!("Successfully updated {}", person.name),
        person,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{scored, state, state_with};
    use crate::config::{EngineConfig, RecordScope};
    use crate::db::RosterStore;
    use serde_json::json;

    fn roster() -> Vec<PersonRecord> {
        let mut gone = scored("3", "Dee", "FALSE", "4", "4");
        gone.is_removed = "TRUE".into();
        vec![
            scored("1", "Ann", "TRUE", "2", "1"),
            scored("2", "Bob", "FALSE", "0", "0"),
            gone,
        ]
    }

    fn update_body(value: Value) -> UpdateRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_get_scoreboard_returns_all_rows() {
        let (state, _) = state(&roster());
        let Json(rows) = get_scoreboard(State(state)).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[2].is_removed());
    }

    #[tokio::test]
    async fn test_read_failure_uses_fixed_message() {
        let (state, store) = state(&roster());
        store.set_unavailable(true);
        let err = get_scoreboard(State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to read scoreboard data");
    }

    #[tokio::test]
    async fn test_update_removes_and_patches() {
        let (state, store) = state(&roster());
        let body = update_body(json!({
            "selectedNames": ["2"],
            "updatedData": [
                { "id": "1", "questionsAnsweredCorrectly": 5, "questionsMissed": "2" }
            ]
        }));
        let Json(resp) = update_scoreboard(State(state), Ok(Json(body))).await.unwrap();
        assert_eq!(
            resp,
            UpdateResponse {
                success: true,
                message: "Successfully removed 1 people and updated 1 entries".into(),
                removed_count: 1,
                updated_count: 1,
            }
        );

        let rows = store.read_all().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].questions_answered_correctly, "5");
        assert_eq!(rows[0].points, "3");
        assert!(rows[1].is_removed());
    }

    #[tokio::test]
    async fn test_update_explicit_points_override() {
        let (state, store) = state(&roster());
        let body = update_body(json!({
            "updatedData": [{ "id": "1", "questionsAnsweredCorrectly": 1, "questionsMissed": 5, "points": 10 }]
        }));
        let Json(resp) = update_scoreboard(State(state), Ok(Json(body))).await.unwrap();
        assert_eq!(resp.message, "Successfully updated 1 entries");
        assert_eq!(store.read_all().await.unwrap()[0].points, "10");
    }

    #[tokio::test]
    async fn test_empty_update_is_no_changes() {
        let (state, _) = state(&roster());
        let Json(resp) = update_scoreboard(State(state), Ok(Json(update_body(json!({}))))).await.unwrap();
        assert_eq!(resp.message, "No changes made");
        assert_eq!(resp.removed_count, 0);
    }

    #[tokio::test]
    async fn test_removed_count_includes_null_selections() {
        let (state, store) = state(&roster());
        let body = update_body(json!({ "selectedNames": ["2", null] }));
        let Json(resp) = update_scoreboard(State(state), Ok(Json(body))).await.unwrap();
        assert_eq!(resp.removed_count, 2);
        assert_eq!(resp.message, "Successfully marked 2 people as removed");

        let rows = store.read_all().await.unwrap();
        assert!(rows[1].is_removed());
        assert!(!rows[0].is_removed());
    }

    #[tokio::test]
    async fn test_add_person() {
        let (state, store) = state(&roster());
        let body = AddRequest {
            name: Some("Cy".into()),
            is_dev: Some(json!(true)),
        };
        let Json(resp) = add_person(State(state), Ok(Json(body))).await.unwrap();
        assert_eq!(resp.message, "Successfully added Cy to the scoreboard");
        assert_eq!(resp.new_person.id, "4");
        assert_eq!(resp.new_person.is_dev, "TRUE");
        assert_eq!(store.read_all().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_add_requires_fields() {
        let (state, store) = state(&roster());
        let body = AddRequest {
            name: Some("Cy".into()),
            is_dev: None,
        };
        let err = add_person(State(state), Ok(Json(body))).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "name and isDev are required");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_add_duplicate_of_removed_person() {
        let (state, store) = state(&roster());
        let body = AddRequest {
            name: Some("Dee".into()),
            is_dev: Some(json!("FALSE")),
        };
        let err = add_person(State(state), Ok(Json(body))).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Person with this name already exists");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_add_duplicate_scope_active_allows_removed_name() {
        let engine = EngineConfig {
            duplicate_name_scope: RecordScope::Active,
            ..EngineConfig::default()
        };
        let (state, _) = state_with(&roster(), engine);
        let body = AddRequest {
            name: Some("Dee".into()),
            is_dev: Some(json!("FALSE")),
        };
        let Json(resp) = add_person(State(state), Ok(Json(body))).await.unwrap();
        assert_eq!(resp.new_person.id, "4");
    }

    #[tokio::test]
    async fn test_clear_resets_every_row() {
        let (state, store) = state(&roster());
        let Json(resp) = clear_scoreboard(State(state)).await.unwrap();
        assert_eq!(resp.message, "Scoreboard cleared successfully");
        assert_eq!(resp.cleared_count, 3);
        for row in store.read_all().await.unwrap() {
            assert_eq!(row.questions_asked, "0");
            assert_eq!(row.points, "0");
        }
    }

    #[tokio::test]
    async fn test_clear_failure_message() {
        let (state, store) = state(&roster());
        store.set_unavailable(true);
        let err = clear_scoreboard(State(state)).await.unwrap_err();
        assert_eq!(err.message, "Failed to clear scoreboard data");
    }

    #[tokio::test]
    async fn test_remove_person_by_id() {
        let (state, store) = state(&roster());
        let Json(resp) = remove_person(State(state.clone()), Path("1".into())).await.unwrap();
        assert!(resp.person.is_removed());
        assert_eq!(store.read_all().await.unwrap().len(), 3);

        let err = remove_person(State(state), Path("42".into())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_patch_person_uses_path_id() {
        let (state, _) = state(&roster());
        let body: CounterPatchBody = serde_json::from_value(json!({
            "id": "2",
            "questionsAnsweredCorrectly": "4",
            "questionsMissed": null
        }))
        .unwrap();
        let Json(resp) = patch_person(State(state), Path("1".into()), Ok(Json(body))).await.unwrap();
        assert_eq!(resp.person.name, "Ann");
        assert_eq!(resp.person.points, "4");
    }
}
