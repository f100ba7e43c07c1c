use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::models::PersonRecord;
use crate::engine::scoreboard;
use crate::engine::selection::{Audience, Wheel};
use crate::engine::spin::{plan_spin, SpinPlan};
use crate::error::{ApiError, AppError};
use crate::AppState;

const READ_FAILED: &str = "Failed to read scoreboard data";

#[derive(Debug, Default, Deserialize)]
pub struct AudienceQuery {
    #[serde(default)]
    pub audience: Option<String>,
}

impl AudienceQuery {
    /// Requested audience, or the configured default when none was given.
    fn resolve(&self, default: Audience) -> Result<Audience, AppError> {
        match self.audience.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => {
                Audience::parse(raw).ok_or_else(|| AppError::Validation(format!("Unknown audience: {raw}")))
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub record: PersonRecord,
    pub weight: f64,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub audience: Audience,
    pub label: &'static str,
    pub candidates: Vec<RosterEntry>,
}

fn wheel_for(state: &AppState, query: &AudienceQuery) -> Result<(Audience, Wheel), ApiError> {
    let audience = query
        .resolve(state.engine.default_audience)
        .map_err(|e| ApiError::from_app(e, READ_FAILED))?;
    Ok((audience, Wheel::for_audience(audience, state.engine.weight_exponent)))
}

async fn read_roster(state: &AppState) -> Result<Vec<PersonRecord>, ApiError> {
    state
        .store
        .read_all()
        .await
        .map_err(|e| ApiError::from_app(e, READ_FAILED))
}

/// `GET /api/roster?audience=`: who is on the wheel and how heavily they are weighted.
pub async fn get_roster(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AudienceQuery>,
) -> Result<Json<RosterResponse>, ApiError> {
    let (audience, wheel) = wheel_for(&state, &query)?;
    let records = read_roster(&state).await?;

    let candidates = wheel
        .candidates(&records)
        .into_iter()
        .map(|record| RosterEntry {
            weight: wheel.weight(record),
            record: record.clone(),
        })
        .collect();

    Ok(Json(RosterResponse {
        audience,
        label: audience.label(),
        candidates,
    }))
}

/// `GET /api/standings`: visible people, highest points first.
pub async fn get_standings(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PersonRecord>>, ApiError> {
    let records = read_roster(&state).await?;
    Ok(Json(scoreboard::standings(&records)))
}

/// `GET /api/spin?audience=`
pub async fn spin(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AudienceQuery>,
) -> Result<Json<SpinPlan>, ApiError> {
    let (audience, wheel) = wheel_for(&state, &query)?;
    let records = read_roster(&state).await?;

    let plan = {
        let mut rng = rand::thread_rng();
        plan_spin(&wheel, &records, &mut rng)
    };
    tracing::info!(audience = ?audience, winner = %plan.winner, cycles = plan.cycles, "Wheel spun");
    Ok(Json(plan))
}
