use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
};

use crate::config::ResponseShape;
use crate::db::{self, Table};
use crate::error::{report, ApiError};
use crate::models::RecordSet;
use super::AppState;

// GET /PL/stats/{team} - Regular season table rows for a squad
pub async fn get_team_stats(
    State(state): State<AppState>,
    Path(team): Path<String>,
) -> Result<Response, ApiError> {
    squad_rows(&state, Table::RegularSeason, &team).await
}

// GET /PL/ratings/{team} - Ratings rows for a squad
pub async fn get_team_ratings(
    State(state): State<AppState>,
    Path(team): Path<String>,
) -> Result<Response, ApiError> {
    squad_rows(&state, Table::Ratings, &team).await
}

async fn squad_rows(state: &AppState, table: Table, team: &str) -> Result<Response, ApiError> {
    tracing::info!("Querying {:?} for: {}", table, db::fold_squad(team));

    let records = db::fetch_squad(&state.pool, table, team)
        .await
        .inspect_err(|e| tracing::error!("Failed to query {:?} for {}: {}", table, team, report(e)))?;

    render(records, state.response_shape)
}

fn render(records: RecordSet, shape: ResponseShape) -> Result<Response, ApiError> {
    match shape {
        ResponseShape::Array => Ok(Json(records).into_response()),
        ResponseShape::LegacyString => {
            let text = serde_json::to_string(&records)?;
            Ok(Json(text).into_response())
        }
    }
}
