use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::reports::GenderFilter;
use crate::services::reports;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct DemographicsQuery {
    pub gender: Option<String>,
}

pub async fn demographics(
    State(state): State<AppState>,
    Query(query): Query<DemographicsQuery>,
) -> AppResult<Response> {
    let filter = GenderFilter::parse(query.gender.as_deref());
    let report = reports::demographics(&state, &filter).await?;
    Ok(success(report, "Demographics computed"))
}

pub async fn bad_time_sheets(State(state): State<AppState>) -> AppResult<Response> {
    let sheets = reports::bad_time_sheets(&state).await?;
    Ok(success(sheets, "Bad time sheets retrieved"))
}
