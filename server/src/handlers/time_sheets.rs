use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{NewTimeSheet, TimeCorrection, TimeSheetFilter};
use crate::services::time_sheets::{self, TimeCardQuery};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Default, Deserialize)]
pub struct TimeSheetQuery {
    pub user_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    /// First clock-in day, inclusive.
    pub from: Option<NaiveDate>,
    /// Last clock-in day, inclusive.
    pub to: Option<NaiveDate>,
}

impl TimeSheetQuery {
    fn into_filter(self) -> AppResult<TimeSheetFilter> {
        time_sheets::within_days(
            TimeSheetFilter {
                user_id: self.user_id,
                project_id: self.project_id,
                organization_id: self.organization_id,
                ..TimeSheetFilter::default()
            },
            self.from,
            self.to,
        )
    }
}

pub async fn list_time_sheets(
    State(state): State<AppState>,
    Query(query): Query<TimeSheetQuery>,
) -> AppResult<Response> {
    let filter = query.into_filter()?;
    let sheets = time_sheets::find_time_sheets(&state, &filter).await?;
    Ok(success(sheets, "Time sheets retrieved"))
}

pub async fn insert_time_sheet(
    State(state): State<AppState>,
    Json(payload): Json<NewTimeSheet>,
) -> AppResult<Response> {
    let sheet = time_sheets::insert_time_sheet(&state, payload).await?;
    Ok(created(sheet, "Time sheet created"))
}

pub async fn get_time_sheet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let sheet = time_sheets::get_time_sheet(&state, id).await?;
    Ok(success(sheet, "Time sheet retrieved"))
}

pub async fn edit_time_sheet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewTimeSheet>,
) -> AppResult<Response> {
    let sheet = time_sheets::edit_time_sheet(&state, id, payload).await?;
    Ok(success(sheet, "Time sheet updated"))
}

pub async fn delete_time_sheet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    time_sheets::delete_time_sheet(&state, id).await?;
    Ok(empty_success("Time sheet deleted"))
}

pub async fn time_card_page(
    State(state): State<AppState>,
    Query(query): Query<TimeCardQuery>,
) -> AppResult<Response> {
    let page = time_sheets::time_card_page(&state, query).await?;
    Ok(success(page, "Time cards retrieved"))
}

pub async fn get_time_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let card = time_sheets::time_card(&state, id).await?;
    Ok(success(card, "Time card retrieved"))
}

pub async fn edit_time_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(correction): Json<TimeCorrection>,
) -> AppResult<Response> {
    let card = time_sheets::edit_time_card(&state, id, correction).await?;
    Ok(success(card, "Time card updated"))
}
