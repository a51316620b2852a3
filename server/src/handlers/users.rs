use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{NewUser, UserChanges};
use crate::services::{reports, time_sheets, users};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct VolunteerQuery {
    pub project_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Serialize)]
struct EmailExists {
    email: String,
    exists: bool,
}

#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    pub password: String,
}

pub async fn list_volunteers(
    State(state): State<AppState>,
    Query(query): Query<VolunteerQuery>,
) -> AppResult<Response> {
    let volunteers =
        users::list_volunteers(&state, query.project_id, query.organization_id).await?;
    Ok(success(volunteers, "Volunteers retrieved"))
}

pub async fn create_volunteer(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> AppResult<Response> {
    let user = users::create_volunteer(&state, payload).await?;
    Ok(created(user, "Volunteer registered"))
}

pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> AppResult<Response> {
    let found = users::users_by_name(&state, query.first_name, query.last_name).await?;
    Ok(success(found, "Users retrieved"))
}

pub async fn email_exists(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Response> {
    let exists = users::email_exists(&state, &query.email).await?;
    Ok(success(
        EmailExists {
            email: query.email,
            exists,
        },
        "Email lookup complete",
    ))
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    let user = users::get_user(&state, id).await?;
    Ok(success(user, "User retrieved"))
}

pub async fn edit_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<UserChanges>,
) -> AppResult<Response> {
    let user = users::edit_user(&state, id, changes).await?;
    Ok(success(user, "User updated"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    users::delete_user(&state, id).await?;
    Ok(empty_success("User deleted"))
}

pub async fn change_password(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PasswordChange>,
) -> AppResult<Response> {
    users::change_password(&state, id, &payload.password).await?;
    Ok(empty_success("Password changed"))
}

pub async fn portal(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    let portal = time_sheets::portal(&state, id).await?;
    Ok(success(portal, "Portal retrieved"))
}

pub async fn volunteer_hours(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let summary = reports::hours_for_volunteer(&state, id).await?;
    Ok(success(summary, "Volunteer hours computed"))
}

pub async fn volunteer_time_sheets(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    users::get_user(&state, id).await?;
    let sheets = time_sheets::time_sheets_for_volunteer(&state, id).await?;
    Ok(success(sheets, "Time sheets retrieved"))
}

pub async fn punch_in(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(punch): Json<time_sheets::PunchIn>,
) -> AppResult<Response> {
    let sheet = time_sheets::punch_in(&state, id, punch).await?;
    Ok(created(sheet, "Punched in"))
}

pub async fn punch_out(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let sheet = time_sheets::punch_out(&state, id).await?;
    Ok(success(sheet, "Punched out"))
}
