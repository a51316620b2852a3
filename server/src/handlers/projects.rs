use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::organizations::parse_status;
use crate::models::{NewProject, ProjectChanges};
use crate::services::{projects, reports};
use crate::state::AppState;
use crate::store::PageRequest;
use crate::utils::error::AppResult;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub page: Option<u32>,
    pub status: Option<String>,
    /// Name fragment.
    pub query: Option<String>,
}

pub async fn project_page(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> AppResult<Response> {
    let status = parse_status(query.status.as_deref())?;
    let page = projects::project_page(
        &state,
        PageRequest::new(query.page, None),
        status,
        query.query,
    )
    .await?;
    Ok(success(page, "Projects retrieved"))
}

pub async fn active_projects(State(state): State<AppState>) -> AppResult<Response> {
    let active = projects::list_active_projects(&state).await?;
    Ok(success(active, "Active projects retrieved"))
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<NewProject>,
) -> AppResult<Response> {
    let project = projects::create_project(&state, payload).await?;
    Ok(created(project, "Project created"))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let project = projects::get_project(&state, id).await?;
    Ok(success(project, "Project retrieved"))
}

pub async fn edit_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<ProjectChanges>,
) -> AppResult<Response> {
    let project = projects::edit_project(&state, id, changes).await?;
    Ok(success(project, "Project updated"))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    projects::delete_project(&state, id).await?;
    Ok(empty_success("Project deleted"))
}

pub async fn project_hours(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let summary = reports::hours_for_project(&state, id).await?;
    Ok(success(summary, "Project hours computed"))
}
