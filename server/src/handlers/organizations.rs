use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{NewOrganization, OrganizationChanges, OrganizationFilter, StatusChoice};
use crate::services::organizations;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct OrganizationQuery {
    /// Name fragment.
    pub name: Option<String>,
    pub status: Option<String>,
}

pub(crate) fn parse_status(status: Option<&str>) -> AppResult<StatusChoice> {
    status
        .map_or(Ok(StatusChoice::All), str::parse)
        .map_err(AppError::ValidationError)
}

pub async fn list_organizations(
    State(state): State<AppState>,
    Query(query): Query<OrganizationQuery>,
) -> AppResult<Response> {
    let filter = OrganizationFilter {
        name_contains: query.name.filter(|n| !n.trim().is_empty()),
        active: parse_status(query.status.as_deref())?.as_flag(),
        ..OrganizationFilter::default()
    };
    let orgs = organizations::list_organizations(&state, &filter).await?;
    Ok(success(orgs, "Organizations retrieved"))
}

pub async fn create_organization(
    State(state): State<AppState>,
    Json(payload): Json<NewOrganization>,
) -> AppResult<Response> {
    let org = organizations::create_organization(&state, payload).await?;
    Ok(created(org, "Organization created"))
}

pub async fn get_organization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let org = organizations::get_organization(&state, id).await?;
    Ok(success(org, "Organization retrieved"))
}

pub async fn edit_organization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<OrganizationChanges>,
) -> AppResult<Response> {
    let org = organizations::edit_organization(&state, id, changes).await?;
    Ok(success(org, "Organization updated"))
}

pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    organizations::delete_organization(&state, id).await?;
    Ok(empty_success("Organization deleted"))
}
