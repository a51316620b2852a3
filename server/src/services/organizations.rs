use uuid::Uuid;

use crate::models::{
    NewOrganization, Organization, OrganizationChanges, OrganizationFilter, TimeSheetFilter,
};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn list_organizations(
    state: &AppState,
    filter: &OrganizationFilter,
) -> AppResult<Vec<Organization>> {
    state.store.organizations().find_where(filter).await
}

pub async fn get_organization(state: &AppState, id: Uuid) -> AppResult<Organization> {
    state.store.organizations().get(id).await
}

pub async fn get_organization_by_name(state: &AppState, name: &str) -> AppResult<Organization> {
    state
        .store
        .organizations()
        .find_single(&OrganizationFilter {
            name: Some(name.trim().to_string()),
            ..OrganizationFilter::default()
        })
        .await
}

async fn ensure_name_free(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let clash = state
        .store
        .organizations()
        .find_where(&OrganizationFilter {
            name: Some(name.to_string()),
            ..OrganizationFilter::default()
        })
        .await?
        .iter()
        .any(|org| Some(org.id) != except);
    if clash {
        return Err(AppError::validation(format!(
            "An organization named '{}' already exists",
            name
        )));
    }
    Ok(())
}

fn required_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Organization name is required"));
    }
    Ok(name.to_string())
}

pub async fn create_organization(
    state: &AppState,
    new: NewOrganization,
) -> AppResult<Organization> {
    let name = required_name(&new.name)?;
    ensure_name_free(state, &name, None).await?;

    let stamp = state.stamp();
    let org = state
        .store
        .organizations()
        .insert(Organization {
            id: Uuid::new_v4(),
            name,
            active: new.active,
            created_at: stamp,
            updated_at: stamp,
        })
        .await?;
    tracing::info!(organization_id = %org.id, name = %org.name, "Organization created");
    Ok(org)
}

pub async fn edit_organization(
    state: &AppState,
    id: Uuid,
    changes: OrganizationChanges,
) -> AppResult<Organization> {
    let mut org = state.store.organizations().get(id).await?;
    if let Some(name) = changes.name {
        let name = required_name(&name)?;
        ensure_name_free(state, &name, Some(id)).await?;
        org.name = name;
    }
    if let Some(active) = changes.active {
        org.active = active;
    }
    org.updated_at = state.stamp();
    state.store.organizations().update(org).await
}

pub async fn delete_organization(state: &AppState, id: Uuid) -> AppResult<()> {
    state.store.organizations().get(id).await?;
    let sheets = state
        .store
        .time_sheets()
        .find_where(&TimeSheetFilter::for_organization(id))
        .await?;
    if !sheets.is_empty() {
        return Err(AppError::validation(format!(
            "Organization is referenced by {} time sheet(s)",
            sheets.len()
        )));
    }
    state.store.organizations().delete(id).await?;
    tracing::info!(organization_id = %id, "Organization deleted");
    Ok(())
}
