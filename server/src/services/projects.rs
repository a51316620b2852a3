use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{
    NewProject, Project, ProjectChanges, ProjectFilter, StatusChoice, TimeSheetFilter,
};
use crate::state::AppState;
use crate::store::{Page, PageRequest};
use crate::utils::error::{AppError, AppResult};

pub async fn list_projects(state: &AppState, filter: &ProjectFilter) -> AppResult<Vec<Project>> {
    state.store.projects().find_where(filter).await
}

pub async fn list_active_projects(state: &AppState) -> AppResult<Vec<Project>> {
    list_projects(
        state,
        &ProjectFilter {
            active: Some(true),
            ..ProjectFilter::default()
        },
    )
    .await
}

/// One page of projects narrowed by status and a name fragment.
pub async fn project_page(
    state: &AppState,
    page: PageRequest,
    status: StatusChoice,
    query: Option<String>,
) -> AppResult<Page<Project>> {
    let filter = ProjectFilter {
        name_contains: query.filter(|q| !q.trim().is_empty()),
        active: status.as_flag(),
        ..ProjectFilter::default()
    };
    state.store.projects().find_page(&filter, page).await
}

pub async fn get_project(state: &AppState, id: Uuid) -> AppResult<Project> {
    state.store.projects().get(id).await
}

pub async fn get_project_by_name_and_date(
    state: &AppState,
    name: &str,
    begin_date: NaiveDate,
) -> AppResult<Project> {
    state
        .store
        .projects()
        .find_single(&ProjectFilter {
            name: Some(name.trim().to_string()),
            begin_date: Some(begin_date),
            ..ProjectFilter::default()
        })
        .await
}

async fn ensure_key_free(
    state: &AppState,
    name: &str,
    begin_date: NaiveDate,
    except: Option<Uuid>,
) -> AppResult<()> {
    let clash = state
        .store
        .projects()
        .find_where(&ProjectFilter {
            name: Some(name.to_string()),
            begin_date: Some(begin_date),
            ..ProjectFilter::default()
        })
        .await?
        .iter()
        .any(|p| Some(p.id) != except);
    if clash {
        return Err(AppError::validation(format!(
            "Project '{}' beginning {} already exists",
            name, begin_date
        )));
    }
    Ok(())
}

fn required_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Project name is required"));
    }
    Ok(name.to_string())
}

pub async fn create_project(state: &AppState, new: NewProject) -> AppResult<Project> {
    let name = required_name(&new.name)?;
    ensure_key_free(state, &name, new.begin_date, None).await?;

    let stamp = state.stamp();
    let project = state
        .store
        .projects()
        .insert(Project {
            id: Uuid::new_v4(),
            name,
            description: new.description,
            begin_date: new.begin_date,
            active: new.active,
            created_at: stamp,
            updated_at: stamp,
        })
        .await?;
    tracing::info!(project_id = %project.id, name = %project.name, "Project created");
    Ok(project)
}

pub async fn edit_project(
    state: &AppState,
    id: Uuid,
    changes: ProjectChanges,
) -> AppResult<Project> {
    let mut project = state.store.projects().get(id).await?;
    if let Some(name) = changes.name {
        project.name = required_name(&name)?;
    }
    if let Some(description) = changes.description {
        project.description = Some(description);
    }
    if let Some(begin_date) = changes.begin_date {
        project.begin_date = begin_date;
    }
    if let Some(active) = changes.active {
        project.active = active;
    }
    ensure_key_free(state, &project.name, project.begin_date, Some(id)).await?;

    project.updated_at = state.stamp();
    state.store.projects().update(project).await
}

pub async fn delete_project(state: &AppState, id: Uuid) -> AppResult<()> {
    state.store.projects().get(id).await?;
    let sheets = state
        .store
        .time_sheets()
        .find_where(&TimeSheetFilter::for_project(id))
        .await?;
    if !sheets.is_empty() {
        return Err(AppError::validation(format!(
            "Project is referenced by {} time sheet(s)",
            sheets.len()
        )));
    }
    state.store.projects().delete(id).await?;
    tracing::info!(project_id = %id, "Project deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::time_sheet::tests::at;
    use crate::utils::clock::FixedClock;

    fn state() -> AppState {
        AppState::in_memory(Arc::new(FixedClock(at((2025, 6, 10), 9, 0))))
    }

    fn new_project(name: &str, begin: NaiveDate) -> NewProject {
        NewProject {
            name: name.into(),
            description: None,
            begin_date: begin,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_natural_key_is_name_and_begin_date() {
        let state = state();
        let spring = at((2025, 3, 1), 0, 0).date();
        let fall = at((2025, 9, 1), 0, 0).date();

        let first = create_project(&state, new_project("Roof Repair", spring))
            .await
            .unwrap();
        create_project(&state, new_project("Roof Repair", fall))
            .await
            .unwrap();

        let found = get_project_by_name_and_date(&state, "roof repair", spring)
            .await
            .unwrap();
        assert_eq!(found.id, first.id);

        let dup = create_project(&state, new_project("Roof Repair", spring)).await;
        assert!(matches!(dup, Err(AppError::ValidationError(_))));

        let moved = edit_project(
            &state,
            first.id,
            ProjectChanges {
                begin_date: Some(fall),
                ..ProjectChanges::default()
            },
        )
        .await;
        assert!(matches!(moved, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_active_listing() {
        let state = state();
        let day = at((2025, 3, 1), 0, 0).date();
        let mut dormant = new_project("Shed", day);
        dormant.active = false;
        create_project(&state, dormant).await.unwrap();
        create_project(&state, new_project("Fence", day)).await.unwrap();

        let active = list_active_projects(&state).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Fence");
    }
}
