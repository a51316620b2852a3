use uuid::Uuid;

use crate::models::{TimeSheet, TimeSheetFilter, UserFilter};
use crate::reports::{bucket_users, total_hours, Demographics, GenderFilter, HoursSummary};
use crate::state::AppState;
use crate::utils::error::AppResult;

pub async fn hours_for_volunteer(state: &AppState, user_id: Uuid) -> AppResult<HoursSummary> {
    state.store.users().get(user_id).await?;
    let sheets = state
        .store
        .time_sheets()
        .find_where(&TimeSheetFilter::for_user(user_id))
        .await?;
    Ok(total_hours(&sheets, state.today()))
}

pub async fn hours_for_project(state: &AppState, project_id: Uuid) -> AppResult<HoursSummary> {
    state.store.projects().get(project_id).await?;
    let sheets = state
        .store
        .time_sheets()
        .find_where(&TimeSheetFilter::for_project(project_id))
        .await?;
    Ok(total_hours(&sheets, state.today()))
}

pub async fn demographics(state: &AppState, gender: &GenderFilter) -> AppResult<Demographics> {
    let users = state
        .store
        .users()
        .find_where(&UserFilter {
            has_birth_date: true,
            gender: gender.as_gender().map(str::to_string),
            ..UserFilter::default()
        })
        .await?;
    Ok(bucket_users(&users, gender, state.today()))
}

/// Sheets that need an editor: negative durations and open sheets left
/// behind on an earlier day.
pub async fn bad_time_sheets(state: &AppState) -> AppResult<Vec<TimeSheet>> {
    let today = state.today();
    let sheets = state
        .store
        .time_sheets()
        .find_where(&TimeSheetFilter::default())
        .await?;
    Ok(sheets
        .into_iter()
        .filter(|s| s.is_negative() || s.is_stale_open(today))
        .collect())
}
