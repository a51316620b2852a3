use std::collections::HashMap;

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    open_sentinel, NewTimeSheet, TimeCorrection, TimeSheet, TimeSheetFilter, UserFilter,
};
use crate::reports::total_hours;
use crate::state::AppState;
use crate::store::{Page, PageRequest};
use crate::utils::error::{AppError, AppResult};

/// Time sheet joined with the display names of what it references.
#[derive(Debug, Clone, Serialize)]
pub struct TimeCard {
    pub time_sheet_id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub organization_id: Uuid,
    pub clock_in_time: NaiveDateTime,
    pub clock_out_time: NaiveDateTime,
    pub organization_name: Option<String>,
    pub project_name: Option<String>,
    pub volunteer_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeCardQuery {
    pub page: Option<u32>,
    pub organization_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub range_start: Option<NaiveDate>,
    pub range_end: Option<NaiveDate>,
    /// Volunteer name or email fragment.
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Portal {
    pub user_id: Uuid,
    pub full_name: String,
    pub is_punched_in: bool,
    pub cumulative_hours: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PunchIn {
    pub project_id: Uuid,
    pub organization_id: Uuid,
}

fn ensure_ordered(clock_in: NaiveDateTime, clock_out: NaiveDateTime) -> AppResult<()> {
    if clock_out < clock_in {
        return Err(AppError::validation(format!(
            "Clock-out {} is before clock-in {}",
            clock_out, clock_in
        )));
    }
    Ok(())
}

fn start_of(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// `[begin 00:00, end + 1 day 00:00)`, so the end day is included.
fn day_range(begin: NaiveDate, end: NaiveDate) -> AppResult<(NaiveDateTime, NaiveDateTime)> {
    if begin > end {
        return Err(AppError::validation(format!(
            "Range start {} is after range end {}",
            begin, end
        )));
    }
    Ok((start_of(begin), open_sentinel(end)))
}

/// Narrow `filter` to sheets clocked in on the given days, both inclusive.
/// Either end may be left open.
pub fn within_days(
    mut filter: TimeSheetFilter,
    begin: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> AppResult<TimeSheetFilter> {
    let (from, before) = match (begin, end) {
        (Some(begin), Some(end)) => {
            let (from, before) = day_range(begin, end)?;
            (Some(from), Some(before))
        }
        (begin, end) => (begin.map(start_of), end.map(open_sentinel)),
    };
    filter.clock_in_from = from;
    filter.clock_in_before = before;
    Ok(filter)
}

async fn ensure_references(
    state: &AppState,
    user_id: Uuid,
    project_id: Uuid,
    organization_id: Uuid,
) -> AppResult<()> {
    state.store.users().get(user_id).await?;
    state.store.projects().get(project_id).await?;
    state.store.organizations().get(organization_id).await?;
    Ok(())
}

/// A volunteer holds at most one sheet carrying today's open sentinel.
async fn ensure_single_open(
    state: &AppState,
    user_id: Uuid,
    clock_out: NaiveDateTime,
    except: Option<Uuid>,
) -> AppResult<()> {
    if clock_out != open_sentinel(state.today()) {
        return Ok(());
    }
    let open = find_time_sheets(
        state,
        &TimeSheetFilter {
            user_id: Some(user_id),
            clock_out_time: Some(clock_out),
            ..TimeSheetFilter::default()
        },
    )
    .await?;
    if open.iter().any(|sheet| Some(sheet.id) != except) {
        return Err(AppError::validation("Volunteer is already punched in"));
    }
    Ok(())
}

pub async fn get_time_sheet(state: &AppState, id: Uuid) -> AppResult<TimeSheet> {
    state.store.time_sheets().get(id).await
}

pub async fn find_time_sheets(
    state: &AppState,
    filter: &TimeSheetFilter,
) -> AppResult<Vec<TimeSheet>> {
    state.store.time_sheets().find_where(filter).await
}

/// The sheet a volunteer punched in to a project on a given day.
pub async fn time_sheet_by_natural_key(
    state: &AppState,
    user_id: Uuid,
    project_id: Uuid,
    day: NaiveDate,
) -> AppResult<TimeSheet> {
    let (from, before) = day_range(day, day)?;
    state
        .store
        .time_sheets()
        .find_single(&TimeSheetFilter {
            user_id: Some(user_id),
            project_id: Some(project_id),
            clock_in_from: Some(from),
            clock_in_before: Some(before),
            ..TimeSheetFilter::default()
        })
        .await
}

pub async fn time_sheets_for_volunteer(
    state: &AppState,
    user_id: Uuid,
) -> AppResult<Vec<TimeSheet>> {
    find_time_sheets(state, &TimeSheetFilter::for_user(user_id)).await
}

pub async fn time_sheets_for_project(
    state: &AppState,
    project_id: Uuid,
) -> AppResult<Vec<TimeSheet>> {
    find_time_sheets(state, &TimeSheetFilter::for_project(project_id)).await
}

pub async fn time_sheets_for_organization(
    state: &AppState,
    organization_id: Uuid,
) -> AppResult<Vec<TimeSheet>> {
    find_time_sheets(state, &TimeSheetFilter::for_organization(organization_id)).await
}

pub async fn time_sheets_in_range(
    state: &AppState,
    begin: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<TimeSheet>> {
    let filter = within_days(TimeSheetFilter::default(), Some(begin), Some(end))?;
    find_time_sheets(state, &filter).await
}

/// Administrative insert of a complete sheet.
pub async fn insert_time_sheet(state: &AppState, new: NewTimeSheet) -> AppResult<TimeSheet> {
    ensure_ordered(new.clock_in_time, new.clock_out_time)?;
    ensure_references(state, new.user_id, new.project_id, new.organization_id).await?;
    ensure_single_open(state, new.user_id, new.clock_out_time, None).await?;

    let stamp = state.stamp();
    state
        .store
        .time_sheets()
        .insert(TimeSheet {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            project_id: new.project_id,
            organization_id: new.organization_id,
            clock_in_time: new.clock_in_time,
            clock_out_time: new.clock_out_time,
            created_at: stamp,
            updated_at: stamp,
        })
        .await
}

pub async fn edit_time_sheet(
    state: &AppState,
    id: Uuid,
    replacement: NewTimeSheet,
) -> AppResult<TimeSheet> {
    ensure_ordered(replacement.clock_in_time, replacement.clock_out_time)?;
    let mut sheet = state.store.time_sheets().get(id).await?;
    ensure_references(
        state,
        replacement.user_id,
        replacement.project_id,
        replacement.organization_id,
    )
    .await?;
    ensure_single_open(state, replacement.user_id, replacement.clock_out_time, Some(id)).await?;

    sheet.user_id = replacement.user_id;
    sheet.project_id = replacement.project_id;
    sheet.organization_id = replacement.organization_id;
    sheet.clock_in_time = replacement.clock_in_time;
    sheet.clock_out_time = replacement.clock_out_time;
    sheet.updated_at = state.stamp();
    state.store.time_sheets().update(sheet).await
}

pub async fn delete_time_sheet(state: &AppState, id: Uuid) -> AppResult<()> {
    state.store.time_sheets().delete(id).await?;
    tracing::info!(time_sheet_id = %id, "Time sheet deleted");
    Ok(())
}

/// Most recent sheet of the user that is still open today.
pub async fn clocked_in_sheet(state: &AppState, user_id: Uuid) -> AppResult<Option<TimeSheet>> {
    let open = find_time_sheets(
        state,
        &TimeSheetFilter {
            user_id: Some(user_id),
            clock_out_time: Some(open_sentinel(state.today())),
            ..TimeSheetFilter::default()
        },
    )
    .await?;
    Ok(open.into_iter().next())
}

pub async fn is_clocked_in(state: &AppState, user_id: Uuid) -> AppResult<bool> {
    Ok(clocked_in_sheet(state, user_id).await?.is_some())
}

pub async fn punch_in(state: &AppState, user_id: Uuid, punch: PunchIn) -> AppResult<TimeSheet> {
    ensure_references(state, user_id, punch.project_id, punch.organization_id).await?;
    if is_clocked_in(state, user_id).await? {
        return Err(AppError::validation("Volunteer is already punched in"));
    }

    let now = state.now();
    let stamp = state.stamp();
    let sheet = state
        .store
        .time_sheets()
        .insert(TimeSheet {
            id: Uuid::new_v4(),
            user_id,
            project_id: punch.project_id,
            organization_id: punch.organization_id,
            clock_in_time: now,
            clock_out_time: open_sentinel(now.date()),
            created_at: stamp,
            updated_at: stamp,
        })
        .await?;
    tracing::info!(user_id = %user_id, time_sheet_id = %sheet.id, "Punched in");
    Ok(sheet)
}

pub async fn punch_out(state: &AppState, user_id: Uuid) -> AppResult<TimeSheet> {
    let mut sheet = clocked_in_sheet(state, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Volunteer is not punched in"))?;

    let now = state.now();
    ensure_ordered(sheet.clock_in_time, now)?;
    sheet.clock_out_time = now;
    sheet.updated_at = state.stamp();

    let sheet = state.store.time_sheets().update(sheet).await?;
    tracing::info!(user_id = %user_id, time_sheet_id = %sheet.id, "Punched out");
    Ok(sheet)
}

#[derive(Default)]
struct NameLookup {
    organizations: HashMap<Uuid, Option<String>>,
    projects: HashMap<Uuid, Option<String>>,
    volunteers: HashMap<Uuid, Option<String>>,
}

impl NameLookup {
    async fn card(&mut self, state: &AppState, sheet: TimeSheet) -> AppResult<TimeCard> {
        if !self.organizations.contains_key(&sheet.organization_id) {
            let name = state
                .store
                .organizations()
                .find_by_id(sheet.organization_id)
                .await?
                .map(|o| o.name);
            self.organizations.insert(sheet.organization_id, name);
        }
        if !self.projects.contains_key(&sheet.project_id) {
            let name = state
                .store
                .projects()
                .find_by_id(sheet.project_id)
                .await?
                .map(|p| p.name);
            self.projects.insert(sheet.project_id, name);
        }
        if !self.volunteers.contains_key(&sheet.user_id) {
            let name = state
                .store
                .users()
                .find_by_id(sheet.user_id)
                .await?
                .map(|u| u.full_name());
            self.volunteers.insert(sheet.user_id, name);
        }

        Ok(TimeCard {
            time_sheet_id: sheet.id,
            user_id: sheet.user_id,
            project_id: sheet.project_id,
            organization_id: sheet.organization_id,
            clock_in_time: sheet.clock_in_time,
            clock_out_time: sheet.clock_out_time,
            organization_name: self.organizations[&sheet.organization_id].clone(),
            project_name: self.projects[&sheet.project_id].clone(),
            volunteer_name: self.volunteers[&sheet.user_id].clone(),
        })
    }
}

pub async fn time_card(state: &AppState, id: Uuid) -> AppResult<TimeCard> {
    let sheet = state.store.time_sheets().get(id).await?;
    NameLookup::default().card(state, sheet).await
}

/// Editor correction of a sheet's punch times.
pub async fn edit_time_card(
    state: &AppState,
    id: Uuid,
    correction: TimeCorrection,
) -> AppResult<TimeCard> {
    ensure_ordered(correction.clock_in_time, correction.clock_out_time)?;
    let mut sheet = state.store.time_sheets().get(id).await?;
    ensure_single_open(state, sheet.user_id, correction.clock_out_time, Some(id)).await?;
    sheet.clock_in_time = correction.clock_in_time;
    sheet.clock_out_time = correction.clock_out_time;
    sheet.updated_at = state.stamp();

    let sheet = state.store.time_sheets().update(sheet).await?;
    tracing::info!(time_sheet_id = %id, "Time card corrected");
    NameLookup::default().card(state, sheet).await
}

/// Time cards clocked in within the range, newest first. The range defaults
/// to the last two months.
pub async fn time_card_page(state: &AppState, query: TimeCardQuery) -> AppResult<Page<TimeCard>> {
    let today = state.today();
    let range_end = query.range_end.unwrap_or(today);
    let range_start = query.range_start.unwrap_or_else(|| {
        range_end
            .checked_sub_months(Months::new(2))
            .unwrap_or(NaiveDate::MIN)
    });
    let (from, before) = day_range(range_start, range_end)?;

    let user_ids = match query.query.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => Some(
            state
                .store
                .users()
                .find_where(&UserFilter {
                    search: Some(term.to_string()),
                    ..UserFilter::default()
                })
                .await?
                .into_iter()
                .map(|u| u.id)
                .collect(),
        ),
        _ => None,
    };

    let filter = TimeSheetFilter {
        user_ids,
        project_id: query.project_id,
        organization_id: query.organization_id,
        clock_in_from: Some(from),
        clock_in_before: Some(before),
        ..TimeSheetFilter::default()
    };
    let page = state
        .store
        .time_sheets()
        .find_page(&filter, PageRequest::new(query.page, None))
        .await?;

    let mut lookup = NameLookup::default();
    let mut cards = Vec::with_capacity(page.items.len());
    let request = PageRequest::new(Some(page.page), Some(page.per_page));
    let total = page.total_count;
    for sheet in page.items {
        cards.push(lookup.card(state, sheet).await?);
    }
    Ok(Page::new(cards, request, total))
}

pub async fn portal(state: &AppState, user_id: Uuid) -> AppResult<Portal> {
    let user = state.store.users().get(user_id).await?;
    let sheets = time_sheets_for_volunteer(state, user_id).await?;
    let today = state.today();
    let sentinel = open_sentinel(today);

    Ok(Portal {
        user_id,
        full_name: user.full_name(),
        is_punched_in: sheets.iter().any(|s| s.clock_out_time == sentinel),
        cumulative_hours: total_hours(&sheets, today).hours,
    })
}
