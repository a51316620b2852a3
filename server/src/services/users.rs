use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::models::{NewUser, TimeSheet, TimeSheetFilter, User, UserChanges, UserFilter};
use crate::reports::total_hours;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::password::hash_password;

#[derive(Debug, Clone, Serialize)]
pub struct VolunteerSummary {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub hours_to_date: f64,
}

/// Every volunteer with their cumulative hours. With a project or
/// organization given, only volunteers that logged time there are listed.
pub async fn list_volunteers(
    state: &AppState,
    project_id: Option<Uuid>,
    organization_id: Option<Uuid>,
) -> AppResult<Vec<VolunteerSummary>> {
    let mut users = state.store.users().find_where(&UserFilter::default()).await?;

    if project_id.is_some() || organization_id.is_some() {
        let filter = TimeSheetFilter {
            project_id,
            organization_id,
            ..TimeSheetFilter::default()
        };
        let worked: HashSet<Uuid> = state
            .store
            .time_sheets()
            .find_where(&filter)
            .await?
            .into_iter()
            .map(|sheet| sheet.user_id)
            .collect();
        users.retain(|user| worked.contains(&user.id));
    }

    let sheets = state
        .store
        .time_sheets()
        .find_where(&TimeSheetFilter {
            user_ids: Some(users.iter().map(|u| u.id).collect()),
            ..TimeSheetFilter::default()
        })
        .await?;
    let mut by_user: HashMap<Uuid, Vec<TimeSheet>> = HashMap::new();
    for sheet in sheets {
        by_user.entry(sheet.user_id).or_default().push(sheet);
    }

    let today = state.today();
    Ok(users
        .into_iter()
        .map(|user| {
            let hours = by_user
                .get(&user.id)
                .map_or(0.0, |sheets| total_hours(sheets, today).hours);
            VolunteerSummary {
                user_id: user.id,
                name: user.full_name(),
                email: user.email_address,
                hours_to_date: hours,
            }
        })
        .collect())
}

pub async fn create_volunteer(state: &AppState, new: NewUser) -> AppResult<User> {
    let email = new.email_address.trim().to_string();
    if email.is_empty() {
        return Err(AppError::validation("Email address is a required field"));
    }
    if email_exists(state, &email).await? {
        return Err(AppError::validation(format!(
            "An account for '{}' already exists",
            email
        )));
    }

    let password_hash = hash_password(&new.password)?;
    let stamp = state.stamp();
    let user = User {
        id: Uuid::new_v4(),
        first_name: new.first_name,
        last_name: new.last_name,
        email_address: email,
        home_phone_number: new.home_phone_number,
        work_phone_number: new.work_phone_number,
        street_address: new.street_address,
        city: new.city,
        zip: new.zip,
        password_hash,
        birth_date: new.birth_date,
        gender: new.gender,
        is_admin: new.is_admin,
        waiver_sign_date: Some(state.today()),
        emergency_first_name: new.emergency_first_name,
        emergency_last_name: new.emergency_last_name,
        relation: new.relation,
        emergency_home_phone: new.emergency_home_phone,
        emergency_work_phone: new.emergency_work_phone,
        emergency_street_address: new.emergency_street_address,
        emergency_city: new.emergency_city,
        emergency_zip: new.emergency_zip,
        created_at: stamp,
        updated_at: stamp,
    };

    let user = state.store.users().insert(user).await?;
    tracing::info!(user_id = %user.id, "Volunteer registered");
    Ok(user)
}

pub async fn email_exists(state: &AppState, email: &str) -> AppResult<bool> {
    let found = state
        .store
        .users()
        .find_where(&UserFilter::by_email(email.trim()))
        .await?;
    Ok(!found.is_empty())
}

pub async fn get_user(state: &AppState, id: Uuid) -> AppResult<User> {
    state.store.users().get(id).await
}

pub async fn get_user_by_email(state: &AppState, email: &str) -> AppResult<User> {
    state
        .store
        .users()
        .find_single(&UserFilter::by_email(email.trim()))
        .await
}

/// Users whose first or last name matches, for when only one is known.
pub async fn users_by_name(
    state: &AppState,
    first_name: Option<String>,
    last_name: Option<String>,
) -> AppResult<Vec<User>> {
    let first_name = first_name.filter(|n| !n.trim().is_empty());
    let last_name = last_name.filter(|n| !n.trim().is_empty());
    if first_name.is_none() && last_name.is_none() {
        return Err(AppError::validation("A first or last name is required"));
    }

    state
        .store
        .users()
        .find_where(&UserFilter {
            first_name,
            last_name,
            match_any_name: true,
            ..UserFilter::default()
        })
        .await
}

/// The single user with exactly this first and last name.
pub async fn user_by_full_name(
    state: &AppState,
    first_name: &str,
    last_name: &str,
) -> AppResult<User> {
    state
        .store
        .users()
        .find_single(&UserFilter {
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            ..UserFilter::default()
        })
        .await
}

pub async fn edit_user(state: &AppState, id: Uuid, changes: UserChanges) -> AppResult<User> {
    let mut user = state.store.users().get(id).await?;

    if let Some(email) = &changes.email_address {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::validation("Email address cannot be blank"));
        }
        let taken = state
            .store
            .users()
            .find_where(&UserFilter::by_email(email))
            .await?
            .iter()
            .any(|other| other.id != id);
        if taken {
            return Err(AppError::validation(format!(
                "An account for '{}' already exists",
                email
            )));
        }
    }

    changes.apply(&mut user);
    user.email_address = user.email_address.trim().to_string();
    user.updated_at = state.stamp();
    state.store.users().update(user).await
}

pub async fn change_password(state: &AppState, id: Uuid, new_password: &str) -> AppResult<()> {
    let mut user = state.store.users().get(id).await?;
    user.password_hash = hash_password(new_password)?;
    user.updated_at = state.stamp();
    state.store.users().update(user).await?;
    tracing::info!(user_id = %id, "Password changed");
    Ok(())
}

pub async fn delete_user(state: &AppState, id: Uuid) -> AppResult<()> {
    state.store.users().get(id).await?;
    let sheets = state
        .store
        .time_sheets()
        .find_where(&TimeSheetFilter::for_user(id))
        .await?;
    if !sheets.is_empty() {
        return Err(AppError::validation(format!(
            "User still has {} time sheet(s); delete those first",
            sheets.len()
        )));
    }

    state.store.users().delete(id).await?;
    tracing::info!(user_id = %id, "User deleted");
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

    fn registration(first: &str, last: &str, email: &str) -> NewUser {
        NewUser {
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            email_address: email.into(),
            password: "hunter22".into(),
            ..NewUser::default()
        }
    }

    #[tokio::test]
    async fn test_lookups_by_email_and_name() {
        let state = state();
        let ada = create_volunteer(&state, registration("Ada", "Lovelace", "ada@example.org"))
            .await
            .unwrap();
        create_volunteer(&state, registration("Ada", "Byron", "byron@example.org"))
            .await
            .unwrap();

        let found = get_user_by_email(&state, "ADA@example.org").await.unwrap();
        assert_eq!(found.id, ada.id);

        let found = user_by_full_name(&state, "ada", "lovelace").await.unwrap();
        assert_eq!(found.id, ada.id);

        let both = users_by_name(&state, Some("Ada".into()), None).await.unwrap();
        assert_eq!(both.len(), 2);

        let result = users_by_name(&state, None, Some("  ".into())).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_duplicate_full_name_is_ambiguous() {
        let state = state();
        create_volunteer(&state, registration("Sam", "Lee", "sam1@example.org"))
            .await
            .unwrap();
        create_volunteer(&state, registration("Sam", "Lee", "sam2@example.org"))
            .await
            .unwrap();

        let result = user_by_full_name(&state, "Sam", "Lee").await;
        assert!(matches!(result, Err(AppError::AmbiguousLookup(_))));
        let result = get_user_by_email(&state, "nobody@example.org").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_change_password_rehashes_and_rejects_blank() {
        let state = state();
        let ada = create_volunteer(&state, registration("Ada", "Lovelace", "ada@example.org"))
            .await
            .unwrap();
        assert_ne!(ada.password_hash, "hunter22");

        change_password(&state, ada.id, "new secret").await.unwrap();
        let updated = get_user(&state, ada.id).await.unwrap();
        assert_ne!(updated.password_hash, ada.password_hash);

        let result = change_password(&state, ada.id, "   ").await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_edit_rejects_taken_email() {
        let state = state();
        create_volunteer(&state, registration("Ada", "Lovelace", "ada@example.org"))
            .await
            .unwrap();
        let grace = create_volunteer(&state, registration("Grace", "Hopper", "grace@example.org"))
            .await
            .unwrap();

        let result = edit_user(
            &state,
            grace.id,
            UserChanges {
                email_address: Some("ada@example.org".into()),
                ..UserChanges::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_duplicate_email_differing_in_non_ascii_case() {
        let state = state();
        create_volunteer(&state, registration("Élodie", "Roux", "élodie@example.org"))
            .await
            .unwrap();

        let dup =
            create_volunteer(&state, registration("Élodie", "Roux", "ÉLODIE@example.org")).await;
        assert!(matches!(dup, Err(AppError::ValidationError(_))));
        assert!(email_exists(&state, "ÉLODIE@EXAMPLE.ORG").await.unwrap());
    }
}
