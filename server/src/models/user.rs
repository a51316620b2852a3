use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::store::{contains_ignore_case, eq_ignore_case, opt_eq_ignore_case, Entity, Filter};

/// Volunteer or admin account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: String,
    pub home_phone_number: Option<String>,
    pub work_phone_number: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub is_admin: bool,
    pub waiver_sign_date: Option<NaiveDate>,
    pub emergency_first_name: Option<String>,
    pub emergency_last_name: Option<String>,
    pub relation: Option<String>,
    pub emergency_home_phone: Option<String>,
    pub emergency_work_phone: Option<String>,
    pub emergency_street_address: Option<String>,
    pub emergency_city: Option<String>,
    pub emergency_zip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// "First Last", falling back to the email address for a missing half.
    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or(&self.email_address);
        let last = self.last_name.as_deref().unwrap_or(&self.email_address);
        format!("{} {}", first, last)
    }
}

/// Registration payload. The password arrives in plaintext and is hashed
/// before the record is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: String,
    pub password: String,
    pub home_phone_number: Option<String>,
    pub work_phone_number: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    pub emergency_first_name: Option<String>,
    pub emergency_last_name: Option<String>,
    pub relation: Option<String>,
    pub emergency_home_phone: Option<String>,
    pub emergency_work_phone: Option<String>,
    pub emergency_street_address: Option<String>,
    pub emergency_city: Option<String>,
    pub emergency_zip: Option<String>,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub home_phone_number: Option<String>,
    pub work_phone_number: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub is_admin: Option<bool>,
    pub waiver_sign_date: Option<NaiveDate>,
    pub emergency_first_name: Option<String>,
    pub emergency_last_name: Option<String>,
    pub relation: Option<String>,
    pub emergency_home_phone: Option<String>,
    pub emergency_work_phone: Option<String>,
    pub emergency_street_address: Option<String>,
    pub emergency_city: Option<String>,
    pub emergency_zip: Option<String>,
}

impl UserChanges {
    pub fn apply(self, user: &mut User) {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut user.first_name, self.first_name);
        set(&mut user.last_name, self.last_name);
        if let Some(email) = self.email_address {
            user.email_address = email;
        }
        set(&mut user.home_phone_number, self.home_phone_number);
        set(&mut user.work_phone_number, self.work_phone_number);
        set(&mut user.street_address, self.street_address);
        set(&mut user.city, self.city);
        set(&mut user.zip, self.zip);
        set(&mut user.birth_date, self.birth_date);
        set(&mut user.gender, self.gender);
        if let Some(is_admin) = self.is_admin {
            user.is_admin = is_admin;
        }
        set(&mut user.waiver_sign_date, self.waiver_sign_date);
        set(&mut user.emergency_first_name, self.emergency_first_name);
        set(&mut user.emergency_last_name, self.emergency_last_name);
        set(&mut user.relation, self.relation);
        set(&mut user.emergency_home_phone, self.emergency_home_phone);
        set(&mut user.emergency_work_phone, self.emergency_work_phone);
        set(&mut user.emergency_street_address, self.emergency_street_address);
        set(&mut user.emergency_city, self.emergency_city);
        set(&mut user.emergency_zip, self.emergency_zip);
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Combine `first_name` and `last_name` with OR instead of AND.
    pub match_any_name: bool,
    pub gender: Option<String>,
    pub has_birth_date: bool,
    pub is_admin: Option<bool>,
    /// Substring match over first name, last name and email.
    pub search: Option<String>,
}

impl UserFilter {
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }
}

impl Filter<User> for UserFilter {
    fn matches(&self, user: &User) -> bool {
        if let Some(email) = &self.email {
            if !eq_ignore_case(&user.email_address, email) {
                return false;
            }
        }

        let first = self
            .first_name
            .as_deref()
            .map(|name| opt_eq_ignore_case(user.first_name.as_deref(), name));
        let last = self
            .last_name
            .as_deref()
            .map(|name| opt_eq_ignore_case(user.last_name.as_deref(), name));
        let names_ok = match (first, last) {
            (None, None) => true,
            (Some(a), None) | (None, Some(a)) => a,
            (Some(a), Some(b)) if self.match_any_name => a || b,
            (Some(a), Some(b)) => a && b,
        };
        if !names_ok {
            return false;
        }

        if let Some(gender) = &self.gender {
            if !opt_eq_ignore_case(user.gender.as_deref(), gender) {
                return false;
            }
        }
        if self.has_birth_date && user.birth_date.is_none() {
            return false;
        }
        if let Some(is_admin) = self.is_admin {
            if user.is_admin != is_admin {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let hit = [
                user.first_name.as_deref(),
                user.last_name.as_deref(),
                Some(user.email_address.as_str()),
            ]
            .into_iter()
            .flatten()
            .any(|field| contains_ignore_case(field, term));
            if !hit {
                return false;
            }
        }
        true
    }
}

impl Entity for User {
    type Filter = UserFilter;
    const NAME: &'static str = "user";

    fn id(&self) -> Uuid {
        self.id
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        self.last_name
            .cmp(&other.last_name)
            .then_with(|| self.first_name.cmp(&other.first_name))
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn sample_user(first: &str, last: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            email_address: email.to_string(),
            home_phone_number: None,
            work_phone_number: None,
            street_address: None,
            city: None,
            zip: None,
            password_hash: String::new(),
            birth_date: None,
            gender: None,
            is_admin: false,
            waiver_sign_date: None,
            emergency_first_name: None,
            emergency_last_name: None,
            relation: None,
            emergency_home_phone: None,
            emergency_work_phone: None,
            emergency_street_address: None,
            emergency_city: None,
            emergency_zip: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_name_filter_and_vs_or() {
        let ada = sample_user("Ada", "Lovelace", "ada@example.org");

        let both = UserFilter {
            first_name: Some("ada".into()),
            last_name: Some("Byron".into()),
            ..UserFilter::default()
        };
        assert!(!both.matches(&ada));

        let either = UserFilter {
            match_any_name: true,
            ..both
        };
        assert!(either.matches(&ada));
    }

    #[test]
    fn test_search_covers_email() {
        let ada = sample_user("Ada", "Lovelace", "countess@example.org");
        let filter = UserFilter {
            search: Some("COUNTESS".into()),
            ..UserFilter::default()
        };
        assert!(filter.matches(&ada));
    }

    #[test]
    fn test_full_name_falls_back_to_email() {
        let mut user = sample_user("Grace", "Hopper", "grace@example.org");
        user.last_name = None;
        assert_eq!(user.full_name(), "Grace grace@example.org");
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let mut user = sample_user("Ada", "Lovelace", "ada@example.org");
        user.password_hash = "$argon2id$secret".into();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_changes_keep_absent_fields() {
        let mut user = sample_user("Ada", "Lovelace", "ada@example.org");
        UserChanges {
            city: Some("London".into()),
            ..UserChanges::default()
        }
        .apply(&mut user);

        assert_eq!(user.city.as_deref(), Some("London"));
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
    }
}
