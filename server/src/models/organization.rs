use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::store::{contains_ignore_case, eq_ignore_case, Entity, Filter};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrganization {
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationChanges {
    pub name: Option<String>,
    pub active: Option<bool>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationFilter {
    pub name: Option<String>,
    pub name_contains: Option<String>,
    pub active: Option<bool>,
}

impl Filter<Organization> for OrganizationFilter {
    fn matches(&self, org: &Organization) -> bool {
        self.name
            .as_deref()
            .map_or(true, |name| eq_ignore_case(&org.name, name))
            && self
                .name_contains
                .as_deref()
                .map_or(true, |term| contains_ignore_case(&org.name, term))
            && self.active.map_or(true, |active| org.active == active)
    }
}

impl Entity for Organization {
    type Filter = OrganizationFilter;
    const NAME: &'static str = "organization";

    fn id(&self) -> Uuid {
        self.id
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}
