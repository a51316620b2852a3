use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::store::{contains_ignore_case, eq_ignore_case, Entity, Filter};

/// A build or event that volunteers punch in to. `name` + `begin_date` is
/// the natural key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub begin_date: NaiveDate,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub begin_date: NaiveDate,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub begin_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

fn default_active() -> bool {
    true
}

/// Status selector used by listing screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusChoice {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusChoice {
    pub fn as_flag(self) -> Option<bool> {
        match self {
            StatusChoice::All => None,
            StatusChoice::Active => Some(true),
            StatusChoice::Inactive => Some(false),
        }
    }
}

impl FromStr for StatusChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "all" | "0" => Ok(StatusChoice::All),
            "active" | "1" => Ok(StatusChoice::Active),
            "inactive" | "2" => Ok(StatusChoice::Inactive),
            other => Err(format!("Unknown status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub name: Option<String>,
    pub name_contains: Option<String>,
    pub begin_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

impl Filter<Project> for ProjectFilter {
    fn matches(&self, project: &Project) -> bool {
        self.name
            .as_deref()
            .map_or(true, |name| eq_ignore_case(&project.name, name))
            && self
                .name_contains
                .as_deref()
                .map_or(true, |term| contains_ignore_case(&project.name, term))
            && self
                .begin_date
                .map_or(true, |date| project.begin_date == date)
            && self.active.map_or(true, |active| project.active == active)
    }
}

impl Entity for Project {
    type Filter = ProjectFilter;
    const NAME: &'static str = "project";

    fn id(&self) -> Uuid {
        self.id
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        other
            .begin_date
            .cmp(&self.begin_date)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.id.cmp(&other.id))
    }
}
