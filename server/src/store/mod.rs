//! Generic entity store.
//!
//! Every entity is reached through one small [`Repository`] interface whose
//! queries take a predicate filter. The Postgres backend compiles filters to
//! SQL; the in-memory backend evaluates [`Filter::matches`] directly.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Organization, Project, TimeSheet, User};
use crate::utils::error::{AppError, AppResult};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const RECORDS_PER_PAGE: u32 = 10;

pub trait Filter<E>: Default + Clone + Send + Sync {
    fn matches(&self, entity: &E) -> bool;
}

pub trait Entity: Clone + Send + Sync + Unpin + 'static {
    type Filter: Filter<Self>;

    /// Human-readable entity name used in error messages.
    const NAME: &'static str;

    fn id(&self) -> Uuid;

    /// Listing order. Must agree with the SQL `ORDER BY` of the entity.
    fn listing_order(&self, other: &Self) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Pages are 1-based; anything below 1 is treated as the first page.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(RECORDS_PER_PAGE).max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total_count: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_count: u64) -> Self {
        let per_page = u64::from(request.per_page);
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total_count,
            total_pages: total_count.div_ceil(per_page),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn insert(&self, entity: E) -> AppResult<E>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<E>>;

    async fn find_where(&self, filter: &E::Filter) -> AppResult<Vec<E>>;

    async fn find_page(&self, filter: &E::Filter, page: PageRequest) -> AppResult<Page<E>>;

    /// Replace the stored record with the same id. Last write wins.
    async fn update(&self, entity: E) -> AppResult<E>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn get(&self, id: Uuid) -> AppResult<E> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} '{}' was not found", E::NAME, id)))
    }

    /// Lookup on a key that is supposed to be unique.
    async fn find_single(&self, filter: &E::Filter) -> AppResult<E> {
        let mut matches = self.find_where(filter).await?;
        match matches.len() {
            0 => Err(AppError::NotFound(format!("No matching {} was found", E::NAME))),
            1 => Ok(matches.remove(0)),
            n => Err(AppError::AmbiguousLookup(format!(
                "{} records of {} match a unique key",
                n,
                E::NAME
            ))),
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    fn users(&self) -> &dyn Repository<User>;
    fn organizations(&self) -> &dyn Repository<Organization>;
    fn projects(&self) -> &dyn Repository<Project>;
    fn time_sheets(&self) -> &dyn Repository<TimeSheet>;

    async fn ping(&self) -> AppResult<()>;
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Unicode case-insensitive equality, matching `LOWER(a) = LOWER(b)` in Postgres.
pub(crate) fn eq_ignore_case(value: &str, expected: &str) -> bool {
    value.to_lowercase() == expected.to_lowercase()
}

pub(crate) fn opt_eq_ignore_case(value: Option<&str>, expected: &str) -> bool {
    value.is_some_and(|v| eq_ignore_case(v, expected))
}
