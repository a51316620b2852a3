use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Organization, Project, TimeSheet, User};
use crate::store::{Entity, Filter, Page, PageRequest, Repository, Store};
use crate::utils::error::{AppError, AppResult};

pub struct MemoryRepository<E> {
    rows: RwLock<Vec<E>>,
}

impl<E> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<E: Entity> MemoryRepository<E> {
    async fn matching(&self, filter: &E::Filter) -> Vec<E> {
        let rows = self.rows.read().await;
        let mut found: Vec<E> = rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.listing_order(b));
        found
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::NotFound(format!("{} '{}' was not found", E::NAME, id))
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn insert(&self, entity: E) -> AppResult<E> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.id() == entity.id()) {
            return Err(AppError::validation(format!(
                "{} '{}' already exists",
                E::NAME,
                entity.id()
            )));
        }
        rows.push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<E>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn find_where(&self, filter: &E::Filter) -> AppResult<Vec<E>> {
        Ok(self.matching(filter).await)
    }

    async fn find_page(&self, filter: &E::Filter, page: PageRequest) -> AppResult<Page<E>> {
        let all = self.matching(filter).await;
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect();
        Ok(Page::new(items, page, total))
    }

    async fn update(&self, entity: E) -> AppResult<E> {
        let mut rows = self.rows.write().await;
        let slot = rows
            .iter_mut()
            .find(|row| row.id() == entity.id())
            .ok_or_else(|| Self::not_found(entity.id()))?;
        *slot = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        if rows.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    users: MemoryRepository<User>,
    organizations: MemoryRepository<Organization>,
    projects: MemoryRepository<Project>,
    time_sheets: MemoryRepository<TimeSheet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn users(&self) -> &dyn Repository<User> {
        &self.users
    }

    fn organizations(&self) -> &dyn Repository<Organization> {
        &self.organizations
    }

    fn projects(&self) -> &dyn Repository<Project> {
        &self.projects
    }

    fn time_sheets(&self) -> &dyn Repository<TimeSheet> {
        &self.time_sheets
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
