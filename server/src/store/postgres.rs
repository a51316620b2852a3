use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Encode, FromRow, Postgres, QueryBuilder, Type};
use uuid::Uuid;

use crate::models::{
    Organization, OrganizationFilter, Project, ProjectFilter, TimeSheet, TimeSheetFilter, User,
    UserFilter,
};
use crate::store::{Entity, Page, PageRequest, Repository, Store};
use crate::utils::error::{AppError, AppResult};

#[derive(Clone, Copy, PartialEq, Eq)]
enum ColumnMode {
    Names,
    Values,
    Assignments,
}

/// Writes an entity's columns into a statement as a name list, a bind list
/// or `name = $n` assignments, so each entity lists its columns only once.
pub struct ColumnWriter<'q, 'args> {
    qb: &'q mut QueryBuilder<'args, Postgres>,
    mode: ColumnMode,
    first: bool,
}

impl<'q, 'args> ColumnWriter<'q, 'args> {
    fn new(qb: &'q mut QueryBuilder<'args, Postgres>, mode: ColumnMode) -> Self {
        Self {
            qb,
            mode,
            first: true,
        }
    }

    pub fn column<T>(&mut self, name: &'static str, value: T) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        if self.mode == ColumnMode::Assignments && name == "id" {
            return self;
        }
        if !self.first {
            self.qb.push(", ");
        }
        self.first = false;

        match self.mode {
            ColumnMode::Names => {
                self.qb.push(name);
            }
            ColumnMode::Values => {
                self.qb.push_bind(value);
            }
            ColumnMode::Assignments => {
                self.qb.push(name).push(" = ").push_bind(value);
            }
        }
        self
    }
}

/// Builds ` WHERE TRUE AND ...` clauses.
pub struct Conditions<'q, 'args> {
    qb: &'q mut QueryBuilder<'args, Postgres>,
}

impl<'q, 'args> Conditions<'q, 'args> {
    fn new(qb: &'q mut QueryBuilder<'args, Postgres>) -> Self {
        qb.push(" WHERE TRUE");
        Self { qb }
    }

    /// `AND <prefix> $n <suffix>` when `value` is present.
    pub fn bind<T>(&mut self, prefix: &str, value: Option<T>, suffix: &str) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        if let Some(value) = value {
            self.qb
                .push(" AND ")
                .push(prefix)
                .push_bind(value)
                .push(suffix);
        }
        self
    }

    /// Continue the previous condition without a leading `AND`.
    pub fn bind_continuation<T>(&mut self, prefix: &str, value: T, suffix: &str) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        self.qb.push(prefix).push_bind(value).push(suffix);
        self
    }

    pub fn raw(&mut self, condition: &str) -> &mut Self {
        self.qb.push(" AND ").push(condition);
        self
    }
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// SQL mapping of an [`Entity`].
pub trait PgEntity: Entity + for<'r> FromRow<'r, PgRow> {
    const TABLE: &'static str;
    const ORDER_BY: &'static str;

    fn write_columns(&self, columns: &mut ColumnWriter<'_, '_>);

    fn push_filter(filter: &Self::Filter, conditions: &mut Conditions<'_, '_>);
}

pub struct PgRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

impl<E: PgEntity> PgRepository<E> {
    fn select(filter: &E::Filter) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT * FROM {}", E::TABLE));
        E::push_filter(filter, &mut Conditions::new(&mut qb));
        qb
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::NotFound(format!("{} '{}' was not found", E::NAME, id))
    }
}

#[async_trait]
impl<E: PgEntity> Repository<E> for PgRepository<E> {
    async fn insert(&self, entity: E) -> AppResult<E> {
        let mut qb = QueryBuilder::new(format!("INSERT INTO {} (", E::TABLE));
        entity.write_columns(&mut ColumnWriter::new(&mut qb, ColumnMode::Names));
        qb.push(") VALUES (");
        entity.write_columns(&mut ColumnWriter::new(&mut qb, ColumnMode::Values));
        qb.push(") RETURNING *");

        let row = qb.build_query_as::<E>().fetch_one(&self.pool).await?;
        tracing::debug!(table = E::TABLE, id = %row.id(), "Inserted row");
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<E>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", E::TABLE);
        sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn find_where(&self, filter: &E::Filter) -> AppResult<Vec<E>> {
        let mut qb = Self::select(filter);
        qb.push(" ORDER BY ").push(E::ORDER_BY);
        qb.build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn find_page(&self, filter: &E::Filter, page: PageRequest) -> AppResult<Page<E>> {
        let mut count = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", E::TABLE));
        E::push_filter(filter, &mut Conditions::new(&mut count));
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = Self::select(filter);
        qb.push(" ORDER BY ")
            .push(E::ORDER_BY)
            .push(" LIMIT ")
            .push_bind(i64::from(page.per_page))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let items = qb.build_query_as::<E>().fetch_all(&self.pool).await?;

        Ok(Page::new(items, page, total.max(0) as u64))
    }

    async fn update(&self, entity: E) -> AppResult<E> {
        let id = entity.id();
        let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", E::TABLE));
        entity.write_columns(&mut ColumnWriter::new(&mut qb, ColumnMode::Assignments));
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}

impl PgEntity for User {
    const TABLE: &'static str = "users";
    const ORDER_BY: &'static str = "last_name ASC NULLS FIRST, first_name ASC NULLS FIRST, id";

    fn write_columns(&self, c: &mut ColumnWriter<'_, '_>) {
        c.column("id", self.id)
            .column("first_name", self.first_name.clone())
            .column("last_name", self.last_name.clone())
            .column("email_address", self.email_address.clone())
            .column("home_phone_number", self.home_phone_number.clone())
            .column("work_phone_number", self.work_phone_number.clone())
            .column("street_address", self.street_address.clone())
            .column("city", self.city.clone())
            .column("zip", self.zip.clone())
            .column("password_hash", self.password_hash.clone())
            .column("birth_date", self.birth_date)
            .column("gender", self.gender.clone())
            .column("is_admin", self.is_admin)
            .column("waiver_sign_date", self.waiver_sign_date)
            .column("emergency_first_name", self.emergency_first_name.clone())
            .column("emergency_last_name", self.emergency_last_name.clone())
            .column("relation", self.relation.clone())
            .column("emergency_home_phone", self.emergency_home_phone.clone())
            .column("emergency_work_phone", self.emergency_work_phone.clone())
            .column(
                "emergency_street_address",
                self.emergency_street_address.clone(),
            )
            .column("emergency_city", self.emergency_city.clone())
            .column("emergency_zip", self.emergency_zip.clone())
            .column("created_at", self.created_at)
            .column("updated_at", self.updated_at);
    }

    fn push_filter(filter: &UserFilter, w: &mut Conditions<'_, '_>) {
        w.bind("LOWER(email_address) = LOWER(", filter.email.clone(), ")");

        match (&filter.first_name, &filter.last_name) {
            (Some(first), Some(last)) if filter.match_any_name => {
                w.bind("(LOWER(first_name) = LOWER(", Some(first.clone()), ")")
                    .bind_continuation(" OR LOWER(last_name) = LOWER(", last.clone(), "))");
            }
            (first, last) => {
                w.bind("LOWER(first_name) = LOWER(", first.clone(), ")")
                    .bind("LOWER(last_name) = LOWER(", last.clone(), ")");
            }
        }

        w.bind("LOWER(gender) = LOWER(", filter.gender.clone(), ")")
            .bind("is_admin = ", filter.is_admin, "");
        if filter.has_birth_date {
            w.raw("birth_date IS NOT NULL");
        }
        if let Some(term) = &filter.search {
            let pattern = like_pattern(term);
            w.bind("(first_name ILIKE ", Some(pattern.clone()), "")
                .bind_continuation(" OR last_name ILIKE ", pattern.clone(), "")
                .bind_continuation(" OR email_address ILIKE ", pattern, ")");
        }
    }
}

impl PgEntity for Organization {
    const TABLE: &'static str = "organizations";
    const ORDER_BY: &'static str = "name, id";

    fn write_columns(&self, c: &mut ColumnWriter<'_, '_>) {
        c.column("id", self.id)
            .column("name", self.name.clone())
            .column("active", self.active)
            .column("created_at", self.created_at)
            .column("updated_at", self.updated_at);
    }

    fn push_filter(filter: &OrganizationFilter, w: &mut Conditions<'_, '_>) {
        w.bind("LOWER(name) = LOWER(", filter.name.clone(), ")")
            .bind(
                "name ILIKE ",
                filter.name_contains.as_deref().map(like_pattern),
                "",
            )
            .bind("active = ", filter.active, "");
    }
}

impl PgEntity for Project {
    const TABLE: &'static str = "projects";
    const ORDER_BY: &'static str = "begin_date DESC, name, id";

    fn write_columns(&self, c: &mut ColumnWriter<'_, '_>) {
        c.column("id", self.id)
            .column("name", self.name.clone())
            .column("description", self.description.clone())
            .column("begin_date", self.begin_date)
            .column("active", self.active)
            .column("created_at", self.created_at)
            .column("updated_at", self.updated_at);
    }

    fn push_filter(filter: &ProjectFilter, w: &mut Conditions<'_, '_>) {
        w.bind("LOWER(name) = LOWER(", filter.name.clone(), ")")
            .bind(
                "name ILIKE ",
                filter.name_contains.as_deref().map(like_pattern),
                "",
            )
            .bind("begin_date = ", filter.begin_date, "")
            .bind("active = ", filter.active, "");
    }
}

impl PgEntity for TimeSheet {
    const TABLE: &'static str = "time_sheets";
    const ORDER_BY: &'static str = "clock_in_time DESC, id";

    fn write_columns(&self, c: &mut ColumnWriter<'_, '_>) {
        c.column("id", self.id)
            .column("user_id", self.user_id)
            .column("project_id", self.project_id)
            .column("organization_id", self.organization_id)
            .column("clock_in_time", self.clock_in_time)
            .column("clock_out_time", self.clock_out_time)
            .column("created_at", self.created_at)
            .column("updated_at", self.updated_at);
    }

    fn push_filter(filter: &TimeSheetFilter, w: &mut Conditions<'_, '_>) {
        w.bind("user_id = ", filter.user_id, "")
            .bind("user_id = ANY(", filter.user_ids.clone(), ")")
            .bind("project_id = ", filter.project_id, "")
            .bind("organization_id = ", filter.organization_id, "")
            .bind("clock_in_time >= ", filter.clock_in_from, "")
            .bind("clock_in_time < ", filter.clock_in_before, "")
            .bind("clock_out_time = ", filter.clock_out_time, "");
    }
}

pub struct PgStore {
    pool: PgPool,
    users: PgRepository<User>,
    organizations: PgRepository<Organization>,
    projects: PgRepository<Project>,
    time_sheets: PgRepository<TimeSheet>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: PgRepository::new(pool.clone()),
            organizations: PgRepository::new(pool.clone()),
            projects: PgRepository::new(pool.clone()),
            time_sheets: PgRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl Store for PgStore {
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
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
