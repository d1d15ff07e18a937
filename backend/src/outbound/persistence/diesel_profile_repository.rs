//! PostgreSQL-backed `ProfileRepository` implementation using Diesel ORM.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{
    DirectoryQuery, EmailAddress, Identity, Instrument, Profile, ProfileDraft, Role, SortDir,
    SortField, UserId,
};

use super::diesel_basic_error_mapping::{
    contains_pattern, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewProfileRow, ProfileRow};
use super::pool::{DbPool, PoolError};
use super::schema::profiles;

/// Diesel-backed implementation of the `ProfileRepository` port.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProfileRepositoryError {
    map_basic_pool_error(error, ProfileRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProfileRepositoryError {
    map_basic_diesel_error(
        error,
        ProfileRepositoryError::query,
        ProfileRepositoryError::connection,
    )
}

fn row_to_profile(row: ProfileRow) -> Result<Profile, ProfileRepositoryError> {
    let corrupt = |field: &str, err: &dyn std::fmt::Display| {
        ProfileRepositoryError::corrupt(format!("profile {} {field}: {err}", row.id))
    };
    let email = row
        .email
        .as_deref()
        .map(EmailAddress::new)
        .transpose()
        .map_err(|err| corrupt("email", &err))?;
    let role = row
        .role
        .as_deref()
        .map(Role::from_str)
        .transpose()
        .map_err(|err| corrupt("role", &err))?;
    let instrument = row
        .instrument
        .as_deref()
        .map(Instrument::new)
        .transpose()
        .map_err(|err| corrupt("instrument", &err))?;
    Ok(Profile::new(ProfileDraft {
        id: UserId::from_uuid(row.id),
        email,
        role,
        instrument,
        full_name: row.full_name,
        avatar_url: row.avatar_url,
        created_at: row.created_at,
    }))
}

fn rows_to_profiles(rows: Vec<ProfileRow>) -> Result<Vec<Profile>, ProfileRepositoryError> {
    rows.into_iter().map(row_to_profile).collect()
}

fn directory_filter(search: Option<&str>) -> profiles::BoxedQuery<'static, Pg> {
    let query = profiles::table.into_boxed();
    match search {
        Some(needle) => {
            let pattern = contains_pattern(needle);
            query.filter(
                profiles::email
                    .ilike(pattern.clone())
                    .or(profiles::full_name.ilike(pattern).nullable()),
            )
        }
        None => query,
    }
}

fn directory_order(
    query: profiles::BoxedQuery<'static, Pg>,
    sort: SortField,
    dir: SortDir,
) -> profiles::BoxedQuery<'static, Pg> {
    match (sort, dir) {
        (SortField::CreatedAt, SortDir::Asc) => query.order(profiles::created_at.asc()),
        (SortField::CreatedAt, SortDir::Desc) => query.order(profiles::created_at.desc()),
        (SortField::Email, SortDir::Asc) => query.order(profiles::email.asc()),
        (SortField::Email, SortDir::Desc) => query.order(profiles::email.desc()),
        (SortField::FullName, SortDir::Asc) => query.order(profiles::full_name.asc()),
        (SortField::FullName, SortDir::Desc) => query.order(profiles::full_name.desc()),
        (SortField::Role, SortDir::Asc) => query.order(profiles::role.asc()),
        (SortField::Role, SortDir::Desc) => query.order(profiles::role.desc()),
    }
    .then_order_by(profiles::id.asc())
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = profiles::table
            .filter(profiles::id.eq(*id.as_uuid()))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_profile).transpose()
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<Profile>, ProfileRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = profiles::table
            .filter(profiles::id.eq_any(uuids))
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_profiles(rows)
    }

    async fn assign_role(
        &self,
        identity: &Identity,
        role: Role,
    ) -> Result<Profile, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewProfileRow {
            id: *identity.id().as_uuid(),
            email: identity.email().as_ref(),
            role: role.as_str(),
        };

        let row = diesel::insert_into(profiles::table)
            .values(&new_row)
            .on_conflict(profiles::id)
            .do_update()
            .set((
                profiles::role.eq(excluded(profiles::role)),
                profiles::email.eq(excluded(profiles::email)),
            ))
            .returning(ProfileRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_profile(row)
    }

    async fn list_directory(
        &self,
        query: &DirectoryQuery,
    ) -> Result<(Vec<Profile>, u64), ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let search = query.search.as_deref();

        let total: i64 = directory_filter(search)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let offset = i64::try_from(query.page.offset()).unwrap_or(i64::MAX);
        let limit = i64::try_from(query.page.limit()).unwrap_or(i64::MAX);
        let rows = directory_order(directory_filter(search), query.sort, query.dir)
            .offset(offset)
            .limit(limit)
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let total = u64::try_from(total).unwrap_or_default();
        Ok((rows_to_profiles(rows)?, total))
    }
}
