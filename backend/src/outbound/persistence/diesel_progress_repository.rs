//! PostgreSQL-backed `ProgressRepository` implementation using Diesel ORM.
//!
//! Upserts are a single `INSERT .. ON CONFLICT (user_id, lesson_id) DO UPDATE`
//! so concurrent submissions for the same pair converge on one row.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProgressRepository, ProgressRepositoryError};
use crate::domain::{LessonId, ProgressChange, ProgressRecord, ProgressStatus, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewProgressRow, ProgressRow, ProgressUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::lesson_progress;

/// Diesel-backed implementation of the `ProgressRepository` port.
#[derive(Clone)]
pub struct DieselProgressRepository {
    pool: DbPool,
}

impl DieselProgressRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProgressRepositoryError {
    map_basic_pool_error(error, ProgressRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProgressRepositoryError {
    map_basic_diesel_error(
        error,
        ProgressRepositoryError::query,
        ProgressRepositoryError::connection,
    )
}

fn row_to_record(row: ProgressRow) -> Result<ProgressRecord, ProgressRepositoryError> {
    let status = ProgressStatus::from_str(&row.status).map_err(|err| {
        ProgressRepositoryError::corrupt(format!(
            "progress {}/{}: {err}",
            row.user_id, row.lesson_id
        ))
    })?;
    Ok(ProgressRecord {
        user_id: UserId::from_uuid(row.user_id),
        lesson_id: LessonId::from_uuid(row.lesson_id),
        status,
        last_viewed_at: row.last_viewed_at,
        notes: row.notes,
    })
}

fn rows_to_records(rows: Vec<ProgressRow>) -> Result<Vec<ProgressRecord>, ProgressRepositoryError> {
    rows.into_iter().map(row_to_record).collect()
}

/// Insert values: `Keep` fields fall back to the column defaults.
fn insert_row(change: &ProgressChange) -> NewProgressRow<'_> {
    NewProgressRow {
        user_id: *change.user_id.as_uuid(),
        lesson_id: *change.lesson_id.as_uuid(),
        status: change
            .status
            .as_set()
            .copied()
            .unwrap_or_default()
            .as_str(),
        last_viewed_at: change.last_viewed_at.as_set().copied().flatten(),
        notes: change.notes.as_set().and_then(|notes| notes.as_deref()),
    }
}

/// Update values: only `Set` fields are written.
fn update_set(change: &ProgressChange) -> ProgressUpdate<'_> {
    ProgressUpdate {
        status: change.status.as_set().map(|status| status.as_str()),
        last_viewed_at: change.last_viewed_at.as_set().copied(),
        notes: change.notes.as_set().map(|notes| notes.as_deref()),
    }
}

#[async_trait]
impl ProgressRepository for DieselProgressRepository {
    async fn find(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
    ) -> Result<Option<ProgressRecord>, ProgressRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = lesson_progress::table
            .find((*user_id.as_uuid(), *lesson_id.as_uuid()))
            .select(ProgressRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProgressRecord>, ProgressRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows = lesson_progress::table
            .filter(lesson_progress::user_id.eq(*user_id.as_uuid()))
            .select(ProgressRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_records(rows)
    }

    async fn list_for_lesson(
        &self,
        lesson_id: &LessonId,
    ) -> Result<Vec<ProgressRecord>, ProgressRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows = lesson_progress::table
            .filter(lesson_progress::lesson_id.eq(*lesson_id.as_uuid()))
            .order(lesson_progress::updated_at.desc())
            .select(ProgressRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_records(rows)
    }

    async fn upsert(
        &self,
        change: &ProgressChange,
    ) -> Result<ProgressRecord, ProgressRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::insert_into(lesson_progress::table)
            .values(&insert_row(change))
            .on_conflict((lesson_progress::user_id, lesson_progress::lesson_id))
            .do_update()
            .set((
                update_set(change),
                lesson_progress::updated_at.eq(diesel::dsl::now),
            ))
            .returning(ProgressRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_record(row)
    }

    async fn update_existing(
        &self,
        change: &ProgressChange,
    ) -> Result<Option<ProgressRecord>, ProgressRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(
            lesson_progress::table
                .find((*change.user_id.as_uuid(), *change.lesson_id.as_uuid())),
        )
        .set((
            update_set(change),
            lesson_progress::updated_at.eq(diesel::dsl::now),
        ))
        .returning(ProgressRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }
}
