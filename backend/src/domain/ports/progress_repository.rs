//! Port for the `lesson_progress` table.
//!
//! Rows are unique per `(user_id, lesson_id)`. [`ProgressRepository::upsert`]
//! must be a single atomic statement so concurrent submissions converge on one
//! row.

use async_trait::async_trait;

use crate::domain::{LessonId, ProgressChange, ProgressRecord, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by progress repository adapters.
    pub enum ProgressRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "progress repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "progress repository query failed: {message}",
        /// A stored row could not be converted into a domain record.
        Corrupt { message: String } => "progress row invalid: {message}",
    }
}

/// Port for progress storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch one record.
    async fn find(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
    ) -> Result<Option<ProgressRecord>, ProgressRepositoryError>;

    /// Every record belonging to `user_id`.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProgressRecord>, ProgressRepositoryError>;

    /// Every record for `lesson_id`, across students.
    async fn list_for_lesson(
        &self,
        lesson_id: &LessonId,
    ) -> Result<Vec<ProgressRecord>, ProgressRepositoryError>;

    /// Insert or update atomically on `(user_id, lesson_id)`.
    ///
    /// On insert, fields left as `Keep` take their defaults.
    async fn upsert(
        &self,
        change: &ProgressChange,
    ) -> Result<ProgressRecord, ProgressRepositoryError>;

    /// Update an existing record only.
    ///
    /// Returns `None` when no record exists.
    async fn update_existing(
        &self,
        change: &ProgressChange,
    ) -> Result<Option<ProgressRecord>, ProgressRepositoryError>;
}
