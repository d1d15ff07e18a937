//! Port for the `lessons` table.
//!
//! Mutations are keyed on both the lesson id and the owning teacher so an
//! adapter can enforce ownership in the same statement that writes.

use async_trait::async_trait;

use crate::domain::{Instrument, Lesson, LessonId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by lesson repository adapters.
    pub enum LessonRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "lesson repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "lesson repository query failed: {message}",
        /// A stored row could not be converted into a domain lesson.
        Corrupt { message: String } => "lesson row invalid: {message}",
    }
}

/// Port for lesson storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Fetch a lesson regardless of owner or publication state.
    async fn find_by_id(&self, id: &LessonId) -> Result<Option<Lesson>, LessonRepositoryError>;

    /// Published lessons for `instrument`, ascending by `order_index`.
    async fn list_published(
        &self,
        instrument: &Instrument,
    ) -> Result<Vec<Lesson>, LessonRepositoryError>;

    /// All lessons owned by `teacher_id`, ascending by `order_index`.
    async fn list_by_teacher(
        &self,
        teacher_id: &UserId,
    ) -> Result<Vec<Lesson>, LessonRepositoryError>;

    /// Insert a new lesson.
    async fn insert(&self, lesson: &Lesson) -> Result<(), LessonRepositoryError>;

    /// Overwrite a lesson, matching on id and `teacher_id`.
    ///
    /// Returns `false` when no row matched.
    async fn update_owned(&self, lesson: &Lesson) -> Result<bool, LessonRepositoryError>;

    /// Delete a lesson owned by `teacher_id`.
    ///
    /// Returns `false` when no row matched.
    async fn delete_owned(
        &self,
        id: &LessonId,
        teacher_id: &UserId,
    ) -> Result<bool, LessonRepositoryError>;
}
