//! Progress state machine and the views built on it.
//!
//! Student transitions always act on the caller's own profile; teacher
//! overrides require ownership of the lesson. Every write goes through a single
//! repository statement keyed on `(user_id, lesson_id)`, so concurrent
//! submissions converge on one row without in-process locking.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use tracing::info;

use super::ports::{LessonRepository, ProfileRepository, ProgressRepository};
use super::service_support::{map_lesson_error, map_profile_error, map_progress_error};
use super::{
    Error, Lesson, LessonCatalog, LessonId, LessonNote, Profile, ProgressChange, ProgressRecord,
    ProgressStats, Role, UserId, next_unlocked_index,
};

const UNKNOWN_NAME: &str = "Unknown";
const UNKNOWN_EMAIL: &str = "N/A";

/// Everything the student dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentOverview {
    /// Published lessons for the student's instrument, in order.
    pub lessons: Vec<Lesson>,
    /// The student's records for those lessons.
    pub progress: Vec<ProgressRecord>,
    /// Highest order index the student may open.
    pub unlocked_index: i32,
}

/// One student's line in a lesson roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    /// Student identifier.
    pub user_id: UserId,
    /// Display name, or a placeholder when the profile is missing.
    pub full_name: String,
    /// Contact email, or a placeholder when unknown.
    pub email: String,
    /// Stored progress.
    #[serde(flatten)]
    pub record: ProgressRecord,
}

/// Progress of every student on one lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRoster {
    /// The lesson.
    pub lesson: Lesson,
    /// Per-student lines.
    pub entries: Vec<RosterEntry>,
    /// Counts per status.
    pub stats: ProgressStats,
}

/// Progress transitions and progress views.
#[derive(Clone)]
pub struct ProgressTracker {
    catalog: LessonCatalog,
    lessons: Arc<dyn LessonRepository>,
    progress: Arc<dyn ProgressRepository>,
    profiles: Arc<dyn ProfileRepository>,
    clock: Arc<dyn Clock>,
}

impl ProgressTracker {
    /// Create a tracker over the lesson, progress, and profile stores.
    pub fn new(
        lessons: Arc<dyn LessonRepository>,
        progress: Arc<dyn ProgressRepository>,
        profiles: Arc<dyn ProfileRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog: LessonCatalog::new(Arc::clone(&lessons)),
            lessons,
            progress,
            profiles,
            clock,
        }
    }

    /// Open a lesson: create it as in progress or touch the existing record.
    ///
    /// Repeating the call is harmless and never duplicates the record; notes
    /// survive.
    pub async fn start(
        &self,
        student: &Profile,
        lesson_id: &LessonId,
    ) -> Result<ProgressRecord, Error> {
        let lesson = self.visible_lesson(student, lesson_id).await?;
        let change = ProgressChange::started(*student.id(), lesson.id(), self.clock.utc());
        let record = self.upsert(&change).await?;
        info!(user_id = %student.id(), lesson_id = %lesson.id(), "lesson started");
        Ok(record)
    }

    /// Mark a lesson completed.
    pub async fn complete(
        &self,
        student: &Profile,
        lesson_id: &LessonId,
    ) -> Result<ProgressRecord, Error> {
        let lesson = self.visible_lesson(student, lesson_id).await?;
        let change = ProgressChange::completed(*student.id(), lesson.id(), self.clock.utc());
        let record = self.upsert(&change).await?;
        info!(user_id = %student.id(), lesson_id = %lesson.id(), "lesson completed");
        Ok(record)
    }

    /// Replace the student's note on a started lesson.
    ///
    /// # Errors
    /// `not_found` when the lesson is hidden or has not been started.
    pub async fn annotate(
        &self,
        student: &Profile,
        lesson_id: &LessonId,
        note: &LessonNote,
    ) -> Result<ProgressRecord, Error> {
        let lesson = self.visible_lesson(student, lesson_id).await?;
        let change =
            ProgressChange::annotated(*student.id(), lesson.id(), note, self.clock.utc());
        self.progress
            .update_existing(&change)
            .await
            .map_err(map_progress_error)?
            .ok_or_else(|| Error::not_found("start the lesson before adding notes"))
    }

    /// Teacher override: mark `student_id` complete on an owned lesson.
    pub async fn teacher_complete(
        &self,
        teacher: &Profile,
        lesson_id: &LessonId,
        student_id: &UserId,
    ) -> Result<ProgressRecord, Error> {
        let lesson = self.owned_lesson(teacher, lesson_id).await?;
        self.require_student(&lesson, student_id).await?;
        let record = self
            .upsert(&ProgressChange::marked_complete(*student_id, lesson.id()))
            .await?;
        info!(
            teacher_id = %teacher.id(),
            %student_id,
            lesson_id = %lesson.id(),
            "student marked complete"
        );
        Ok(record)
    }

    /// Teacher override: reset `student_id` to not started, clearing notes
    /// and the last-viewed timestamp.
    ///
    /// Resetting a student with no record is a no-op.
    pub async fn teacher_reset(
        &self,
        teacher: &Profile,
        lesson_id: &LessonId,
        student_id: &UserId,
    ) -> Result<ProgressRecord, Error> {
        let lesson = self.owned_lesson(teacher, lesson_id).await?;
        self.require_student(&lesson, student_id).await?;
        let reset = self
            .progress
            .update_existing(&ProgressChange::reset(*student_id, lesson.id()))
            .await
            .map_err(map_progress_error)?;
        info!(
            teacher_id = %teacher.id(),
            %student_id,
            lesson_id = %lesson.id(),
            existed = reset.is_some(),
            "student progress reset"
        );
        Ok(reset.unwrap_or_else(|| ProgressRecord::not_started(*student_id, lesson.id())))
    }

    /// Lessons, progress, and unlock boundary for the student dashboard.
    pub async fn student_overview(&self, student: &Profile) -> Result<StudentOverview, Error> {
        let lessons = self.catalog.list_published(student.instrument()).await?;
        let mut progress = self
            .progress
            .list_for_user(student.id())
            .await
            .map_err(map_progress_error)?;
        progress.retain(|record| lessons.iter().any(|lesson| lesson.id() == record.lesson_id));
        let unlocked_index = next_unlocked_index(&lessons, &progress);
        Ok(StudentOverview {
            lessons,
            progress,
            unlocked_index,
        })
    }

    /// Every student's progress on an owned lesson.
    pub async fn lesson_roster(
        &self,
        teacher: &Profile,
        lesson_id: &LessonId,
    ) -> Result<LessonRoster, Error> {
        let lesson = self.owned_lesson(teacher, lesson_id).await?;
        let records = self
            .progress
            .list_for_lesson(&lesson.id())
            .await
            .map_err(map_progress_error)?;
        let ids: Vec<UserId> = records.iter().map(|record| record.user_id).collect();
        let profiles: HashMap<UserId, Profile> = self
            .profiles
            .find_many(&ids)
            .await
            .map_err(map_profile_error)?
            .into_iter()
            .map(|profile| (*profile.id(), profile))
            .collect();

        let stats = ProgressStats::tally(records.iter().map(|record| record.status));
        let mut entries: Vec<RosterEntry> = records
            .into_iter()
            .map(|record| roster_entry(profiles.get(&record.user_id), record))
            .collect();
        entries.sort_by(|a, b| a.full_name.cmp(&b.full_name));

        Ok(LessonRoster {
            lesson,
            entries,
            stats,
        })
    }

    async fn upsert(&self, change: &ProgressChange) -> Result<ProgressRecord, Error> {
        self.progress
            .upsert(change)
            .await
            .map_err(map_progress_error)
    }

    async fn visible_lesson(&self, student: &Profile, lesson_id: &LessonId) -> Result<Lesson, Error> {
        self.lessons
            .find_by_id(lesson_id)
            .await
            .map_err(map_lesson_error)?
            .filter(|lesson| lesson.is_visible_to(student.instrument()))
            .ok_or_else(|| Error::not_found("lesson not found"))
    }

    async fn owned_lesson(&self, teacher: &Profile, lesson_id: &LessonId) -> Result<Lesson, Error> {
        let lesson = self
            .lessons
            .find_by_id(lesson_id)
            .await
            .map_err(map_lesson_error)?
            .ok_or_else(|| Error::not_found("lesson not found"))?;
        if lesson.is_owned_by(teacher.id()) {
            Ok(lesson)
        } else {
            Err(Error::forbidden(
                "you do not have permission to manage progress for this lesson",
            ))
        }
    }

    async fn require_student(&self, lesson: &Lesson, student_id: &UserId) -> Result<(), Error> {
        let student = self
            .profiles
            .find_by_id(student_id)
            .await
            .map_err(map_profile_error)?;
        match student {
            Some(profile)
                if profile.role() == Some(Role::Student)
                    && profile.instrument() == Some(lesson.instrument()) =>
            {
                Ok(())
            }
            _ => Err(Error::not_found("student not found")),
        }
    }
}

fn roster_entry(profile: Option<&Profile>, record: ProgressRecord) -> RosterEntry {
    let full_name = profile
        .map(Profile::full_name)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_NAME)
        .to_owned();
    let email = profile
        .and_then(Profile::email)
        .map_or_else(|| UNKNOWN_EMAIL.to_owned(), ToString::to_string);
    RosterEntry {
        user_id: record.user_id,
        full_name,
        email,
        record,
    }
}

#[cfg(test)]
#[path = "progress_tracker_tests.rs"]
mod tests;
