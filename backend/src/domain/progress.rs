//! Per-(user, lesson) progress records and the changes applied to them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{LessonId, UserId};

/// Maximum stored length of a student note.
pub const NOTE_MAX: usize = 2000;

/// Lifecycle of a student's work on one lesson.
///
/// A missing record is equivalent to [`ProgressStatus::NotStarted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// Not yet opened, or reset by a teacher.
    #[default]
    NotStarted,
    /// Opened at least once.
    InProgress,
    /// Finished.
    Completed,
}

/// Raised when a stored status string is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown progress status: {0}")]
pub struct UnknownProgressStatus(pub String);

impl ProgressStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = UnknownProgressStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownProgressStatus(other.to_owned())),
        }
    }
}

/// Stored progress for one student on one lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Student.
    pub user_id: UserId,
    /// Lesson.
    pub lesson_id: LessonId,
    /// Current status.
    pub status: ProgressStatus,
    /// Last time the student opened or annotated the lesson.
    pub last_viewed_at: Option<DateTime<Utc>>,
    /// Free-form student note.
    pub notes: Option<String>,
}

impl ProgressRecord {
    /// Implicit record for a lesson never touched.
    #[must_use]
    pub const fn not_started(user_id: UserId, lesson_id: LessonId) -> Self {
        Self {
            user_id,
            lesson_id,
            status: ProgressStatus::NotStarted,
            last_viewed_at: None,
            notes: None,
        }
    }

    /// Apply `change` to this record.
    ///
    /// Adapters without native upsert support use this to merge in memory.
    #[must_use]
    pub fn apply(mut self, change: &ProgressChange) -> Self {
        if let FieldChange::Set(status) = change.status {
            self.status = status;
        }
        if let FieldChange::Set(at) = change.last_viewed_at {
            self.last_viewed_at = at;
        }
        if let FieldChange::Set(notes) = &change.notes {
            self.notes.clone_from(notes);
        }
        self
    }
}

/// Whether a column is overwritten or left as stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldChange<T> {
    /// Leave the stored value untouched (or default on insert).
    #[default]
    Keep,
    /// Overwrite with the given value.
    Set(T),
}

impl<T> FieldChange<T> {
    /// The value to write, if any.
    pub const fn as_set(&self) -> Option<&T> {
        match self {
            Self::Keep => None,
            Self::Set(value) => Some(value),
        }
    }
}

/// Keyed change applied atomically to a progress record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressChange {
    /// Student.
    pub user_id: UserId,
    /// Lesson.
    pub lesson_id: LessonId,
    /// New status.
    pub status: FieldChange<ProgressStatus>,
    /// New last-viewed timestamp; `Set(None)` clears it.
    pub last_viewed_at: FieldChange<Option<DateTime<Utc>>>,
    /// New note; `Set(None)` clears it.
    pub notes: FieldChange<Option<String>>,
}

impl ProgressChange {
    /// Change that only touches the key.
    #[must_use]
    pub const fn for_key(user_id: UserId, lesson_id: LessonId) -> Self {
        Self {
            user_id,
            lesson_id,
            status: FieldChange::Keep,
            last_viewed_at: FieldChange::Keep,
            notes: FieldChange::Keep,
        }
    }

    /// Record the student opening the lesson.
    #[must_use]
    pub fn started(user_id: UserId, lesson_id: LessonId, now: DateTime<Utc>) -> Self {
        Self {
            status: FieldChange::Set(ProgressStatus::InProgress),
            last_viewed_at: FieldChange::Set(Some(now)),
            ..Self::for_key(user_id, lesson_id)
        }
    }

    /// Record the student finishing the lesson.
    #[must_use]
    pub fn completed(user_id: UserId, lesson_id: LessonId, now: DateTime<Utc>) -> Self {
        Self {
            status: FieldChange::Set(ProgressStatus::Completed),
            last_viewed_at: FieldChange::Set(Some(now)),
            ..Self::for_key(user_id, lesson_id)
        }
    }

    /// Replace the student's note.
    #[must_use]
    pub fn annotated(
        user_id: UserId,
        lesson_id: LessonId,
        note: &LessonNote,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            last_viewed_at: FieldChange::Set(Some(now)),
            notes: FieldChange::Set(note.as_stored()),
            ..Self::for_key(user_id, lesson_id)
        }
    }

    /// Teacher override marking the lesson done.
    #[must_use]
    pub fn marked_complete(user_id: UserId, lesson_id: LessonId) -> Self {
        Self {
            status: FieldChange::Set(ProgressStatus::Completed),
            ..Self::for_key(user_id, lesson_id)
        }
    }

    /// Teacher reset back to the initial state.
    #[must_use]
    pub fn reset(user_id: UserId, lesson_id: LessonId) -> Self {
        Self {
            status: FieldChange::Set(ProgressStatus::NotStarted),
            last_viewed_at: FieldChange::Set(None),
            notes: FieldChange::Set(None),
            ..Self::for_key(user_id, lesson_id)
        }
    }
}

/// Validation failures for student notes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteValidationError {
    /// Note exceeded [`NOTE_MAX`].
    #[error("note must be at most {max} characters")]
    TooLong {
        /// Allowed maximum.
        max: usize,
    },
}

/// Student note; blank input clears the stored note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonNote(Option<String>);

impl LessonNote {
    /// Validate a submitted note.
    pub fn new(raw: &str) -> Result<Self, NoteValidationError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() > NOTE_MAX {
            return Err(NoteValidationError::TooLong { max: NOTE_MAX });
        }
        Ok(Self((!trimmed.is_empty()).then(|| trimmed.to_owned())))
    }

    /// Value to persist.
    #[must_use]
    pub fn as_stored(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Per-status counts for a lesson roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    /// Students with a record.
    pub total: usize,
    /// Completed records.
    pub completed: usize,
    /// In-progress records.
    pub in_progress: usize,
    /// Not-started records.
    pub not_started: usize,
}

impl ProgressStats {
    /// Tally statuses.
    ///
    /// # Examples
    /// ```
    /// use cadence::domain::{ProgressStats, ProgressStatus};
    ///
    /// let stats = ProgressStats::tally([ProgressStatus::Completed, ProgressStatus::InProgress]);
    /// assert_eq!(stats.total, 2);
    /// assert_eq!(stats.completed, 1);
    /// ```
    pub fn tally(statuses: impl IntoIterator<Item = ProgressStatus>) -> Self {
        statuses
            .into_iter()
            .fold(Self::default(), |mut stats, status| {
                stats.total += 1;
                match status {
                    ProgressStatus::Completed => stats.completed += 1,
                    ProgressStatus::InProgress => stats.in_progress += 1,
                    ProgressStatus::NotStarted => stats.not_started += 1,
                }
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn key() -> (UserId, LessonId) {
        (UserId::random(), LessonId::random())
    }

    #[rstest]
    #[case(ProgressStatus::NotStarted)]
    #[case(ProgressStatus::InProgress)]
    #[case(ProgressStatus::Completed)]
    fn status_parses_its_storage_form(#[case] status: ProgressStatus) {
        assert_eq!(status.as_str().parse::<ProgressStatus>(), Ok(status));
    }

    #[test]
    fn start_after_complete_returns_to_in_progress_and_keeps_notes() {
        let (user, lesson) = key();
        let now = Utc::now();
        let record = ProgressRecord {
            status: ProgressStatus::Completed,
            notes: Some("tricky bar 12".to_owned()),
            ..ProgressRecord::not_started(user, lesson)
        };

        let touched = record.apply(&ProgressChange::started(user, lesson, now));

        assert_eq!(touched.status, ProgressStatus::InProgress);
        assert_eq!(touched.last_viewed_at, Some(now));
        assert_eq!(touched.notes.as_deref(), Some("tricky bar 12"));
    }

    #[test]
    fn reset_clears_notes_and_timestamp() {
        let (user, lesson) = key();
        let record = ProgressRecord {
            status: ProgressStatus::Completed,
            last_viewed_at: Some(Utc::now()),
            notes: Some("done".to_owned()),
            ..ProgressRecord::not_started(user, lesson)
        };

        let reset = record.apply(&ProgressChange::reset(user, lesson));

        assert_eq!(reset, ProgressRecord::not_started(user, lesson));
    }

    #[test]
    fn marked_complete_keeps_timestamp() {
        let (user, lesson) = key();
        let seen = Utc::now();
        let record = ProgressRecord {
            status: ProgressStatus::InProgress,
            last_viewed_at: Some(seen),
            ..ProgressRecord::not_started(user, lesson)
        };

        let done = record.apply(&ProgressChange::marked_complete(user, lesson));

        assert_eq!(done.status, ProgressStatus::Completed);
        assert_eq!(done.last_viewed_at, Some(seen));
    }

    #[rstest]
    #[case("  ", None)]
    #[case(" keep wrists loose ", Some("keep wrists loose"))]
    fn notes_are_trimmed_and_blank_clears(#[case] raw: &str, #[case] expected: Option<&str>) {
        let note = LessonNote::new(raw).expect("valid note");
        assert_eq!(note.as_stored().as_deref(), expected);
    }

    #[test]
    fn overlong_notes_are_rejected() {
        let raw = "n".repeat(NOTE_MAX + 1);
        assert_eq!(
            LessonNote::new(&raw),
            Err(NoteValidationError::TooLong { max: NOTE_MAX })
        );
    }

    #[test]
    fn tally_counts_each_status() {
        let stats = ProgressStats::tally([
            ProgressStatus::Completed,
            ProgressStatus::Completed,
            ProgressStatus::InProgress,
            ProgressStatus::NotStarted,
        ]);
        assert_eq!(
            stats,
            ProgressStats {
                total: 4,
                completed: 2,
                in_progress: 1,
                not_started: 1,
            }
        );
    }
}
