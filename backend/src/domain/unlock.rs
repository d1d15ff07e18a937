//! Sequential unlock rule for a student's lesson list.
//!
//! A lesson is unlocked when its `order_index` is at most the value returned
//! by [`next_unlocked_index`]: one past the highest completed position.
//! Out-of-order completions are honoured, but a gap in the numbering is not
//! skipped, so a lesson numbered beyond the boundary stays locked until an
//! earlier lesson closer to it is completed.

use super::{Lesson, ProgressRecord, ProgressStatus};

/// Highest order index the student may open.
///
/// Equals one more than the largest `order_index` among listed lessons the
/// student has completed, or `1` when none are complete. Progress for lessons
/// outside `lessons` (unpublished or another instrument) is ignored.
///
/// # Examples
/// ```
/// use cadence::domain::next_unlocked_index;
///
/// assert_eq!(next_unlocked_index(&[], &[]), 1);
/// ```
#[must_use]
pub fn next_unlocked_index(lessons: &[Lesson], progress: &[ProgressRecord]) -> i32 {
    let highest_completed = progress
        .iter()
        .filter(|record| record.status == ProgressStatus::Completed)
        .filter_map(|record| {
            lessons
                .iter()
                .find(|lesson| lesson.id() == record.lesson_id)
                .map(Lesson::order_index)
        })
        .max()
        .unwrap_or(0)
        .max(0);
    highest_completed.saturating_add(1)
}
