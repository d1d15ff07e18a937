//! Read-only lesson listings.

use std::sync::Arc;

use super::ports::LessonRepository;
use super::service_support::map_lesson_error;
use super::{Error, Instrument, Lesson, UserId};

/// Published and owned lesson listings, ascending by `order_index`.
#[derive(Clone)]
pub struct LessonCatalog {
    lessons: Arc<dyn LessonRepository>,
}

impl LessonCatalog {
    /// Create a catalogue over the lesson store.
    pub fn new(lessons: Arc<dyn LessonRepository>) -> Self {
        Self { lessons }
    }

    /// Published lessons for `instrument`.
    ///
    /// An actor without an instrument has not been scoped to any content yet,
    /// so `None` yields an empty list without touching the store.
    pub async fn list_published(
        &self,
        instrument: Option<&Instrument>,
    ) -> Result<Vec<Lesson>, Error> {
        let Some(instrument) = instrument else {
            return Ok(Vec::new());
        };
        let mut lessons = self
            .lessons
            .list_published(instrument)
            .await
            .map_err(map_lesson_error)?;
        lessons.retain(|lesson| lesson.is_visible_to(Some(instrument)));
        sort_by_position(&mut lessons);
        Ok(lessons)
    }

    /// Every lesson owned by `teacher_id`, published or not.
    pub async fn list_owned(&self, teacher_id: &UserId) -> Result<Vec<Lesson>, Error> {
        let mut lessons = self
            .lessons
            .list_by_teacher(teacher_id)
            .await
            .map_err(map_lesson_error)?;
        lessons.retain(|lesson| lesson.is_owned_by(teacher_id));
        sort_by_position(&mut lessons);
        Ok(lessons)
    }
}

fn sort_by_position(lessons: &mut [Lesson]) {
    lessons.sort_by_key(Lesson::order_index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockLessonRepository;
    use crate::domain::{LessonContent, LessonId, LessonParts};
    use chrono::Utc;

    fn lesson(teacher: UserId, instrument: &str, order_index: i32, published: bool) -> Lesson {
        let now = Utc::now();
        Lesson::from_parts(LessonParts {
            id: LessonId::random(),
            teacher_id: teacher,
            title: format!("{instrument} {order_index}"),
            description: "Warm-up".to_owned(),
            instrument: Instrument::new(instrument).expect("instrument"),
            order_index,
            published,
            content: LessonContent::Text {
                body: "Long tones.".to_owned(),
            },
            created_at: now,
            updated_at: now,
        })
    }

    #[tokio::test]
    async fn no_instrument_yields_empty_without_querying() {
        let mut repo = MockLessonRepository::new();
        repo.expect_list_published().times(0);
        let catalog = LessonCatalog::new(Arc::new(repo));

        let lessons = catalog.list_published(None).await.expect("empty list");

        assert!(lessons.is_empty());
    }

    #[tokio::test]
    async fn published_lessons_are_filtered_and_ordered() {
        let teacher = UserId::random();
        let rows = vec![
            lesson(teacher, "piano", 3, true),
            lesson(teacher, "piano", 1, true),
            lesson(teacher, "piano", 2, false),
            lesson(teacher, "violin", 1, true),
        ];
        let mut repo = MockLessonRepository::new();
        repo.expect_list_published()
            .times(1)
            .return_once(move |_| Ok(rows));
        let catalog = LessonCatalog::new(Arc::new(repo));
        let piano = Instrument::new("piano").expect("instrument");

        let lessons = catalog
            .list_published(Some(&piano))
            .await
            .expect("lessons");

        let positions: Vec<_> = lessons.iter().map(Lesson::order_index).collect();
        assert_eq!(positions, vec![1, 3]);
        assert!(lessons.iter().all(|l| l.instrument() == &piano));
    }

    #[tokio::test]
    async fn owned_lessons_include_drafts() {
        let teacher = UserId::random();
        let rows = vec![
            lesson(teacher, "cello", 2, false),
            lesson(teacher, "cello", 1, true),
        ];
        let mut repo = MockLessonRepository::new();
        repo.expect_list_by_teacher()
            .times(1)
            .return_once(move |_| Ok(rows));
        let catalog = LessonCatalog::new(Arc::new(repo));

        let lessons = catalog.list_owned(&teacher).await.expect("lessons");

        assert_eq!(lessons.len(), 2);
        assert_eq!(lessons[0].order_index(), 1);
        assert!(!lessons[1].published());
    }
}
