//! PostgreSQL-backed `LessonRepository` implementation using Diesel ORM.
//!
//! Updates and deletes filter on `teacher_id` in the same statement, so a
//! zero row count means the caller no longer owns the lesson.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LessonRepository, LessonRepositoryError};
use crate::domain::{
    ContentType, Instrument, Lesson, LessonContent, LessonId, LessonParts, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{LessonRow, LessonUpdate, NewLessonRow};
use super::pool::{DbPool, PoolError};
use super::schema::lessons;

/// Diesel-backed implementation of the `LessonRepository` port.
#[derive(Clone)]
pub struct DieselLessonRepository {
    pool: DbPool,
}

impl DieselLessonRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LessonRepositoryError {
    map_basic_pool_error(error, LessonRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> LessonRepositoryError {
    map_basic_diesel_error(
        error,
        LessonRepositoryError::query,
        LessonRepositoryError::connection,
    )
}

/// Column values for a lesson body.
struct ContentColumns<'a> {
    content_type: &'static str,
    body: Option<&'a str>,
    url: Option<&'a str>,
    path: Option<&'a str>,
}

fn content_columns(content: &LessonContent) -> ContentColumns<'_> {
    let content_type = content.content_type().as_str();
    match content {
        LessonContent::Text { body } => ContentColumns {
            content_type,
            body: Some(body.as_str()),
            url: None,
            path: None,
        },
        LessonContent::Asset { url, path, .. } => ContentColumns {
            content_type,
            body: None,
            url: url.as_deref(),
            path: path.as_deref(),
        },
    }
}

fn row_to_lesson(row: LessonRow) -> Result<Lesson, LessonRepositoryError> {
    let id = row.id;
    let corrupt =
        |detail: String| LessonRepositoryError::corrupt(format!("lesson {id}: {detail}"));

    let content_type =
        ContentType::from_str(&row.content_type).map_err(|err| corrupt(err.to_string()))?;
    let content = match content_type.asset_kind() {
        None => LessonContent::Text {
            body: row
                .content_body
                .ok_or_else(|| corrupt("text lesson without body".to_owned()))?,
        },
        Some(kind) => LessonContent::Asset {
            kind,
            url: row.content_url,
            path: row.content_path,
        },
    };
    let instrument =
        Instrument::new(&row.instrument).map_err(|err| corrupt(err.to_string()))?;

    Ok(Lesson::from_parts(LessonParts {
        id: LessonId::from_uuid(row.id),
        teacher_id: UserId::from_uuid(row.teacher_id),
        title: row.title,
        description: row.description,
        instrument,
        order_index: row.order_index,
        published: row.published,
        content,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn rows_to_lessons(rows: Vec<LessonRow>) -> Result<Vec<Lesson>, LessonRepositoryError> {
    rows.into_iter().map(row_to_lesson).collect()
}

#[async_trait]
impl LessonRepository for DieselLessonRepository {
    async fn find_by_id(&self, id: &LessonId) -> Result<Option<Lesson>, LessonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = lessons::table
            .filter(lessons::id.eq(*id.as_uuid()))
            .select(LessonRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_lesson).transpose()
    }

    async fn list_published(
        &self,
        instrument: &Instrument,
    ) -> Result<Vec<Lesson>, LessonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows = lessons::table
            .filter(lessons::instrument.eq(instrument.as_ref()))
            .filter(lessons::published.eq(true))
            .order((lessons::order_index.asc(), lessons::created_at.asc()))
            .select(LessonRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_lessons(rows)
    }

    async fn list_by_teacher(
        &self,
        teacher_id: &UserId,
    ) -> Result<Vec<Lesson>, LessonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows = lessons::table
            .filter(lessons::teacher_id.eq(*teacher_id.as_uuid()))
            .order((lessons::order_index.asc(), lessons::created_at.asc()))
            .select(LessonRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_lessons(rows)
    }

    async fn insert(&self, lesson: &Lesson) -> Result<(), LessonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let content = content_columns(lesson.content());
        let row = NewLessonRow {
            id: *lesson.id().as_uuid(),
            teacher_id: *lesson.teacher_id().as_uuid(),
            title: lesson.title(),
            description: lesson.description(),
            instrument: lesson.instrument().as_ref(),
            order_index: lesson.order_index(),
            published: lesson.published(),
            content_type: content.content_type,
            content_body: content.body,
            content_url: content.url,
            content_path: content.path,
            created_at: lesson.created_at(),
            updated_at: lesson.updated_at(),
        };

        diesel::insert_into(lessons::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_owned(&self, lesson: &Lesson) -> Result<bool, LessonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let content = content_columns(lesson.content());
        let update = LessonUpdate {
            title: lesson.title(),
            description: lesson.description(),
            order_index: lesson.order_index(),
            published: lesson.published(),
            content_type: content.content_type,
            content_body: content.body,
            content_url: content.url,
            content_path: content.path,
            updated_at: lesson.updated_at(),
        };

        let rows = diesel::update(
            lessons::table
                .filter(lessons::id.eq(*lesson.id().as_uuid()))
                .filter(lessons::teacher_id.eq(*lesson.teacher_id().as_uuid())),
        )
        .set(&update)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(rows > 0)
    }

    async fn delete_owned(
        &self,
        id: &LessonId,
        teacher_id: &UserId,
    ) -> Result<bool, LessonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows = diesel::delete(
            lessons::table
                .filter(lessons::id.eq(*id.as_uuid()))
                .filter(lessons::teacher_id.eq(*teacher_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage.
    use super::*;
    use crate::domain::AssetKind;
    use chrono::Utc;
    use rstest::rstest;

    fn row(content_type: &str, body: Option<&str>) -> LessonRow {
        LessonRow {
            id: uuid::Uuid::new_v4(),
            teacher_id: uuid::Uuid::new_v4(),
            title: "Scales".to_owned(),
            description: "Major scales".to_owned(),
            instrument: "piano".to_owned(),
            order_index: 3,
            published: true,
            content_type: content_type.to_owned(),
            content_body: body.map(str::to_owned),
            content_url: Some("https://cdn.example.com/a.pdf".to_owned()),
            content_path: Some("owner/a.pdf".to_owned()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn text_rows_ignore_asset_columns() {
        let lesson = row_to_lesson(row("text", Some("C major"))).expect("valid row");
        assert_eq!(
            lesson.content(),
            &LessonContent::Text {
                body: "C major".to_owned()
            }
        );
    }

    #[rstest]
    fn asset_rows_carry_url_and_path() {
        let lesson = row_to_lesson(row("pdf", None)).expect("valid row");
        let LessonContent::Asset { kind, url, path } = lesson.content() else {
            panic!("expected asset content");
        };
        assert_eq!(*kind, AssetKind::Pdf);
        assert_eq!(url.as_deref(), Some("https://cdn.example.com/a.pdf"));
        assert_eq!(path.as_deref(), Some("owner/a.pdf"));
    }

    #[rstest]
    #[case("midi", Some("x"))]
    #[case("text", None)]
    fn malformed_rows_are_corrupt(#[case] content_type: &str, #[case] body: Option<&str>) {
        let err = row_to_lesson(row(content_type, body)).expect_err("corrupt");
        assert!(matches!(err, LessonRepositoryError::Corrupt { .. }));
    }

    #[rstest]
    fn asset_content_clears_body_column() {
        let content = LessonContent::Asset {
            kind: AssetKind::Video,
            url: None,
            path: None,
        };
        let columns = content_columns(&content);
        assert_eq!(columns.content_type, "video");
        assert!(columns.body.is_none());
    }
}
