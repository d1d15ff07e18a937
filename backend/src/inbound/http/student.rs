//! Student dashboard and progress actions.
//!
//! ```text
//! GET  /dashboard/student
//! POST /dashboard/student/startLesson    {"lessonId":"..."}
//! POST /dashboard/student/completeLesson {"lessonId":"..."}
//! POST /dashboard/student/noteLesson     {"lessonId":"...","note":"..."}
//! ```
//!
//! The acting student always comes from the session; request bodies never
//! name a user.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{DashboardArea, LessonNote, Profile, ProgressRecord, StudentOverview};

use super::ApiResult;
use super::schemas::{ErrorSchema, ProfileSchema, ProgressRecordSchema, StudentOverviewSchema};
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::{FieldErrorCode, FieldName, LESSON_ID, field_error, parse_lesson_id};

/// Student dashboard payload.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StudentDashboard {
    #[schema(value_type = ProfileSchema)]
    pub profile: Profile,
    #[schema(value_type = StudentOverviewSchema)]
    pub overview: StudentOverview,
}

/// Body naming the lesson to act on.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonActionRequest {
    #[schema(format = Uuid)]
    pub lesson_id: Option<String>,
}

/// Body for saving a note; a blank note clears it.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    #[schema(format = Uuid)]
    pub lesson_id: Option<String>,
    #[serde(default)]
    pub note: String,
}

/// Published lessons for the student's instrument with unlock state.
#[utoipa::path(
    get,
    path = "/dashboard/student",
    responses(
        (status = 200, description = "Lessons, progress, and unlocked index", body = StudentDashboard),
        (status = 303, description = "Not a student; redirected")
    ),
    tags = ["student"],
    operation_id = "studentDashboard"
)]
#[get("/dashboard/student")]
pub async fn student_dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<StudentDashboard>> {
    let profile = state.require_area(&session, DashboardArea::Student).await?;
    let overview = state.tracker.student_overview(&profile).await?;
    Ok(web::Json(StudentDashboard { profile, overview }))
}

/// Open a lesson.
#[utoipa::path(
    post,
    path = "/dashboard/student/startLesson",
    request_body = LessonActionRequest,
    responses(
        (status = 200, description = "Lesson in progress", body = ProgressRecordSchema),
        (status = 400, description = "Missing or malformed lessonId", body = ErrorSchema),
        (status = 404, description = "Lesson not visible to the student", body = ErrorSchema)
    ),
    tags = ["student"],
    operation_id = "startLesson"
)]
#[post("/dashboard/student/startLesson")]
pub async fn start_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LessonActionRequest>,
) -> ApiResult<web::Json<ProgressRecord>> {
    let profile = state.require_area(&session, DashboardArea::Student).await?;
    let lesson_id = parse_lesson_id(payload.lesson_id.as_deref(), LESSON_ID)?;
    let record = state.tracker.start(&profile, &lesson_id).await?;
    Ok(web::Json(record))
}

/// Mark a lesson completed.
#[utoipa::path(
    post,
    path = "/dashboard/student/completeLesson",
    request_body = LessonActionRequest,
    responses(
        (status = 200, description = "Lesson completed", body = ProgressRecordSchema),
        (status = 400, description = "Missing or malformed lessonId", body = ErrorSchema),
        (status = 404, description = "Lesson not visible to the student", body = ErrorSchema)
    ),
    tags = ["student"],
    operation_id = "completeLesson"
)]
#[post("/dashboard/student/completeLesson")]
pub async fn complete_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LessonActionRequest>,
) -> ApiResult<web::Json<ProgressRecord>> {
    let profile = state.require_area(&session, DashboardArea::Student).await?;
    let lesson_id = parse_lesson_id(payload.lesson_id.as_deref(), LESSON_ID)?;
    let record = state.tracker.complete(&profile, &lesson_id).await?;
    Ok(web::Json(record))
}

/// Save the student's note on a started lesson.
#[utoipa::path(
    post,
    path = "/dashboard/student/noteLesson",
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note saved", body = ProgressRecordSchema),
        (status = 400, description = "Invalid lessonId or note too long", body = ErrorSchema),
        (status = 404, description = "Lesson not started", body = ErrorSchema)
    ),
    tags = ["student"],
    operation_id = "noteLesson"
)]
#[post("/dashboard/student/noteLesson")]
pub async fn note_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<NoteRequest>,
) -> ApiResult<web::Json<ProgressRecord>> {
    let profile = state.require_area(&session, DashboardArea::Student).await?;
    let NoteRequest { lesson_id, note } = payload.into_inner();
    let lesson_id = parse_lesson_id(lesson_id.as_deref(), LESSON_ID)?;
    let note = LessonNote::new(&note).map_err(|err| {
        field_error(
            FieldName::new("note"),
            FieldErrorCode::InvalidNote,
            err.to_string(),
        )
    })?;
    let record = state.tracker.annotate(&profile, &lesson_id, &note).await?;
    Ok(web::Json(record))
}

#[cfg(test)]
#[path = "student_tests.rs"]
mod tests;
