//! Teacher dashboard: lesson authoring and student oversight.
//!
//! ```text
//! GET  /dashboard/teacher
//! POST /dashboard/teacher/createLesson   {"title":"...","description":"...","content_type":"text",...}
//! POST /dashboard/teacher/updateLesson   {"lessonId":"...", ...lesson form}
//! POST /dashboard/teacher/togglePublish  {"lessonId":"..."}
//! POST /dashboard/teacher/deleteLesson   {"lessonId":"..."}
//! GET  /dashboard/teacher/lessons/{id}
//! POST /dashboard/teacher/lessons/{id}/asset?fileName=scales.pdf   <raw bytes>
//! GET  /dashboard/teacher/lessons/{id}/progress
//! POST /dashboard/teacher/lessons/{id}/markStudentComplete  {"studentId":"..."}
//! POST /dashboard/teacher/lessons/{id}/resetStudentProgress {"studentId":"..."}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AssetUpload, DashboardArea, Error, Lesson, LessonForm, LessonId, LessonRoster, Profile,
    ProgressRecord,
};

use super::ApiResult;
use super::schemas::{
    ErrorSchema, LessonFormSchema, LessonRosterSchema, LessonSchema, ProfileSchema,
    ProgressRecordSchema, UpdateLessonSchema,
};
use super::session::SessionContext;
use super::state::HttpState;
use super::student::LessonActionRequest;
use super::validation::{FieldName, LESSON_ID, STUDENT_ID, parse_lesson_id, parse_user_id};

/// Largest accepted asset upload.
pub const MAX_ASSET_BYTES: usize = 50 * 1024 * 1024;
/// Header carrying the uploaded file's name.
pub const FILE_NAME_HEADER: &str = "x-file-name";

const PATH_ID: FieldName = FieldName::new("id");

/// Teacher dashboard payload.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TeacherDashboard {
    #[schema(value_type = ProfileSchema)]
    pub profile: Profile,
    /// Every owned lesson, published or not, by order index.
    #[schema(value_type = Vec<LessonSchema>)]
    pub lessons: Vec<Lesson>,
}

/// Edited lesson form.
#[derive(Debug, Deserialize)]
pub struct UpdateLessonRequest {
    #[serde(rename = "lessonId")]
    pub lesson_id: Option<String>,
    #[serde(flatten)]
    pub form: LessonForm,
}

/// Student targeted by a teacher override.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentActionRequest {
    #[schema(format = Uuid)]
    pub student_id: Option<String>,
}

/// Query alternative to the `X-File-Name` header.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct AssetQuery {
    pub file_name: Option<String>,
}

fn path_lesson_id(raw: &str) -> Result<LessonId, Error> {
    parse_lesson_id(Some(raw), PATH_ID)
}

async fn teacher(
    state: &HttpState,
    session: &SessionContext,
) -> Result<Profile, Error> {
    state.require_area(session, DashboardArea::Teacher).await
}

/// Owned lessons.
#[utoipa::path(
    get,
    path = "/dashboard/teacher",
    responses(
        (status = 200, description = "Owned lessons", body = TeacherDashboard),
        (status = 303, description = "Not a teacher; redirected")
    ),
    tags = ["teacher"],
    operation_id = "teacherDashboard"
)]
#[get("/dashboard/teacher")]
pub async fn teacher_dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<TeacherDashboard>> {
    let profile = teacher(&state, &session).await?;
    let lessons = state.catalog.list_owned(profile.id()).await?;
    Ok(web::Json(TeacherDashboard { profile, lessons }))
}

/// Create an unpublished lesson for the teacher's instrument.
#[utoipa::path(
    post,
    path = "/dashboard/teacher/createLesson",
    request_body = LessonFormSchema,
    responses(
        (status = 201, description = "Lesson created", body = LessonSchema),
        (status = 400, description = "Invalid form; details echo the submitted values", body = ErrorSchema)
    ),
    tags = ["teacher"],
    operation_id = "createLesson"
)]
#[post("/dashboard/teacher/createLesson")]
pub async fn create_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LessonForm>,
) -> ApiResult<HttpResponse> {
    let profile = teacher(&state, &session).await?;
    let lesson = state.authoring.create(&profile, &payload).await?;
    Ok(HttpResponse::Created().json(lesson))
}

/// Apply an edited form to an owned lesson.
#[utoipa::path(
    post,
    path = "/dashboard/teacher/updateLesson",
    request_body = UpdateLessonSchema,
    responses(
        (status = 200, description = "Lesson updated", body = LessonSchema),
        (status = 400, description = "Invalid form", body = ErrorSchema),
        (status = 403, description = "Lesson owned by another teacher", body = ErrorSchema),
        (status = 404, description = "Lesson missing", body = ErrorSchema)
    ),
    tags = ["teacher"],
    operation_id = "updateLesson"
)]
#[post("/dashboard/teacher/updateLesson")]
pub async fn update_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateLessonRequest>,
) -> ApiResult<web::Json<Lesson>> {
    let profile = teacher(&state, &session).await?;
    let UpdateLessonRequest { lesson_id, form } = payload.into_inner();
    let lesson_id = parse_lesson_id(lesson_id.as_deref(), LESSON_ID)?;
    let lesson = state.authoring.update(&profile, &lesson_id, &form).await?;
    Ok(web::Json(lesson))
}

/// Flip an owned lesson between published and draft.
#[utoipa::path(
    post,
    path = "/dashboard/teacher/togglePublish",
    request_body = LessonActionRequest,
    responses(
        (status = 200, description = "Publication toggled", body = LessonSchema),
        (status = 403, description = "Lesson owned by another teacher", body = ErrorSchema),
        (status = 404, description = "Lesson missing", body = ErrorSchema)
    ),
    tags = ["teacher"],
    operation_id = "togglePublish"
)]
#[post("/dashboard/teacher/togglePublish")]
pub async fn toggle_publish(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LessonActionRequest>,
) -> ApiResult<web::Json<Lesson>> {
    let profile = teacher(&state, &session).await?;
    let lesson_id = parse_lesson_id(payload.lesson_id.as_deref(), LESSON_ID)?;
    let lesson = state.authoring.toggle_publish(&profile, &lesson_id).await?;
    Ok(web::Json(lesson))
}

/// Delete an owned lesson.
#[utoipa::path(
    post,
    path = "/dashboard/teacher/deleteLesson",
    request_body = LessonActionRequest,
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 403, description = "Lesson owned by another teacher", body = ErrorSchema),
        (status = 404, description = "Lesson missing", body = ErrorSchema)
    ),
    tags = ["teacher"],
    operation_id = "deleteLesson"
)]
#[post("/dashboard/teacher/deleteLesson")]
pub async fn delete_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LessonActionRequest>,
) -> ApiResult<HttpResponse> {
    let profile = teacher(&state, &session).await?;
    let lesson_id = parse_lesson_id(payload.lesson_id.as_deref(), LESSON_ID)?;
    state.authoring.delete(&profile, &lesson_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Load an owned lesson for editing.
#[utoipa::path(
    get,
    path = "/dashboard/teacher/lessons/{id}",
    params(("id" = String, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Lesson", body = LessonSchema),
        (status = 404, description = "Missing or owned by another teacher", body = ErrorSchema)
    ),
    tags = ["teacher"],
    operation_id = "getOwnedLesson"
)]
#[get("/dashboard/teacher/lessons/{id}")]
pub async fn owned_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Lesson>> {
    let profile = teacher(&state, &session).await?;
    let lesson_id = path_lesson_id(&path)?;
    let lesson = state.authoring.get_owned(&profile, &lesson_id).await?;
    Ok(web::Json(lesson))
}

/// Upload the file behind an asset-backed lesson.
///
/// The request body is the raw file; its name comes from the `X-File-Name`
/// header or the `fileName` query parameter and only contributes its
/// extension to the stored path.
#[utoipa::path(
    post,
    path = "/dashboard/teacher/lessons/{id}/asset",
    params(("id" = String, Path, description = "Lesson id"), AssetQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Asset stored and linked", body = LessonSchema),
        (status = 400, description = "Empty file or text lesson", body = ErrorSchema),
        (status = 403, description = "Lesson owned by another teacher", body = ErrorSchema)
    ),
    tags = ["teacher"],
    operation_id = "uploadLessonAsset"
)]
#[post("/dashboard/teacher/lessons/{id}/asset")]
pub async fn upload_asset(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<AssetQuery>,
    body: web::Bytes,
) -> ApiResult<web::Json<Lesson>> {
    let profile = teacher(&state, &session).await?;
    let lesson_id = path_lesson_id(&path)?;
    let file_name = req
        .headers()
        .get(FILE_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or_else(|| query.into_inner().file_name)
        .unwrap_or_default();
    let upload = AssetUpload {
        file_name,
        bytes: body.to_vec(),
    };
    let lesson = state
        .authoring
        .upload_content_asset(&profile, &lesson_id, upload)
        .await?;
    Ok(web::Json(lesson))
}

/// Every student's progress on an owned lesson.
#[utoipa::path(
    get,
    path = "/dashboard/teacher/lessons/{id}/progress",
    params(("id" = String, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Roster with per-status counts", body = LessonRosterSchema),
        (status = 403, description = "Lesson owned by another teacher", body = ErrorSchema),
        (status = 404, description = "Lesson missing", body = ErrorSchema)
    ),
    tags = ["teacher"],
    operation_id = "lessonRoster"
)]
#[get("/dashboard/teacher/lessons/{id}/progress")]
pub async fn lesson_roster(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LessonRoster>> {
    let profile = teacher(&state, &session).await?;
    let lesson_id = path_lesson_id(&path)?;
    let roster = state.tracker.lesson_roster(&profile, &lesson_id).await?;
    Ok(web::Json(roster))
}

/// Mark a student's lesson completed on their behalf.
#[utoipa::path(
    post,
    path = "/dashboard/teacher/lessons/{id}/markStudentComplete",
    params(("id" = String, Path, description = "Lesson id")),
    request_body = StudentActionRequest,
    responses(
        (status = 200, description = "Record completed", body = ProgressRecordSchema),
        (status = 403, description = "Lesson owned by another teacher", body = ErrorSchema),
        (status = 404, description = "Lesson or student missing", body = ErrorSchema)
    ),
    tags = ["teacher"],
    operation_id = "markStudentComplete"
)]
#[post("/dashboard/teacher/lessons/{id}/markStudentComplete")]
pub async fn mark_student_complete(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<StudentActionRequest>,
) -> ApiResult<web::Json<ProgressRecord>> {
    let profile = teacher(&state, &session).await?;
    let lesson_id = path_lesson_id(&path)?;
    let student_id = parse_user_id(payload.student_id.as_deref(), STUDENT_ID)?;
    let record = state
        .tracker
        .teacher_complete(&profile, &lesson_id, &student_id)
        .await?;
    Ok(web::Json(record))
}

/// Reset a student's progress on an owned lesson.
#[utoipa::path(
    post,
    path = "/dashboard/teacher/lessons/{id}/resetStudentProgress",
    params(("id" = String, Path, description = "Lesson id")),
    request_body = StudentActionRequest,
    responses(
        (status = 200, description = "Record reset to not started", body = ProgressRecordSchema),
        (status = 403, description = "Lesson owned by another teacher", body = ErrorSchema),
        (status = 404, description = "Lesson missing", body = ErrorSchema)
    ),
    tags = ["teacher"],
    operation_id = "resetStudentProgress"
)]
#[post("/dashboard/teacher/lessons/{id}/resetStudentProgress")]
pub async fn reset_student_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<StudentActionRequest>,
) -> ApiResult<web::Json<ProgressRecord>> {
    let profile = teacher(&state, &session).await?;
    let lesson_id = path_lesson_id(&path)?;
    let student_id = parse_user_id(payload.student_id.as_deref(), STUDENT_ID)?;
    let record = state
        .tracker
        .teacher_reset(&profile, &lesson_id, &student_id)
        .await?;
    Ok(web::Json(record))
}

#[cfg(test)]
#[path = "teacher_tests.rs"]
mod tests;
