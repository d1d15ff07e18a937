//! Handler tests for the teacher dashboard.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use rstest_bdd_macros::{given, then, when};
use serde_json::{Value, json};

use super::*;
use crate::domain::{Identity, LessonId, Role};
use crate::inbound::http::test_utils::{TestWorld, init_app, send, sign_in};

fn text_form() -> Value {
    json!({
        "title": "Scales",
        "description": "Major scales, hands together",
        "content_type": "text",
        "content_body": "C, G, D, A",
        "order_index": "2"
    })
}

fn pdf_form() -> Value {
    json!({
        "title": "Sight reading",
        "description": "Sheet one",
        "content_type": "pdf"
    })
}

async fn teacher_world() -> (TestWorld, Identity) {
    let world = TestWorld::default();
    let identity = world
        .account("clara@example.com", Some(Role::Teacher), Some("piano"))
        .await;
    (world, identity)
}

fn lesson_id_of(body: &Value) -> LessonId {
    body["id"]
        .as_str()
        .expect("lesson id")
        .parse()
        .expect("uuid")
}

#[actix_web::test]
async fn created_lessons_inherit_instrument_and_start_unpublished() {
    let (world, identity) = teacher_world().await;
    let app = init_app(&world).await;
    let cookie = sign_in(&app, "clara@example.com").await;

    let (status, _, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/createLesson")
            .cookie(cookie.clone())
            .set_json(text_form())
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["instrument"], "piano");
    assert_eq!(created["published"], false);
    assert_eq!(created["orderIndex"], 2);
    assert_eq!(created["teacherId"], identity.id().to_string());

    let (status, _, dashboard) = send(
        &app,
        test::TestRequest::get()
            .uri("/dashboard/teacher")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["lessons"][0]["id"], created["id"]);
}

#[actix_web::test]
async fn invalid_forms_echo_submitted_values() {
    let (world, _) = teacher_world().await;
    let app = init_app(&world).await;
    let cookie = sign_in(&app, "clara@example.com").await;
    let mut form = text_form();
    form["content_body"] = json!("   ");

    let (status, _, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/createLesson")
            .cookie(cookie)
            .set_json(form)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "content_body");
    assert_eq!(body["details"]["values"]["title"], "Scales");
    assert!(world.lessons.all().is_empty());
}

#[actix_web::test]
async fn teachers_without_instrument_cannot_create() {
    let world = TestWorld::default();
    world
        .account("johannes@example.com", Some(Role::Teacher), None)
        .await;
    let app = init_app(&world).await;
    let cookie = sign_in(&app, "johannes@example.com").await;

    let (status, _, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/createLesson")
            .cookie(cookie)
            .set_json(text_form())
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "missing_instrument");
}

#[given("a lesson owned by another teacher")]
fn a_lesson_owned_by_another_teacher(created: Value) -> LessonId {
    lesson_id_of(&created)
}

#[when("the intruder's toggle is answered")]
fn the_intruders_toggle_is_answered(outcome: (StatusCode, Value)) -> (StatusCode, Value) {
    outcome
}

#[then("the toggle is forbidden")]
fn the_toggle_is_forbidden(outcome: (StatusCode, Value)) {
    let (status, body) = outcome;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[then("the lesson stays unpublished")]
fn the_lesson_stays_unpublished(lesson: Option<Lesson>) {
    let lesson = lesson.expect("lesson still stored");
    assert!(!lesson.published());
}

#[actix_web::test]
async fn foreign_toggle_is_forbidden() {
    let (world, _) = teacher_world().await;
    world
        .account("johannes@example.com", Some(Role::Teacher), Some("piano"))
        .await;
    let app = init_app(&world).await;
    let owner = sign_in(&app, "clara@example.com").await;
    let intruder = sign_in(&app, "johannes@example.com").await;
    let (_, _, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/createLesson")
            .cookie(owner)
            .set_json(text_form())
            .to_request(),
    )
    .await;

    let lesson_id = a_lesson_owned_by_another_teacher(created);
    let (status, _, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/togglePublish")
            .cookie(intruder)
            .set_json(json!({ "lessonId": lesson_id.to_string() }))
            .to_request(),
    )
    .await;
    let outcome = the_intruders_toggle_is_answered((status, body));

    the_toggle_is_forbidden(outcome);
    the_lesson_stays_unpublished(world.lessons.get(&lesson_id));
}

#[actix_web::test]
async fn owners_toggle_update_and_delete() {
    let (world, _) = teacher_world().await;
    let app = init_app(&world).await;
    let cookie = sign_in(&app, "clara@example.com").await;
    let (_, _, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/createLesson")
            .cookie(cookie.clone())
            .set_json(text_form())
            .to_request(),
    )
    .await;
    let lesson_id = lesson_id_of(&created);
    let target = json!({ "lessonId": lesson_id.to_string() });

    let (status, _, toggled) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/togglePublish")
            .cookie(cookie.clone())
            .set_json(&target)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["published"], true);

    let mut edit = text_form();
    edit["lessonId"] = json!(lesson_id.to_string());
    edit["title"] = json!("Arpeggios");
    let (status, _, updated) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/updateLesson")
            .cookie(cookie.clone())
            .set_json(edit)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Arpeggios");
    assert_eq!(updated["published"], true);

    let (status, _, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/deleteLesson")
            .cookie(cookie.clone())
            .set_json(&target)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/dashboard/teacher/lessons/{lesson_id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn foreign_lessons_are_hidden_from_the_edit_page() {
    let (world, _) = teacher_world().await;
    world
        .account("johannes@example.com", Some(Role::Teacher), Some("piano"))
        .await;
    let app = init_app(&world).await;
    let owner = sign_in(&app, "clara@example.com").await;
    let other = sign_in(&app, "johannes@example.com").await;
    let (_, _, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/createLesson")
            .cookie(owner)
            .set_json(text_form())
            .to_request(),
    )
    .await;

    let (status, _, _) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/dashboard/teacher/lessons/{}", lesson_id_of(&created)))
            .cookie(other)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[case(true)]
#[case(false)]
#[actix_web::test]
async fn asset_uploads_record_the_public_url(#[case] name_in_header: bool) {
    let (world, identity) = teacher_world().await;
    let app = init_app(&world).await;
    let cookie = sign_in(&app, "clara@example.com").await;
    let (_, _, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/createLesson")
            .cookie(cookie.clone())
            .set_json(pdf_form())
            .to_request(),
    )
    .await;
    let lesson_id = lesson_id_of(&created);

    let base = format!("/dashboard/teacher/lessons/{lesson_id}/asset");
    let request = if name_in_header {
        test::TestRequest::post()
            .uri(&base)
            .insert_header((FILE_NAME_HEADER, "Sheet One.PDF"))
    } else {
        test::TestRequest::post().uri(&format!("{base}?fileName=Sheet%20One.PDF"))
    };
    let (status, _, updated) = send(
        &app,
        request
            .cookie(cookie)
            .set_payload(b"%PDF-1.7".to_vec())
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let path = updated["content"]["path"].as_str().expect("path");
    assert!(path.starts_with(&format!("{}/", identity.id())));
    assert!(path.ends_with(".pdf"));
    assert_eq!(
        updated["content"]["url"],
        format!("https://cdn.example.com/lessons/{path}")
    );
    assert_eq!(world.blobs.paths(), vec![path.to_owned()]);
}

#[actix_web::test]
async fn text_lessons_refuse_uploads() {
    let (world, _) = teacher_world().await;
    let app = init_app(&world).await;
    let cookie = sign_in(&app, "clara@example.com").await;
    let (_, _, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/createLesson")
            .cookie(cookie.clone())
            .set_json(text_form())
            .to_request(),
    )
    .await;

    let (status, _, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&format!(
                "/dashboard/teacher/lessons/{}/asset",
                lesson_id_of(&created)
            ))
            .insert_header((FILE_NAME_HEADER, "notes.pdf"))
            .cookie(cookie)
            .set_payload(vec![1_u8, 2, 3])
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "asset_on_text_lesson");
    assert!(world.blobs.paths().is_empty());
}

#[actix_web::test]
async fn roster_reflects_overrides_and_resets() {
    let (world, _) = teacher_world().await;
    let student = world
        .account("robert@example.com", Some(Role::Student), Some("piano"))
        .await;
    let app = init_app(&world).await;
    let cookie = sign_in(&app, "clara@example.com").await;
    let (_, _, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/createLesson")
            .cookie(cookie.clone())
            .set_json(text_form())
            .to_request(),
    )
    .await;
    let lesson_id = lesson_id_of(&created);
    let student_body = json!({ "studentId": student.id().to_string() });

    let (status, _, record) = send(
        &app,
        test::TestRequest::post()
            .uri(&format!(
                "/dashboard/teacher/lessons/{lesson_id}/markStudentComplete"
            ))
            .cookie(cookie.clone())
            .set_json(&student_body)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "completed");

    let (status, _, roster) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/dashboard/teacher/lessons/{lesson_id}/progress"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roster["stats"]["completed"], 1);
    assert_eq!(roster["entries"][0]["fullName"], "robert");
    assert_eq!(roster["entries"][0]["status"], "completed");

    let (status, _, record) = send(
        &app,
        test::TestRequest::post()
            .uri(&format!(
                "/dashboard/teacher/lessons/{lesson_id}/resetStudentProgress"
            ))
            .cookie(cookie)
            .set_json(&student_body)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "not_started");
    assert!(record["notes"].is_null());
    assert!(record["lastViewedAt"].is_null());
}

#[actix_web::test]
async fn malformed_student_ids_are_rejected() {
    let (world, _) = teacher_world().await;
    let app = init_app(&world).await;
    let cookie = sign_in(&app, "clara@example.com").await;

    let (status, _, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&format!(
                "/dashboard/teacher/lessons/{}/markStudentComplete",
                LessonId::random()
            ))
            .cookie(cookie)
            .set_json(json!({ "studentId": "robert" }))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "studentId");
}

#[actix_web::test]
async fn students_are_redirected_from_teacher_actions() {
    let world = TestWorld::default();
    world
        .account("robert@example.com", Some(Role::Student), Some("piano"))
        .await;
    let app = init_app(&world).await;
    let cookie = sign_in(&app, "robert@example.com").await;

    let (status, location, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/dashboard/teacher/createLesson")
            .cookie(cookie)
            .set_json(text_form())
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/dashboard/student"));
    assert!(world.lessons.all().is_empty());
}
