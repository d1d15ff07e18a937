//! Tests for lesson authoring.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockLessonRepository;
use crate::domain::{
    AssetKind, EmailAddress, ErrorCode, Instrument, ProfileDraft, Role,
};
use crate::outbound::memory::{InMemoryBlobStore, InMemoryLessonRepository};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 15, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

fn teacher(instrument: Option<&str>) -> Profile {
    Profile::new(ProfileDraft {
        id: UserId::random(),
        email: Some(EmailAddress::new("clara@example.com").expect("email")),
        role: Some(Role::Teacher),
        instrument: instrument.map(|name| Instrument::new(name).expect("instrument")),
        full_name: "Clara".to_owned(),
        avatar_url: None,
        created_at: Utc::now(),
    })
}

fn text_form() -> LessonForm {
    LessonForm {
        title: "Scales".to_owned(),
        description: "Major scales, hands together".to_owned(),
        content_type: "text".to_owned(),
        content_body: Some("C, G, D, A".to_owned()),
        content_url: None,
        order_index: Some("2".to_owned()),
    }
}

fn pdf_form() -> LessonForm {
    LessonForm {
        content_type: "pdf".to_owned(),
        content_body: None,
        ..text_form()
    }
}

struct Harness {
    gate: LessonAuthoringGate,
    lessons: Arc<InMemoryLessonRepository>,
    blobs: Arc<InMemoryBlobStore>,
}

#[fixture]
fn harness() -> Harness {
    let lessons = Arc::new(InMemoryLessonRepository::default());
    let blobs = Arc::new(InMemoryBlobStore::new("https://cdn.example.com/lessons"));
    let gate = LessonAuthoringGate::new(lessons.clone(), blobs.clone(), Arc::new(FixtureClock));
    Harness {
        gate,
        lessons,
        blobs,
    }
}

#[rstest]
#[tokio::test]
async fn create_inherits_instrument_and_starts_unpublished(harness: Harness) {
    let author = teacher(Some("Piano"));

    let lesson = harness
        .gate
        .create(&author, &text_form())
        .await
        .expect("created");

    assert_eq!(lesson.instrument().as_ref(), "piano");
    assert_eq!(lesson.teacher_id(), author.id());
    assert_eq!(lesson.order_index(), 2);
    assert!(!lesson.published());
    assert_eq!(harness.lessons.all(), vec![lesson]);
}

#[rstest]
#[tokio::test]
async fn create_without_teacher_instrument_is_rejected(harness: Harness) {
    let err = harness
        .gate
        .create(&teacher(None), &text_form())
        .await
        .expect_err("no instrument");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("details");
    assert_eq!(details["field"], "instrument");
    assert_eq!(details["code"], "missing_instrument");
    assert!(harness.lessons.all().is_empty());
}

#[rstest]
#[tokio::test]
async fn validation_errors_echo_submitted_values(harness: Harness) {
    let form = LessonForm {
        content_body: Some("   ".to_owned()),
        ..text_form()
    };

    let err = harness
        .gate
        .create(&teacher(Some("piano")), &form)
        .await
        .expect_err("missing body");

    let details = err.details().expect("details");
    assert_eq!(details["field"], "content_body");
    assert_eq!(details["values"]["title"], "Scales");
}

#[rstest]
#[tokio::test]
async fn foreign_toggle_is_forbidden_and_leaves_flag_unchanged(harness: Harness) {
    let owner = teacher(Some("piano"));
    let intruder = teacher(Some("piano"));
    let lesson = harness
        .gate
        .create(&owner, &text_form())
        .await
        .expect("created");

    let err = harness
        .gate
        .toggle_publish(&intruder, &lesson.id())
        .await
        .expect_err("foreign");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    let stored = harness.lessons.get(&lesson.id()).expect("still stored");
    assert!(!stored.published());
}

#[rstest]
#[tokio::test]
async fn toggle_flips_publication_each_time(harness: Harness) {
    let owner = teacher(Some("piano"));
    let lesson = harness
        .gate
        .create(&owner, &text_form())
        .await
        .expect("created");

    let first = harness
        .gate
        .toggle_publish(&owner, &lesson.id())
        .await
        .expect("publish");
    let second = harness
        .gate
        .toggle_publish(&owner, &lesson.id())
        .await
        .expect("unpublish");

    assert!(first.published());
    assert!(!second.published());
}

#[rstest]
#[tokio::test]
async fn update_keeps_owner_instrument_and_publication(harness: Harness) {
    let owner = teacher(Some("piano"));
    let lesson = harness
        .gate
        .create(&owner, &text_form())
        .await
        .expect("created");
    harness
        .gate
        .toggle_publish(&owner, &lesson.id())
        .await
        .expect("publish");

    let updated = harness
        .gate
        .update(
            &owner,
            &lesson.id(),
            &LessonForm {
                title: "Arpeggios".to_owned(),
                ..text_form()
            },
        )
        .await
        .expect("updated");

    assert_eq!(updated.title(), "Arpeggios");
    assert!(updated.published());
    assert_eq!(updated.instrument(), lesson.instrument());
}

#[rstest]
#[tokio::test]
async fn delete_checks_ownership(harness: Harness) {
    let owner = teacher(Some("piano"));
    let lesson = harness
        .gate
        .create(&owner, &text_form())
        .await
        .expect("created");

    let err = harness
        .gate
        .delete(&teacher(Some("piano")), &lesson.id())
        .await
        .expect_err("foreign");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert!(harness.lessons.get(&lesson.id()).is_some());

    harness
        .gate
        .delete(&owner, &lesson.id())
        .await
        .expect("deleted");
    assert!(harness.lessons.get(&lesson.id()).is_none());
}

#[rstest]
#[tokio::test]
async fn get_owned_hides_foreign_lessons(harness: Harness) {
    let owner = teacher(Some("piano"));
    let lesson = harness
        .gate
        .create(&owner, &text_form())
        .await
        .expect("created");

    let err = harness
        .gate
        .get_owned(&teacher(Some("piano")), &lesson.id())
        .await
        .expect_err("hidden");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn upload_stores_under_owner_namespace_and_records_url(harness: Harness) {
    let owner = teacher(Some("piano"));
    let lesson = harness
        .gate
        .create(&owner, &pdf_form())
        .await
        .expect("created");

    let updated = harness
        .gate
        .upload_content_asset(
            &owner,
            &lesson.id(),
            AssetUpload {
                file_name: "../../etc/passwd.PDF".to_owned(),
                bytes: b"%PDF-1.7".to_vec(),
            },
        )
        .await
        .expect("uploaded");

    let LessonContent::Asset { kind, url, path } = updated.content() else {
        panic!("expected asset content");
    };
    let path = path.as_deref().expect("path recorded");
    assert_eq!(*kind, AssetKind::Pdf);
    assert!(path.starts_with(&format!("{}/", owner.id())));
    assert!(path.ends_with(".pdf"));
    assert!(!path.contains("passwd"));
    assert_eq!(
        url.as_deref(),
        Some(format!("https://cdn.example.com/lessons/{path}").as_str())
    );
    assert_eq!(harness.blobs.paths(), vec![path.to_owned()]);
}

#[rstest]
#[tokio::test]
async fn upload_to_text_lesson_is_refused_before_storing(harness: Harness) {
    let owner = teacher(Some("piano"));
    let lesson = harness
        .gate
        .create(&owner, &text_form())
        .await
        .expect("created");

    let err = harness
        .gate
        .upload_content_asset(
            &owner,
            &lesson.id(),
            AssetUpload {
                file_name: "notes.pdf".to_owned(),
                bytes: vec![1, 2, 3],
            },
        )
        .await
        .expect_err("text lesson");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(harness.blobs.paths().is_empty());
}

#[rstest]
#[case("sheet.PDF", "pdf")]
#[case("clip.final.mp4", "mp4")]
#[case("README", "bin")]
#[case("weird.p d f", "bin")]
#[case("long.extension123", "bin")]
#[case("trailing.", "bin")]
fn extensions_are_sanitised(#[case] file_name: &str, #[case] expected: &str) {
    assert_eq!(extension_of(file_name), expected);
}

#[tokio::test]
async fn lost_ownership_race_is_forbidden() {
    let owner = teacher(Some("piano"));
    let lesson = Lesson::create(
        *owner.id(),
        Instrument::new("piano").expect("instrument"),
        LessonDraft::try_from_form(&text_form()).expect("draft"),
        Utc::now(),
    );
    let stored = lesson.clone();
    let mut repo = MockLessonRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_update_owned().times(1).return_once(|_| Ok(false));
    let gate = LessonAuthoringGate::new(
        Arc::new(repo),
        Arc::new(InMemoryBlobStore::new("https://cdn.example.com")),
        Arc::new(FixtureClock),
    );

    let err = gate
        .toggle_publish(&owner, &lesson.id())
        .await
        .expect_err("race lost");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}
