//! Ownership-checked lesson authoring.
//!
//! Every mutation re-reads the lesson and compares its `teacher_id` with the
//! acting teacher before writing; repository writes are additionally filtered
//! on `teacher_id`, so a lesson changing hands between the read and the write
//! is refused rather than overwritten.

use std::sync::Arc;

use mockable::Clock;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use super::ports::{BlobStore, LessonRepository};
use super::service_support::{map_blob_error, map_lesson_error};
use super::{
    Error, Lesson, LessonContent, LessonDraft, LessonForm, LessonId, LessonValidationError,
    Profile, UserId,
};

const FALLBACK_EXTENSION: &str = "bin";
const EXTENSION_MAX: usize = 8;

/// File received for an asset-backed lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUpload {
    /// Name supplied by the client; only its extension is kept.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Blob path for an upload: `{owner}/{uuid}.{ext}`.
///
/// The client's file name never becomes part of the path beyond a sanitised
/// extension, so uploads cannot collide or overwrite each other.
///
/// # Examples
/// ```
/// use cadence::domain::{UserId, asset_path};
///
/// let owner = UserId::random();
/// let path = asset_path(&owner, "Scales (final).PDF");
/// assert!(path.starts_with(&format!("{owner}/")));
/// assert!(path.ends_with(".pdf"));
/// ```
#[must_use]
pub fn asset_path(owner: &UserId, file_name: &str) -> String {
    format!("{owner}/{}.{}", Uuid::new_v4(), extension_of(file_name))
}

fn extension_of(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= EXTENSION_MAX
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_owned())
}

/// Map a form validation failure to an `invalid_request` that names the
/// field and echoes the submitted values for re-rendering.
#[must_use]
pub fn lesson_validation_error(err: &LessonValidationError, form: &LessonForm) -> Error {
    let values = serde_json::to_value(form).unwrap_or(Value::Null);
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": err.field(),
        "code": err.code(),
        "values": values,
    }))
}

/// Lesson creation and ownership-checked mutation.
#[derive(Clone)]
pub struct LessonAuthoringGate {
    lessons: Arc<dyn LessonRepository>,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
}

impl LessonAuthoringGate {
    /// Create the gate over the lesson store and blob store.
    pub fn new(
        lessons: Arc<dyn LessonRepository>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            lessons,
            blobs,
            clock,
        }
    }

    /// Create an unpublished lesson owned by `teacher`.
    ///
    /// The instrument comes from the teacher's profile, never from the form.
    pub async fn create(&self, teacher: &Profile, form: &LessonForm) -> Result<Lesson, Error> {
        let instrument = teacher.instrument().cloned().ok_or_else(|| {
            lesson_validation_error(&LessonValidationError::MissingInstrument, form)
        })?;
        let draft =
            LessonDraft::try_from_form(form).map_err(|err| lesson_validation_error(&err, form))?;
        let lesson = Lesson::create(*teacher.id(), instrument, draft, self.clock.utc());
        self.lessons
            .insert(&lesson)
            .await
            .map_err(map_lesson_error)?;
        info!(teacher_id = %teacher.id(), lesson_id = %lesson.id(), "lesson created");
        Ok(lesson)
    }

    /// Apply edited form values to an owned lesson.
    pub async fn update(
        &self,
        teacher: &Profile,
        lesson_id: &LessonId,
        form: &LessonForm,
    ) -> Result<Lesson, Error> {
        let draft =
            LessonDraft::try_from_form(form).map_err(|err| lesson_validation_error(&err, form))?;
        let lesson = self.owned(teacher, lesson_id, "edit").await?;
        let revised = lesson.revise(draft, self.clock.utc());
        self.write_owned(&revised).await?;
        info!(teacher_id = %teacher.id(), lesson_id = %revised.id(), "lesson updated");
        Ok(revised)
    }

    /// Flip the publication flag of an owned lesson.
    pub async fn toggle_publish(
        &self,
        teacher: &Profile,
        lesson_id: &LessonId,
    ) -> Result<Lesson, Error> {
        let lesson = self.owned(teacher, lesson_id, "publish").await?;
        let published = !lesson.published();
        let toggled = lesson.with_published(published, self.clock.utc());
        self.write_owned(&toggled).await?;
        info!(
            teacher_id = %teacher.id(),
            lesson_id = %toggled.id(),
            published,
            "lesson publication toggled"
        );
        Ok(toggled)
    }

    /// Delete an owned lesson.
    pub async fn delete(&self, teacher: &Profile, lesson_id: &LessonId) -> Result<(), Error> {
        let lesson = self.owned(teacher, lesson_id, "delete").await?;
        let deleted = self
            .lessons
            .delete_owned(&lesson.id(), teacher.id())
            .await
            .map_err(map_lesson_error)?;
        if !deleted {
            return Err(Error::not_found("lesson not found"));
        }
        info!(teacher_id = %teacher.id(), lesson_id = %lesson.id(), "lesson deleted");
        Ok(())
    }

    /// Load an owned lesson for the edit form.
    ///
    /// Lessons owned by someone else are reported as missing.
    pub async fn get_owned(&self, teacher: &Profile, lesson_id: &LessonId) -> Result<Lesson, Error> {
        self.find(lesson_id)
            .await?
            .filter(|lesson| lesson.is_owned_by(teacher.id()))
            .ok_or_else(|| Error::not_found("lesson not found"))
    }

    /// Store an asset for an owned asset-backed lesson and record its URL.
    ///
    /// If recording the URL fails after the upload succeeded, the blob stays
    /// behind unreferenced.
    pub async fn upload_content_asset(
        &self,
        teacher: &Profile,
        lesson_id: &LessonId,
        upload: AssetUpload,
    ) -> Result<Lesson, Error> {
        let lesson = self.owned(teacher, lesson_id, "upload to").await?;
        if matches!(lesson.content(), LessonContent::Text { .. }) {
            return Err(Error::invalid_request(
                LessonValidationError::AssetOnTextLesson.to_string(),
            )
            .with_details(json!({
                "field": LessonValidationError::AssetOnTextLesson.field(),
                "code": LessonValidationError::AssetOnTextLesson.code(),
            })));
        }
        if upload.bytes.is_empty() {
            return Err(Error::invalid_request("file is required").with_details(json!({
                "field": "file",
                "code": "missing_field",
            })));
        }

        let path = asset_path(teacher.id(), &upload.file_name);
        let size = upload.bytes.len();
        self.blobs
            .upload(&path, upload.bytes)
            .await
            .map_err(map_blob_error)?;
        let url = self.blobs.public_url(&path);

        let updated = lesson
            .with_asset(url, path.clone(), self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if let Err(err) = self.write_owned(&updated).await {
            warn!(%path, "lesson update failed after upload; blob left unreferenced");
            return Err(err);
        }
        info!(
            teacher_id = %teacher.id(),
            lesson_id = %updated.id(),
            %path,
            size,
            "lesson asset uploaded"
        );
        Ok(updated)
    }

    async fn find(&self, lesson_id: &LessonId) -> Result<Option<Lesson>, Error> {
        self.lessons
            .find_by_id(lesson_id)
            .await
            .map_err(map_lesson_error)
    }

    async fn owned(
        &self,
        teacher: &Profile,
        lesson_id: &LessonId,
        action: &str,
    ) -> Result<Lesson, Error> {
        let lesson = self
            .find(lesson_id)
            .await?
            .ok_or_else(|| Error::not_found("lesson not found"))?;
        if lesson.is_owned_by(teacher.id()) {
            Ok(lesson)
        } else {
            warn!(
                teacher_id = %teacher.id(),
                %lesson_id,
                owner = %lesson.teacher_id(),
                "lesson ownership check failed"
            );
            Err(Error::forbidden(format!(
                "you do not have permission to {action} this lesson"
            )))
        }
    }

    async fn write_owned(&self, lesson: &Lesson) -> Result<(), Error> {
        let updated = self
            .lessons
            .update_owned(lesson)
            .await
            .map_err(map_lesson_error)?;
        if updated {
            Ok(())
        } else {
            Err(Error::forbidden(
                "lesson changed owner or was removed during the update",
            ))
        }
    }
}

#[cfg(test)]
#[path = "authoring_tests.rs"]
mod tests;
