//! Lessons, their content, and the authoring form that produces them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Instrument, UserId};

/// Order index assigned when the form value is missing or not a number.
pub const DEFAULT_ORDER_INDEX: i32 = 1;

/// Stable lesson identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(Uuid);

impl LessonId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LessonId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Kind of uploaded asset backing a non-text lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// PDF document.
    Pdf,
    /// Video file.
    Video,
    /// Word document.
    Docx,
}

/// Content type column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Inline text body.
    Text,
    /// Uploaded PDF.
    Pdf,
    /// Uploaded video.
    Video,
    /// Uploaded Word document.
    Docx,
}

impl ContentType {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Video => "video",
            Self::Docx => "docx",
        }
    }

    /// Asset kind for non-text content.
    #[must_use]
    pub const fn asset_kind(self) -> Option<AssetKind> {
        match self {
            Self::Text => None,
            Self::Pdf => Some(AssetKind::Pdf),
            Self::Video => Some(AssetKind::Video),
            Self::Docx => Some(AssetKind::Docx),
        }
    }
}

impl FromStr for ContentType {
    type Err = LessonValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            "video" => Ok(Self::Video),
            "docx" => Ok(Self::Docx),
            other => Err(LessonValidationError::UnknownContentType(other.to_owned())),
        }
    }
}

impl From<AssetKind> for ContentType {
    fn from(value: AssetKind) -> Self {
        match value {
            AssetKind::Pdf => Self::Pdf,
            AssetKind::Video => Self::Video,
            AssetKind::Docx => Self::Docx,
        }
    }
}

/// Lesson body: inline text or a reference to an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LessonContent {
    /// Inline text lesson.
    Text {
        /// Lesson text; never blank.
        body: String,
    },
    /// Asset-backed lesson; the URL is absent until an upload lands.
    Asset {
        /// Asset kind.
        kind: AssetKind,
        /// Public URL of the asset.
        url: Option<String>,
        /// Blob-store path of an uploaded asset.
        path: Option<String>,
    },
}

impl LessonContent {
    /// Content type column value.
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        match self {
            Self::Text { .. } => ContentType::Text,
            Self::Asset { kind, .. } => match kind {
                AssetKind::Pdf => ContentType::Pdf,
                AssetKind::Video => ContentType::Video,
                AssetKind::Docx => ContentType::Docx,
            },
        }
    }
}

/// Validation failures raised while reading a lesson form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LessonValidationError {
    /// Title missing or blank.
    #[error("title is required")]
    EmptyTitle,
    /// Description missing or blank.
    #[error("description is required")]
    EmptyDescription,
    /// Text lesson submitted without a body.
    #[error("content body is required for text lessons")]
    MissingTextBody,
    /// Unrecognised content type.
    #[error("unknown content type: {0}")]
    UnknownContentType(String),
    /// Teacher profile carries no instrument to inherit.
    #[error("set an instrument on your profile before creating lessons")]
    MissingInstrument,
    /// Asset uploaded against a text lesson.
    #[error("text lessons do not accept uploaded assets")]
    AssetOnTextLesson,
}

impl LessonValidationError {
    /// Form field the failure refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "title",
            Self::EmptyDescription => "description",
            Self::MissingTextBody => "content_body",
            Self::UnknownContentType(_) | Self::AssetOnTextLesson => "content_type",
            Self::MissingInstrument => "instrument",
        }
    }

    /// Machine-readable failure code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::EmptyDescription | Self::MissingTextBody => "missing_field",
            Self::UnknownContentType(_) => "invalid_content_type",
            Self::MissingInstrument => "missing_instrument",
            Self::AssetOnTextLesson => "asset_on_text_lesson",
        }
    }
}

/// Raw lesson form values as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonForm {
    /// Lesson title.
    pub title: String,
    /// Lesson description.
    pub description: String,
    /// One of `text`, `pdf`, `video`, `docx`.
    pub content_type: String,
    /// Body for text lessons.
    #[serde(default)]
    pub content_body: Option<String>,
    /// Externally hosted asset URL.
    #[serde(default)]
    pub content_url: Option<String>,
    /// Position in the instrument's sequence, as typed.
    #[serde(default)]
    pub order_index: Option<String>,
}

/// Validated lesson fields shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDraft {
    title: String,
    description: String,
    content: LessonContent,
    order_index: i32,
}

impl LessonDraft {
    /// Validate a submitted form.
    ///
    /// Text lessons keep their body; asset lessons drop any submitted body.
    /// A missing or non-numeric order index falls back to
    /// [`DEFAULT_ORDER_INDEX`].
    ///
    /// # Examples
    /// ```
    /// use cadence::domain::{LessonDraft, LessonForm};
    ///
    /// let draft = LessonDraft::try_from_form(&LessonForm {
    ///     title: "Scales".into(),
    ///     description: "C major".into(),
    ///     content_type: "text".into(),
    ///     content_body: Some("Play slowly".into()),
    ///     content_url: None,
    ///     order_index: Some("abc".into()),
    /// })
    /// .unwrap();
    /// assert_eq!(draft.order_index(), 1);
    /// ```
    pub fn try_from_form(form: &LessonForm) -> Result<Self, LessonValidationError> {
        let title = form.title.trim();
        if title.is_empty() {
            return Err(LessonValidationError::EmptyTitle);
        }
        let description = form.description.trim();
        if description.is_empty() {
            return Err(LessonValidationError::EmptyDescription);
        }
        let content = match form.content_type.parse::<ContentType>()?.asset_kind() {
            None => {
                let body = non_blank(form.content_body.as_deref())
                    .ok_or(LessonValidationError::MissingTextBody)?;
                LessonContent::Text { body }
            }
            Some(kind) => LessonContent::Asset {
                kind,
                url: non_blank(form.content_url.as_deref()),
                path: None,
            },
        };
        let order_index = form
            .order_index
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .unwrap_or(DEFAULT_ORDER_INDEX);

        Ok(Self {
            title: title.to_owned(),
            description: description.to_owned(),
            content,
            order_index,
        })
    }

    /// Validated title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Validated content.
    #[must_use]
    pub const fn content(&self) -> &LessonContent {
        &self.content
    }

    /// Resolved order index.
    #[must_use]
    pub const fn order_index(&self) -> i32 {
        self.order_index
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// All persisted lesson fields.
#[derive(Debug, Clone)]
pub struct LessonParts {
    /// Identifier.
    pub id: LessonId,
    /// Owning teacher.
    pub teacher_id: UserId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Instrument inherited from the owner.
    pub instrument: Instrument,
    /// Position in the instrument's sequence.
    pub order_index: i32,
    /// Student visibility.
    pub published: bool,
    /// Body or asset reference.
    pub content: LessonContent,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Lesson authored by a teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    id: LessonId,
    teacher_id: UserId,
    title: String,
    description: String,
    instrument: Instrument,
    order_index: i32,
    published: bool,
    content: LessonContent,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Lesson {
    /// Rehydrate a lesson from stored parts.
    #[must_use]
    pub fn from_parts(parts: LessonParts) -> Self {
        let LessonParts {
            id,
            teacher_id,
            title,
            description,
            instrument,
            order_index,
            published,
            content,
            created_at,
            updated_at,
        } = parts;
        Self {
            id,
            teacher_id,
            title,
            description,
            instrument,
            order_index,
            published,
            content,
            created_at,
            updated_at,
        }
    }

    /// New unpublished lesson owned by `teacher_id`.
    #[must_use]
    pub fn create(
        teacher_id: UserId,
        instrument: Instrument,
        draft: LessonDraft,
        now: DateTime<Utc>,
    ) -> Self {
        let LessonDraft {
            title,
            description,
            content,
            order_index,
        } = draft;
        Self {
            id: LessonId::random(),
            teacher_id,
            title,
            description,
            instrument,
            order_index,
            published: false,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply edited form values, keeping identity, ownership, instrument, and
    /// publication state.
    ///
    /// An existing upload survives when the asset kind is unchanged and the
    /// form supplies no replacement URL.
    #[must_use]
    pub fn revise(mut self, draft: LessonDraft, now: DateTime<Utc>) -> Self {
        let LessonDraft {
            title,
            description,
            content,
            order_index,
        } = draft;
        self.content = match (self.content, content) {
            (
                LessonContent::Asset {
                    kind: old_kind,
                    url: old_url,
                    path: old_path,
                },
                LessonContent::Asset {
                    kind,
                    url: None,
                    path: _,
                },
            ) if old_kind == kind => LessonContent::Asset {
                kind,
                url: old_url,
                path: old_path,
            },
            (_, content) => content,
        };
        self.title = title;
        self.description = description;
        self.order_index = order_index;
        self.updated_at = now;
        self
    }

    /// Copy with the publication flag set.
    #[must_use]
    pub fn with_published(mut self, published: bool, now: DateTime<Utc>) -> Self {
        self.published = published;
        self.updated_at = now;
        self
    }

    /// Record an uploaded asset.
    pub fn with_asset(
        mut self,
        url: String,
        path: String,
        now: DateTime<Utc>,
    ) -> Result<Self, LessonValidationError> {
        let LessonContent::Asset { kind, .. } = self.content else {
            return Err(LessonValidationError::AssetOnTextLesson);
        };
        self.content = LessonContent::Asset {
            kind,
            url: Some(url),
            path: Some(path),
        };
        self.updated_at = now;
        Ok(self)
    }

    /// Whether `teacher_id` owns this lesson.
    #[must_use]
    pub fn is_owned_by(&self, teacher_id: &UserId) -> bool {
        &self.teacher_id == teacher_id
    }

    /// Whether a student learning `instrument` may see this lesson.
    #[must_use]
    pub fn is_visible_to(&self, instrument: Option<&Instrument>) -> bool {
        self.published && instrument == Some(&self.instrument)
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> LessonId {
        self.id
    }

    /// Owning teacher.
    #[must_use]
    pub const fn teacher_id(&self) -> &UserId {
        &self.teacher_id
    }

    /// Title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Instrument.
    #[must_use]
    pub const fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// Position in the instrument's sequence.
    #[must_use]
    pub const fn order_index(&self) -> i32 {
        self.order_index
    }

    /// Student visibility.
    #[must_use]
    pub const fn published(&self) -> bool {
        self.published
    }

    /// Body or asset reference.
    #[must_use]
    pub const fn content(&self) -> &LessonContent {
        &self.content
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn text_form() -> LessonForm {
        LessonForm {
            title: " Scales ".to_owned(),
            description: "C major, two octaves".to_owned(),
            content_type: "text".to_owned(),
            content_body: Some("Play slowly.".to_owned()),
            content_url: None,
            order_index: Some("3".to_owned()),
        }
    }

    fn instrument() -> Instrument {
        Instrument::new("piano").expect("instrument")
    }

    #[rstest]
    fn text_form_validates(text_form: LessonForm) {
        let draft = LessonDraft::try_from_form(&text_form).expect("valid");
        assert_eq!(draft.title(), "Scales");
        assert_eq!(draft.order_index(), 3);
        assert_eq!(
            draft.content(),
            &LessonContent::Text {
                body: "Play slowly.".to_owned()
            }
        );
    }

    #[rstest]
    #[case::blank_title(LessonForm { title: "  ".into(), ..text_form() }, LessonValidationError::EmptyTitle)]
    #[case::blank_description(LessonForm { description: String::new(), ..text_form() }, LessonValidationError::EmptyDescription)]
    #[case::missing_body(LessonForm { content_body: None, ..text_form() }, LessonValidationError::MissingTextBody)]
    #[case::blank_body(LessonForm { content_body: Some(" ".into()), ..text_form() }, LessonValidationError::MissingTextBody)]
    #[case::unknown_type(LessonForm { content_type: "audio".into(), ..text_form() }, LessonValidationError::UnknownContentType("audio".into()))]
    fn invalid_forms_are_rejected(#[case] form: LessonForm, #[case] expected: LessonValidationError) {
        assert_eq!(LessonDraft::try_from_form(&form), Err(expected));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("not a number"))]
    #[case(Some(""))]
    fn order_index_falls_back_to_default(text_form: LessonForm, #[case] raw: Option<&str>) {
        let form = LessonForm {
            order_index: raw.map(str::to_owned),
            ..text_form
        };
        let draft = LessonDraft::try_from_form(&form).expect("valid");
        assert_eq!(draft.order_index(), DEFAULT_ORDER_INDEX);
    }

    #[rstest]
    fn asset_forms_drop_text_body(text_form: LessonForm) {
        let form = LessonForm {
            content_type: "pdf".to_owned(),
            ..text_form
        };
        let draft = LessonDraft::try_from_form(&form).expect("valid");
        assert_eq!(
            draft.content(),
            &LessonContent::Asset {
                kind: AssetKind::Pdf,
                url: None,
                path: None
            }
        );
    }

    #[rstest]
    fn created_lessons_start_unpublished(text_form: LessonForm) {
        let draft = LessonDraft::try_from_form(&text_form).expect("valid");
        let owner = UserId::random();
        let lesson = Lesson::create(owner, instrument(), draft, Utc::now());
        assert!(!lesson.published());
        assert!(lesson.is_owned_by(&owner));
    }

    #[rstest]
    fn revise_keeps_uploaded_asset_when_kind_is_unchanged(text_form: LessonForm) {
        let now = Utc::now();
        let pdf_form = LessonForm {
            content_type: "pdf".to_owned(),
            ..text_form
        };
        let lesson = Lesson::create(
            UserId::random(),
            instrument(),
            LessonDraft::try_from_form(&pdf_form).expect("valid"),
            now,
        )
        .with_asset("https://cdn/x.pdf".to_owned(), "u/x.pdf".to_owned(), now)
        .expect("asset lesson");

        let revised = lesson.revise(
            LessonDraft::try_from_form(&LessonForm {
                title: "Renamed".to_owned(),
                ..pdf_form
            })
            .expect("valid"),
            now,
        );

        assert_eq!(revised.title(), "Renamed");
        assert_eq!(
            revised.content(),
            &LessonContent::Asset {
                kind: AssetKind::Pdf,
                url: Some("https://cdn/x.pdf".to_owned()),
                path: Some("u/x.pdf".to_owned()),
            }
        );
    }

    #[rstest]
    fn text_lessons_reject_assets(text_form: LessonForm) {
        let now = Utc::now();
        let lesson = Lesson::create(
            UserId::random(),
            instrument(),
            LessonDraft::try_from_form(&text_form).expect("valid"),
            now,
        );
        assert_eq!(
            lesson.with_asset("u".to_owned(), "p".to_owned(), now),
            Err(LessonValidationError::AssetOnTextLesson)
        );
    }

    #[rstest]
    fn visibility_requires_publication_and_matching_instrument(text_form: LessonForm) {
        let now = Utc::now();
        let lesson = Lesson::create(
            UserId::random(),
            instrument(),
            LessonDraft::try_from_form(&text_form).expect("valid"),
            now,
        );
        let piano = instrument();
        let guitar = Instrument::new("guitar").expect("instrument");

        assert!(!lesson.is_visible_to(Some(&piano)));
        let published = lesson.with_published(true, now);
        assert!(published.is_visible_to(Some(&piano)));
        assert!(!published.is_visible_to(Some(&guitar)));
        assert!(!published.is_visible_to(None));
    }
}
