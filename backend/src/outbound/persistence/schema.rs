//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// One row per identity, provisioned on first role selection.
    profiles (id) {
        /// Identity id issued by the identity provider.
        id -> Uuid,
        /// Email mirrored from the identity provider.
        email -> Nullable<Text>,
        /// `student`, `teacher`, `parent`, or `admin`; NULL until chosen.
        role -> Nullable<Text>,
        /// Instrument for students and teachers.
        instrument -> Nullable<Text>,
        /// Display name; empty when never provided.
        full_name -> Text,
        /// Avatar image URL.
        avatar_url -> Nullable<Text>,
        /// Provisioning timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Lessons authored by teachers.
    lessons (id) {
        /// Primary key.
        id -> Uuid,
        /// Owning teacher's profile id.
        teacher_id -> Uuid,
        /// Title.
        title -> Text,
        /// Description.
        description -> Text,
        /// Instrument inherited from the teacher at creation.
        instrument -> Text,
        /// Position within the instrument's sequence.
        order_index -> Int4,
        /// Visible to students when true.
        published -> Bool,
        /// `text`, `pdf`, `video`, or `docx`.
        content_type -> Text,
        /// Body of a text lesson.
        content_body -> Nullable<Text>,
        /// Public URL of an asset lesson.
        content_url -> Nullable<Text>,
        /// Blob path of an uploaded asset.
        content_path -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-student progress, unique on `(user_id, lesson_id)`.
    lesson_progress (user_id, lesson_id) {
        /// Student profile id.
        user_id -> Uuid,
        /// Lesson id.
        lesson_id -> Uuid,
        /// `not_started`, `in_progress`, or `completed`.
        status -> Text,
        /// Last time the student opened or annotated the lesson.
        last_viewed_at -> Nullable<Timestamptz>,
        /// Student note.
        notes -> Nullable<Text>,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(lesson_progress -> lessons (lesson_id));
diesel::allow_tables_to_appear_in_same_query!(lesson_progress, lessons, profiles);
