//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversion into domain types happens in the
//! repositories, where malformed rows surface as `Corrupt` errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{lesson_progress, lessons, profiles};

/// Row struct for reading from the profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
    pub instrument: Option<String>,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct used by the role-selection upsert.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub role: &'a str,
}

/// Row struct for reading from the lessons table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lessons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LessonRow {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub title: String,
    pub description: String,
    pub instrument: String,
    pub order_index: i32,
    pub published: bool,
    pub content_type: String,
    pub content_body: Option<String>,
    pub content_url: Option<String>,
    pub content_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new lessons.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = lessons)]
pub(crate) struct NewLessonRow<'a> {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub instrument: &'a str,
    pub order_index: i32,
    pub published: bool,
    pub content_type: &'a str,
    pub content_body: Option<&'a str>,
    pub content_url: Option<&'a str>,
    pub content_path: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset overwriting every mutable lesson column.
///
/// `treat_none_as_null` clears asset columns when a lesson switches to text.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = lessons)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct LessonUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub order_index: i32,
    pub published: bool,
    pub content_type: &'a str,
    pub content_body: Option<&'a str>,
    pub content_url: Option<&'a str>,
    pub content_path: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the lesson_progress table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lesson_progress)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProgressRow {
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub status: String,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Insertable struct for the first write of a progress record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = lesson_progress)]
pub(crate) struct NewProgressRow<'a> {
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub status: &'a str,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub notes: Option<&'a str>,
}

/// Partial changeset for progress records.
///
/// Outer `None` leaves the column untouched; `Some(None)` writes NULL.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = lesson_progress)]
pub(crate) struct ProgressUpdate<'a> {
    pub status: Option<&'a str>,
    pub last_viewed_at: Option<Option<DateTime<Utc>>>,
    pub notes: Option<Option<&'a str>>,
}
