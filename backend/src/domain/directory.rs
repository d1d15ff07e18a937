//! Admin user directory: search, sort, and page through profiles.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use pagination::{Page, PageRequest};
use tracing::debug;

use super::ports::ProfileRepository;
use super::service_support::map_profile_error;
use super::{Error, Profile};

/// Rows shown per directory page.
pub const DIRECTORY_PAGE_SIZE: u32 = 10;

/// Sortable directory columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// Provisioning time.
    #[default]
    CreatedAt,
    /// Contact email.
    Email,
    /// Display name.
    FullName,
    /// Assigned role.
    Role,
}

impl SortField {
    /// Query-string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Email => "email",
            Self::FullName => "full_name",
            Self::Role => "role",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised for unsupported sort parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported sort value: {0}")]
pub struct UnsupportedSort(pub String);

impl FromStr for SortField {
    type Err = UnsupportedSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "email" => Ok(Self::Email),
            "full_name" => Ok(Self::FullName),
            "role" => Ok(Self::Role),
            other => Err(UnsupportedSort(other.to_owned())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortDir {
    /// Query-string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortDir {
    type Err = UnsupportedSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(UnsupportedSort(other.to_owned())),
        }
    }
}

/// Validated directory listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryQuery {
    /// Requested page.
    pub page: PageRequest,
    /// Case-insensitive substring matched against email and full name.
    pub search: Option<String>,
    /// Sort column.
    pub sort: SortField,
    /// Sort direction.
    pub dir: SortDir,
}

impl DirectoryQuery {
    /// Build a query from raw query-string values.
    ///
    /// Page parsing is lenient; unknown sort values are rejected rather than
    /// forwarded to the store.
    pub fn from_params(
        page: Option<&str>,
        search: Option<&str>,
        sort: Option<&str>,
        dir: Option<&str>,
    ) -> Result<Self, UnsupportedSort> {
        let search = search
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        Ok(Self {
            page: PageRequest::from_query(page, DIRECTORY_PAGE_SIZE),
            search,
            sort: sort.map(SortField::from_str).transpose()?.unwrap_or_default(),
            dir: dir.map(SortDir::from_str).transpose()?.unwrap_or_default(),
        })
    }
}

impl Default for DirectoryQuery {
    fn default() -> Self {
        Self {
            page: PageRequest::from_query(None, DIRECTORY_PAGE_SIZE),
            search: None,
            sort: SortField::default(),
            dir: SortDir::default(),
        }
    }
}

/// Read-only listing over every profile, for administrators.
#[derive(Clone)]
pub struct UserDirectory {
    profiles: Arc<dyn ProfileRepository>,
}

impl UserDirectory {
    /// Create a directory over the profile store.
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Fetch one page of profiles.
    ///
    /// Callers must have passed the admin gate.
    pub async fn list(&self, query: &DirectoryQuery) -> Result<Page<Profile>, Error> {
        let (profiles, total) = self
            .profiles
            .list_directory(query)
            .await
            .map_err(map_profile_error)?;
        debug!(
            page = query.page.page(),
            sort = %query.sort,
            total,
            "listed user directory"
        );
        Ok(Page::new(profiles, query.page, total))
    }
}
