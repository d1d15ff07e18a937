//! Admin user directory.
//!
//! ```text
//! GET /dashboard/admin/users?page=2&search=ada&sortBy=email&sortDir=asc
//! ```

use std::str::FromStr;

use actix_web::{HttpRequest, get, web};
use pagination::{Page, PageLinks};
use serde::{Deserialize, Serialize};

use crate::domain::{DashboardArea, DirectoryQuery, Error, Profile, SortField, UnsupportedSort};

use super::ApiResult;
use super::schemas::{ErrorSchema, ProfilePageSchema};
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::{FieldErrorCode, FieldName, field_error_with_value};

/// Raw directory query string.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct DirectoryParams {
    /// One-based page; anything unparsable falls back to 1.
    pub page: Option<String>,
    /// Case-insensitive match on email or full name.
    pub search: Option<String>,
    /// `created_at`, `email`, `full_name`, or `role`.
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    pub sort_dir: Option<String>,
}

/// One directory page with navigation links.
#[derive(Debug, Serialize)]
pub struct DirectoryPage {
    #[serde(flatten)]
    pub page: Page<Profile>,
    pub links: PageLinks,
}

fn sort_error(params: &DirectoryParams, err: &UnsupportedSort) -> Error {
    let sort_by_valid = params
        .sort_by
        .as_deref()
        .is_none_or(|raw| SortField::from_str(raw).is_ok());
    let field = if sort_by_valid {
        FieldName::new("sortDir")
    } else {
        FieldName::new("sortBy")
    };
    field_error_with_value(field, FieldErrorCode::InvalidSort, err.to_string(), &err.0)
}

/// Search, sort, and page through every profile.
#[utoipa::path(
    get,
    path = "/dashboard/admin/users",
    params(DirectoryParams),
    responses(
        (status = 200, description = "Directory page", body = ProfilePageSchema),
        (status = 303, description = "Not an administrator; redirected"),
        (status = 400, description = "Unsupported sort column or direction", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/dashboard/admin/users")]
pub async fn users(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    params: web::Query<DirectoryParams>,
) -> ApiResult<web::Json<DirectoryPage>> {
    state.require_area(&session, DashboardArea::Admin).await?;
    let query = DirectoryQuery::from_params(
        params.page.as_deref(),
        params.search.as_deref(),
        params.sort_by.as_deref(),
        params.sort_dir.as_deref(),
    )
    .map_err(|err| sort_error(&params, &err))?;
    let page = state.directory.list(&query).await?;
    let links = page.links(&req.full_url());
    Ok(web::Json(DirectoryPage { page, links }))
}
