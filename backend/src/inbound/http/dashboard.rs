//! Role-neutral dashboard pages.
//!
//! ```text
//! GET /dashboard          -> 303 to the caller's role dashboard
//! GET /dashboard/profile
//! GET /dashboard/parent
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Serialize;

use crate::domain::{DashboardArea, Error, Identity, Profile};

use super::schemas::{ErrorSchema, ProfileSchema};
use super::session::SessionContext;
use super::state::HttpState;
use super::{ApiResult, see_other};

/// Account page payload.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[schema(value_type = Object)]
    pub user: Identity,
    /// Absent until the user picks a role.
    #[schema(value_type = Option<ProfileSchema>)]
    pub profile: Option<Profile>,
}

/// Parent dashboard payload.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ParentDashboard {
    #[schema(value_type = ProfileSchema)]
    pub profile: Profile,
}

/// Send the caller to the dashboard for their role.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 303, description = "Redirect to the role dashboard, role selection, or login")
    ),
    tags = ["dashboard"],
    operation_id = "dashboardLanding"
)]
#[get("/dashboard")]
pub async fn landing(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let identity = state.identity(&session).await;
    let target = state.gate.dashboard_for(identity.as_ref()).await?;
    Ok(see_other(target))
}

/// Account details for the signed-in user, with or without a role.
#[utoipa::path(
    get,
    path = "/dashboard/profile",
    responses(
        (status = 200, description = "Account and profile", body = ProfileView),
        (status = 303, description = "Not signed in"),
        (status = 503, description = "Profile store unavailable", body = ErrorSchema)
    ),
    tags = ["dashboard"],
    operation_id = "profilePage"
)]
#[get("/dashboard/profile")]
pub async fn profile_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileView>> {
    let user = state
        .identity(&session)
        .await
        .ok_or_else(|| Error::unauthorized("sign in required"))?;
    let profile = state.gate.load_profile(&user).await?;
    Ok(web::Json(ProfileView { user, profile }))
}

/// Parent landing page.
#[utoipa::path(
    get,
    path = "/dashboard/parent",
    responses(
        (status = 200, description = "Parent dashboard", body = ParentDashboard),
        (status = 303, description = "Not a parent; redirected")
    ),
    tags = ["dashboard"],
    operation_id = "parentDashboard"
)]
#[get("/dashboard/parent")]
pub async fn parent(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ParentDashboard>> {
    let profile = state.require_area(&session, DashboardArea::Parent).await?;
    Ok(web::Json(ParentDashboard { profile }))
}
