//! Account and onboarding endpoints.
//!
//! ```text
//! POST /auth/login {"email":"ada@example.com","password":"secret"}
//! POST /auth/signup {"email":"ada@example.com","password":"secret","fullName":"Ada"}
//! POST /auth/logout
//! POST /auth/choose-role {"role":"student"}
//! POST /auth/reset-password {"email":"ada@example.com"}
//! POST /auth/update-password {"password":"secret","confirmPassword":"secret"}
//! POST /auth/resend-confirmation {"email":"ada@example.com"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::account::PASSWORD_MISMATCH;
use crate::domain::{
    AuthValidationError, CHOOSE_ROLE_PATH, EmailAddress, Error, LoginCredentials, NewPassword,
    Registration, Role, SelectableRole,
};

use super::schemas::ErrorSchema;
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::{
    FieldErrorCode, FieldName, auth_validation_error, field_error, field_error_with_value,
};
use super::{ApiResult, see_other};

/// Landing page after sign-out.
pub const HOME_PATH: &str = "/";

/// Sign-in form.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sign-up form.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

/// Onboarding role choice.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChooseRoleRequest {
    #[schema(example = "student")]
    pub role: String,
}

/// Email-only form used for reset and confirmation requests.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub email: String,
}

/// New password with confirmation.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

/// User-facing outcome message.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn ok(message: &str) -> HttpResponse {
        HttpResponse::Ok().json(Self {
            message: message.to_owned(),
        })
    }
}

fn parse_email(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(|err| auth_validation_error(&err.into()))
}

/// Sign in and redirect to the caller's dashboard.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Signed in; redirect to the role dashboard",
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Identity provider unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)
        .map_err(|err| auth_validation_error(&err))?;
    let auth = state.account.login(&credentials).await?;
    let target = state.gate.dashboard_for(Some(&auth.identity)).await?;
    session.persist_token(&auth.access_token)?;
    Ok(see_other(target))
}

/// Register an account pending email confirmation.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Confirmation email sent", body = MessageResponse),
        (status = 400, description = "Invalid form", body = ErrorSchema),
        (status = 503, description = "Identity provider unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let SignupRequest {
        email,
        password,
        full_name,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&email, &password, &full_name)
        .map_err(|err| auth_validation_error(&err))?;
    let message = state.account.signup(&registration).await?;
    Ok(MessageResponse::ok(message))
}

/// Revoke the session and return home.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 303, description = "Signed out; redirect home")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    state.account.logout(session.access_token().as_ref()).await;
    session.clear();
    see_other(HOME_PATH)
}

/// Record the onboarding role and redirect to its dashboard.
#[utoipa::path(
    post,
    path = "/auth/choose-role",
    request_body = ChooseRoleRequest,
    responses(
        (status = 303, description = "Role saved; redirect to its dashboard"),
        (status = 400, description = "Role not selectable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "chooseRole"
)]
#[post("/auth/choose-role")]
pub async fn choose_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ChooseRoleRequest>,
) -> ApiResult<HttpResponse> {
    let identity = state
        .identity(&session)
        .await
        .ok_or_else(|| Error::unauthorized("sign in required"))?;
    let raw = payload.into_inner().role;
    let role = SelectableRole::parse(&raw).map_err(|err| {
        field_error_with_value(
            FieldName::new("role"),
            FieldErrorCode::InvalidRole,
            err.to_string(),
            &raw,
        )
    })?;
    let profile = state.gate.choose_role(&identity, role).await?;
    let target = profile
        .role()
        .map_or(CHOOSE_ROLE_PATH, Role::dashboard_path);
    Ok(see_other(target))
}

/// Email a password-reset link.
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Reset email sent if the address is registered", body = MessageResponse),
        (status = 400, description = "Invalid email", body = ErrorSchema),
        (status = 503, description = "Identity provider unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/auth/reset-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<EmailRequest>,
) -> ApiResult<HttpResponse> {
    let email = parse_email(&payload.email)?;
    let message = state.account.send_password_reset(&email).await?;
    Ok(MessageResponse::ok(message))
}

/// Set a new password for the signed-in account.
#[utoipa::path(
    post,
    path = "/auth/update-password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 303, description = "Not signed in; redirect to login"),
        (status = 400, description = "Passwords differ or too short", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "updatePassword"
)]
#[post("/auth/update-password")]
pub async fn update_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdatePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let token = session
        .access_token()
        .ok_or_else(|| Error::unauthorized("sign in required"))?;
    let UpdatePasswordRequest {
        password,
        confirm_password,
    } = payload.into_inner();
    let password = NewPassword::confirmed(&password, &confirm_password).map_err(|err| match err {
        AuthValidationError::PasswordMismatch => field_error(
            FieldName::new("confirmPassword"),
            FieldErrorCode::PasswordMismatch,
            PASSWORD_MISMATCH,
        ),
        other => auth_validation_error(&other),
    })?;
    let message = state.account.update_password(&token, &password).await?;
    Ok(MessageResponse::ok(message))
}

/// Resend the sign-up confirmation email.
#[utoipa::path(
    post,
    path = "/auth/resend-confirmation",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Confirmation resent if pending", body = MessageResponse),
        (status = 400, description = "Invalid email", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "resendConfirmation",
    security([])
)]
#[post("/auth/resend-confirmation")]
pub async fn resend_confirmation(
    state: web::Data<HttpState>,
    payload: web::Json<EmailRequest>,
) -> ApiResult<HttpResponse> {
    let email = parse_email(&payload.email)?;
    let message = state.account.resend_confirmation(&email).await?;
    Ok(MessageResponse::ok(message))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
