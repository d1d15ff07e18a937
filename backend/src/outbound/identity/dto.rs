//! Wire shapes exchanged with the identity provider.

use serde::{Deserialize, Serialize};

use crate::domain::{EmailAddress, Identity, UserId};

/// User object returned by `/user` and embedded in token responses.
#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    pub id: String,
    pub email: Option<String>,
}

impl UserDto {
    pub(super) fn into_identity(self) -> Result<Identity, String> {
        let id = UserId::new(&self.id).map_err(|err| format!("user id: {err}"))?;
        let email = self
            .email
            .ok_or_else(|| "user without email".to_owned())
            .and_then(|raw| EmailAddress::new(raw).map_err(|err| format!("user email: {err}")))?;
        Ok(Identity::new(id, email))
    }
}

/// Password grant response.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub access_token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub(super) struct PasswordGrantDto<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct SignUpMetadataDto<'a> {
    pub full_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct SignUpDto<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: SignUpMetadataDto<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct EmailDto<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ResendDto<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct PasswordDto<'a> {
    pub password: &'a str,
}
