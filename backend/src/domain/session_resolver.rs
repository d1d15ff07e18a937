//! Resolve the acting identity for a request.
//!
//! The token stored in the session cookie is only a lookup key: every request
//! asks the identity provider who it belongs to, so revoked or forged tokens
//! never yield an identity.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::{IdentityProvider, IdentityProviderError};
use super::{AccessToken, Identity};

/// Server-validated identity lookup.
#[derive(Clone)]
pub struct SessionResolver {
    provider: Arc<dyn IdentityProvider>,
}

impl SessionResolver {
    /// Create a resolver backed by `provider`.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Look up the identity for `token`, keeping provider failures distinct.
    ///
    /// `Ok(None)` covers both "no token" and "token not recognised".
    pub async fn try_resolve(
        &self,
        token: Option<&AccessToken>,
    ) -> Result<Option<Identity>, IdentityProviderError> {
        match token {
            Some(token) => self.provider.current_identity(token).await,
            None => Ok(None),
        }
    }

    /// Look up the identity for `token` for gating purposes.
    ///
    /// Provider failures are logged at `warn` and treated as anonymous;
    /// ordinary anonymous requests are logged at `debug`.
    pub async fn resolve(&self, token: Option<&AccessToken>) -> Option<Identity> {
        match self.try_resolve(token).await {
            Ok(Some(identity)) => Some(identity),
            Ok(None) => {
                debug!(had_token = token.is_some(), "request is anonymous");
                None
            }
            Err(err) => {
                warn!(error = %err, "identity lookup failed; treating request as anonymous");
                None
            }
        }
    }
}
