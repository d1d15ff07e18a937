//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data`; it holds only domain services, so
//! handlers stay testable against the in-memory adapters.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    BlobStore, IdentityProvider, LessonRepository, ProfileRepository, ProgressRepository,
};
use crate::domain::{
    AccountService, DashboardArea, Error, Identity, LessonAuthoringGate, LessonCatalog, Profile,
    ProfileGate, ProgressTracker, SessionResolver, UserDirectory,
};

use super::session::SessionContext;

/// Driven ports the HTTP services are built from.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub lessons: Arc<dyn LessonRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub blobs: Arc<dyn BlobStore>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub resolver: SessionResolver,
    pub gate: ProfileGate,
    pub catalog: LessonCatalog,
    pub tracker: ProgressTracker,
    pub authoring: LessonAuthoringGate,
    pub directory: UserDirectory,
    pub account: AccountService,
}

impl HttpState {
    /// Wire every service over `ports`.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            identity,
            profiles,
            lessons,
            progress,
            blobs,
            clock,
        } = ports;
        Self {
            resolver: SessionResolver::new(identity.clone()),
            gate: ProfileGate::new(profiles.clone()),
            catalog: LessonCatalog::new(lessons.clone()),
            tracker: ProgressTracker::new(
                lessons.clone(),
                progress,
                profiles.clone(),
                clock.clone(),
            ),
            authoring: LessonAuthoringGate::new(lessons, blobs, clock),
            directory: UserDirectory::new(profiles),
            account: AccountService::new(identity),
        }
    }

    /// Identity behind the session cookie, validated with the provider.
    pub async fn identity(&self, session: &SessionContext) -> Option<Identity> {
        self.resolver.resolve(session.access_token().as_ref()).await
    }

    /// Resolve the caller and admit them to `area`.
    pub async fn require_area(
        &self,
        session: &SessionContext,
        area: DashboardArea,
    ) -> Result<Profile, Error> {
        let identity = self.identity(session).await;
        self.gate.require_area(identity.as_ref(), area).await
    }

    /// Resolve the caller and require any assigned role.
    pub async fn require_any_role(&self, session: &SessionContext) -> Result<Profile, Error> {
        let identity = self.identity(session).await;
        self.gate.require_any_role(identity.as_ref()).await
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
