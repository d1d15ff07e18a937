//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::Utc;
use mockable::DefaultClock;
use serde_json::{Value, json};

use super::state::{HttpState, HttpStatePorts};
use crate::Trace;
use crate::domain::ports::IdentityProvider;
use crate::domain::{
    EmailAddress, Identity, Instrument, LoginCredentials, Profile, ProfileDraft, Registration,
    Role,
};
use crate::outbound::memory::{
    InMemoryBlobStore, InMemoryIdentityProvider, InMemoryLessonRepository,
    InMemoryProfileRepository, InMemoryProgressRepository,
};

/// Password shared by every test account.
pub const PASSWORD: &str = "correct-horse";

/// Session middleware with a fresh key, the `session` cookie name, and the
/// `Secure` flag off for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by a response, if any.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// `Location` header of a redirect.
pub fn location<B>(response: &ServiceResponse<B>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// In-memory adapters behind one [`HttpState`].
pub struct TestWorld {
    pub identity: Arc<InMemoryIdentityProvider>,
    pub profiles: Arc<InMemoryProfileRepository>,
    pub lessons: Arc<InMemoryLessonRepository>,
    pub progress: Arc<InMemoryProgressRepository>,
    pub blobs: Arc<InMemoryBlobStore>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self {
            identity: Arc::new(InMemoryIdentityProvider::default()),
            profiles: Arc::new(InMemoryProfileRepository::default()),
            lessons: Arc::new(InMemoryLessonRepository::default()),
            progress: Arc::new(InMemoryProgressRepository::default()),
            blobs: Arc::new(InMemoryBlobStore::new("https://cdn.example.com/lessons")),
        }
    }
}

impl TestWorld {
    /// Ports over this world's adapters, for tests that swap one out.
    pub fn ports(&self) -> HttpStatePorts {
        HttpStatePorts {
            identity: self.identity.clone(),
            profiles: self.profiles.clone(),
            lessons: self.lessons.clone(),
            progress: self.progress.clone(),
            blobs: self.blobs.clone(),
            clock: Arc::new(DefaultClock),
        }
    }

    pub fn state(&self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(self.ports()))
    }

    /// Register an account with [`PASSWORD`].
    ///
    /// A profile is seeded only when a role or instrument is given, so
    /// `account(email, None, None)` models a user who never onboarded.
    pub async fn account(
        &self,
        email: &str,
        role: Option<Role>,
        instrument: Option<&str>,
    ) -> Identity {
        let name = email.split('@').next().unwrap_or(email);
        let registration =
            Registration::try_from_parts(email, PASSWORD, name).expect("valid registration");
        self.identity
            .sign_up(&registration)
            .await
            .expect("sign-up accepted");
        let credentials = LoginCredentials::try_from_parts(email, PASSWORD).expect("credentials");
        let identity = self
            .identity
            .sign_in(&credentials)
            .await
            .expect("sign-in")
            .identity;
        if role.is_some() || instrument.is_some() {
            self.profiles.seed(Profile::new(ProfileDraft {
                id: *identity.id(),
                email: Some(EmailAddress::new(email).expect("email")),
                role,
                instrument: instrument.map(|name| Instrument::new(name).expect("instrument")),
                full_name: name.to_owned(),
                avatar_url: None,
                created_at: Utc::now(),
            }));
        }
        identity
    }
}

/// Initialise the full route table over `world`.
pub async fn init_app(
    world: &TestWorld,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(world.state())
            .wrap(test_session_middleware())
            .wrap(Trace)
            .configure(super::configure),
    )
    .await
}

/// Sign in through `POST /auth/login` and return the session cookie.
pub async fn sign_in<S>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": email, "password": PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER, "login redirects");
    session_cookie(&res).expect("login sets the session cookie")
}

/// Status, `Location`, and JSON body (or `Null`) of a response.
pub async fn send<S>(app: &S, req: Request) -> (StatusCode, Option<String>, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let redirect = location(&res);
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, redirect, body)
}
