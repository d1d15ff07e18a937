//! Session cookie access for HTTP handlers.
//!
//! The cookie holds only the identity provider's access token. It is a lookup
//! key, not a credential the server trusts: every request re-validates it via
//! [`crate::domain::SessionResolver`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{AccessToken, Error};

pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";

/// Newtype wrapper exposing token-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the access token issued at sign-in.
    ///
    /// The session id is renewed first so a pre-login cookie cannot be
    /// reused.
    pub fn persist_token(&self, token: &AccessToken) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(ACCESS_TOKEN_KEY, token.expose())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Access token from the cookie, if any.
    ///
    /// An unreadable cookie is treated as anonymous.
    pub fn access_token(&self) -> Option<AccessToken> {
        match self.0.get::<String>(ACCESS_TOKEN_KEY) {
            Ok(raw) => raw.and_then(AccessToken::new),
            Err(error) => {
                warn!(%error, "unreadable session cookie; treating as anonymous");
                None
            }
        }
    }

    /// Drop everything stored in the session.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    async fn set_token(session: SessionContext) -> Result<HttpResponse, Error> {
        let token = AccessToken::new("tok-123").ok_or_else(|| Error::internal("token"))?;
        session.persist_token(&token)?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn read_token(session: SessionContext) -> HttpResponse {
        let token = session.access_token();
        HttpResponse::Ok().body(token.map(|t| t.expose().to_owned()).unwrap_or_default())
    }

    async fn clear(session: SessionContext) -> HttpResponse {
        session.clear();
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn round_trips_the_access_token() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/set", web::get().to(set_token))
                .route("/get", web::get().to(read_token)),
        )
        .await;

        let set = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set.status(), StatusCode::OK);
        let cookie = session_cookie(&set).expect("session cookie set");

        let body = test::call_and_read_body(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(body.as_ref(), b"tok-123");
    }

    #[actix_web::test]
    async fn missing_cookie_is_anonymous() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/get", web::get().to(read_token)),
        )
        .await;

        let body =
            test::call_and_read_body(&app, test::TestRequest::get().uri("/get").to_request())
                .await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn blank_tokens_are_ignored() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set-blank",
                    web::get().to(|session: actix_session::Session| async move {
                        session
                            .insert(ACCESS_TOKEN_KEY, "   ")
                            .expect("insert blank token");
                        HttpResponse::Ok().finish()
                    }),
                )
                .route("/get", web::get().to(read_token)),
        )
        .await;

        let set = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-blank").to_request(),
        )
        .await;
        let cookie = session_cookie(&set).expect("session cookie set");
        let body = test::call_and_read_body(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn clearing_expires_the_cookie() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/set", web::get().to(set_token))
                .route("/clear", web::get().to(clear)),
        )
        .await;
        let set = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set).expect("session cookie set");

        let cleared = test::call_service(
            &app,
            test::TestRequest::get().uri("/clear").cookie(cookie).to_request(),
        )
        .await;

        let removal = session_cookie(&cleared).expect("removal cookie");
        assert_eq!(removal.value(), "");
    }
}
