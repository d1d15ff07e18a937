//! HTTP inbound adapter: session-authenticated dashboard and auth endpoints.

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod student;
pub mod teacher;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

use actix_web::http::header;
use actix_web::{HttpResponse, web};

use crate::domain::Error;

/// `303 See Other` to a local path.
pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_owned()))
        .finish()
}

/// Register every session-authenticated route.
///
/// Health probes are mounted separately because they need the
/// [`health::HealthState`] owned by the server.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(teacher::MAX_ASSET_BYTES))
        .app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| Error::invalid_request(err.to_string()).into()),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _req| Error::invalid_request(err.to_string()).into()),
        )
        .service(auth::login)
        .service(auth::signup)
        .service(auth::logout)
        .service(auth::choose_role)
        .service(auth::reset_password)
        .service(auth::update_password)
        .service(auth::resend_confirmation)
        .service(dashboard::landing)
        .service(dashboard::profile_page)
        .service(dashboard::parent)
        .service(student::student_dashboard)
        .service(student::start_lesson)
        .service(student::complete_lesson)
        .service(student::note_lesson)
        .service(teacher::teacher_dashboard)
        .service(teacher::create_lesson)
        .service(teacher::update_lesson)
        .service(teacher::toggle_publish)
        .service(teacher::delete_lesson)
        .service(teacher::owned_lesson)
        .service(teacher::upload_asset)
        .service(teacher::lesson_roster)
        .service(teacher::mark_student_complete)
        .service(teacher::reset_student_progress)
        .service(admin::users);
}
