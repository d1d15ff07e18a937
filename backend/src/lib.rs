//! Cadence: a role-gated learning-progress tracker for music lessons.
//!
//! - [`domain`]: services, entities, and ports
//! - [`inbound`]: the actix-web HTTP adapter
//! - [`outbound`]: PostgreSQL, identity-provider, blob-store, and in-memory
//!   adapters
//! - [`settings`]: application configuration

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
