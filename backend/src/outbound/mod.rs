//! Outbound adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL repositories via Diesel
//! - **identity**: HTTP client for the hosted identity provider
//! - **blob**: capability-scoped filesystem blob store
//! - **memory**: process-local adapters for development and tests
//!
//! Adapters translate between domain types and infrastructure
//! representations and carry no business rules.

pub mod blob;
pub mod identity;
pub mod memory;
pub mod persistence;
