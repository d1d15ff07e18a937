//! Identity provider adapters.
//!
//! [`HttpIdentityProvider`] speaks to a hosted auth service over its REST
//! API.

mod dto;
mod http_provider;

pub use http_provider::{HttpIdentityProvider, IdentityProviderSettings};
