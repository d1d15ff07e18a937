//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod blob_store;
mod identity_provider;
mod lesson_repository;
mod profile_repository;
mod progress_repository;

#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use lesson_repository::MockLessonRepository;
pub use lesson_repository::{LessonRepository, LessonRepositoryError};
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError};
#[cfg(test)]
pub use progress_repository::MockProgressRepository;
pub use progress_repository::{ProgressRepository, ProgressRepositoryError};
