//! Port for the `profiles` table.

use async_trait::async_trait;

use crate::domain::{DirectoryQuery, Identity, Profile, Role, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by profile repository adapters.
    pub enum ProfileRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "profile repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "profile repository query failed: {message}",
        /// A stored row could not be converted into a domain profile.
        Corrupt { message: String } => "profile row invalid: {message}",
    }
}

/// Port for profile reads and the onboarding role write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch a profile by identity id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Fetch every profile whose id is in `ids`; unknown ids are skipped.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<Profile>, ProfileRepositoryError>;

    /// Set the role for `identity`, creating the profile when absent.
    ///
    /// The identity email is written alongside so the directory can show it.
    async fn assign_role(
        &self,
        identity: &Identity,
        role: Role,
    ) -> Result<Profile, ProfileRepositoryError>;

    /// One page of profiles plus the total number matching the search.
    async fn list_directory(
        &self,
        query: &DirectoryQuery,
    ) -> Result<(Vec<Profile>, u64), ProfileRepositoryError>;
}
