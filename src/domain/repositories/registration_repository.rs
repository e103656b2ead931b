use async_trait::async_trait;

use crate::domain::{
    error::RepositoryError,
    models::{
        conference::{Conference, ConferenceId},
        profile::{Profile, UserId},
        versioned::Versioned,
    },
};

/// Repository for registrations that reads and writes a profile and a conference as one unit
#[async_trait]
pub trait RegistrationRepository {
    async fn load_conference(
        &self,
        id: &ConferenceId,
    ) -> Result<Option<Versioned<Conference>>, RepositoryError>;

    async fn load_profile(&self, user_id: &UserId) -> Result<Option<Versioned<Profile>>, RepositoryError>;

    /// Write both records in a single transaction.
    ///
    /// Succeeds only if neither record changed since it was loaded; otherwise nothing
    /// is written and `RepositoryError::Conflict` is returned.
    async fn commit(
        &self,
        profile: &Versioned<Profile>,
        conference: &Versioned<Conference>,
    ) -> Result<(), RepositoryError>;
}
