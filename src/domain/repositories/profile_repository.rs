use async_trait::async_trait;

use crate::domain::{
    error::RepositoryError,
    models::{
        profile::{Profile, UserId},
        versioned::Versioned,
    },
};

#[async_trait]
pub trait ProfileRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Versioned<Profile>>, RepositoryError>;

    /// Store the profile if its version still matches, `Conflict` otherwise
    async fn save(&self, profile: &Versioned<Profile>) -> Result<(), RepositoryError>;
}
