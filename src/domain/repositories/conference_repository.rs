use async_trait::async_trait;

use crate::domain::{
    error::RepositoryError,
    models::{
        conference::{Conference, ConferenceId},
        profile::{Profile, UserId},
        query::ConferenceQuery,
    },
};

#[async_trait]
pub trait ConferenceRepository {
    async fn find_by_id(&self, id: &ConferenceId) -> Result<Option<Conference>, RepositoryError>;

    /// Fetch several conferences at once; missing ids are simply absent from the result
    async fn find_many(&self, ids: &[ConferenceId]) -> Result<Vec<Conference>, RepositoryError>;

    /// Conferences owned by the organizer, sorted by name
    async fn find_by_organizer(&self, organizer: &UserId) -> Result<Vec<Conference>, RepositoryError>;

    /// Matching conferences in the order the query prescribes
    async fn query(&self, query: &ConferenceQuery) -> Result<Vec<Conference>, RepositoryError>;

    /// Conferences with `0 < seats_available < threshold`, sorted by name
    async fn find_nearly_sold_out(&self, threshold: u32) -> Result<Vec<Conference>, RepositoryError>;

    /// Insert the conference, and the organizer's first profile when given, in one transaction.
    /// A profile stored concurrently for the same user surfaces as `Conflict`.
    async fn create(
        &self,
        conference: &Conference,
        new_organizer_profile: Option<&Profile>,
    ) -> Result<(), RepositoryError>;
}
