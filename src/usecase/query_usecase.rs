use crate::domain::{
    error::DomainError,
    models::{
        conference::{Conference, ConferenceId},
        profile::UserId,
        query::{ConferenceQuery, QueryFilter},
    },
    repositories::{conference_repository::ConferenceRepository, profile_repository::ProfileRepository},
};

/// Read-only access to conferences
pub struct QueryUsecase<C: ConferenceRepository, P: ProfileRepository> {
    conference_repository: C,
    profile_repository: P,
}

impl<C: ConferenceRepository, P: ProfileRepository> QueryUsecase<C, P>
where
    C: Send + Sync,
    P: Send + Sync,
{
    pub fn new(conference_repository: C, profile_repository: P) -> Self {
        Self {
            conference_repository,
            profile_repository,
        }
    }

    pub async fn query_conferences(&self, filters: Vec<QueryFilter>) -> Result<Vec<Conference>, DomainError> {
        let query = ConferenceQuery::new(filters)?;
        Ok(self.conference_repository.query(&query).await?)
    }

    pub async fn get_conference(&self, websafe_key: &str) -> Result<Conference, DomainError> {
        let id = ConferenceId::parse(websafe_key)?;
        self.conference_repository
            .find_by_id(&id)
            .await?
            .ok_or(DomainError::NotFound("conference"))
    }

    pub async fn conferences_created_by(&self, user_id: &UserId) -> Result<Vec<Conference>, DomainError> {
        Ok(self.conference_repository.find_by_organizer(user_id).await?)
    }

    /// All conferences the user attends, sorted by name; never a partial list
    pub async fn conferences_attended_by(&self, user_id: &UserId) -> Result<Vec<Conference>, DomainError> {
        let profile = self
            .profile_repository
            .find_by_user_id(user_id)
            .await?
            .ok_or(DomainError::NotFound("profile"))?;

        let ids: Vec<ConferenceId> = profile.record.conference_keys_to_attend().iter().copied().collect();
        let mut conferences = self.conference_repository.find_many(&ids).await?;
        if conferences.len() != ids.len() {
            return Err(DomainError::NotFound("conference"));
        }
        conferences.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(conferences)
    }
}
