use std::{collections::HashMap, sync::Arc};

#[cfg(test)]
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    error::RepositoryError,
    models::{
        conference::{Conference, ConferenceId},
        profile::{Profile, UserId},
        query::ConferenceQuery,
        versioned::{Version, Versioned},
    },
    repositories::{
        conference_repository::ConferenceRepository, profile_repository::ProfileRepository,
        registration_repository::RegistrationRepository,
    },
};

#[derive(Default)]
struct Tables {
    profiles: HashMap<UserId, (Profile, Version)>,
    conferences: HashMap<ConferenceId, (Conference, Version)>,
}

/// Process-local directory.
///
/// Every write checks the version the caller read against the stored one under the
/// table lock, so concurrent transactions behave like they would against the database.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    tables: Arc<RwLock<Tables>>,
    #[cfg(test)]
    forced_conflicts: Arc<AtomicU32>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` writes fail with a conflict
    #[cfg(test)]
    pub fn force_conflicts(&self, count: u32) {
        self.forced_conflicts.store(count, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn take_forced_conflict(&self) -> bool {
        self.forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    #[cfg(not(test))]
    fn take_forced_conflict(&self) -> bool {
        false
    }
}

fn check_version<T>(stored: Option<&(T, Version)>, expected: Option<Version>) -> Result<(), RepositoryError> {
    if stored.map(|(_, version)| *version) == expected {
        Ok(())
    } else {
        Err(RepositoryError::Conflict)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryDirectory {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Versioned<Profile>>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .get(user_id)
            .map(|(profile, version)| Versioned::stored(profile.clone(), *version)))
    }

    async fn save(&self, profile: &Versioned<Profile>) -> Result<(), RepositoryError> {
        if self.take_forced_conflict() {
            return Err(RepositoryError::Conflict);
        }
        let mut tables = self.tables.write().await;
        let user_id = profile.record.user_id();
        check_version(tables.profiles.get(user_id), profile.version)?;
        tables
            .profiles
            .insert(user_id.clone(), (profile.record.clone(), profile.next_version()));
        Ok(())
    }
}

#[async_trait]
impl ConferenceRepository for InMemoryDirectory {
    async fn find_by_id(&self, id: &ConferenceId) -> Result<Option<Conference>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.conferences.get(id).map(|(conference, _)| conference.clone()))
    }

    async fn find_many(&self, ids: &[ConferenceId]) -> Result<Vec<Conference>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.conferences.get(id))
            .map(|(conference, _)| conference.clone())
            .collect())
    }

    async fn find_by_organizer(&self, organizer: &UserId) -> Result<Vec<Conference>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut conferences: Vec<Conference> = tables
            .conferences
            .values()
            .filter(|(conference, _)| conference.organizer_user_id() == organizer)
            .map(|(conference, _)| conference.clone())
            .collect();
        conferences.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(conferences)
    }

    async fn query(&self, query: &ConferenceQuery) -> Result<Vec<Conference>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut conferences: Vec<Conference> = tables
            .conferences
            .values()
            .filter(|(conference, _)| query.matches(conference))
            .map(|(conference, _)| conference.clone())
            .collect();
        query.sort(&mut conferences);
        Ok(conferences)
    }

    async fn find_nearly_sold_out(&self, threshold: u32) -> Result<Vec<Conference>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut conferences: Vec<Conference> = tables
            .conferences
            .values()
            .filter(|(conference, _)| (1..threshold).contains(&conference.seats_available()))
            .map(|(conference, _)| conference.clone())
            .collect();
        conferences.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(conferences)
    }

    async fn create(
        &self,
        conference: &Conference,
        new_organizer_profile: Option<&Profile>,
    ) -> Result<(), RepositoryError> {
        if self.take_forced_conflict() {
            return Err(RepositoryError::Conflict);
        }
        let mut tables = self.tables.write().await;
        check_version(tables.conferences.get(conference.id()), None)?;
        if let Some(profile) = new_organizer_profile {
            check_version(tables.profiles.get(profile.user_id()), None)?;
            tables
                .profiles
                .insert(profile.user_id().clone(), (profile.clone(), 1));
        }
        tables
            .conferences
            .insert(*conference.id(), (conference.clone(), 1));
        Ok(())
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryDirectory {
    async fn load_conference(
        &self,
        id: &ConferenceId,
    ) -> Result<Option<Versioned<Conference>>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .conferences
            .get(id)
            .map(|(conference, version)| Versioned::stored(conference.clone(), *version)))
    }

    async fn load_profile(&self, user_id: &UserId) -> Result<Option<Versioned<Profile>>, RepositoryError> {
        ProfileRepository::find_by_user_id(self, user_id).await
    }

    async fn commit(
        &self,
        profile: &Versioned<Profile>,
        conference: &Versioned<Conference>,
    ) -> Result<(), RepositoryError> {
        if self.take_forced_conflict() {
            return Err(RepositoryError::Conflict);
        }
        let mut tables = self.tables.write().await;
        let user_id = profile.record.user_id();
        let conference_id = conference.record.id();

        // validate both before touching either
        check_version(tables.profiles.get(user_id), profile.version)?;
        if conference.version.is_none() {
            return Err(RepositoryError::NotFound);
        }
        check_version(tables.conferences.get(conference_id), conference.version)?;

        tables
            .profiles
            .insert(user_id.clone(), (profile.record.clone(), profile.next_version()));
        tables.conferences.insert(
            *conference_id,
            (conference.record.clone(), conference.next_version()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::conference::ConferenceDraft;

    fn sample_conference(max_attendees: u32) -> Conference {
        Conference::create(
            ConferenceId::generate(),
            UserId::new("organizer".to_string()).unwrap(),
            ConferenceDraft {
                name: "Directory Days".to_string(),
                max_attendees,
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn sample_profile(user: &str) -> Profile {
        Profile::new(
            UserId::new(user.to_string()).unwrap(),
            None,
            format!("{user}@example.com"),
            None,
        )
    }

    #[tokio::test]
    async fn stale_commit_writes_neither_record() {
        let directory = InMemoryDirectory::new();
        let conference = sample_conference(5);
        directory.create(&conference, None).await.unwrap();

        let loaded = directory.load_conference(conference.id()).await.unwrap().unwrap();
        let mut first = loaded.clone();
        first.record.book_seat().unwrap();
        let ann = Versioned::unsaved(sample_profile("ann"));
        directory.commit(&ann, &first).await.unwrap();

        // second writer read the same conference version
        let mut second = loaded;
        second.record.book_seat().unwrap();
        let bob = Versioned::unsaved(sample_profile("bob"));
        assert!(matches!(
            directory.commit(&bob, &second).await,
            Err(RepositoryError::Conflict)
        ));

        let bob_id = UserId::new("bob".to_string()).unwrap();
        assert!(directory.load_profile(&bob_id).await.unwrap().is_none());
        let stored = directory.load_conference(conference.id()).await.unwrap().unwrap();
        assert_eq!(stored.record.seats_available(), 4);
        assert_eq!(stored.version, Some(2));
    }

    #[tokio::test]
    async fn unsaved_profile_conflicts_with_a_stored_one() {
        let directory = InMemoryDirectory::new();
        directory.save(&Versioned::unsaved(sample_profile("ann"))).await.unwrap();
        assert!(matches!(
            directory.save(&Versioned::unsaved(sample_profile("ann"))).await,
            Err(RepositoryError::Conflict)
        ));
    }

    #[tokio::test]
    async fn nearly_sold_out_excludes_full_and_empty_conferences() {
        let directory = InMemoryDirectory::new();
        let roomy = sample_conference(50);
        let sold_out = sample_conference(0);
        let mut tight = sample_conference(3);
        tight.book_seat().unwrap();
        for conference in [&roomy, &sold_out, &tight] {
            directory.create(conference, None).await.unwrap();
        }

        let found = directory.find_nearly_sold_out(5).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), tight.id());
    }
}
