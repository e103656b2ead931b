use tracing::{info, warn};

use crate::{
    domain::{
        error::DomainError,
        models::{
            conference::{Conference, ConferenceDraft, ConferenceId},
            identity::Identity,
            profile::Profile,
        },
        repositories::{
            conference_repository::ConferenceRepository, profile_repository::ProfileRepository,
        },
        services::notification_service::{ConfirmationJob, ConfirmationNotifier},
    },
    usecase::retry::RetryPolicy,
};

pub struct ConferenceUsecase<C: ConferenceRepository, P: ProfileRepository, N: ConfirmationNotifier> {
    conference_repository: C,
    profile_repository: P,
    notifier: N,
    retry: RetryPolicy,
}

impl<C: ConferenceRepository, P: ProfileRepository, N: ConfirmationNotifier> ConferenceUsecase<C, P, N> {
    pub fn new(conference_repository: C, profile_repository: P, notifier: N, retry: RetryPolicy) -> Self {
        Self {
            conference_repository,
            profile_repository,
            notifier,
            retry,
        }
    }

    /// Store a new conference owned by the caller, creating their profile if needed
    pub async fn create_conference(
        &self,
        identity: &Identity,
        draft: ConferenceDraft,
    ) -> Result<Conference, DomainError>
    where
        C: Send + Sync,
        P: Send + Sync,
    {
        let conference = Conference::create(ConferenceId::generate(), identity.user_id().clone(), draft)?;

        let this = self;
        let pending = &conference;
        let email = self
            .retry
            .run("create_conference", move || this.try_create(identity, pending))
            .await?;

        info!(
            user_id = %identity.user_id(),
            conference_id = %conference.id(),
            max_attendees = conference.max_attendees(),
            "conference created"
        );
        let job = ConfirmationJob {
            email,
            conference_info: conference.summary(),
        };
        if let Err(err) = self.notifier.enqueue(job) {
            warn!(conference_id = %conference.id(), error = %err, "could not queue confirmation");
        }
        Ok(conference)
    }

    /// Returns the organizer's email once both records are stored
    async fn try_create(&self, identity: &Identity, conference: &Conference) -> Result<String, DomainError> {
        match self.profile_repository.find_by_user_id(identity.user_id()).await? {
            Some(profile) => {
                self.conference_repository.create(conference, None).await?;
                Ok(profile.record.main_email().to_string())
            }
            None => {
                let profile = Profile::from_identity(identity);
                self.conference_repository.create(conference, Some(&profile)).await?;
                Ok(profile.main_email().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        domain::{error::ErrorKind, models::profile::UserId},
        infrastructure::in_memory_directory::InMemoryDirectory,
    };

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        jobs: Arc<Mutex<Vec<ConfirmationJob>>>,
    }

    impl ConfirmationNotifier for RecordingNotifier {
        fn enqueue(&self, job: ConfirmationJob) -> Result<(), DomainError> {
            self.jobs.lock().unwrap().push(job);
            Ok(())
        }
    }

    fn organizer() -> Identity {
        Identity::new(UserId::new("org".to_string()).unwrap(), "org@example.com".to_string())
    }

    fn draft(name: &str) -> ConferenceDraft {
        ConferenceDraft {
            name: name.to_string(),
            max_attendees: 25,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn creating_a_conference_creates_the_missing_profile() {
        let directory = InMemoryDirectory::new();
        let notifier = RecordingNotifier::default();
        let usecase = ConferenceUsecase::new(
            directory.clone(),
            directory.clone(),
            notifier.clone(),
            RetryPolicy::default(),
        );

        let conference = usecase.create_conference(&organizer(), draft("Kickoff")).await.unwrap();
        assert_eq!(conference.seats_available(), 25);
        assert_eq!(conference.organizer_user_id(), organizer().user_id());

        let profile = directory.find_by_user_id(organizer().user_id()).await.unwrap().unwrap();
        assert_eq!(profile.record.display_name(), "org");
        assert!(directory.find_by_id(conference.id()).await.unwrap().is_some());
        assert_eq!(notifier.jobs.lock().unwrap()[0].email, "org@example.com");

        // an existing profile is left alone
        usecase.create_conference(&organizer(), draft("Second")).await.unwrap();
        let again = directory.find_by_user_id(organizer().user_id()).await.unwrap().unwrap();
        assert_eq!(again.version, profile.version);
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_before_storage() {
        let directory = InMemoryDirectory::new();
        let usecase = ConferenceUsecase::new(
            directory.clone(),
            directory.clone(),
            RecordingNotifier::default(),
            RetryPolicy::default(),
        );
        let err = usecase.create_conference(&organizer(), draft("")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(directory.find_by_organizer(organizer().user_id()).await.unwrap().is_empty());
    }
}
