use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    domain::{
        error::{DomainError, ErrorKind},
        models::{
            conference::{Conference, ConferenceId},
            identity::Identity,
            profile::Profile,
            versioned::Versioned,
        },
        repositories::registration_repository::RegistrationRepository,
        services::notification_service::{ConfirmationJob, ConfirmationNotifier},
    },
    usecase::retry::RetryPolicy,
};

/// Business-rule outcomes that leave every record untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    ConferenceNotFound,
    AlreadyRegistered,
    NotRegistered,
    NoCapacity,
}

impl RejectionReason {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RejectionReason::ConferenceNotFound => ErrorKind::NotFound,
            RejectionReason::AlreadyRegistered => ErrorKind::AlreadyRegistered,
            RejectionReason::NotRegistered => ErrorKind::NotRegistered,
            RejectionReason::NoCapacity => ErrorKind::NoCapacity,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::ConferenceNotFound => "No conference found with this key",
            RejectionReason::AlreadyRegistered => "You have already registered",
            RejectionReason::NotRegistered => "You are not registered for this conference",
            RejectionReason::NoCapacity => "There are no seats available",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationResult {
    Registered,
    Unregistered,
    Rejected(RejectionReason),
}

impl RegistrationResult {
    pub fn success(&self) -> bool {
        !matches!(self, RegistrationResult::Rejected(_))
    }

    pub fn reason(&self) -> &'static str {
        match self {
            RegistrationResult::Registered => "Registration successful",
            RegistrationResult::Unregistered => "Unregistration successful",
            RegistrationResult::Rejected(reason) => reason.message(),
        }
    }
}

/// What one run of a transaction body ended with
enum Attempt {
    Committed { email: String, conference: Conference },
    Rejected(RejectionReason),
}

/// Sole writer of seat counts and attendance sets
pub struct RegistrationUsecase<R: RegistrationRepository, N: ConfirmationNotifier> {
    repository: R,
    notifier: N,
    retry: RetryPolicy,
}

impl<R: RegistrationRepository, N: ConfirmationNotifier> RegistrationUsecase<R, N> {
    pub fn new(repository: R, notifier: N, retry: RetryPolicy) -> Self {
        Self {
            repository,
            notifier,
            retry,
        }
    }

    pub async fn register(
        &self,
        identity: &Identity,
        websafe_key: &str,
    ) -> Result<RegistrationResult, DomainError>
    where
        R: Send + Sync,
    {
        let conference_id = ConferenceId::parse(websafe_key)?;
        let this = self;
        let attempt = self
            .retry
            .run("register", move || this.try_register(identity, conference_id))
            .await;

        match self.settle("register", identity, &conference_id, attempt)? {
            Attempt::Committed { email, conference } => {
                info!(
                    user_id = %identity.user_id(),
                    conference_id = %conference_id,
                    seats_available = conference.seats_available(),
                    "registered for conference"
                );
                // the booking stands whether or not the mail can be queued
                let job = ConfirmationJob {
                    email,
                    conference_info: conference.summary(),
                };
                if let Err(err) = self.notifier.enqueue(job) {
                    warn!(conference_id = %conference_id, error = %err, "could not queue confirmation");
                }
                Ok(RegistrationResult::Registered)
            }
            Attempt::Rejected(reason) => Ok(RegistrationResult::Rejected(reason)),
        }
    }

    pub async fn unregister(
        &self,
        identity: &Identity,
        websafe_key: &str,
    ) -> Result<RegistrationResult, DomainError>
    where
        R: Send + Sync,
    {
        let conference_id = ConferenceId::parse(websafe_key)?;
        let this = self;
        let attempt = self
            .retry
            .run("unregister", move || this.try_unregister(identity, conference_id))
            .await;

        match self.settle("unregister", identity, &conference_id, attempt)? {
            Attempt::Committed { conference, .. } => {
                info!(
                    user_id = %identity.user_id(),
                    conference_id = %conference_id,
                    seats_available = conference.seats_available(),
                    "unregistered from conference"
                );
                Ok(RegistrationResult::Unregistered)
            }
            Attempt::Rejected(reason) => Ok(RegistrationResult::Rejected(reason)),
        }
    }

    async fn try_register(
        &self,
        identity: &Identity,
        conference_id: ConferenceId,
    ) -> Result<Attempt, DomainError> {
        let Some(mut conference) = self.repository.load_conference(&conference_id).await? else {
            return Ok(Attempt::Rejected(RejectionReason::ConferenceNotFound));
        };
        let mut profile = self.load_or_default_profile(identity).await?;

        if profile.record.is_attending(&conference_id) {
            return Ok(Attempt::Rejected(RejectionReason::AlreadyRegistered));
        }
        match conference.record.book_seat() {
            Err(DomainError::NoCapacity) => return Ok(Attempt::Rejected(RejectionReason::NoCapacity)),
            other => other?,
        }
        profile.record.attend(conference_id)?;

        self.repository.commit(&profile, &conference).await?;
        Ok(Attempt::Committed {
            email: profile.record.main_email().to_string(),
            conference: conference.record,
        })
    }

    async fn try_unregister(
        &self,
        identity: &Identity,
        conference_id: ConferenceId,
    ) -> Result<Attempt, DomainError> {
        let Some(mut conference) = self.repository.load_conference(&conference_id).await? else {
            return Ok(Attempt::Rejected(RejectionReason::ConferenceNotFound));
        };
        let mut profile = self.load_or_default_profile(identity).await?;

        if !profile.record.is_attending(&conference_id) {
            return Ok(Attempt::Rejected(RejectionReason::NotRegistered));
        }
        profile.record.unattend(&conference_id)?;
        conference.record.give_back_seat()?;

        self.repository.commit(&profile, &conference).await?;
        Ok(Attempt::Committed {
            email: profile.record.main_email().to_string(),
            conference: conference.record,
        })
    }

    async fn load_or_default_profile(&self, identity: &Identity) -> Result<Versioned<Profile>, DomainError> {
        Ok(self
            .repository
            .load_profile(identity.user_id())
            .await?
            .unwrap_or_else(|| Versioned::unsaved(Profile::from_identity(identity))))
    }

    /// Log the final outcome of a transaction and pass it on
    fn settle(
        &self,
        operation: &'static str,
        identity: &Identity,
        conference_id: &ConferenceId,
        attempt: Result<Attempt, DomainError>,
    ) -> Result<Attempt, DomainError> {
        match &attempt {
            Ok(Attempt::Rejected(reason)) => info!(
                operation,
                user_id = %identity.user_id(),
                conference_id = %conference_id,
                reason = ?reason,
                "request rejected"
            ),
            Err(err) if err.kind() == ErrorKind::Unknown => error!(
                operation,
                user_id = %identity.user_id(),
                conference_id = %conference_id,
                error = %err,
                "transaction failed, nothing committed"
            ),
            _ => {}
        }
        attempt
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use proptest::prelude::*;

    use super::*;
    use crate::{
        config::TransactionConfig,
        domain::{
            models::{conference::ConferenceDraft, profile::UserId},
            repositories::conference_repository::ConferenceRepository,
        },
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

    struct BrokenNotifier;

    impl ConfirmationNotifier for BrokenNotifier {
        fn enqueue(&self, _job: ConfirmationJob) -> Result<(), DomainError> {
            Err(DomainError::Notification("queue closed".to_string()))
        }
    }

    fn retry() -> RetryPolicy {
        RetryPolicy::new(TransactionConfig {
            max_attempts: 3,
            backoff: Duration::ZERO,
        })
    }

    fn identity(user: &str) -> Identity {
        Identity::new(UserId::new(user.to_string()).unwrap(), format!("{user}@example.com"))
    }

    async fn seed_conference(directory: &InMemoryDirectory, max_attendees: u32) -> ConferenceId {
        let conference = Conference::create(
            ConferenceId::generate(),
            UserId::new("organizer".to_string()).unwrap(),
            ConferenceDraft {
                name: "Seat Accounting Summit".to_string(),
                max_attendees,
                ..Default::default()
            },
        )
        .unwrap();
        directory.create(&conference, None).await.unwrap();
        *conference.id()
    }

    async fn seats(directory: &InMemoryDirectory, id: &ConferenceId) -> u32 {
        directory
            .load_conference(id)
            .await
            .unwrap()
            .unwrap()
            .record
            .seats_available()
    }

    async fn attending(directory: &InMemoryDirectory, user: &Identity, id: &ConferenceId) -> bool {
        directory
            .load_profile(user.user_id())
            .await
            .unwrap()
            .is_some_and(|profile| profile.record.is_attending(id))
    }

    #[tokio::test]
    async fn register_and_unregister_walkthrough() {
        let directory = InMemoryDirectory::new();
        let notifier = RecordingNotifier::default();
        let usecase = RegistrationUsecase::new(directory.clone(), notifier.clone(), retry());
        let id = seed_conference(&directory, 10).await;
        let key = id.websafe();
        let ann = identity("ann");

        assert_eq!(seats(&directory, &id).await, 10);

        let result = usecase.register(&ann, &key).await.unwrap();
        assert_eq!(result, RegistrationResult::Registered);
        assert!(result.success());
        assert_eq!(seats(&directory, &id).await, 9);
        assert!(attending(&directory, &ann, &id).await);

        let again = usecase.register(&ann, &key).await.unwrap();
        assert_eq!(again, RegistrationResult::Rejected(RejectionReason::AlreadyRegistered));
        assert!(!again.success());
        assert_eq!(seats(&directory, &id).await, 9);

        let left = usecase.unregister(&ann, &key).await.unwrap();
        assert_eq!(left, RegistrationResult::Unregistered);
        assert_eq!(seats(&directory, &id).await, 10);
        let profile = directory.load_profile(ann.user_id()).await.unwrap().unwrap();
        assert!(profile.record.conference_keys_to_attend().is_empty());

        let left_again = usecase.unregister(&ann, &key).await.unwrap();
        assert_eq!(left_again, RegistrationResult::Rejected(RejectionReason::NotRegistered));
        assert_eq!(seats(&directory, &id).await, 10);

        let jobs = notifier.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].email, "ann@example.com");
        assert!(jobs[0].conference_info.contains("Seat Accounting Summit"));
    }

    #[tokio::test]
    async fn missing_conference_leaves_profile_untouched() {
        let directory = InMemoryDirectory::new();
        let usecase = RegistrationUsecase::new(directory.clone(), RecordingNotifier::default(), retry());
        let ann = identity("ann");

        let result = usecase
            .register(&ann, &ConferenceId::generate().websafe())
            .await
            .unwrap();
        assert_eq!(result, RegistrationResult::Rejected(RejectionReason::ConferenceNotFound));
        assert_eq!(RejectionReason::ConferenceNotFound.kind(), ErrorKind::NotFound);
        assert!(directory.load_profile(ann.user_id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_key_is_an_error_not_a_rejection() {
        let usecase =
            RegistrationUsecase::new(InMemoryDirectory::new(), RecordingNotifier::default(), retry());
        let err = usecase.register(&identity("ann"), "garbage").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);
    }

    #[tokio::test]
    async fn full_conference_rejects_without_writing() {
        let directory = InMemoryDirectory::new();
        let usecase = RegistrationUsecase::new(directory.clone(), RecordingNotifier::default(), retry());
        let id = seed_conference(&directory, 0).await;

        let result = usecase.register(&identity("ann"), &id.websafe()).await.unwrap();
        assert_eq!(result, RegistrationResult::Rejected(RejectionReason::NoCapacity));
        let conference = directory.load_conference(&id).await.unwrap().unwrap();
        assert_eq!(conference.version, Some(1));
    }

    #[tokio::test]
    async fn failing_notifier_does_not_undo_booking() {
        let directory = InMemoryDirectory::new();
        let usecase = RegistrationUsecase::new(directory.clone(), BrokenNotifier, retry());
        let id = seed_conference(&directory, 2).await;
        let ann = identity("ann");

        let result = usecase.register(&ann, &id.websafe()).await.unwrap();
        assert_eq!(result, RegistrationResult::Registered);
        assert_eq!(seats(&directory, &id).await, 1);
        assert!(attending(&directory, &ann, &id).await);
    }

    #[tokio::test]
    async fn single_conflict_is_retried_transparently() {
        let directory = InMemoryDirectory::new();
        let usecase = RegistrationUsecase::new(directory.clone(), RecordingNotifier::default(), retry());
        let id = seed_conference(&directory, 2).await;

        directory.force_conflicts(1);
        let result = usecase.register(&identity("ann"), &id.websafe()).await.unwrap();
        assert_eq!(result, RegistrationResult::Registered);
        assert_eq!(seats(&directory, &id).await, 1);
    }

    #[tokio::test]
    async fn exhausted_retries_leave_no_partial_state() {
        let directory = InMemoryDirectory::new();
        let usecase = RegistrationUsecase::new(directory.clone(), RecordingNotifier::default(), retry());
        let id = seed_conference(&directory, 2).await;
        let ann = identity("ann");

        directory.force_conflicts(3);
        let err = usecase.register(&ann, &id.websafe()).await.unwrap_err();
        assert!(matches!(err, DomainError::TransientConflict { attempts: 3 }));
        assert_eq!(err.kind(), ErrorKind::TransientConflict);
        assert_eq!(seats(&directory, &id).await, 2);
        assert!(directory.load_profile(ann.user_id()).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_for_last_seat() {
        const CALLERS: usize = 16;

        let directory = InMemoryDirectory::new();
        let usecase = Arc::new(RegistrationUsecase::new(
            directory.clone(),
            RecordingNotifier::default(),
            retry(),
        ));
        let id = seed_conference(&directory, 1).await;

        let handles: Vec<_> = (0..CALLERS)
            .map(|n| {
                let usecase = Arc::clone(&usecase);
                let key = id.websafe();
                tokio::spawn(async move { usecase.register(&identity(&format!("user-{n}")), &key).await })
            })
            .collect();

        let mut registered = 0;
        let mut no_capacity = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                RegistrationResult::Registered => registered += 1,
                RegistrationResult::Rejected(RejectionReason::NoCapacity) => no_capacity += 1,
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        assert_eq!(registered, 1);
        assert_eq!(no_capacity, CALLERS - 1);
        assert_eq!(seats(&directory, &id).await, 0);
    }

    proptest! {
        #[test]
        fn seat_count_always_mirrors_attendance(
            max_attendees in 0u32..4,
            ops in proptest::collection::vec((any::<bool>(), 0usize..5), 1..40),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            runtime.block_on(async {
                let directory = InMemoryDirectory::new();
                let usecase = RegistrationUsecase::new(directory.clone(), RecordingNotifier::default(), retry());
                let id = seed_conference(&directory, max_attendees).await;
                let users: Vec<Identity> = (0..5).map(|n| identity(&format!("user-{n}"))).collect();

                for (register, user) in ops {
                    let caller = &users[user];
                    let was_attending = attending(&directory, caller, &id).await;
                    let result = if register {
                        usecase.register(caller, &id.websafe()).await.unwrap()
                    } else {
                        usecase.unregister(caller, &id.websafe()).await.unwrap()
                    };

                    match result {
                        RegistrationResult::Registered => prop_assert!(!was_attending),
                        RegistrationResult::Unregistered => prop_assert!(was_attending),
                        RegistrationResult::Rejected(RejectionReason::AlreadyRegistered) => prop_assert!(was_attending),
                        RegistrationResult::Rejected(RejectionReason::NotRegistered) => prop_assert!(!was_attending),
                        RegistrationResult::Rejected(RejectionReason::NoCapacity) => {}
                        RegistrationResult::Rejected(RejectionReason::ConferenceNotFound) => {
                            prop_assert!(false, "conference vanished")
                        }
                    }

                    let mut attendees = 0;
                    for user in &users {
                        if attending(&directory, user, &id).await {
                            attendees += 1;
                        }
                    }
                    let seats_left = seats(&directory, &id).await;
                    prop_assert!(seats_left <= max_attendees);
                    prop_assert_eq!(seats_left, max_attendees - attendees);
                }
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
