use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};

use crate::{
    domain::{
        error::RepositoryError,
        models::{
            conference::{Conference, ConferenceId},
            profile::{Profile, UserId},
            versioned::Versioned,
        },
        repositories::registration_repository::RegistrationRepository,
    },
    infrastructure::entity::{conferences, map_db_err, profiles},
};

#[derive(Clone)]
pub struct PostgresRegistrationRepository {
    db: DatabaseConnection,
}

impl PostgresRegistrationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RegistrationRepository for PostgresRegistrationRepository {
    async fn load_conference(
        &self,
        id: &ConferenceId,
    ) -> Result<Option<Versioned<Conference>>, RepositoryError> {
        conferences::Entity::find_by_id(*id.as_uuid())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(conferences::Model::into_domain)
            .transpose()
    }

    async fn load_profile(&self, user_id: &UserId) -> Result<Option<Versioned<Profile>>, RepositoryError> {
        profiles::Entity::find_by_id(user_id.as_str())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(profiles::Model::into_domain)
            .transpose()
    }

    async fn commit(
        &self,
        profile: &Versioned<Profile>,
        conference: &Versioned<Conference>,
    ) -> Result<(), RepositoryError> {
        // Begin transaction
        let txn = self.db.begin().await.map_err(map_db_err)?;

        // Both writes are conditional on the version that was read;
        // an early return drops the transaction, which rolls it back.
        conferences::write_versioned(&txn, conference).await?;
        profiles::write_versioned(&txn, profile).await?;

        // Commit transaction
        txn.commit().await.map_err(map_db_err)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    use super::*;
    use crate::domain::models::conference::ConferenceDraft;

    fn updated(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn booked(version: u64) -> (Versioned<Profile>, Versioned<Conference>) {
        let mut conference = Conference::create(
            ConferenceId::generate(),
            UserId::new("organizer".to_string()).unwrap(),
            ConferenceDraft {
                name: "Mocked Summit".to_string(),
                max_attendees: 10,
                ..Default::default()
            },
        )
        .unwrap();
        conference.book_seat().unwrap();

        let mut profile = Profile::new(
            UserId::new("ann".to_string()).unwrap(),
            None,
            "ann@example.com".to_string(),
            None,
        );
        profile.attend(*conference.id()).unwrap();

        (Versioned::stored(profile, version), Versioned::stored(conference, version))
    }

    fn committed(log: &[Transaction]) -> bool {
        format!("{log:?}").contains("\"COMMIT\"")
    }

    #[tokio::test]
    async fn matching_versions_commit_both_writes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([updated(1), updated(1)])
            .into_connection();
        let repository = PostgresRegistrationRepository::new(db.clone());

        let (profile, conference) = booked(3);
        repository.commit(&profile, &conference).await.unwrap();

        assert!(committed(&db.into_transaction_log()));
    }

    #[tokio::test]
    async fn stale_conference_version_is_a_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([updated(0)])
            .into_connection();
        let repository = PostgresRegistrationRepository::new(db.clone());

        let (profile, conference) = booked(3);
        let result = repository.commit(&profile, &conference).await;

        assert!(matches!(result, Err(RepositoryError::Conflict)));
        assert!(!committed(&db.into_transaction_log()));
    }

    #[tokio::test]
    async fn stale_profile_rolls_back_the_seat_update() {
        // conference row matches, profile row moved on
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([updated(1), updated(0)])
            .into_connection();
        let repository = PostgresRegistrationRepository::new(db.clone());

        let (profile, conference) = booked(3);
        let result = repository.commit(&profile, &conference).await;

        assert!(matches!(result, Err(RepositoryError::Conflict)));
        assert!(!committed(&db.into_transaction_log()));
    }

    #[tokio::test]
    async fn unsaved_conference_is_never_written() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repository = PostgresRegistrationRepository::new(db.clone());

        let (profile, conference) = booked(3);
        let unsaved = Versioned::unsaved(conference.record);
        let result = repository.commit(&profile, &unsaved).await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
        assert!(!committed(&db.into_transaction_log()));
    }

    #[tokio::test]
    async fn loaded_rows_keep_their_version() {
        let (_, conference) = booked(7);
        let record = &conference.record;
        let row = conferences::Model {
            id: *record.id().as_uuid(),
            organizer_user_id: record.organizer_user_id().to_string(),
            name: record.name().to_string(),
            description: None,
            topics: serde_json::json!([]),
            city: None,
            start_date: None,
            end_date: None,
            month: 0,
            max_attendees: 10,
            seats_available: 9,
            version: 7,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();
        let repository = PostgresRegistrationRepository::new(db);

        let loaded = repository.load_conference(record.id()).await.unwrap().unwrap();
        assert_eq!(loaded.version, Some(7));
        assert_eq!(loaded.record.seats_available(), 9);
    }
}
