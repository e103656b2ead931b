use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::{
    domain::{
        error::RepositoryError,
        models::{
            profile::{Profile, UserId},
            versioned::Versioned,
        },
        repositories::profile_repository::ProfileRepository,
    },
    infrastructure::entity::{map_db_err, profiles},
};

#[derive(Clone)]
pub struct PostgresProfileRepository {
    db: DatabaseConnection,
}

impl PostgresProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Versioned<Profile>>, RepositoryError> {
        profiles::Entity::find_by_id(user_id.as_str())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(profiles::Model::into_domain)
            .transpose()
    }

    async fn save(&self, profile: &Versioned<Profile>) -> Result<(), RepositoryError> {
        profiles::write_versioned(&self.db, profile).await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    fn profile() -> Profile {
        Profile::new(
            UserId::new("ann".to_string()).unwrap(),
            Some("Ann".to_string()),
            "ann@example.com".to_string(),
            None,
        )
    }

    #[tokio::test]
    async fn save_checks_the_version_it_read() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repository = PostgresProfileRepository::new(db);

        repository.save(&Versioned::unsaved(profile())).await.unwrap();
        assert!(matches!(
            repository.save(&Versioned::stored(profile(), 4)).await,
            Err(RepositoryError::Conflict)
        ));
    }

    #[tokio::test]
    async fn corrupt_rows_are_reported() {
        let row = profiles::Model {
            user_id: "ann".to_string(),
            display_name: "Ann".to_string(),
            main_email: "ann@example.com".to_string(),
            tee_shirt_size: "GIGANTIC".to_string(),
            conference_keys_to_attend: serde_json::json!([]),
            version: 1,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();
        let repository = PostgresProfileRepository::new(db);

        let user_id = UserId::new("ann".to_string()).unwrap();
        assert!(matches!(
            repository.find_by_user_id(&user_id).await,
            Err(RepositoryError::DatabaseError(_))
        ));
    }
}
