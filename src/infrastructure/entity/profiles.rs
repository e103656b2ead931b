use std::collections::BTreeSet;

use sea_orm::{ActiveValue::Set, entity::prelude::*};

use crate::{
    domain::{
        error::RepositoryError,
        models::{
            conference::ConferenceId,
            profile::{Profile, TeeShirtSize, UserId},
            versioned::Versioned,
        },
    },
    infrastructure::entity::{corrupt, map_db_err},
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub display_name: String,
    pub main_email: String,
    pub tee_shirt_size: String,
    pub conference_keys_to_attend: Json,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_domain(self) -> Result<Versioned<Profile>, RepositoryError> {
        let user_id = UserId::new(self.user_id).map_err(corrupt)?;
        let tee_shirt_size: TeeShirtSize = self.tee_shirt_size.parse().map_err(corrupt)?;
        let attending: BTreeSet<ConferenceId> =
            serde_json::from_value(self.conference_keys_to_attend).map_err(corrupt)?;
        let version = u64::try_from(self.version).map_err(corrupt)?;

        let profile = Profile::reconstruct(
            user_id,
            self.display_name,
            self.main_email,
            tee_shirt_size,
            attending,
        );
        Ok(Versioned::stored(profile, version))
    }
}

fn active_model(profile: &Profile, version: u64) -> Result<ActiveModel, RepositoryError> {
    let attending = serde_json::to_value(profile.conference_keys_to_attend()).map_err(corrupt)?;
    Ok(ActiveModel {
        user_id: Set(profile.user_id().as_str().to_string()),
        display_name: Set(profile.display_name().to_string()),
        main_email: Set(profile.main_email().to_string()),
        tee_shirt_size: Set(profile.tee_shirt_size().as_str().to_string()),
        conference_keys_to_attend: Set(attending),
        version: Set(i64::try_from(version).map_err(corrupt)?),
    })
}

/// Insert a new profile or update it if the stored version is still the one read
pub async fn write_versioned<C: ConnectionTrait>(
    conn: &C,
    profile: &Versioned<Profile>,
) -> Result<(), RepositoryError> {
    let model = active_model(&profile.record, profile.next_version())?;

    match profile.version {
        None => {
            Entity::insert(model)
                .exec_without_returning(conn)
                .await
                .map_err(map_db_err)?;
        }
        Some(expected) => {
            let result = Entity::update_many()
                .set(model)
                .filter(Column::UserId.eq(profile.record.user_id().as_str()))
                .filter(Column::Version.eq(i64::try_from(expected).map_err(corrupt)?))
                .exec(conn)
                .await
                .map_err(map_db_err)?;
            if result.rows_affected == 0 {
                return Err(RepositoryError::Conflict);
            }
        }
    }
    Ok(())
}
