use sea_orm::{ActiveValue::Set, entity::prelude::*};

use crate::{
    domain::{
        error::RepositoryError,
        models::{
            conference::{Conference, ConferenceId},
            profile::UserId,
            versioned::Versioned,
        },
    },
    infrastructure::entity::{corrupt, map_db_err},
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "conferences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub organizer_user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub topics: Json,
    pub city: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub month: i32,
    pub max_attendees: i32,
    pub seats_available: i32,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_domain(self) -> Result<Versioned<Conference>, RepositoryError> {
        let topics: Vec<String> = serde_json::from_value(self.topics).map_err(corrupt)?;
        let conference = Conference::reconstruct(
            ConferenceId::from_uuid(self.id),
            UserId::new(self.organizer_user_id).map_err(corrupt)?,
            self.name,
            self.description,
            topics,
            self.city,
            self.start_date,
            self.end_date,
            u32::try_from(self.max_attendees).map_err(corrupt)?,
            u32::try_from(self.seats_available).map_err(corrupt)?,
        )
        .map_err(corrupt)?;
        Ok(Versioned::stored(conference, u64::try_from(self.version).map_err(corrupt)?))
    }
}

fn active_model(conference: &Conference, version: u64) -> Result<ActiveModel, RepositoryError> {
    Ok(ActiveModel {
        id: Set(*conference.id().as_uuid()),
        organizer_user_id: Set(conference.organizer_user_id().as_str().to_string()),
        name: Set(conference.name().to_string()),
        description: Set(conference.description().map(str::to_string)),
        topics: Set(serde_json::to_value(conference.topics()).map_err(corrupt)?),
        city: Set(conference.city().map(str::to_string)),
        start_date: Set(conference.start_date()),
        end_date: Set(conference.end_date()),
        month: Set(i32::try_from(conference.month()).map_err(corrupt)?),
        max_attendees: Set(i32::try_from(conference.max_attendees()).map_err(corrupt)?),
        seats_available: Set(i32::try_from(conference.seats_available()).map_err(corrupt)?),
        version: Set(i64::try_from(version).map_err(corrupt)?),
    })
}

/// Update a stored conference if its version is still the one read.
/// Conferences are only ever inserted through `insert_new`.
pub async fn write_versioned<C: ConnectionTrait>(
    conn: &C,
    conference: &Versioned<Conference>,
) -> Result<(), RepositoryError> {
    let Some(expected) = conference.version else {
        return Err(RepositoryError::NotFound);
    };
    let result = Entity::update_many()
        .set(active_model(&conference.record, conference.next_version())?)
        .filter(Column::Id.eq(*conference.record.id().as_uuid()))
        .filter(Column::Version.eq(i64::try_from(expected).map_err(corrupt)?))
        .exec(conn)
        .await
        .map_err(map_db_err)?;
    if result.rows_affected == 0 {
        return Err(RepositoryError::Conflict);
    }
    Ok(())
}

pub async fn insert_new<C: ConnectionTrait>(conn: &C, conference: &Conference) -> Result<(), RepositoryError> {
    Entity::insert(active_model(conference, 1)?)
        .exec_without_returning(conn)
        .await
        .map_err(map_db_err)?;
    Ok(())
}
