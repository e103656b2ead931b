use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::SimpleExpr,
};

use crate::{
    domain::{
        error::RepositoryError,
        models::{
            conference::{Conference, ConferenceId},
            profile::{Profile, UserId},
            query::{Condition, ConferenceQuery, QueryField, QueryOperator},
            versioned::Versioned,
        },
        repositories::conference_repository::ConferenceRepository,
    },
    infrastructure::entity::{conferences, map_db_err, profiles},
};

#[derive(Clone)]
pub struct PostgresConferenceRepository {
    db: DatabaseConnection,
}

impl PostgresConferenceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn compare(column: conferences::Column, operator: QueryOperator, value: impl Into<sea_orm::Value>) -> SimpleExpr {
    match operator {
        QueryOperator::Eq => column.eq(value),
        QueryOperator::Ne => column.ne(value),
        QueryOperator::Lt => column.lt(value),
        QueryOperator::Lte => column.lte(value),
        QueryOperator::Gt => column.gt(value),
        QueryOperator::Gte => column.gte(value),
    }
}

fn decode(models: Vec<conferences::Model>) -> Result<Vec<Conference>, RepositoryError> {
    models
        .into_iter()
        .map(|model| model.into_domain().map(|conference| conference.record))
        .collect()
}

#[async_trait]
impl ConferenceRepository for PostgresConferenceRepository {
    async fn find_by_id(&self, id: &ConferenceId) -> Result<Option<Conference>, RepositoryError> {
        conferences::Entity::find_by_id(*id.as_uuid())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(|model| model.into_domain().map(|conference| conference.record))
            .transpose()
    }

    async fn find_many(&self, ids: &[ConferenceId]) -> Result<Vec<Conference>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = conferences::Entity::find()
            .filter(conferences::Column::Id.is_in(ids.iter().map(|id| *id.as_uuid())))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        decode(models)
    }

    async fn find_by_organizer(&self, organizer: &UserId) -> Result<Vec<Conference>, RepositoryError> {
        let models = conferences::Entity::find()
            .filter(conferences::Column::OrganizerUserId.eq(organizer.as_str()))
            .order_by_asc(conferences::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        decode(models)
    }

    async fn query(&self, query: &ConferenceQuery) -> Result<Vec<Conference>, RepositoryError> {
        let mut select = conferences::Entity::find();
        for condition in query.conditions() {
            select = match condition {
                Condition::City(op, city) => select.filter(compare(conferences::Column::City, *op, city.as_str())),
                Condition::Month(op, month) => {
                    select.filter(compare(conferences::Column::Month, *op, i64::from(*month)))
                }
                Condition::MaxAttendees(op, max) => {
                    select.filter(compare(conferences::Column::MaxAttendees, *op, i64::from(*max)))
                }
                // topics live in a JSON column, membership is checked after decoding
                Condition::Topic(_) => select,
            };
        }
        select = match query.inequality_field() {
            Some(QueryField::City) => select.order_by_asc(conferences::Column::City),
            Some(QueryField::Month) => select.order_by_asc(conferences::Column::Month),
            Some(QueryField::MaxAttendees) => select.order_by_asc(conferences::Column::MaxAttendees),
            Some(QueryField::Topic) | None => select,
        };

        let models = select
            .order_by_asc(conferences::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        let mut conferences: Vec<Conference> = decode(models)?
            .into_iter()
            .filter(|conference| query.matches(conference))
            .collect();
        query.sort(&mut conferences);
        Ok(conferences)
    }

    async fn find_nearly_sold_out(&self, threshold: u32) -> Result<Vec<Conference>, RepositoryError> {
        let models = conferences::Entity::find()
            .filter(conferences::Column::SeatsAvailable.gt(0))
            .filter(conferences::Column::SeatsAvailable.lt(i64::from(threshold)))
            .order_by_asc(conferences::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        decode(models)
    }

    async fn create(
        &self,
        conference: &Conference,
        new_organizer_profile: Option<&Profile>,
    ) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        if let Some(profile) = new_organizer_profile {
            profiles::write_versioned(&txn, &Versioned::unsaved(profile.clone())).await?;
        }
        conferences::insert_new(&txn, conference).await?;

        txn.commit().await.map_err(map_db_err)
    }
}
