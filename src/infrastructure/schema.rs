use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};
use tracing::info;

use crate::infrastructure::entity::{conferences, profiles};

/// Create the tables and the organizer index when they do not exist yet
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut profiles_table = schema.create_table_from_entity(profiles::Entity);
    profiles_table.if_not_exists();
    db.execute_raw(backend.build(&profiles_table)).await?;

    let mut conferences_table = schema.create_table_from_entity(conferences::Entity);
    conferences_table.if_not_exists();
    db.execute_raw(backend.build(&conferences_table)).await?;

    for mut index in schema.create_index_from_entity(conferences::Entity) {
        index.if_not_exists();
        db.execute_raw(backend.build(&index)).await?;
    }

    info!("database schema ready");
    Ok(())
}
