use sea_orm::{DbErr, EntityTrait, Schema};
use sea_orm_migration::{
    MigrationName, MigrationTrait, MigratorTrait, SchemaManager, prelude::Table,
};

use crate::resources::example;

/// Create the table of a resource entity, indexes included.
///
/// The layout comes straight from the entity definition, so unique and
/// indexed columns of the record base carry over.
///
/// # Errors
///
/// Propagates the database error.
pub async fn create_record_table<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    entity: E,
) -> Result<(), DbErr> {
    let schema = Schema::new(manager.get_database_backend());

    let mut table = schema.create_table_from_entity(entity);
    manager.create_table(table.if_not_exists().to_owned()).await?;

    for mut index in schema.create_index_from_entity(entity) {
        manager.create_index(index.if_not_exists().to_owned()).await?;
    }
    tracing::debug!(table = entity.table_name(), "table created");
    Ok(())
}

/// # Errors
///
/// Propagates the database error.
pub async fn drop_record_table<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateExampleTable)]
    }
}

pub struct CreateExampleTable;

impl MigrationName for CreateExampleTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_example_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateExampleTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_record_table(manager, example::Entity).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_record_table(manager, example::Entity).await
    }
}
