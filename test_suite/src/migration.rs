use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateFooTable)]
    }
}

pub struct CreateFooTable;

impl MigrationName for CreateFooTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_foo_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateFooTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Foos::Table)
            .if_not_exists()
            .col(ColumnDef::new(Foos::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Foos::Foo).text().not_null())
            .col(ColumnDef::new(Foos::Bar).integer().not_null())
            .col(ColumnDef::new(Foos::Version).integer().not_null().default(0))
            .col(ColumnDef::new(Foos::CreatedAt).timestamp_with_time_zone().not_null())
            .col(ColumnDef::new(Foos::UpdatedAt).timestamp_with_time_zone().not_null())
            .col(ColumnDef::new(Foos::DeletedAt).timestamp_with_time_zone().null())
            .to_owned();
        manager.create_table(table).await?;

        // Only live rows must be unique, so deleted data can be created again.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS foos_foo_bar_live ON foos (foo, bar) WHERE deleted_at IS NULL",
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Foos::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Foos {
    Table,
    Id,
    Foo,
    Bar,
    Version,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
