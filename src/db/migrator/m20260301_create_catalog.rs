use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Artists)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // works.artist_id and media.work_id carry ON DELETE CASCADE from the
        // entity relations.
        manager
            .create_table(
                schema
                    .create_table_from_entity(Works)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Media)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_works_artist_id")
                    .table(Works)
                    .col(crate::entities::works::Column::ArtistId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_media_work_order")
                    .table(Media)
                    .col(crate::entities::media::Column::WorkId)
                    .col(crate::entities::media::Column::OrderColumn)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Media).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Works).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Artists).to_owned())
            .await?;

        Ok(())
    }
}
