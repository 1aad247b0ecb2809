use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Folder: index on user_id for owner-scoped listings
        manager
            .create_index(
                Index::create()
                    .name("idx_folder_user")
                    .table(Folder::Table)
                    .col(Folder::UserId)
                    .to_owned(),
            )
            .await?;

        // Bookmark: index on folder_id
        manager
            .create_index(
                Index::create()
                    .name("idx_bookmark_folder")
                    .table(Bookmark::Table)
                    .col(Bookmark::FolderId)
                    .to_owned(),
            )
            .await?;

        // Bookmark: composite (folder_id, url) for the duplicate check
        manager
            .create_index(
                Index::create()
                    .name("idx_bookmark_folder_url")
                    .table(Bookmark::Table)
                    .col(Bookmark::FolderId)
                    .col(Bookmark::Url)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_folder_user").table(Folder::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_bookmark_folder").table(Bookmark::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_bookmark_folder_url").table(Bookmark::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Folder { Table, UserId }

#[derive(DeriveIden)]
enum Bookmark { Table, FolderId, Url }
