//! Create `bookmark` table with FK to `folder`.
//!
//! Bookmarks carry no owner column; access control is transitive through the
//! folder. The FK cascade backs the explicit delete the folder service performs.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookmark::Table)
                    .if_not_exists()
                    .col(uuid(Bookmark::Id).primary_key())
                    .col(uuid(Bookmark::FolderId).not_null())
                    .col(text(Bookmark::Url).not_null())
                    .col(text(Bookmark::Title).not_null())
                    .col(text_null(Bookmark::Description))
                    .col(text_null(Bookmark::FaviconUrl))
                    .col(text_null(Bookmark::OgImageUrl))
                    .col(timestamp_with_time_zone(Bookmark::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Bookmark::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookmark_folder")
                            .from(Bookmark::Table, Bookmark::FolderId)
                            .to(Folder::Table, Folder::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Bookmark::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Bookmark { Table, Id, FolderId, Url, Title, Description, FaviconUrl, OgImageUrl, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Folder { Table, Id }
