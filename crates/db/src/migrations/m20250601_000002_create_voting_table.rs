//! Create voting table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Voting::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Voting::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Voting::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Voting::AuthorId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Voting::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Voting::Blocked).boolean().not_null().default(false))
                    .col(ColumnDef::new(Voting::Published).boolean().not_null().default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voting_author")
                            .from(Voting::Table, Voting::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_voting_author_id")
                    .table(Voting::Table)
                    .col(Voting::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Active list filter: published AND NOT blocked
        manager
            .create_index(
                Index::create()
                    .name("idx_voting_published_blocked")
                    .table(Voting::Table)
                    .col(Voting::Published)
                    .col(Voting::Blocked)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_voting_created_at")
                    .table(Voting::Table)
                    .col(Voting::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Voting::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Voting {
    Table,
    Id,
    Title,
    AuthorId,
    CreatedAt,
    Blocked,
    Published,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
