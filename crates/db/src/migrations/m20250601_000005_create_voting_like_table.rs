//! Create voting_like table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VotingLike::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VotingLike::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(VotingLike::VotingId).string_len(32).not_null())
                    .col(ColumnDef::new(VotingLike::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(VotingLike::Active).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(VotingLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voting_like_voting")
                            .from(VotingLike::Table, VotingLike::VotingId)
                            .to(Voting::Table, Voting::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voting_like_user")
                            .from(VotingLike::Table, VotingLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_voting_like_user_id")
                    .table(VotingLike::Table)
                    .col(VotingLike::UserId)
                    .to_owned(),
            )
            .await?;

        // Toggled in place, so one row per (voting, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_voting_like_unique")
                    .table(VotingLike::Table)
                    .col(VotingLike::VotingId)
                    .col(VotingLike::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VotingLike::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VotingLike {
    Table,
    Id,
    VotingId,
    UserId,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum Voting {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
