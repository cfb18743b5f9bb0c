//! Create vote_fact table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VoteFact::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VoteFact::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(VoteFact::UserId).string_len(32).null())
                    .col(ColumnDef::new(VoteFact::VariantId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(VoteFact::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_fact_user")
                            .from(VoteFact::Table, VoteFact::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_fact_variant")
                            .from(VoteFact::Table, VoteFact::VariantId)
                            .to(Variant::Table, Variant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vote_fact_variant_id")
                    .table(VoteFact::Table)
                    .col(VoteFact::VariantId)
                    .to_owned(),
            )
            .await?;

        // A user picks the same variant at most once. NULL user ids never collide.
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_fact_user_variant_unique")
                    .table(VoteFact::Table)
                    .col(VoteFact::UserId)
                    .col(VoteFact::VariantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VoteFact::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VoteFact {
    Table,
    Id,
    UserId,
    VariantId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Variant {
    Table,
    Id,
}
