//! Create question and variant tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Question::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Question::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Question::Description).text().not_null())
                    .col(ColumnDef::new(Question::VotingId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Question::QuestionType)
                            .string_len(16)
                            .not_null()
                            .default("single"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_voting")
                            .from(Question::Table, Question::VotingId)
                            .to(Voting::Table, Voting::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One question per voting
        manager
            .create_index(
                Index::create()
                    .name("idx_question_voting_id_unique")
                    .table(Question::Table)
                    .col(Question::VotingId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Variant::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Variant::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Variant::Text).string_len(100).not_null())
                    .col(ColumnDef::new(Variant::QuestionId).string_len(32).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_variant_question")
                            .from(Variant::Table, Variant::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_variant_question_id")
                    .table(Variant::Table)
                    .col(Variant::QuestionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Variant::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Question::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
    Title,
    Description,
    VotingId,
    QuestionType,
}

#[derive(Iden)]
enum Variant {
    Table,
    Id,
    Text,
    QuestionId,
}

#[derive(Iden)]
enum Voting {
    Table,
    Id,
}
