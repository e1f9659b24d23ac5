//! Create voter table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Voter::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Voter::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Voter::QuestionId).integer().not_null())
                    .col(ColumnDef::new(Voter::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Voter::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voter_question")
                            .from(Voter::Table, Voter::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voter_user")
                            .from(Voter::Table, Voter::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, question_id) - one vote per user per question
        manager
            .create_index(
                Index::create()
                    .name("idx_voter_user_question")
                    .table(Voter::Table)
                    .col(Voter::UserId)
                    .col(Voter::QuestionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: question_id (cascade deletes, receipts per question)
        manager
            .create_index(
                Index::create()
                    .name("idx_voter_question_id")
                    .table(Voter::Table)
                    .col(Voter::QuestionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Voter::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Voter {
    Table,
    Id,
    QuestionId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
