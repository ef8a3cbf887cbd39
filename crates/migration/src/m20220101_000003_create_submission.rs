//! Create `submission` table with FK to `user` (the owning student).
//!
//! Rows are immutable after insert; there is no updated_at.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Submission::Table)
                    .if_not_exists()
                    .col(uuid(Submission::Id).primary_key())
                    .col(uuid(Submission::StudentId).not_null())
                    .col(ColumnDef::new(Submission::CourseId).string_len(64).null())
                    .col(ColumnDef::new(Submission::ModuleId).string_len(64).null())
                    .col(ColumnDef::new(Submission::QuestionId).string_len(64).null())
                    .col(json_binary(Submission::Answers).not_null())
                    .col(timestamp_with_time_zone(Submission::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_submission_student")
                            .from(Submission::Table, Submission::StudentId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Submission::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Submission { Table, Id, StudentId, CourseId, ModuleId, QuestionId, Answers, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
