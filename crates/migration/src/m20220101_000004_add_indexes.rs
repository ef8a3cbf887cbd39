use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Credentials: one row per user
        manager
            .create_index(
                Index::create()
                    .name("uniq_user_credentials_user")
                    .table(UserCredentials::Table)
                    .col(UserCredentials::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Submissions: "list by student" lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_student")
                    .table(Submission::Table)
                    .col(Submission::StudentId)
                    .to_owned(),
            )
            .await?;

        // Submissions: "by course, scoped to student" lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_course_student")
                    .table(Submission::Table)
                    .col(Submission::CourseId)
                    .col(Submission::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_submission_course_student").table(Submission::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_submission_student").table(Submission::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_user_credentials_user").table(UserCredentials::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum UserCredentials { Table, UserId }

#[derive(DeriveIden)]
enum Submission { Table, StudentId, CourseId }
