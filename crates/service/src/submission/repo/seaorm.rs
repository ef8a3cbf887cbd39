use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::submission::domain::{NewSubmission, SubmissionRecord};
use crate::submission::errors::SubmissionError;
use crate::submission::repository::SubmissionRepository;

pub struct SeaOrmSubmissionRepository {
    pub db: DatabaseConnection,
}

fn to_record(m: models::submission::Model) -> SubmissionRecord {
    SubmissionRecord {
        id: m.id,
        student_id: m.student_id,
        course_id: m.course_id,
        module_id: m.module_id,
        question_id: m.question_id,
        answers: m.answers,
        created_at: m.created_at.with_timezone(&Utc),
    }
}

fn map_model_err(e: models::errors::ModelError) -> SubmissionError {
    match e {
        models::errors::ModelError::Validation(m) => SubmissionError::Validation(m),
        models::errors::ModelError::Conflict(m) | models::errors::ModelError::Db(m) => {
            SubmissionError::Repository(m)
        }
    }
}

#[async_trait::async_trait]
impl SubmissionRepository for SeaOrmSubmissionRepository {
    async fn insert(&self, new: NewSubmission) -> Result<SubmissionRecord, SubmissionError> {
        let created = match (&new.module_id, &new.question_id) {
            (Some(module_id), None) => models::submission::create_for_module(
                &self.db,
                new.student_id,
                module_id,
                new.course_id.as_deref(),
                new.answers,
            )
            .await
            .map_err(map_model_err)?,
            (None, Some(question_id)) => models::submission::create_for_question(
                &self.db,
                new.student_id,
                question_id,
                new.answers,
            )
            .await
            .map_err(map_model_err)?,
            _ => {
                return Err(SubmissionError::Validation(
                    "exactly one of module or question must be set".into(),
                ))
            }
        };
        Ok(to_record(created))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SubmissionRecord>, SubmissionError> {
        let res = models::submission::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SubmissionError::Repository(e.to_string()))?;
        Ok(res.map(to_record))
    }

    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<SubmissionRecord>, SubmissionError> {
        let rows = models::submission::Entity::find()
            .filter(models::submission::Column::StudentId.eq(student_id))
            .order_by_desc(models::submission::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| SubmissionError::Repository(e.to_string()))?;
        Ok(rows.into_iter().map(to_record).collect())
    }

    async fn list_by_student_and_course(&self, student_id: Uuid, course_id: &str) -> Result<Vec<SubmissionRecord>, SubmissionError> {
        let rows = models::submission::Entity::find()
            .filter(models::submission::Column::StudentId.eq(student_id))
            .filter(models::submission::Column::CourseId.eq(course_id.to_string()))
            .order_by_desc(models::submission::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| SubmissionError::Repository(e.to_string()))?;
        Ok(rows.into_iter().map(to_record).collect())
    }
}
