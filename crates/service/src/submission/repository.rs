use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{NewSubmission, SubmissionRecord};
use super::errors::SubmissionError;

/// Repository abstraction for submission persistence.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn insert(&self, new: NewSubmission) -> Result<SubmissionRecord, SubmissionError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SubmissionRecord>, SubmissionError>;
    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<SubmissionRecord>, SubmissionError>;
    async fn list_by_student_and_course(&self, student_id: Uuid, course_id: &str) -> Result<Vec<SubmissionRecord>, SubmissionError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockSubmissionRepository {
        rows: Mutex<Vec<SubmissionRecord>>,
    }

    #[async_trait]
    impl SubmissionRepository for MockSubmissionRepository {
        async fn insert(&self, new: NewSubmission) -> Result<SubmissionRecord, SubmissionError> {
            let rec = SubmissionRecord {
                id: Uuid::new_v4(),
                student_id: new.student_id,
                course_id: new.course_id,
                module_id: new.module_id,
                question_id: new.question_id,
                answers: new.answers,
                created_at: chrono::Utc::now(),
            };
            self.rows.lock().unwrap().push(rec.clone());
            Ok(rec)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<SubmissionRecord>, SubmissionError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|r| r.id == id).cloned())
        }

        async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<SubmissionRecord>, SubmissionError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|r| r.student_id == student_id).cloned().collect())
        }

        async fn list_by_student_and_course(&self, student_id: Uuid, course_id: &str) -> Result<Vec<SubmissionRecord>, SubmissionError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| r.student_id == student_id && r.course_id.as_deref() == Some(course_id))
                .cloned()
                .collect())
        }
    }
}
