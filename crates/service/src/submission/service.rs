use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{NewSubmission, SubmissionRecord};
use super::errors::SubmissionError;
use super::repository::SubmissionRepository;

/// Submission business service independent of web framework. The
/// `student_id` arguments come from the verified bearer identity, except in
/// [`SubmissionService::submit_single_question`].
pub struct SubmissionService {
    repo: Arc<dyn SubmissionRepository>,
}

impl SubmissionService {
    pub fn new(repo: Arc<dyn SubmissionRepository>) -> Self {
        Self { repo }
    }

    /// Record a module submission for the acting student.
    ///
    /// # Examples
    /// ```
    /// use service::submission::{SubmissionService, repository::{SubmissionRepository, mock::MockSubmissionRepository}};
    /// use std::sync::Arc;
    /// let repo: Arc<dyn SubmissionRepository> = Arc::new(MockSubmissionRepository::default());
    /// let svc = SubmissionService::new(repo);
    /// let student = uuid::Uuid::new_v4();
    /// let rec = tokio_test::block_on(svc.submit_module(student, "module-1", Some("course-9".into()), serde_json::json!({"q1": "a"}))).unwrap();
    /// assert_eq!(rec.student_id, student);
    /// assert_eq!(rec.module_id.as_deref(), Some("module-1"));
    /// ```
    #[instrument(skip(self, answers), fields(student_id = %student_id, module_id = %module_id))]
    pub async fn submit_module(
        &self,
        student_id: Uuid,
        module_id: &str,
        course_id: Option<String>,
        answers: serde_json::Value,
    ) -> Result<SubmissionRecord, SubmissionError> {
        if module_id.trim().is_empty() {
            return Err(SubmissionError::Validation("module id required".into()));
        }
        if answers.is_null() {
            return Err(SubmissionError::Validation("answers required".into()));
        }
        let rec = self.repo
            .insert(NewSubmission {
                student_id,
                course_id,
                module_id: Some(module_id.to_string()),
                question_id: None,
                answers,
            })
            .await?;
        info!(submission_id = %rec.id, student_id = %student_id, "submission_created");
        Ok(rec)
    }

    /// All submissions owned by the acting student.
    pub async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<SubmissionRecord>, SubmissionError> {
        self.repo.list_by_student(student_id).await
    }

    /// Fetch one submission. The record is returned only to its owner: a
    /// foreign row yields `Forbidden`, an absent one `NotFound`.
    #[instrument(skip(self), fields(student_id = %student_id, submission_id = %id))]
    pub async fn get_by_id(&self, student_id: Uuid, id: Uuid) -> Result<SubmissionRecord, SubmissionError> {
        let rec = self.repo.find_by_id(id).await?.ok_or(SubmissionError::NotFound)?;
        if rec.student_id != student_id {
            warn!(owner = %rec.student_id, "cross-student submission access denied");
            return Err(SubmissionError::Forbidden);
        }
        Ok(rec)
    }

    /// Course submissions filtered to the acting student.
    pub async fn list_by_course(&self, student_id: Uuid, course_id: &str) -> Result<Vec<SubmissionRecord>, SubmissionError> {
        if course_id.trim().is_empty() {
            return Err(SubmissionError::Validation("course id required".into()));
        }
        self.repo.list_by_student_and_course(student_id, course_id).await
    }

    /// Practice path: unauthenticated, the student id comes straight from
    /// the URL, so rows created here carry no ownership guarantee.
    #[instrument(skip(self, answer), fields(student_id = %student_id, question_id = %question_id))]
    pub async fn submit_single_question(
        &self,
        student_id: Uuid,
        question_id: &str,
        answer: serde_json::Value,
    ) -> Result<SubmissionRecord, SubmissionError> {
        if question_id.trim().is_empty() {
            return Err(SubmissionError::Validation("question id required".into()));
        }
        if answer.is_null() {
            return Err(SubmissionError::Validation("answer required".into()));
        }
        let rec = self.repo
            .insert(NewSubmission {
                student_id,
                course_id: None,
                module_id: None,
                question_id: Some(question_id.to_string()),
                answers: answer,
            })
            .await?;
        info!(submission_id = %rec.id, student_id = %student_id, "practice_submission_created");
        Ok(rec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::repository::mock::MockSubmissionRepository;

    fn svc() -> SubmissionService {
        let repo: Arc<dyn SubmissionRepository> = Arc::new(MockSubmissionRepository::default());
        SubmissionService::new(repo)
    }

    #[tokio::test]
    async fn get_by_id_never_returns_a_foreign_submission() {
        let svc = svc();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let rec = svc
            .submit_module(owner, "m1", None, serde_json::json!({"q": 1}))
            .await
            .unwrap();

        let err = svc.get_by_id(other, rec.id).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Forbidden));

        let ok = svc.get_by_id(owner, rec.id).await.unwrap();
        assert_eq!(ok.id, rec.id);
    }

    #[tokio::test]
    async fn get_by_id_absent_row_is_not_found() {
        let svc = svc();
        let err = svc.get_by_id(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::NotFound));
    }

    #[tokio::test]
    async fn listings_are_scoped_to_the_student() {
        let svc = svc();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        svc.submit_module(alice, "m1", Some("c1".into()), serde_json::json!({"a": 1})).await.unwrap();
        svc.submit_module(alice, "m2", Some("c2".into()), serde_json::json!({"a": 2})).await.unwrap();
        svc.submit_module(bob, "m1", Some("c1".into()), serde_json::json!({"b": 1})).await.unwrap();

        assert_eq!(svc.list_by_student(alice).await.unwrap().len(), 2);
        assert_eq!(svc.list_by_student(bob).await.unwrap().len(), 1);

        let alice_c1 = svc.list_by_course(alice, "c1").await.unwrap();
        assert_eq!(alice_c1.len(), 1);
        assert!(alice_c1.iter().all(|r| r.student_id == alice));
    }

    #[tokio::test]
    async fn single_question_accepts_arbitrary_student_id() {
        let svc = svc();
        let anyone = Uuid::new_v4();
        let rec = svc
            .submit_single_question(anyone, "q-42", serde_json::json!("answer"))
            .await
            .unwrap();
        assert_eq!(rec.student_id, anyone);
        assert_eq!(rec.question_id.as_deref(), Some("q-42"));
        assert!(rec.module_id.is_none());
    }

    #[tokio::test]
    async fn blank_identifiers_are_rejected() {
        let svc = svc();
        let sid = Uuid::new_v4();
        assert!(svc.submit_module(sid, "  ", None, serde_json::json!({})).await.is_err());
        assert!(svc.submit_single_question(sid, "", serde_json::json!("x")).await.is_err());
        assert!(svc.list_by_course(sid, " ").await.is_err());
    }
}
