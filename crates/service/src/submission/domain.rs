use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded piece of student work. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Option<String>,
    pub module_id: Option<String>,
    pub question_id: Option<String>,
    pub answers: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Insert payload. Exactly one of `module_id` / `question_id` is set; the
/// service constructors enforce this.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub student_id: Uuid,
    pub course_id: Option<String>,
    pub module_id: Option<String>,
    pub question_id: Option<String>,
    pub answers: serde_json::Value,
}
