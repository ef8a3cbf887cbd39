use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::user;

/// A piece of student work. Either `module_id` (a full module submission)
/// or `question_id` (a single practice answer) is set, never both.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Option<String>,
    pub module_id: Option<String>,
    pub question_id: Option<String>,
    pub answers: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Student,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Student => Entity::belongs_to(user::Entity)
                .from(Column::StudentId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create_for_module(
    db: &DatabaseConnection,
    student_id: Uuid,
    module_id: &str,
    course_id: Option<&str>,
    answers: serde_json::Value,
) -> Result<Model, errors::ModelError> {
    if module_id.trim().is_empty() {
        return Err(errors::ModelError::Validation("module id required".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        student_id: Set(student_id),
        course_id: Set(course_id.map(str::to_string)),
        module_id: Set(Some(module_id.to_string())),
        question_id: Set(None),
        answers: Set(answers),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(errors::map_db_err)
}

pub async fn create_for_question(
    db: &DatabaseConnection,
    student_id: Uuid,
    question_id: &str,
    answer: serde_json::Value,
) -> Result<Model, errors::ModelError> {
    if question_id.trim().is_empty() {
        return Err(errors::ModelError::Validation("question id required".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        student_id: Set(student_id),
        course_id: Set(None),
        module_id: Set(None),
        question_id: Set(Some(question_id.to_string())),
        answers: Set(answer),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(errors::map_db_err)
}
