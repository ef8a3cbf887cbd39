use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials, Role};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(u: models::user::Model) -> AuthUser {
    AuthUser {
        id: u.id,
        email: u.email,
        name: u.name,
        role: Role::parse(&u.role).unwrap_or_default(),
        image_url: u.image_url,
    }
}

fn map_model_err(e: models::errors::ModelError) -> AuthError {
    match e {
        models::errors::ModelError::Validation(m) => AuthError::Validation(m),
        // Unique-index violation on email: a concurrent registration won the
        // race. Same error the pre-check would have produced.
        models::errors::ModelError::Conflict(_) => AuthError::Conflict("User already exists".into()),
        models::errors::ModelError::Db(m) => AuthError::Repository(m),
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::Entity::find()
            .filter(models::user::Column::Email.eq(email.to_string()))
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn create_user_with_credentials(
        &self,
        email: &str,
        name: &str,
        role: Role,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError> {
        // Dropping the transaction uncommitted rolls both inserts back, so
        // an early return here leaves no half-registered account.
        let txn = self.db.begin().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        let created = models::user::create(&txn, email, name, role.as_str())
            .await
            .map_err(map_model_err)?;
        models::user_credentials::upsert_password(&txn, created.id, password_hash, &password_algorithm)
            .await
            .map_err(map_model_err)?;
        txn.commit().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(to_auth_user(created))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::Entity::find()
            .filter(models::user_credentials::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|c| Credentials {
            user_id: c.user_id,
            password_hash: c.password_hash,
            password_algorithm: c.password_algorithm,
        }))
    }
}
