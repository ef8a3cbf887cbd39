use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials, Role};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    /// Insert a new user together with its credential row as one unit:
    /// either both rows exist afterwards or neither does, so a failed
    /// credential write never strands the email. A duplicate email must
    /// surface as `AuthError::Conflict` even when the caller's pre-check
    /// raced a concurrent registration.
    async fn create_user_with_credentials(
        &self,
        email: &str,
        name: &str,
        role: Role,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: email
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.id == id).cloned())
        }

        async fn create_user_with_credentials(
            &self,
            email: &str,
            name: &str,
            role: Role,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<AuthUser, AuthError> {
            // Both maps are updated under the users lock so the pair is
            // inserted as one unit, mirroring the transactional store.
            let mut users = self.users.lock().unwrap();
            if users.contains_key(email) {
                return Err(AuthError::Conflict("User already exists".into()));
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
                name: name.to_string(),
                role,
                image_url: None,
            };
            self.creds.lock().unwrap().insert(
                user.id,
                Credentials { user_id: user.id, password_hash, password_algorithm },
            );
            users.insert(email.to_string(), user.clone());
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }
    }
}
