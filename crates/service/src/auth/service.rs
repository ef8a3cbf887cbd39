use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration. The signing secret is injected here at
/// construction so tests can run with distinct keys.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl_days: 30 }
    }
}

/// Token payload: the user identifier and expiry, nothing else.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

/// Auth business service independent of web framework
pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    cfg: AuthConfig,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, cfg: AuthConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new user with a hashed password and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::{AuthRepository, mock::MockAuthRepository}};
    /// use service::auth::domain::{RegisterInput, Role};
    /// use std::sync::Arc;
    /// let repo: Arc<dyn AuthRepository> = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("doc-secret"));
    /// let input = RegisterInput { email: "user@example.com".into(), password: "secret1".into(), name: "Test".into(), role: Role::Student };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.email, "user@example.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email, role = %input.role))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        if input.password.len() < 6 {
            return Err(AuthError::Validation(
                "Password must be at least 6 characters long".into(),
            ));
        }

        // Best-effort pre-check; the unique index on email is authoritative
        // and a racing insert still maps to the generic conflict below.
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            if existing.role != input.role {
                return Err(AuthError::Conflict(format!(
                    "The email \"{}\" is already registered with the role \"{}\". Please use a different email or contact support.",
                    input.email, existing.role
                )));
            }
            return Err(AuthError::Conflict("User already exists".into()));
        }

        // Hash exactly once; the repository stores the hash verbatim.
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        // User row and credential row are persisted as one unit; a failed
        // write leaves nothing behind and the email stays free to retry.
        let user = self.repo
            .create_user_with_credentials(&input.email, &input.name, input.role, hash, "argon2".into())
            .await?;

        let token = self.issue_token(user.id)?;
        info!(user_id = %user.id, email = %user.email, role = %user.role, "user_registered");
        Ok(AuthSession { user, token })
    }

    /// Authenticate a user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::{AuthRepository, mock::MockAuthRepository}};
    /// use service::auth::domain::{RegisterInput, LoginInput, Role};
    /// use std::sync::Arc;
    /// let repo: Arc<dyn AuthRepository> = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("doc-secret"));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), password: "passw0rd".into(), name: "N".into(), role: Role::Student }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        // Missing user, missing credentials and bad password all collapse to
        // the same error; responses must not reveal which field was wrong.
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash)
            .map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue_token(user.id)?;
        info!(user_id = %user.id, email = %user.email, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Sign `{ sub: <user id>, exp: now + ttl }` with the configured secret.
    pub fn issue_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let exp = (chrono::Utc::now() + chrono::Duration::days(self.cfg.token_ttl_days)).timestamp() as usize;
        let claims = Claims { sub: user_id.to_string(), exp };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Decode and validate a bearer token, returning the user id it carries.
    /// Expired or tampered tokens are rejected with `InvalidToken`, never
    /// with the bad-credentials error.
    pub fn verify_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let key = DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(token, &key, &validation).map_err(|_| AuthError::InvalidToken)?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)
    }

    /// Resolve a verified token's user id to the acting user.
    pub async fn resolve_user(&self, user_id: Uuid) -> Result<AuthUser, AuthError> {
        self.repo
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::auth::domain::{Credentials, Role};
    use crate::auth::repository::mock::MockAuthRepository;

    /// Repository whose first combined user+credential write fails, standing
    /// in for a store error mid-registration.
    #[derive(Default)]
    struct FailingOnceRepository {
        inner: MockAuthRepository,
        failed: AtomicBool,
    }

    #[async_trait]
    impl AuthRepository for FailingOnceRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            self.inner.find_user_by_email(email).await
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            self.inner.find_user_by_id(id).await
        }

        async fn create_user_with_credentials(
            &self,
            email: &str,
            name: &str,
            role: Role,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<AuthUser, AuthError> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(AuthError::Repository("credential write failed".into()));
            }
            self.inner
                .create_user_with_credentials(email, name, role, password_hash, password_algorithm)
                .await
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            self.inner.get_credentials(user_id).await
        }
    }

    fn svc_with_secret(secret: &str) -> AuthService {
        let repo: Arc<dyn AuthRepository> = Arc::new(MockAuthRepository::default());
        AuthService::new(repo, AuthConfig::new(secret))
    }

    fn register_input(email: &str, role: Role) -> RegisterInput {
        RegisterInput {
            email: email.into(),
            password: "secret1".into(),
            name: "A".into(),
            role,
        }
    }

    #[tokio::test]
    async fn register_then_login_roundtrip() {
        let svc = svc_with_secret("test-secret");
        let session = svc.register(register_input("a@x.com", Role::Student)).await.unwrap();
        let user_id = session.user.id;

        let login = svc
            .login(LoginInput { email: "a@x.com".into(), password: "secret1".into() })
            .await
            .unwrap();
        assert_eq!(login.user.id, user_id);
        // Both tokens decode to the same identity.
        assert_eq!(svc.verify_token(&session.token).unwrap(), user_id);
        assert_eq!(svc.verify_token(&login.token).unwrap(), user_id);
    }

    #[tokio::test]
    async fn short_password_rejected_with_exact_message() {
        let svc = svc_with_secret("test-secret");
        let mut input = register_input("a@x.com", Role::Student);
        input.password = "five5".into();
        let err = svc.register(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(err.to_string(), "Password must be at least 6 characters long");
    }

    #[tokio::test]
    async fn duplicate_same_role_yields_generic_conflict() {
        let svc = svc_with_secret("test-secret");
        svc.register(register_input("a@x.com", Role::Student)).await.unwrap();
        let err = svc.register(register_input("a@x.com", Role::Student)).await.unwrap_err();
        assert_eq!(err.to_string(), "User already exists");
    }

    #[tokio::test]
    async fn duplicate_other_role_names_existing_role() {
        let svc = svc_with_secret("test-secret");
        svc.register(register_input("a@x.com", Role::Student)).await.unwrap();
        let err = svc.register(register_input("a@x.com", Role::Instructor)).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("a@x.com"));
        assert!(msg.contains("already registered with the role \"student\""));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let svc = svc_with_secret("test-secret");
        svc.register(register_input("a@x.com", Role::Student)).await.unwrap();

        let no_user = svc
            .login(LoginInput { email: "nobody@x.com".into(), password: "secret1".into() })
            .await
            .unwrap_err();
        let bad_pass = svc
            .login(LoginInput { email: "a@x.com".into(), password: "wrong".into() })
            .await
            .unwrap_err();
        assert_eq!(no_user.to_string(), "Invalid email or password");
        assert_eq!(bad_pass.to_string(), no_user.to_string());
    }

    #[tokio::test]
    async fn token_carries_only_user_id_and_30_day_expiry() {
        let svc = svc_with_secret("test-secret");
        let session = svc.register(register_input("a@x.com", Role::Student)).await.unwrap();

        // Decode without the service to inspect the raw claims.
        let key = DecodingKey::from_secret(b"test-secret");
        let data = decode::<serde_json::Value>(&session.token, &key, &Validation::new(Algorithm::HS256)).unwrap();
        let claims = data.claims.as_object().unwrap();
        assert_eq!(claims.len(), 2);
        assert_eq!(claims["sub"], session.user.id.to_string());

        let exp = claims["exp"].as_i64().unwrap();
        let expected = (chrono::Utc::now() + chrono::Duration::days(30)).timestamp();
        assert!((exp - expected).abs() < 60, "expiry not ~30 days out");
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let svc = svc_with_secret("test-secret");
        let session = svc.register(register_input("a@x.com", Role::Student)).await.unwrap();

        let mut parts: Vec<String> = session.token.split('.').map(str::to_string).collect();
        parts[2] = parts[2].chars().rev().collect();
        let forged = parts.join(".");
        assert!(matches!(svc.verify_token(&forged), Err(AuthError::InvalidToken)));

        // Different signing key: same rejection.
        let other = svc_with_secret("other-secret");
        assert!(matches!(other.verify_token(&session.token), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_is_stored_hashed_once() {
        let repo = Arc::new(MockAuthRepository::default());
        let svc = AuthService::new(repo.clone() as Arc<dyn AuthRepository>, AuthConfig::new("test-secret"));
        let session = svc.register(register_input("a@x.com", Role::Student)).await.unwrap();

        let cred = repo.get_credentials(session.user.id).await.unwrap().unwrap();
        assert!(cred.password_hash.starts_with("$argon2"));
        assert_ne!(cred.password_hash, "secret1");
        assert_eq!(cred.password_algorithm, "argon2");
    }

    #[tokio::test]
    async fn failed_registration_does_not_reserve_the_email() {
        let repo: Arc<dyn AuthRepository> = Arc::new(FailingOnceRepository::default());
        let svc = AuthService::new(repo, AuthConfig::new("test-secret"));

        let err = svc.register(register_input("a@x.com", Role::Student)).await.unwrap_err();
        assert!(matches!(err, AuthError::Repository(_)));

        // The failed attempt persisted nothing, so the same email registers
        // cleanly and can log in.
        let session = svc.register(register_input("a@x.com", Role::Student)).await.unwrap();
        let login = svc
            .login(LoginInput { email: "a@x.com".into(), password: "secret1".into() })
            .await
            .unwrap();
        assert_eq!(login.user.id, session.user.id);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let repo: Arc<dyn AuthRepository> = Arc::new(MockAuthRepository::default());
        let svc = AuthService::new(
            repo,
            AuthConfig { jwt_secret: "test-secret".into(), token_ttl_days: -1 },
        );
        // Issued already a day past its expiry, well beyond the decoder's
        // default leeway.
        let session = svc.register(register_input("a@x.com", Role::Student)).await.unwrap();
        assert!(matches!(svc.verify_token(&session.token), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn resolve_user_rejects_unknown_id() {
        let svc = svc_with_secret("test-secret");
        let err = svc.resolve_user(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
