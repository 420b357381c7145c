//! User service
//!
//! Accounts and login sessions:
//! - signup with a repeated password
//! - login/logout backed by the `sessions` table
//! - resolving a session token to its user

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{FormErrors, Session, User, USERNAME_MAX_LENGTH};
use crate::services::password::{hash_password, verify_password};
use crate::services::validation::{limit_length, require};
use anyhow::Context;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Default session expiration time in days
pub const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Shown when the username/password pair does not match an account
pub const INVALID_LOGIN_MESSAGE: &str =
    "Пожалуйста, введите правильные имя пользователя и пароль. Оба поля могут быть чувствительны к регистру.";

/// Shown when the username is taken
pub const USERNAME_TAKEN_MESSAGE: &str = "Пользователь с таким именем уже существует.";

/// Shown when the two passwords of a signup differ
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Введённые пароли не совпадают.";

/// Shown for usernames with characters outside letters, digits and `@.+-_`
pub const INVALID_USERNAME_MESSAGE: &str =
    "Введите правильное имя пользователя. Оно может содержать только буквы, цифры и знаки @/./+/-/_.";

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Invalid form input
    #[error("Validation error: {0}")]
    Validation(FormErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with custom session expiration
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Register a new account
    ///
    /// # Errors
    ///
    /// - `Validation` for a missing, malformed or taken username, or passwords that differ
    /// - `InternalError` for database errors
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        let username = input.username.trim();
        let mut errors = FormErrors::new();

        if require(&mut errors, "username", username)
            && limit_length(&mut errors, "username", username, USERNAME_MAX_LENGTH)
        {
            if !is_valid_username(username) {
                errors.add("username", INVALID_USERNAME_MESSAGE);
            } else if self
                .user_repo
                .get_by_username(username)
                .await
                .context("Failed to check username")?
                .is_some()
            {
                errors.add("username", USERNAME_TAKEN_MESSAGE);
            }
        }

        let first = require(&mut errors, "password1", &input.password1);
        let second = require(&mut errors, "password2", &input.password2);
        if first && second && input.password1 != input.password2 {
            errors.add("password2", PASSWORD_MISMATCH_MESSAGE);
        }

        errors.into_result().map_err(UserServiceError::Validation)?;

        let password_hash = hash_password(&input.password1).context("Failed to hash password")?;
        let user = self
            .user_repo
            .create(&User::new(username.to_string(), password_hash))
            .await
            .context("Failed to create user")?;

        tracing::info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Check credentials and open a new session
    ///
    /// # Errors
    ///
    /// - `Validation` when a field is empty
    /// - `AuthenticationError` when the credentials don't match an account
    /// - `InternalError` for database errors
    pub async fn login(&self, input: &LoginInput) -> Result<Session, UserServiceError> {
        let mut errors = FormErrors::new();
        require(&mut errors, "username", &input.username);
        require(&mut errors, "password", &input.password);
        errors.into_result().map_err(UserServiceError::Validation)?;

        let user = self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to get user by username")?
            .ok_or_else(|| UserServiceError::AuthenticationError(INVALID_LOGIN_MESSAGE.to_string()))?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            tracing::debug!("Rejected password for user {}", user.id);
            return Err(UserServiceError::AuthenticationError(
                INVALID_LOGIN_MESSAGE.to_string(),
            ));
        }

        let session = self.start_session(user.id).await?;
        tracing::info!("User {} logged in", user.id);
        Ok(session)
    }

    /// Logout (invalidate session)
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Unknown and expired tokens resolve to `None`; expired sessions are deleted.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.session_repo
                .delete(token)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user)
    }

    /// Open a session for a user without checking a password
    pub async fn start_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };

        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(created)
    }

    /// Clean up expired sessions
    ///
    /// Returns the number of sessions deleted
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;

        Ok(count)
    }
}

/// Letters, digits and `@.+-_`
fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

/// Signup form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password1: String,
    #[serde(default, skip_serializing)]
    pub password2: String,
}

impl RegisterInput {
    /// Create a new registration input with the password typed twice
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            password1: password.clone(),
            password2: password,
        }
    }
}

/// Login form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Where to go after a successful login
    #[serde(default)]
    pub next: String,
}

impl LoginInput {
    /// Create a new login input
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            next: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::migrated_pool;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};

    async fn setup() -> UserService {
        let pool = migrated_pool().await;
        UserService::with_session_expiration(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
            DEFAULT_SESSION_EXPIRATION_DAYS,
        )
    }

    fn validation_errors<T: std::fmt::Debug>(result: Result<T, UserServiceError>) -> FormErrors {
        match result {
            Err(UserServiceError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let service = setup().await;

        let user = service
            .register(RegisterInput::new("Автор", "s3cret-pass"))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "s3cret-pass");

        let session = service
            .login(&LoginInput::new("Автор", "s3cret-pass"))
            .await
            .unwrap();
        assert_eq!(session.user_id, user.id);

        let current = service.validate_session(&session.id).await.unwrap();
        assert_eq!(current.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username_and_mismatch() {
        let service = setup().await;
        service.register(RegisterInput::new("reader", "pass")).await.unwrap();

        let errors = validation_errors(service.register(RegisterInput::new("reader", "pass")).await);
        assert_eq!(errors.field("username"), [USERNAME_TAKEN_MESSAGE]);

        let mut input = RegisterInput::new("other", "first");
        input.password2 = "second".to_string();
        let errors = validation_errors(service.register(input).await);
        assert_eq!(errors.field("password2"), [PASSWORD_MISMATCH_MESSAGE]);

        let errors = validation_errors(service.register(RegisterInput::new("bad name", "pass")).await);
        assert_eq!(errors.field("username"), [INVALID_USERNAME_MESSAGE]);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let service = setup().await;
        service.register(RegisterInput::new("reader", "right")).await.unwrap();

        let result = service.login(&LoginInput::new("reader", "wrong")).await;
        assert!(matches!(result, Err(UserServiceError::AuthenticationError(_))));

        let result = service.login(&LoginInput::new("nobody", "right")).await;
        assert!(matches!(result, Err(UserServiceError::AuthenticationError(_))));

        let errors = validation_errors(service.login(&LoginInput::new("", "")).await);
        assert!(errors.has_field("username"));
        assert!(errors.has_field("password"));
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let service = setup().await;
        let user = service.register(RegisterInput::new("reader", "pass")).await.unwrap();
        let session = service.start_session(user.id).await.unwrap();

        service.logout(&session.id).await.unwrap();

        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_removed() {
        let pool = migrated_pool().await;
        let sessions = SqlxSessionRepository::boxed(pool.clone());
        let service = UserService::with_session_expiration(
            SqlxUserRepository::boxed(pool),
            sessions.clone(),
            -1,
        );
        let user = service.register(RegisterInput::new("reader", "pass")).await.unwrap();
        let session = service.start_session(user.id).await.unwrap();

        assert!(service.validate_session(&session.id).await.unwrap().is_none());
        assert!(sessions.get_by_id(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_expired_sessions() {
        let pool = migrated_pool().await;
        let expired = UserService::with_session_expiration(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            -1,
        );
        let user = expired.register(RegisterInput::new("reader", "pass")).await.unwrap();
        expired.start_session(user.id).await.unwrap();
        expired.start_session(user.id).await.unwrap();

        assert_eq!(expired.cleanup_expired_sessions().await.unwrap(), 2);
    }
}
