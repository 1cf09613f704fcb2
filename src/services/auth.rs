//! Authentication service
//!
//! Implements the access-code login flow:
//! - Code validation and user lookup
//! - Session creation with a 24 hour lifetime
//! - Session validation with lazy expiry cleanup
//! - Logout

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{Session, UserWithProfile};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Session lifetime in hours
pub const SESSION_EXPIRATION_HOURS: i64 = 24;

/// Error types for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Validation error (malformed code)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Authentication failed (no user with that code)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Authentication service
///
/// Users log in with a 6-digit access code instead of a username/password
/// pair. A successful login creates a session row carrying the user's login
/// and profile name so later requests need no further lookups.
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
}

impl AuthService {
    /// Create a new authentication service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
        }
    }

    /// Log in with an access code
    ///
    /// # Arguments
    ///
    /// * `code` - The 6-digit access code
    ///
    /// # Returns
    ///
    /// A new session on success
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the code is not exactly 6 digits
    /// - `AuthenticationError` if no user has that code
    /// - `InternalError` for database errors
    pub async fn login(&self, code: &str) -> Result<Session, AuthServiceError> {
        validate_code(code)?;

        let user = self
            .user_repo
            .find_by_code(code)
            .await
            .context("Failed to look up access code")?
            .ok_or_else(|| AuthServiceError::AuthenticationError("Invalid code".to_string()))?;

        self.create_session(&user).await
    }

    /// Validate a session token
    ///
    /// Returns the session if the token exists and has not expired. An
    /// expired session is deleted on sight and treated like an unknown
    /// token.
    pub async fn validate_session(&self, token: &str) -> Result<Option<Session>, AuthServiceError> {
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
            // Lazy cleanup
            let _ = self.session_repo.delete(token).await;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Log out (invalidate a session)
    ///
    /// Deleting an unknown token is not an error, so logout is idempotent.
    pub async fn logout(&self, token: &str) -> Result<(), AuthServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    /// Delete all expired sessions
    ///
    /// Maintenance operation; returns the number of sessions deleted.
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, AuthServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;

        Ok(count)
    }

    /// Create a new session for a user
    async fn create_session(&self, user: &UserWithProfile) -> Result<Session, AuthServiceError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            login: user.login.clone(),
            profile_name: user.profile_name.clone(),
            expires_at: now + Duration::hours(SESSION_EXPIRATION_HOURS),
            created_at: now,
        };

        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(created)
    }
}

/// Check that a code is exactly 6 ASCII digits
fn validate_code(code: &str) -> Result<(), AuthServiceError> {
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthServiceError::ValidationError(
            "Code must be exactly 6 digits".to_string(),
        ));
    }

    Ok(())
}
