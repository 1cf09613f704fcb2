//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile::ADMIN_PROFILE;

/// Session entity for user authentication.
///
/// The row carries the identity resolved at login (login and profile name),
/// so authorization decisions read only the session and never go back to
/// the user table per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID (token)
    pub id: String,
    /// Associated user ID
    pub user_id: i64,
    /// Login captured at session creation
    pub login: String,
    /// Profile name captured at session creation
    pub profile_name: String,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// Check if the session belongs to an administrator
    pub fn is_admin(&self) -> bool {
        self.profile_name == ADMIN_PROFILE
    }
}
