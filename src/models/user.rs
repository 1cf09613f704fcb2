//! User model

use serde::{Deserialize, Serialize};

/// User entity representing a technician or administrator.
///
/// Users sign in with a personal 6-digit numeric code; there is no
/// username prompt. The code is the login secret and is never serialized
/// into responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Display login (unique)
    pub login: String,
    /// 6-digit access code
    #[serde(skip_serializing)]
    pub code: String,
    /// Referenced profile id
    pub profile_id: i64,
}

/// User joined with the profile name, as resolved at login time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithProfile {
    pub id: i64,
    pub login: String,
    pub profile_name: String,
}

/// Input for provisioning a user
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub login: String,
    pub code: String,
    pub profile_id: i64,
}

impl CreateUserInput {
    pub fn new(login: impl Into<String>, code: impl Into<String>, profile_id: i64) -> Self {
        Self {
            login: login.into(),
            code: code.into(),
            profile_id,
        }
    }
}
