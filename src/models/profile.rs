//! Profile model

use serde::{Deserialize, Serialize};

/// Profile name granting administrative rights.
pub const ADMIN_PROFILE: &str = "administrador";

/// Profile name for regular technicians.
pub const TECHNICIAN_PROFILE: &str = "tecnico";

/// Database id of the seeded administrator profile.
pub const ADMIN_PROFILE_ID: i64 = 1;

/// Database id of the seeded technician profile.
pub const TECHNICIAN_PROFILE_ID: i64 = 2;

/// Access profile entity (reference data, seeded by migration)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub name: String,
}
