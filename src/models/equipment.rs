//! Equipment model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Equipment catalog entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// External image URL (images are not uploaded or stored locally)
    pub image_url: String,
    /// Whether the item is in active service
    pub active: bool,
    /// Date the item entered the catalog (date only, set server-side)
    pub created_on: NaiveDate,
}

/// Input for creating equipment
#[derive(Debug, Clone)]
pub struct CreateEquipmentInput {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub active: bool,
}

impl CreateEquipmentInput {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image_url: image_url.into(),
            active: true,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Input for replacing an equipment row.
///
/// Updates are full replacements: every field must be supplied. `active`
/// stays optional at this level so the service can reject its absence
/// instead of silently writing a default.
#[derive(Debug, Clone)]
pub struct UpdateEquipmentInput {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub active: Option<bool>,
}
