//! Shared API response types
//!
//! Common success envelopes used across endpoints so mutations answer with
//! a consistent shape.

use serde::{Deserialize, Serialize};

/// Bare acknowledgement with no payload
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Acknowledgement for updates and deletes
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Acknowledgement for creates, carrying the new row id
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: i64,
    pub message: String,
}

impl CreatedResponse {
    pub fn new(id: i64, message: impl Into<String>) -> Self {
        Self {
            success: true,
            id,
            message: message.into(),
        }
    }
}
