//! Comment model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    /// Date the comment was left (date only, set server-side)
    pub created_on: NaiveDate,
    /// Author user id
    pub user_id: i64,
    /// Referenced equipment id
    pub equipment_id: i64,
}

/// Comment joined with author info for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub text: String,
    pub created_on: NaiveDate,
    pub user_id: i64,
    pub equipment_id: i64,
    pub author_login: String,
    pub author_profile: String,
}

/// Input for creating a comment.
///
/// `equipment_id` stays optional here so its absence surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone)]
pub struct CreateCommentInput {
    pub text: String,
    pub equipment_id: Option<i64>,
}

impl CreateCommentInput {
    pub fn new(text: impl Into<String>, equipment_id: i64) -> Self {
        Self {
            text: text.into(),
            equipment_id: Some(equipment_id),
        }
    }
}
