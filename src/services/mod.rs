//! Services layer - Business logic
//!
//! This module contains all business logic for the TechMan equipment
//! tracker. Services are responsible for:
//! - Implementing business rules
//! - Coordinating repositories
//! - Handling validation and error cases

pub mod auth;
pub mod comment;
pub mod equipment;

pub use auth::{AuthService, AuthServiceError};
pub use comment::{CommentService, CommentServiceError};
pub use equipment::{EquipmentService, EquipmentServiceError};
