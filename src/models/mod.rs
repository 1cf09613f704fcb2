//! Data models
//!
//! This module contains all data structures used throughout the TechMan
//! equipment tracker. Models represent:
//! - Database entities (Profile, User, Equipment, Comment, Session)
//! - Joined projections used by list/detail responses
//! - Internal input types consumed by the service layer

mod comment;
mod equipment;
mod profile;
mod session;
mod user;

pub use comment::{Comment, CommentWithAuthor, CreateCommentInput};
pub use equipment::{CreateEquipmentInput, Equipment, UpdateEquipmentInput};
pub use profile::{Profile, ADMIN_PROFILE, ADMIN_PROFILE_ID, TECHNICIAN_PROFILE, TECHNICIAN_PROFILE_ID};
pub use session::Session;
pub use user::{CreateUserInput, User, UserWithProfile};
