//! Comment service
//!
//! Implements business logic for equipment comments:
//! - Listing and lookup with author annotation
//! - Creation against existing equipment only
//! - Owner-or-admin rule for editing and deleting

use crate::db::repositories::{CommentRepository, EquipmentRepository};
use crate::models::{Comment, CommentWithAuthor, CreateCommentInput};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Error types for comment operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The referenced equipment does not exist
    #[error("Equipment not found")]
    EquipmentNotFound,

    /// The comment does not exist
    #[error("Comment not found")]
    CommentNotFound,

    /// The acting user is neither the comment's author nor an admin
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
///
/// Every write takes the acting user's id and admin flag; the
/// owner-or-admin rule is enforced here, after the existence check, so an
/// absent comment reads as not-found even to users who could not have
/// touched it.
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    equipment_repo: Arc<dyn EquipmentRepository>,
}

impl CommentService {
    /// Create a new comment service
    pub fn new(
        repo: Arc<dyn CommentRepository>,
        equipment_repo: Arc<dyn EquipmentRepository>,
    ) -> Self {
        Self {
            repo,
            equipment_repo,
        }
    }

    /// List the comments on one equipment item, newest first
    ///
    /// An unknown equipment id yields an empty list.
    pub async fn list_for_equipment(
        &self,
        equipment_id: i64,
    ) -> Result<Vec<CommentWithAuthor>, CommentServiceError> {
        let list = self
            .repo
            .list_for_equipment(equipment_id)
            .await
            .context("Failed to list comments")?;

        Ok(list)
    }

    /// Get a single comment with its author
    ///
    /// # Errors
    ///
    /// - `CommentNotFound` if no comment has that id
    pub async fn get_by_id(&self, id: i64) -> Result<CommentWithAuthor, CommentServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get comment")?
            .ok_or(CommentServiceError::CommentNotFound)
    }

    /// Create a comment as the given user
    ///
    /// The stored text is trimmed; the creation date is the server's
    /// current date.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the text is empty or the equipment id is missing
    /// - `EquipmentNotFound` if the referenced equipment does not exist
    pub async fn create(
        &self,
        input: CreateCommentInput,
        user_id: i64,
    ) -> Result<Comment, CommentServiceError> {
        let text = input.text.trim();
        let equipment_id = match input.equipment_id {
            Some(id) if !text.is_empty() => id,
            _ => {
                return Err(CommentServiceError::ValidationError(
                    "Comment text and equipment id are required".to_string(),
                ))
            }
        };

        let exists = self
            .equipment_repo
            .exists(equipment_id)
            .await
            .context("Failed to check equipment")?;
        if !exists {
            return Err(CommentServiceError::EquipmentNotFound);
        }

        let created = self
            .repo
            .create(text, Utc::now().date_naive(), user_id, equipment_id)
            .await
            .context("Failed to create comment")?;

        Ok(created)
    }

    /// Replace a comment's text
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the new text is empty
    /// - `CommentNotFound` if no comment has that id
    /// - `Forbidden` if the user is neither the author nor an admin
    pub async fn update(
        &self,
        id: i64,
        text: &str,
        user_id: i64,
        is_admin: bool,
    ) -> Result<(), CommentServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CommentServiceError::ValidationError(
                "Comment text is required".to_string(),
            ));
        }

        let existing = self.get_by_id(id).await?;
        if !can_modify(&existing, user_id, is_admin) {
            return Err(CommentServiceError::Forbidden(
                "Not allowed to edit this comment".to_string(),
            ));
        }

        let updated = self
            .repo
            .update_text(id, text)
            .await
            .context("Failed to update comment")?;
        if !updated {
            return Err(CommentServiceError::CommentNotFound);
        }

        Ok(())
    }

    /// Delete a comment
    ///
    /// # Errors
    ///
    /// - `CommentNotFound` if no comment has that id
    /// - `Forbidden` if the user is neither the author nor an admin
    pub async fn delete(
        &self,
        id: i64,
        user_id: i64,
        is_admin: bool,
    ) -> Result<(), CommentServiceError> {
        let existing = self.get_by_id(id).await?;
        if !can_modify(&existing, user_id, is_admin) {
            return Err(CommentServiceError::Forbidden(
                "Not allowed to delete this comment".to_string(),
            ));
        }

        let deleted = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete comment")?;
        if !deleted {
            return Err(CommentServiceError::CommentNotFound);
        }

        Ok(())
    }
}

/// Owner-or-admin rule
fn can_modify(comment: &CommentWithAuthor, user_id: i64, is_admin: bool) -> bool {
    is_admin || comment.user_id == user_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxCommentRepository, SqlxEquipmentRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::{
        CreateEquipmentInput, CreateUserInput, ADMIN_PROFILE_ID, TECHNICIAN_PROFILE_ID,
    };

    async fn setup_test_service() -> (DynDatabasePool, CommentService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let repo = SqlxCommentRepository::boxed(pool.clone());
        let equipment_repo = SqlxEquipmentRepository::boxed(pool.clone());
        let service = CommentService::new(repo, equipment_repo);

        (pool, service)
    }

    async fn seed_user(pool: &DynDatabasePool, login: &str, code: &str, profile_id: i64) -> i64 {
        let repo = SqlxUserRepository::new(pool.clone());
        let user = repo
            .create(&CreateUserInput::new(login, code, profile_id))
            .await
            .expect("Failed to seed user");
        user.id
    }

    async fn seed_equipment(pool: &DynDatabasePool, name: &str) -> i64 {
        let repo = SqlxEquipmentRepository::new(pool.clone());
        let equipment = repo
            .create(
                &CreateEquipmentInput::new(name, "desc", "https://img.example.com/e.jpg"),
                Utc::now().date_naive(),
            )
            .await
            .expect("Failed to seed equipment");
        equipment.id
    }

    fn comment_input(text: &str, equipment_id: i64) -> CreateCommentInput {
        CreateCommentInput {
            text: text.to_string(),
            equipment_id: Some(equipment_id),
        }
    }

    // ========================================================================
    // Create tests
    // ========================================================================

    #[tokio::test]
    async fn test_create_and_list() {
        let (pool, service) = setup_test_service().await;
        let user_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;
        let equipment_id = seed_equipment(&pool, "Drill press").await;

        let created = service
            .create(comment_input("Belt is worn", equipment_id), user_id)
            .await
            .expect("Failed to create comment");

        assert!(created.id > 0);
        assert_eq!(created.text, "Belt is worn");
        assert_eq!(created.created_on, Utc::now().date_naive());

        let list = service
            .list_for_equipment(equipment_id)
            .await
            .expect("Failed to list comments");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].author_login, "joao");
        assert_eq!(list[0].author_profile, "tecnico");
    }

    #[tokio::test]
    async fn test_create_trims_text() {
        let (pool, service) = setup_test_service().await;
        let user_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;
        let equipment_id = seed_equipment(&pool, "Drill press").await;

        let created = service
            .create(comment_input("  needs oil  ", equipment_id), user_id)
            .await
            .expect("Failed to create comment");

        assert_eq!(created.text, "needs oil");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_text() {
        let (pool, service) = setup_test_service().await;
        let user_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;
        let equipment_id = seed_equipment(&pool, "Drill press").await;

        for text in ["", "   "] {
            let result = service
                .create(comment_input(text, equipment_id), user_id)
                .await;
            assert!(matches!(
                result,
                Err(CommentServiceError::ValidationError(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_create_rejects_missing_equipment_id() {
        let (pool, service) = setup_test_service().await;
        let user_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;

        let input = CreateCommentInput {
            text: "No target".to_string(),
            equipment_id: None,
        };
        let result = service.create(input, user_id).await;
        assert!(matches!(
            result,
            Err(CommentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_unknown_equipment_writes_nothing() {
        let (pool, service) = setup_test_service().await;
        let user_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;

        let result = service.create(comment_input("Orphan", 999), user_id).await;
        assert!(matches!(
            result,
            Err(CommentServiceError::EquipmentNotFound)
        ));

        let list = service
            .list_for_equipment(999)
            .await
            .expect("Failed to list comments");
        assert!(list.is_empty());
    }

    // ========================================================================
    // Lookup tests
    // ========================================================================

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let (_pool, service) = setup_test_service().await;

        let result = service.get_by_id(999).await;
        assert!(matches!(result, Err(CommentServiceError::CommentNotFound)));
    }

    #[tokio::test]
    async fn test_list_unknown_equipment_is_empty() {
        let (_pool, service) = setup_test_service().await;

        let list = service
            .list_for_equipment(42)
            .await
            .expect("Failed to list comments");
        assert!(list.is_empty());
    }

    // ========================================================================
    // Update tests
    // ========================================================================

    #[tokio::test]
    async fn test_author_can_update() {
        let (pool, service) = setup_test_service().await;
        let user_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;
        let equipment_id = seed_equipment(&pool, "Drill press").await;

        let created = service
            .create(comment_input("Belt is worn", equipment_id), user_id)
            .await
            .expect("Failed to create comment");

        service
            .update(created.id, "Belt replaced", user_id, false)
            .await
            .expect("Author should be allowed to update");

        let found = service
            .get_by_id(created.id)
            .await
            .expect("Failed to get comment");
        assert_eq!(found.text, "Belt replaced");
    }

    #[tokio::test]
    async fn test_admin_can_update_any_comment() {
        let (pool, service) = setup_test_service().await;
        let author_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;
        let admin_id = seed_user(&pool, "maria", "123456", ADMIN_PROFILE_ID).await;
        let equipment_id = seed_equipment(&pool, "Drill press").await;

        let created = service
            .create(comment_input("Belt is worn", equipment_id), author_id)
            .await
            .expect("Failed to create comment");

        service
            .update(created.id, "Corrected by admin", admin_id, true)
            .await
            .expect("Admin should be allowed to update");

        let found = service
            .get_by_id(created.id)
            .await
            .expect("Failed to get comment");
        assert_eq!(found.text, "Corrected by admin");
    }

    #[tokio::test]
    async fn test_other_technician_cannot_update() {
        let (pool, service) = setup_test_service().await;
        let author_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;
        let other_id = seed_user(&pool, "pedro", "111222", TECHNICIAN_PROFILE_ID).await;
        let equipment_id = seed_equipment(&pool, "Drill press").await;

        let created = service
            .create(comment_input("Belt is worn", equipment_id), author_id)
            .await
            .expect("Failed to create comment");

        let result = service
            .update(created.id, "Hijacked", other_id, false)
            .await;
        assert!(matches!(result, Err(CommentServiceError::Forbidden(_))));

        // Comment is unchanged
        let found = service
            .get_by_id(created.id)
            .await
            .expect("Failed to get comment");
        assert_eq!(found.text, "Belt is worn");
    }

    #[tokio::test]
    async fn test_update_rejects_blank_text() {
        let (pool, service) = setup_test_service().await;
        let user_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;
        let equipment_id = seed_equipment(&pool, "Drill press").await;

        let created = service
            .create(comment_input("Belt is worn", equipment_id), user_id)
            .await
            .expect("Failed to create comment");

        let result = service.update(created.id, "   ", user_id, false).await;
        assert!(matches!(
            result,
            Err(CommentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_comment_is_not_found_even_for_non_owner() {
        let (pool, service) = setup_test_service().await;
        let user_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;

        // Not-found wins over forbidden for absent rows
        let result = service.update(999, "text", user_id, false).await;
        assert!(matches!(result, Err(CommentServiceError::CommentNotFound)));
    }

    // ========================================================================
    // Delete tests
    // ========================================================================

    #[tokio::test]
    async fn test_author_can_delete() {
        let (pool, service) = setup_test_service().await;
        let user_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;
        let equipment_id = seed_equipment(&pool, "Drill press").await;

        let created = service
            .create(comment_input("Belt is worn", equipment_id), user_id)
            .await
            .expect("Failed to create comment");

        service
            .delete(created.id, user_id, false)
            .await
            .expect("Author should be allowed to delete");

        let result = service.get_by_id(created.id).await;
        assert!(matches!(result, Err(CommentServiceError::CommentNotFound)));
    }

    #[tokio::test]
    async fn test_other_technician_cannot_delete() {
        let (pool, service) = setup_test_service().await;
        let author_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;
        let other_id = seed_user(&pool, "pedro", "111222", TECHNICIAN_PROFILE_ID).await;
        let equipment_id = seed_equipment(&pool, "Drill press").await;

        let created = service
            .create(comment_input("Belt is worn", equipment_id), author_id)
            .await
            .expect("Failed to create comment");

        let result = service.delete(created.id, other_id, false).await;
        assert!(matches!(result, Err(CommentServiceError::Forbidden(_))));

        assert!(service.get_by_id(created.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_can_delete_any_comment() {
        let (pool, service) = setup_test_service().await;
        let author_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;
        let admin_id = seed_user(&pool, "maria", "123456", ADMIN_PROFILE_ID).await;
        let equipment_id = seed_equipment(&pool, "Drill press").await;

        let created = service
            .create(comment_input("Belt is worn", equipment_id), author_id)
            .await
            .expect("Failed to create comment");

        service
            .delete(created.id, admin_id, true)
            .await
            .expect("Admin should be allowed to delete");
    }

    #[tokio::test]
    async fn test_delete_missing_comment() {
        let (pool, service) = setup_test_service().await;
        let user_id = seed_user(&pool, "joao", "654321", TECHNICIAN_PROFILE_ID).await;

        let result = service.delete(999, user_id, false).await;
        assert!(matches!(result, Err(CommentServiceError::CommentNotFound)));
    }
}
