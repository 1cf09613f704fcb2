//! Equipment service
//!
//! Implements business logic for the equipment catalog:
//! - Listing and lookup
//! - Creation with required-field validation
//! - Full-replacement update that preserves the registration date
//! - Deletion together with the equipment's comments

use crate::db::repositories::EquipmentRepository;
use crate::models::{CreateEquipmentInput, Equipment, UpdateEquipmentInput};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Error types for equipment operations
#[derive(Debug, thiserror::Error)]
pub enum EquipmentServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Equipment not found
    #[error("Equipment not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Equipment service for managing the catalog
pub struct EquipmentService {
    repo: Arc<dyn EquipmentRepository>,
}

impl EquipmentService {
    /// Create a new equipment service
    pub fn new(repo: Arc<dyn EquipmentRepository>) -> Self {
        Self { repo }
    }

    /// List all equipment, newest first
    pub async fn list(&self) -> Result<Vec<Equipment>, EquipmentServiceError> {
        let list = self
            .repo
            .list()
            .await
            .context("Failed to list equipment")?;

        Ok(list)
    }

    /// Get a single equipment item
    ///
    /// # Errors
    ///
    /// - `NotFound` if no equipment has that id
    pub async fn get_by_id(&self, id: i64) -> Result<Equipment, EquipmentServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get equipment")?
            .ok_or(EquipmentServiceError::NotFound)
    }

    /// Register new equipment
    ///
    /// The registration date is the server's current date.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if name, description, or image URL is empty
    pub async fn create(
        &self,
        input: CreateEquipmentInput,
    ) -> Result<Equipment, EquipmentServiceError> {
        if input.name.trim().is_empty()
            || input.description.trim().is_empty()
            || input.image_url.trim().is_empty()
        {
            return Err(EquipmentServiceError::ValidationError(
                "Name, description and image URL are required".to_string(),
            ));
        }

        let created = self
            .repo
            .create(&input, Utc::now().date_naive())
            .await
            .context("Failed to create equipment")?;

        Ok(created)
    }

    /// Replace an equipment item's fields
    ///
    /// This is a full replacement: every field except the registration date
    /// must be supplied, and all of them are overwritten.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if any field is missing or empty
    /// - `NotFound` if no equipment has that id
    pub async fn update(
        &self,
        id: i64,
        input: UpdateEquipmentInput,
    ) -> Result<Equipment, EquipmentServiceError> {
        let active = validate_update_input(&input)?;

        let existing = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get equipment")?
            .ok_or(EquipmentServiceError::NotFound)?;

        let replacement = Equipment {
            id,
            name: input.name,
            description: input.description,
            image_url: input.image_url,
            active,
            created_on: existing.created_on,
        };

        let updated = self
            .repo
            .update(&replacement)
            .await
            .context("Failed to update equipment")?;
        if !updated {
            return Err(EquipmentServiceError::NotFound);
        }

        Ok(replacement)
    }

    /// Delete an equipment item and all of its comments
    ///
    /// Both deletions happen in one transaction.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no equipment has that id
    pub async fn delete(&self, id: i64) -> Result<(), EquipmentServiceError> {
        let deleted = self
            .repo
            .delete_with_comments(id)
            .await
            .context("Failed to delete equipment")?;
        if !deleted {
            return Err(EquipmentServiceError::NotFound);
        }

        Ok(())
    }
}

/// Validate a full-replacement update, returning the active flag
fn validate_update_input(input: &UpdateEquipmentInput) -> Result<bool, EquipmentServiceError> {
    let message = "Name, description, image URL and active flag are required";

    let active = input
        .active
        .ok_or_else(|| EquipmentServiceError::ValidationError(message.to_string()))?;

    if input.name.trim().is_empty()
        || input.description.trim().is_empty()
        || input.image_url.trim().is_empty()
    {
        return Err(EquipmentServiceError::ValidationError(message.to_string()));
    }

    Ok(active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxEquipmentRepository;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup_test_service() -> (DynDatabasePool, EquipmentService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let repo = SqlxEquipmentRepository::boxed(pool.clone());
        let service = EquipmentService::new(repo);

        (pool, service)
    }

    fn drill_press() -> CreateEquipmentInput {
        CreateEquipmentInput::new(
            "Drill press",
            "Bench drill press, 16mm chuck",
            "https://img.example.com/drill.jpg",
        )
    }

    #[tokio::test]
    async fn test_create_sets_defaults() {
        let (_pool, service) = setup_test_service().await;

        let created = service
            .create(drill_press())
            .await
            .expect("Failed to create equipment");

        assert!(created.id > 0);
        assert!(created.active);
        assert_eq!(created.created_on, Utc::now().date_naive());

        let found = service
            .get_by_id(created.id)
            .await
            .expect("Failed to get equipment");
        assert_eq!(found.name, "Drill press");
        assert!(found.active);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let (_pool, service) = setup_test_service().await;

        for input in [
            CreateEquipmentInput::new("", "desc", "https://img.example.com/x.jpg"),
            CreateEquipmentInput::new("Name", "   ", "https://img.example.com/x.jpg"),
            CreateEquipmentInput::new("Name", "desc", ""),
        ] {
            let result = service.create(input).await;
            assert!(matches!(
                result,
                Err(EquipmentServiceError::ValidationError(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let (_pool, service) = setup_test_service().await;

        let result = service.get_by_id(999).await;
        assert!(matches!(result, Err(EquipmentServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (_pool, service) = setup_test_service().await;

        let first = service
            .create(drill_press())
            .await
            .expect("Failed to create equipment");
        let second = service
            .create(CreateEquipmentInput::new(
                "Angle grinder",
                "115mm angle grinder",
                "https://img.example.com/grinder.jpg",
            ))
            .await
            .expect("Failed to create equipment");

        let list = service.list().await.expect("Failed to list");
        assert_eq!(list.len(), 2);
        // Same-day rows come back in reverse insertion order
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].id, first.id);
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let (_pool, service) = setup_test_service().await;

        let created = service
            .create(drill_press())
            .await
            .expect("Failed to create equipment");

        let updated = service
            .update(
                created.id,
                UpdateEquipmentInput {
                    name: "Drill press (rebuilt)".to_string(),
                    description: "Rebuilt spindle".to_string(),
                    image_url: "https://img.example.com/drill2.jpg".to_string(),
                    active: Some(false),
                },
            )
            .await
            .expect("Failed to update equipment");

        assert_eq!(updated.name, "Drill press (rebuilt)");
        assert!(!updated.active);
        assert_eq!(updated.created_on, created.created_on);

        let found = service
            .get_by_id(created.id)
            .await
            .expect("Failed to get equipment");
        assert_eq!(found.description, "Rebuilt spindle");
        assert!(!found.active);
    }

    #[tokio::test]
    async fn test_update_requires_all_fields() {
        let (_pool, service) = setup_test_service().await;

        let created = service
            .create(drill_press())
            .await
            .expect("Failed to create equipment");

        // Missing active flag
        let result = service
            .update(
                created.id,
                UpdateEquipmentInput {
                    name: "Name".to_string(),
                    description: "desc".to_string(),
                    image_url: "https://img.example.com/x.jpg".to_string(),
                    active: None,
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(EquipmentServiceError::ValidationError(_))
        ));

        // Empty name
        let result = service
            .update(
                created.id,
                UpdateEquipmentInput {
                    name: "".to_string(),
                    description: "desc".to_string(),
                    image_url: "https://img.example.com/x.jpg".to_string(),
                    active: Some(true),
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(EquipmentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_equipment() {
        let (_pool, service) = setup_test_service().await;

        let result = service
            .update(
                999,
                UpdateEquipmentInput {
                    name: "Name".to_string(),
                    description: "desc".to_string(),
                    image_url: "https://img.example.com/x.jpg".to_string(),
                    active: Some(true),
                },
            )
            .await;
        assert!(matches!(result, Err(EquipmentServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_validation_runs_before_existence_check() {
        let (_pool, service) = setup_test_service().await;

        // Invalid input against a missing row reports the validation error
        let result = service
            .update(
                999,
                UpdateEquipmentInput {
                    name: "".to_string(),
                    description: "".to_string(),
                    image_url: "".to_string(),
                    active: None,
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(EquipmentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let (_pool, service) = setup_test_service().await;

        let created = service
            .create(drill_press())
            .await
            .expect("Failed to create equipment");

        service
            .delete(created.id)
            .await
            .expect("Failed to delete equipment");

        let result = service.get_by_id(created.id).await;
        assert!(matches!(result, Err(EquipmentServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_missing_equipment() {
        let (_pool, service) = setup_test_service().await;

        let result = service.delete(999).await;
        assert!(matches!(result, Err(EquipmentServiceError::NotFound)));
    }
}
