//! Equipment repository
//!
//! Database operations for the equipment catalog.
//!
//! This module provides:
//! - `EquipmentRepository` trait defining the interface for catalog access
//! - `SqlxEquipmentRepository` implementing the trait for SQLite and MySQL
//!
//! Deleting equipment also removes its comments; both deletions run inside
//! a single transaction so a failure leaves the catalog untouched.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateEquipmentInput, Equipment};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Equipment repository trait
#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    /// Create a new equipment row, returning it with its assigned id
    async fn create(&self, input: &CreateEquipmentInput, created_on: NaiveDate)
        -> Result<Equipment>;

    /// List all equipment, newest first
    async fn list(&self) -> Result<Vec<Equipment>>;

    /// Get equipment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Equipment>>;

    /// Check whether an equipment row exists
    async fn exists(&self, id: i64) -> Result<bool>;

    /// Replace the mutable fields of an equipment row.
    ///
    /// `created_on` is never written. Returns false when the row is absent.
    async fn update(&self, equipment: &Equipment) -> Result<bool>;

    /// Delete an equipment row together with its comments, atomically.
    ///
    /// Returns false when the row is absent (nothing is deleted).
    async fn delete_with_comments(&self, id: i64) -> Result<bool>;
}

/// SQLx-based equipment repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxEquipmentRepository {
    pool: DynDatabasePool,
}

impl SqlxEquipmentRepository {
    /// Create a new SQLx equipment repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn EquipmentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl EquipmentRepository for SqlxEquipmentRepository {
    async fn create(
        &self,
        input: &CreateEquipmentInput,
        created_on: NaiveDate,
    ) -> Result<Equipment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_equipment_sqlite(self.pool.as_sqlite().unwrap(), input, created_on).await
            }
            DatabaseDriver::Mysql => {
                create_equipment_mysql(self.pool.as_mysql().unwrap(), input, created_on).await
            }
        }
    }

    async fn list(&self) -> Result<Vec<Equipment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_equipment_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_equipment_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Equipment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_equipment_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_equipment_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                equipment_exists_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => equipment_exists_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn update(&self, equipment: &Equipment) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_equipment_sqlite(self.pool.as_sqlite().unwrap(), equipment).await
            }
            DatabaseDriver::Mysql => {
                update_equipment_mysql(self.pool.as_mysql().unwrap(), equipment).await
            }
        }
    }

    async fn delete_with_comments(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_equipment_with_comments_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                delete_equipment_with_comments_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_equipment_sqlite(
    pool: &SqlitePool,
    input: &CreateEquipmentInput,
    created_on: NaiveDate,
) -> Result<Equipment> {
    let result = sqlx::query(
        r#"
        INSERT INTO equipment (name, description, image_url, active, created_on)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.image_url)
    .bind(input.active)
    .bind(created_on)
    .execute(pool)
    .await
    .context("Failed to create equipment")?;

    let id = result.last_insert_rowid();

    Ok(Equipment {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
        image_url: input.image_url.clone(),
        active: input.active,
        created_on,
    })
}

async fn list_equipment_sqlite(pool: &SqlitePool) -> Result<Vec<Equipment>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, description, image_url, active, created_on
        FROM equipment
        ORDER BY created_on DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list equipment")?;

    Ok(rows.iter().map(row_to_equipment_sqlite).collect())
}

async fn get_equipment_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Equipment>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, description, image_url, active, created_on
        FROM equipment
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get equipment by ID")?;

    Ok(row.as_ref().map(row_to_equipment_sqlite))
}

async fn equipment_exists_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let row = sqlx::query("SELECT id FROM equipment WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to check equipment existence")?;

    Ok(row.is_some())
}

async fn update_equipment_sqlite(pool: &SqlitePool, equipment: &Equipment) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE equipment
        SET name = ?, description = ?, image_url = ?, active = ?
        WHERE id = ?
        "#,
    )
    .bind(&equipment.name)
    .bind(&equipment.description)
    .bind(&equipment.image_url)
    .bind(equipment.active)
    .bind(equipment.id)
    .execute(pool)
    .await
    .context("Failed to update equipment")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_equipment_with_comments_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to start delete transaction")?;

    sqlx::query("DELETE FROM comments WHERE equipment_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete comments for equipment")?;

    let result = sqlx::query("DELETE FROM equipment WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete equipment")?;

    tx.commit()
        .await
        .context("Failed to commit delete transaction")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_equipment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Equipment {
    Equipment {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        active: row.get("active"),
        created_on: row.get("created_on"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_equipment_mysql(
    pool: &MySqlPool,
    input: &CreateEquipmentInput,
    created_on: NaiveDate,
) -> Result<Equipment> {
    let result = sqlx::query(
        r#"
        INSERT INTO equipment (name, description, image_url, active, created_on)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.image_url)
    .bind(input.active)
    .bind(created_on)
    .execute(pool)
    .await
    .context("Failed to create equipment")?;

    let id = result.last_insert_id() as i64;

    Ok(Equipment {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
        image_url: input.image_url.clone(),
        active: input.active,
        created_on,
    })
}

async fn list_equipment_mysql(pool: &MySqlPool) -> Result<Vec<Equipment>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, description, image_url, active, created_on
        FROM equipment
        ORDER BY created_on DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list equipment")?;

    Ok(rows.iter().map(row_to_equipment_mysql).collect())
}

async fn get_equipment_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Equipment>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, description, image_url, active, created_on
        FROM equipment
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get equipment by ID")?;

    Ok(row.as_ref().map(row_to_equipment_mysql))
}

async fn equipment_exists_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let row = sqlx::query("SELECT id FROM equipment WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to check equipment existence")?;

    Ok(row.is_some())
}

async fn update_equipment_mysql(pool: &MySqlPool, equipment: &Equipment) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE equipment
        SET name = ?, description = ?, image_url = ?, active = ?
        WHERE id = ?
        "#,
    )
    .bind(&equipment.name)
    .bind(&equipment.description)
    .bind(&equipment.image_url)
    .bind(equipment.active)
    .bind(equipment.id)
    .execute(pool)
    .await
    .context("Failed to update equipment")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_equipment_with_comments_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to start delete transaction")?;

    sqlx::query("DELETE FROM comments WHERE equipment_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete comments for equipment")?;

    let result = sqlx::query("DELETE FROM equipment WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete equipment")?;

    tx.commit()
        .await
        .context("Failed to commit delete transaction")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_equipment_mysql(row: &sqlx::mysql::MySqlRow) -> Equipment {
    Equipment {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        active: row.get("active"),
        created_on: row.get("created_on"),
    }
}
