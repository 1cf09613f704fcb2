//! Comment repository
//!
//! Database operations for equipment comments. Reads join the author's
//! login and profile name so callers can render and authorize a comment
//! without a second lookup.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentWithAuthor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment, returning it with its assigned id
    async fn create(
        &self,
        text: &str,
        created_on: NaiveDate,
        user_id: i64,
        equipment_id: i64,
    ) -> Result<Comment>;

    /// List the comments on one equipment item, newest first
    async fn list_for_equipment(&self, equipment_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Get a comment by ID, with its author
    async fn get_by_id(&self, id: i64) -> Result<Option<CommentWithAuthor>>;

    /// Replace a comment's text. Returns false when the row is absent.
    async fn update_text(&self, id: i64, text: &str) -> Result<bool>;

    /// Delete a comment. Returns false when the row is absent.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based comment repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(
        &self,
        text: &str,
        created_on: NaiveDate,
        user_id: i64,
        equipment_id: i64,
    ) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_comment_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    text,
                    created_on,
                    user_id,
                    equipment_id,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                create_comment_mysql(
                    self.pool.as_mysql().unwrap(),
                    text,
                    created_on,
                    user_id,
                    equipment_id,
                )
                .await
            }
        }
    }

    async fn list_for_equipment(&self, equipment_id: i64) -> Result<Vec<CommentWithAuthor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_comments_sqlite(self.pool.as_sqlite().unwrap(), equipment_id).await
            }
            DatabaseDriver::Mysql => {
                list_comments_mysql(self.pool.as_mysql().unwrap(), equipment_id).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<CommentWithAuthor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_comment_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => get_comment_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_comment_text_sqlite(self.pool.as_sqlite().unwrap(), id, text).await
            }
            DatabaseDriver::Mysql => {
                update_comment_text_mysql(self.pool.as_mysql().unwrap(), id, text).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_comment_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => delete_comment_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

const COMMENT_WITH_AUTHOR_SELECT: &str = r#"
    SELECT c.id, c.text, c.created_on, c.user_id, c.equipment_id,
           u.login AS author_login, p.name AS author_profile
    FROM comments c
    JOIN users u ON c.user_id = u.id
    JOIN profiles p ON u.profile_id = p.id
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_comment_sqlite(
    pool: &SqlitePool,
    text: &str,
    created_on: NaiveDate,
    user_id: i64,
    equipment_id: i64,
) -> Result<Comment> {
    let result = sqlx::query(
        r#"
        INSERT INTO comments (text, created_on, user_id, equipment_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(text)
    .bind(created_on)
    .bind(user_id)
    .bind(equipment_id)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        text: text.to_string(),
        created_on,
        user_id,
        equipment_id,
    })
}

async fn list_comments_sqlite(
    pool: &SqlitePool,
    equipment_id: i64,
) -> Result<Vec<CommentWithAuthor>> {
    let sql = format!(
        "{COMMENT_WITH_AUTHOR_SELECT} WHERE c.equipment_id = ? ORDER BY c.created_on DESC, c.id DESC"
    );
    let rows = sqlx::query(&sql)
        .bind(equipment_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows.iter().map(row_to_comment_sqlite).collect())
}

async fn get_comment_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<CommentWithAuthor>> {
    let sql = format!("{COMMENT_WITH_AUTHOR_SELECT} WHERE c.id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment by ID")?;

    Ok(row.as_ref().map(row_to_comment_sqlite))
}

async fn update_comment_text_sqlite(pool: &SqlitePool, id: i64, text: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_comment_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> CommentWithAuthor {
    CommentWithAuthor {
        id: row.get("id"),
        text: row.get("text"),
        created_on: row.get("created_on"),
        user_id: row.get("user_id"),
        equipment_id: row.get("equipment_id"),
        author_login: row.get("author_login"),
        author_profile: row.get("author_profile"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_comment_mysql(
    pool: &MySqlPool,
    text: &str,
    created_on: NaiveDate,
    user_id: i64,
    equipment_id: i64,
) -> Result<Comment> {
    let result = sqlx::query(
        r#"
        INSERT INTO comments (text, created_on, user_id, equipment_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(text)
    .bind(created_on)
    .bind(user_id)
    .bind(equipment_id)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        text: text.to_string(),
        created_on,
        user_id,
        equipment_id,
    })
}

async fn list_comments_mysql(
    pool: &MySqlPool,
    equipment_id: i64,
) -> Result<Vec<CommentWithAuthor>> {
    let sql = format!(
        "{COMMENT_WITH_AUTHOR_SELECT} WHERE c.equipment_id = ? ORDER BY c.created_on DESC, c.id DESC"
    );
    let rows = sqlx::query(&sql)
        .bind(equipment_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows.iter().map(row_to_comment_mysql).collect())
}

async fn get_comment_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<CommentWithAuthor>> {
    let sql = format!("{COMMENT_WITH_AUTHOR_SELECT} WHERE c.id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment by ID")?;

    Ok(row.as_ref().map(row_to_comment_mysql))
}

async fn update_comment_text_mysql(pool: &MySqlPool, id: i64, text: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_comment_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> CommentWithAuthor {
    CommentWithAuthor {
        id: row.get("id"),
        text: row.get("text"),
        created_on: row.get("created_on"),
        user_id: row.get("user_id"),
        equipment_id: row.get("equipment_id"),
        author_login: row.get("author_login"),
        author_profile: row.get("author_profile"),
    }
}
