//! User repository
//!
//! Database operations for users.
//!
//! This module provides:
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite and MySQL
//!
//! Users are provisioned out-of-band (operator inserts or demo seeding),
//! so the write surface is intentionally small: the login path only needs
//! the code lookup.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateUserInput, User, UserWithProfile};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, input: &CreateUserInput) -> Result<User>;

    /// Find a user by access code, joined with the profile name.
    ///
    /// Codes are expected to be unique in practice; if two users share one,
    /// the lowest id wins.
    async fn find_by_code(&self, code: &str) -> Result<Option<UserWithProfile>>;

    /// Count all users
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based user repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, input: &CreateUserInput) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_user_sqlite(self.pool.as_sqlite().unwrap(), input).await
            }
            DatabaseDriver::Mysql => create_user_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UserWithProfile>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                find_user_by_code_sqlite(self.pool.as_sqlite().unwrap(), code).await
            }
            DatabaseDriver::Mysql => {
                find_user_by_code_mysql(self.pool.as_mysql().unwrap(), code).await
            }
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_users_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_users_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, input: &CreateUserInput) -> Result<User> {
    let result = sqlx::query("INSERT INTO users (login, code, profile_id) VALUES (?, ?, ?)")
        .bind(&input.login)
        .bind(&input.code)
        .bind(input.profile_id)
        .execute(pool)
        .await
        .context("Failed to create user")?;

    let id = result.last_insert_rowid();

    Ok(User {
        id,
        login: input.login.clone(),
        code: input.code.clone(),
        profile_id: input.profile_id,
    })
}

async fn find_user_by_code_sqlite(pool: &SqlitePool, code: &str) -> Result<Option<UserWithProfile>> {
    let row = sqlx::query(
        r#"
        SELECT u.id, u.login, p.name AS profile_name
        FROM users u
        JOIN profiles p ON u.profile_id = p.id
        WHERE u.code = ?
        ORDER BY u.id
        LIMIT 1
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await
    .context("Failed to find user by code")?;

    match row {
        Some(row) => Ok(Some(row_to_user_with_profile_sqlite(&row))),
        None => Ok(None),
    }
}

async fn count_users_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

fn row_to_user_with_profile_sqlite(row: &sqlx::sqlite::SqliteRow) -> UserWithProfile {
    UserWithProfile {
        id: row.get("id"),
        login: row.get("login"),
        profile_name: row.get("profile_name"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, input: &CreateUserInput) -> Result<User> {
    let result = sqlx::query("INSERT INTO users (login, code, profile_id) VALUES (?, ?, ?)")
        .bind(&input.login)
        .bind(&input.code)
        .bind(input.profile_id)
        .execute(pool)
        .await
        .context("Failed to create user")?;

    let id = result.last_insert_id() as i64;

    Ok(User {
        id,
        login: input.login.clone(),
        code: input.code.clone(),
        profile_id: input.profile_id,
    })
}

async fn find_user_by_code_mysql(pool: &MySqlPool, code: &str) -> Result<Option<UserWithProfile>> {
    let row = sqlx::query(
        r#"
        SELECT u.id, u.login, p.name AS profile_name
        FROM users u
        JOIN profiles p ON u.profile_id = p.id
        WHERE u.code = ?
        ORDER BY u.id
        LIMIT 1
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await
    .context("Failed to find user by code")?;

    match row {
        Some(row) => Ok(Some(row_to_user_with_profile_mysql(&row))),
        None => Ok(None),
    }
}

async fn count_users_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

fn row_to_user_with_profile_mysql(row: &sqlx::mysql::MySqlRow) -> UserWithProfile {
    UserWithProfile {
        id: row.get("id"),
        login: row.get("login"),
        profile_name: row.get("profile_name"),
    }
}
