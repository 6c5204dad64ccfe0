//! User repository

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use serde::Serialize;

use super::{DbPool, connection, parse_datetime};
use crate::{Error, Result};

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// User repository
#[derive(Clone)]
pub struct UserRepo {
    pool: DbPool,
}

impl UserRepo {
    /// Create a new user repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID (returns None if not found)
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find(&self, id: &str) -> Result<Option<User>> {
        let conn = connection(&self.pool)?;

        let user = conn
            .query_row(
                "SELECT id, username, created_at FROM users WHERE id = ?1",
                [id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        created_at: parse_datetime(&row.get::<_, String>(2)?),
                    })
                },
            )
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(user)
    }

    /// Create a user or rename an existing one
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank ID, or error if database operation fails
    pub fn upsert(&self, id: &str, username: &str) -> Result<User> {
        if id.trim().is_empty() {
            return Err(Error::Validation("user id must not be empty".to_string()));
        }

        let conn = connection(&self.pool)?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO users (id, username, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET username = excluded.username",
            rusqlite::params![id, username, now],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        drop(conn);
        self.find(id)?
            .ok_or_else(|| Error::Internal(format!("user {id} vanished after upsert")))
    }

    /// List all users
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list(&self) -> Result<Vec<User>> {
        let conn = connection(&self.pool)?;

        let mut stmt = conn
            .prepare("SELECT id, username, created_at FROM users ORDER BY id")
            .map_err(|e| Error::Database(e.to_string()))?;

        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(users)
    }
}
