//! Database - r2d2 connection-pool wrapper
//!
//! Owns the pool, applies the base PRAGMA set on every connection and
//! bootstraps the schema on open.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use super::{init_schema, SqlitePool, SqlitePooledConnection};
use crate::error::{ApiError, ApiResult};

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file and initialize the schema.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create database directory {:?}", parent))?;
            }
        }

        let pool = Self::build_pool(db_path)?;

        {
            let conn = pool
                .get()
                .with_context(|| "failed to get a connection for schema init")?;
            init_schema(&conn).with_context(|| "schema initialization failed")?;
        }

        tracing::info!("[Database] Opened {:?}", db_path);
        Ok(Database { pool })
    }

    /// Get a pooled connection, mapped into the API error space.
    pub fn conn(&self) -> ApiResult<SqlitePooledConnection> {
        self.pool.get().map_err(ApiError::from)
    }

    fn build_pool(db_path: &Path) -> Result<SqlitePool> {
        let manager = SqliteConnectionManager::file(db_path).with_init(|c| {
            c.pragma_update(None, "foreign_keys", "ON")?;
            c.pragma_update(None, "journal_mode", "WAL")?;
            c.pragma_update(None, "synchronous", "NORMAL")?;
            // Fail fast instead of waiting on a write lock without bound.
            c.pragma_update(None, "busy_timeout", 3000i64)?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(15)
            .min_idle(Some(2))
            .connection_timeout(Duration::from_secs(10))
            .build(manager)
            .with_context(|| format!("failed to build connection pool for {:?}", db_path))?;

        Ok(pool)
    }
}
