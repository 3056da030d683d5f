// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements run on tokio-rusqlite's single background thread, so the
//! conditional aggregate update and the review insert never interleave with
//! another writer. Do NOT open additional connections for writes.

use std::time::Duration;

use tracing::debug;

use trailhead_config::model::StorageConfig;
use trailhead_core::TrailheadError;

use crate::migrations::run_migrations;

/// Handle to the review database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` in WAL mode.
    pub async fn open(path: &str) -> Result<Self, TrailheadError> {
        let config = StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        };
        Self::open_with(&config).await
    }

    /// Opens the database described by `config` and applies migrations.
    pub async fn open_with(config: &StorageConfig) -> Result<Self, TrailheadError> {
        let conn = tokio_rusqlite::Connection::open(&config.database_path)
            .await
            .map_err(TrailheadError::store)?;
        let db = Self { conn };
        db.prepare(config.wal_mode).await?;
        debug!(path = %config.database_path, wal = config.wal_mode, "database opened");
        Ok(db)
    }

    /// Private in-memory database, used by tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, TrailheadError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(TrailheadError::store)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), TrailheadError> {
        let applied = self
            .conn
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                if wal_mode {
                    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                        row.get::<_, String>(0)
                    })?;
                    conn.pragma_update(None, "synchronous", "NORMAL")?;
                }
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.busy_timeout(Duration::from_secs(5))?;
                run_migrations(conn)
            })
            .await
            .map_err(map_tr_err)?;
        if applied > 0 {
            debug!(applied, "migrations applied");
        }
        Ok(())
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(self) -> Result<(), TrailheadError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(TrailheadError::store)
    }
}

/// Maps tokio-rusqlite failures into the store error.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> TrailheadError {
    TrailheadError::store(e)
}
