// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary by
//! `embed_migrations!` and applied on every [`crate::Database`] open.

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Applies pending migrations and returns how many ran.
///
/// Refinery tracks applied versions in `refinery_schema_history`. Its errors
/// are carried as [`rusqlite::Error::UserFunctionError`] so this can run
/// inside a `tokio_rusqlite` call closure.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> rusqlite::Result<usize> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;
    Ok(report.applied_migrations().len())
}
