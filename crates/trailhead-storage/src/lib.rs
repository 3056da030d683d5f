// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite review store for Trailhead.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and the [`trailhead_core::ReviewStore`]
//! primitives: monotonic review timestamps, keyset pagination over
//! `(created_at desc, id desc)`, and an atomic append with a conditional
//! aggregate update.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteReviewStore;
pub use database::Database;
