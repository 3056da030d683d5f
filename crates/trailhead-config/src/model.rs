// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Trailhead.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Trailhead configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrailheadConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Review store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Faceted search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Review submission and pagination settings.
    #[serde(default)]
    pub reviews: ReviewsConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Review store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "trailhead.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Which listing set the sidebar facet options are derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetSource {
    /// Every candidate passed in, before filtering. The sidebar shows the
    /// whole universe of choices.
    #[default]
    Candidates,
    /// Only the filtered results.
    Results,
}

/// Faceted search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Listing set used for facet option derivation.
    #[serde(default)]
    pub facet_source: FacetSource,

    /// Lower bound of the price slider. Also the default `min_price` filter.
    #[serde(default = "default_min_price")]
    pub min_price: f64,

    /// Upper bound of the price slider. Also the default `max_price` filter.
    #[serde(default = "default_max_price")]
    pub max_price: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            facet_source: FacetSource::default(),
            min_price: default_min_price(),
            max_price: default_max_price(),
        }
    }
}

fn default_min_price() -> f64 {
    0.0
}

fn default_max_price() -> f64 {
    100_000.0
}

/// Review submission and pagination configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewsConfig {
    /// Default number of reviews per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Larger page requests are clamped to this size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Attempts at the conditional aggregate update before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the second attempt; doubles on each further attempt.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum review comment length in characters.
    #[serde(default = "default_max_comment_chars")]
    pub max_comment_chars: usize,
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_comment_chars: default_max_comment_chars(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

fn default_max_page_size() -> usize {
    50
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    20
}

fn default_max_comment_chars() -> usize {
    2000
}
