// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./trailhead.toml` > `~/.config/trailhead/trailhead.toml` >
//! `/etc/trailhead/trailhead.toml` with environment variable overrides via `TRAILHEAD_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TrailheadConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/trailhead/trailhead.toml` (system-wide)
/// 3. `~/.config/trailhead/trailhead.toml` (user XDG config)
/// 4. `./trailhead.toml` (local directory)
/// 5. `TRAILHEAD_*` environment variables
pub fn load_config() -> Result<TrailheadConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TrailheadConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TrailheadConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TrailheadConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TrailheadConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TrailheadConfig::default()))
        .merge(Toml::file("/etc/trailhead/trailhead.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("trailhead/trailhead.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("trailhead.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `TRAILHEAD_REVIEWS_PAGE_SIZE` must map to `reviews.page_size`,
/// not `reviews.page.size`.
fn env_provider() -> Env {
    Env::prefixed("TRAILHEAD_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: &[&str] = &["log", "storage", "search", "reviews"];
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_first_underscore_only() {
        assert_eq!(map_env_key("reviews_page_size"), "reviews.page_size");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(map_env_key("search_facet_source"), "search.facet_source");
        assert_eq!(map_env_key("log_level"), "log.level");
    }

    #[test]
    fn unknown_section_is_left_alone() {
        assert_eq!(map_env_key("unrelated_key"), "unrelated_key");
    }
}
