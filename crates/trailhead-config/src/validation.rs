// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as ordered price bounds, page size limits, and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::TrailheadConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TrailheadConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.log.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let search = &config.search;
    if !search.min_price.is_finite() || search.min_price < 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "search.min_price must be a non-negative number, got {}",
                search.min_price
            ),
        });
    }
    if !search.max_price.is_finite() || search.max_price <= search.min_price {
        errors.push(ConfigError::Validation {
            message: format!(
                "search.max_price must be greater than search.min_price ({}), got {}",
                search.min_price, search.max_price
            ),
        });
    }

    let reviews = &config.reviews;
    if reviews.max_page_size == 0 {
        errors.push(ConfigError::Validation {
            message: "reviews.max_page_size must be at least 1".to_string(),
        });
    }
    if reviews.page_size == 0 || reviews.page_size > reviews.max_page_size {
        errors.push(ConfigError::Validation {
            message: format!(
                "reviews.page_size must be between 1 and reviews.max_page_size ({}), got {}",
                reviews.max_page_size, reviews.page_size
            ),
        });
    }
    if reviews.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "reviews.max_attempts must be at least 1".to_string(),
        });
    }
    if reviews.max_comment_chars == 0 {
        errors.push(ConfigError::Validation {
            message: "reviews.max_comment_chars must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
