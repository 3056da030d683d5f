// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller input checks. Every failure here happens before any store access.

use trailhead_core::TrailheadError;

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

/// Shown when an authenticated identity carries no display name.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

pub fn validate_rating(rating: u8) -> Result<u8, TrailheadError> {
    if (MIN_STARS..=MAX_STARS).contains(&rating) {
        Ok(rating)
    } else {
        Err(TrailheadError::validation(
            "rating",
            format!("must be between {MIN_STARS} and {MAX_STARS}, got {rating}"),
        ))
    }
}

/// Returns the trimmed comment.
pub fn validate_comment(comment: &str, max_chars: usize) -> Result<String, TrailheadError> {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Err(TrailheadError::validation("comment", "must not be empty"));
    }
    let chars = trimmed.chars().count();
    if chars > max_chars {
        return Err(TrailheadError::validation(
            "comment",
            format!("is {chars} characters, limit is {max_chars}"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Zero is rejected; anything above `max` is clamped down to it.
pub fn effective_page_size(requested: usize, max: usize) -> Result<usize, TrailheadError> {
    if requested == 0 {
        return Err(TrailheadError::validation("page_size", "must be at least 1"));
    }
    Ok(requested.min(max.max(1)))
}

pub fn author_name(display_name: &str) -> String {
    match display_name.trim() {
        "" => ANONYMOUS_AUTHOR.to_string(),
        name => name.to_string(),
    }
}
