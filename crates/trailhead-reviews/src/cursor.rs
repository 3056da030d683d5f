// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opaque pagination cursor.
//!
//! Encodes the `(created_at, id)` key of the last review on a page as
//! URL-safe base64, so callers can pass it around as a plain token.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::DateTime;
use serde::{Deserialize, Serialize};

use trailhead_core::{PageKey, ReviewId, TrailheadError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn from_key(key: &PageKey) -> Self {
        let raw = format!("{}:{}", key.created_at.timestamp_micros(), key.id.0);
        Self(URL_SAFE_NO_PAD.encode(raw.as_bytes()))
    }

    /// Validates a token received from a caller.
    pub fn parse(token: &str) -> Result<Self, TrailheadError> {
        let cursor = Self(token.trim().to_string());
        cursor.key()?;
        Ok(cursor)
    }

    /// The page key this cursor points at.
    pub fn key(&self) -> Result<PageKey, TrailheadError> {
        let invalid = || TrailheadError::InvalidCursor(self.0.clone());

        let bytes = URL_SAFE_NO_PAD.decode(&self.0).map_err(|_| invalid())?;
        let raw = String::from_utf8(bytes).map_err(|_| invalid())?;
        let (micros, id) = raw.split_once(':').ok_or_else(invalid)?;
        let micros: i64 = micros.parse().map_err(|_| invalid())?;
        if id.is_empty() {
            return Err(invalid());
        }
        let created_at = DateTime::from_timestamp_micros(micros).ok_or_else(invalid)?;

        Ok(PageKey {
            created_at,
            id: ReviewId(id.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
