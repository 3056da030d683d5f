// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion boundary for loosely-typed upstream listing records.
//!
//! Upstream data arrives as JSON with optional, inconsistently named and
//! inconsistently typed fields. Everything is coerced here so the matcher and
//! ranker can treat [`Listing`] fields as always present. A single bad record
//! is skipped, never allowed to fail the whole batch.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use trailhead_core::types::round_to_tenth;
use trailhead_core::{Category, Listing, ListingId, TrailheadError};

/// A listing record exactly as the upstream store hands it over.
///
/// Upstream spells several fields more than one way and some records carry
/// two spellings at once, so every spelling gets its own slot and
/// [`normalize`] picks the first one present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawListing {
    pub id: Option<Value>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub profession: Option<String>,
    pub location: Option<String>,
    pub price: Option<Value>,
    pub is_free: Option<bool>,
    #[serde(rename = "isFree")]
    pub is_free_camel: Option<bool>,
    pub rating: Option<Value>,
    pub review_count: Option<Value>,
    #[serde(rename = "reviewCount")]
    pub review_count_camel: Option<Value>,
    pub amenities: Option<Value>,
    pub distance: Option<Value>,
}

/// Why a raw record could not become a [`Listing`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("record has no id")]
    MissingId,
    #[error("record {id} has no category")]
    MissingCategory { id: String },
    #[error("record {id} has unknown category `{category}`")]
    UnknownCategory { id: String, category: String },
}

/// Converts one raw record into a validated listing.
pub fn normalize(raw: RawListing) -> Result<Listing, RejectReason> {
    let id = raw
        .id
        .as_ref()
        .and_then(value_as_text)
        .ok_or(RejectReason::MissingId)?;

    let category = first_text([&raw.category, &raw.kind, &raw.profession]);
    let category = match category {
        None => return Err(RejectReason::MissingCategory { id }),
        Some(name) => Category::from_str(name).map_err(|_| RejectReason::UnknownCategory {
            id: id.clone(),
            category: name.to_string(),
        })?,
    };

    let (price_amount, is_free) = if raw.is_free.or(raw.is_free_camel) == Some(true) {
        (0.0, true)
    } else {
        coerce_price(raw.price.as_ref())
    };

    Ok(Listing {
        id: ListingId(id),
        title: first_text([&raw.title, &raw.name])
            .map(str::to_string)
            .unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        category,
        location: raw.location.map(|l| l.trim().to_string()).unwrap_or_default(),
        price_amount,
        is_free,
        rating: coerce_rating(raw.rating.as_ref()),
        review_count: coerce_count(raw.review_count.as_ref().or(raw.review_count_camel.as_ref())),
        amenities: coerce_amenities(raw.amenities.as_ref()),
        distance: raw.distance.as_ref().and_then(value_as_text),
    })
}

/// First non-blank value among alternative spellings, trimmed.
fn first_text<const N: usize>(candidates: [&Option<String>; N]) -> Option<&str> {
    candidates
        .into_iter()
        .filter_map(|c| c.as_deref().map(str::trim))
        .find(|c| !c.is_empty())
}

/// Normalizes a batch, logging and dropping records that cannot be used.
pub fn ingest(raws: impl IntoIterator<Item = RawListing>) -> Vec<Listing> {
    raws.into_iter()
        .filter_map(|raw| match normalize(raw) {
            Ok(listing) => Some(listing),
            Err(reason) => {
                warn!(%reason, "skipping listing record");
                None
            }
        })
        .collect()
}

/// Parses a JSON array of listing records.
///
/// Only a document that is not a JSON array is an error. Elements that are
/// not objects, or that fail [`normalize`], are skipped.
pub fn ingest_json(text: &str) -> Result<Vec<Listing>, TrailheadError> {
    let values: Vec<Value> = serde_json::from_str(text)
        .map_err(|e| TrailheadError::validation("listings", e.to_string()))?;
    let total = values.len();

    let raws = values.into_iter().enumerate().filter_map(|(index, value)| {
        match serde_json::from_value::<RawListing>(value) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed listing record");
                None
            }
        }
    });
    let listings = ingest(raws);
    debug!(total, kept = listings.len(), "ingested listings");
    Ok(listings)
}

/// Parses a price that may be a number, a numeric string with currency
/// symbols and separators, or the literal `"Free"`.
///
/// Returns `(amount, is_free)`. Anything unparseable is `0.0`.
pub fn coerce_price(value: Option<&Value>) -> (f64, bool) {
    match value {
        Some(Value::Number(n)) => (non_negative(n.as_f64().unwrap_or(0.0)), false),
        Some(Value::String(s)) => {
            if s.trim().eq_ignore_ascii_case("free") {
                (0.0, true)
            } else {
                (non_negative(parse_numeric_text(s).unwrap_or(0.0)), false)
            }
        }
        _ => (0.0, false),
    }
}

fn coerce_rating(value: Option<&Value>) -> f64 {
    let rating = value.and_then(value_as_f64).unwrap_or(0.0);
    round_to_tenth(rating.clamp(0.0, 5.0))
}

fn coerce_count(value: Option<&Value>) -> u32 {
    value
        .and_then(value_as_f64)
        .map(|n| n.clamp(0.0, f64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

/// Accepts an array of strings or a single comma-separated string.
fn coerce_amenities(value: Option<&Value>) -> BTreeSet<String> {
    let items: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(value_as_text).collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    items
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}

fn value_as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_text(s),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Reads the first number in `text`, skipping currency prefixes and
/// thousands separators (`"₹2,500 / night"` -> `2500`, `"4.5/5"` -> `4.5`).
///
/// A `.` only counts as a decimal point between two digits, so the dot in
/// `"Rs. 1500"` is not part of the number. Anything after the first number,
/// such as the upper end of `"₹2,500 - ₹3,000"`, is ignored.
fn parse_numeric_text(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let mut chars = text[start..].chars().peekable();
    let mut number = String::new();
    let mut seen_point = false;
    while let Some(c) = chars.next() {
        let digit_follows = chars.peek().is_some_and(char::is_ascii_digit);
        match c {
            '0'..='9' => number.push(c),
            ',' if digit_follows => {}
            '.' if digit_follows && !seen_point => {
                seen_point = true;
                number.push(c);
            }
            _ => break,
        }
    }
    number.parse::<f64>().ok()
}

fn non_negative(n: f64) -> f64 {
    if n.is_finite() && n > 0.0 { n } else { 0.0 }
}
