// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stable result ordering.
//!
//! Every sort is a stable `sort_by`, so ties keep their incoming relative
//! order and re-sorting an already sorted list is a no-op.

use std::borrow::Borrow;
use std::cmp::Ordering;

use trailhead_core::Listing;

use crate::criteria::SortKey;

/// Sorts `listings` in place by `key`.
///
/// Generic over [`Borrow<Listing>`] so the engine can rank references into
/// the candidate set without cloning.
pub fn sort_listings<L: Borrow<Listing>>(listings: &mut [L], key: SortKey) {
    listings.sort_by(|a, b| compare(a.borrow(), b.borrow(), key));
}

/// Sorted copy of `listings`.
pub fn sorted(listings: &[Listing], key: SortKey) -> Vec<Listing> {
    let mut out = listings.to_vec();
    sort_listings(&mut out, key);
    out
}

fn compare(a: &Listing, b: &Listing, key: SortKey) -> Ordering {
    match key {
        SortKey::Popularity => b.review_count.cmp(&a.review_count),
        // `price_amount` is already 0 for free listings.
        SortKey::PriceAsc => a.price_amount.total_cmp(&b.price_amount),
        SortKey::PriceDesc => b.price_amount.total_cmp(&a.price_amount),
        SortKey::Rating => b.rating.total_cmp(&a.rating),
        SortKey::Distance => compare_distance(a, b),
    }
}

/// Descending by distance value; listings without a usable distance go last.
fn compare_distance(a: &Listing, b: &Listing) -> Ordering {
    match (distance_value(a), distance_value(b)) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Leading number of a textual distance such as `"12.5 km"` or `"3km away"`.
pub fn distance_value(listing: &Listing) -> Option<f64> {
    let text = listing.distance.as_deref()?.trim_start();
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(text.len());
    let digits: String = text[..end].chars().filter(|c| *c != ',').collect();
    digits.parse::<f64>().ok().filter(|n| n.is_finite())
}
