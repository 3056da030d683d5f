// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review documents: the atomic append and the keyset page query.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use trailhead_core::{
    AppendOutcome, ListingId, NewReview, PageKey, RatingAggregate, ReviewDocument, ReviewId,
    TrailheadError,
};

use crate::database::{Database, map_tr_err};

/// What happened inside the append transaction.
enum AppendStep {
    Committed(ReviewDocument),
    Conflict(RatingAggregate),
    UnknownListing,
}

/// Inserts `review` and swaps the listing aggregate from `expected` to
/// `next` in one transaction.
///
/// The aggregate update is conditional on the stored `review_count` still
/// equalling `expected.review_count`. When it does not, the transaction is
/// rolled back and the current aggregate is returned as a conflict.
pub async fn append(
    db: &Database,
    review: NewReview,
    expected: RatingAggregate,
    next: RatingAggregate,
) -> Result<AppendOutcome, TrailheadError> {
    let listing_id = review.listing_id.0.clone();
    let step = db
        .connection()
        .call(move |conn| -> Result<AppendStep, rusqlite::Error> {
            let tx = conn.transaction()?;
            let now = Utc::now().timestamp_micros();

            let swapped = tx.execute(
                "UPDATE listing_aggregates
                 SET star_total = ?1, review_count = ?2, updated_at = ?3
                 WHERE listing_id = ?4 AND review_count = ?5",
                params![
                    next.star_total,
                    next.review_count,
                    now,
                    review.listing_id.0,
                    expected.review_count
                ],
            )?;

            if swapped == 0 {
                let current = tx
                    .query_row(
                        "SELECT star_total, review_count FROM listing_aggregates WHERE listing_id = ?1",
                        params![review.listing_id.0],
                        |row| {
                            Ok(RatingAggregate {
                                star_total: row.get(0)?,
                                review_count: row.get(1)?,
                            })
                        },
                    )
                    .optional()?;
                // Dropping `tx` rolls back.
                return Ok(match current {
                    Some(current) => AppendStep::Conflict(current),
                    None => AppendStep::UnknownListing,
                });
            }

            let last: Option<i64> = tx.query_row(
                "SELECT MAX(created_at) FROM reviews WHERE listing_id = ?1",
                params![review.listing_id.0],
                |row| row.get(0),
            )?;
            let created_micros = next_timestamp(now, last);
            let id = Uuid::new_v4().to_string();

            tx.execute(
                "INSERT INTO reviews (id, listing_id, author_display_name, rating, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    review.listing_id.0,
                    review.author_display_name,
                    review.rating,
                    review.comment,
                    created_micros
                ],
            )?;
            tx.commit()?;

            Ok(AppendStep::Committed(ReviewDocument {
                id: ReviewId(id),
                listing_id: review.listing_id,
                author_display_name: review.author_display_name,
                rating: review.rating,
                comment: review.comment,
                created_at: micros_to_datetime(created_micros)?,
            }))
        })
        .await
        .map_err(map_tr_err)?;

    match step {
        AppendStep::Committed(doc) => Ok(AppendOutcome::Committed(doc)),
        AppendStep::Conflict(current) => Ok(AppendOutcome::Conflict { current }),
        AppendStep::UnknownListing => Err(TrailheadError::ListingNotFound(listing_id)),
    }
}

/// Up to `limit` reviews in `(created_at desc, id desc)` order, strictly
/// after `after` when given.
pub async fn page(
    db: &Database,
    listing_id: &ListingId,
    after: Option<&PageKey>,
    limit: usize,
) -> Result<Vec<ReviewDocument>, TrailheadError> {
    let listing = listing_id.0.clone();
    let after = after.map(|key| (key.created_at.timestamp_micros(), key.id.0.clone()));
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    db.connection()
        .call(move |conn| -> Result<Vec<ReviewDocument>, rusqlite::Error> {
            let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<ReviewDocument> {
                Ok(ReviewDocument {
                    id: ReviewId(row.get(0)?),
                    listing_id: ListingId(row.get(1)?),
                    author_display_name: row.get(2)?,
                    rating: row.get(3)?,
                    comment: row.get(4)?,
                    created_at: micros_to_datetime(row.get(5)?)?,
                })
            };

            match after {
                Some((micros, id)) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, listing_id, author_display_name, rating, comment, created_at
                         FROM reviews
                         WHERE listing_id = ?1
                           AND (created_at < ?2 OR (created_at = ?2 AND id < ?3))
                         ORDER BY created_at DESC, id DESC
                         LIMIT ?4",
                    )?;
                    let rows = stmt.query_map(params![listing, micros, id, limit], map_row)?;
                    rows.collect()
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, listing_id, author_display_name, rating, comment, created_at
                         FROM reviews
                         WHERE listing_id = ?1
                         ORDER BY created_at DESC, id DESC
                         LIMIT ?2",
                    )?;
                    let rows = stmt.query_map(params![listing, limit], map_row)?;
                    rows.collect()
                }
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Number of review documents stored for a listing.
pub async fn count(db: &Database, listing_id: &ListingId) -> Result<u64, TrailheadError> {
    let listing = listing_id.0.clone();
    let n = db
        .connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM reviews WHERE listing_id = ?1",
                params![listing],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(u64::try_from(n).unwrap_or(0))
}

/// Strictly later than `last`, and no earlier than `now`.
fn next_timestamp(now: i64, last: Option<i64>) -> i64 {
    match last {
        Some(last) if last >= now => last + 1,
        _ => now,
    }
}

fn micros_to_datetime(micros: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros).ok_or(rusqlite::Error::IntegralValueOutOfRange(5, micros))
}
