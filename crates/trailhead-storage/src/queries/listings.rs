// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listing aggregate rows.

use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use trailhead_core::{ListingId, RatingAggregate, TrailheadError};

use crate::database::{Database, map_tr_err};

/// Inserts the aggregate row if the listing is not registered yet.
///
/// Returns `true` when a row was created. An existing aggregate is never
/// touched, which keeps repeated imports from clobbering review totals.
pub async fn register(
    db: &Database,
    listing_id: &ListingId,
    initial: RatingAggregate,
) -> Result<bool, TrailheadError> {
    let id = listing_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO listing_aggregates (listing_id, star_total, review_count, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    id,
                    initial.star_total,
                    initial.review_count,
                    Utc::now().timestamp_micros()
                ],
            )?;
            Ok(inserted == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Current aggregate, or `None` for an unregistered listing.
pub async fn get_aggregate(
    db: &Database,
    listing_id: &ListingId,
) -> Result<Option<RatingAggregate>, TrailheadError> {
    let id = listing_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<RatingAggregate>, rusqlite::Error> {
            conn.query_row(
                "SELECT star_total, review_count FROM listing_aggregates WHERE listing_id = ?1",
                params![id],
                |row| {
                    Ok(RatingAggregate {
                        star_total: row.get(0)?,
                        review_count: row.get(1)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Every registered listing, ordered by id.
pub async fn list_aggregates(
    db: &Database,
) -> Result<Vec<(ListingId, RatingAggregate)>, TrailheadError> {
    db.connection()
        .call(|conn| -> Result<Vec<(ListingId, RatingAggregate)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT listing_id, star_total, review_count FROM listing_aggregates
                 ORDER BY listing_id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    ListingId(row.get(0)?),
                    RatingAggregate {
                        star_total: row.get(1)?,
                        review_count: row.get(2)?,
                    },
                ))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_is_insert_if_absent() {
        let db = Database::open_in_memory().await.unwrap();
        let id = ListingId::from("stay-1");
        let initial = RatingAggregate::from_rating(3.9, 14);

        assert!(register(&db, &id, initial).await.unwrap());
        assert!(!register(&db, &id, RatingAggregate::EMPTY).await.unwrap());
        assert_eq!(get_aggregate(&db, &id).await.unwrap(), Some(initial));
    }

    #[tokio::test]
    async fn star_total_is_stored_unrounded() {
        let db = Database::open_in_memory().await.unwrap();
        let id = ListingId::from("stay-1");
        let mut agg = RatingAggregate::EMPTY.with_review(4).with_review(4).with_review(5);
        register(&db, &id, agg).await.unwrap();

        let stored = get_aggregate(&db, &id).await.unwrap().unwrap();
        assert_eq!(stored.star_total, 13.0);
        assert_eq!(stored.rating(), 4.3);

        agg = stored.with_review(5);
        assert_eq!(agg.rating(), 4.5);
    }

    #[tokio::test]
    async fn unknown_listing_has_no_aggregate() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(get_aggregate(&db, &"nope".into()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let db = Database::open_in_memory().await.unwrap();
        for id in ["trek-2", "cab-9", "stay-1"] {
            register(&db, &id.into(), RatingAggregate::EMPTY).await.unwrap();
        }
        let ids: Vec<String> = list_aggregates(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|(id, _)| id.0)
            .collect();
        assert_eq!(ids, vec!["cab-9", "stay-1", "trek-2"]);
    }
}
