// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the search and review pipeline.
//!
//! The first group drives the `trailhead` binary against a temp config and
//! database; the second wires the library crates together through the
//! TestHarness. Tests are independent and order-insensitive.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;

use trailhead_core::ListingId;
use trailhead_reviews::PageFetch;
use trailhead_search::{StaticListings, StoreAggregates};
use trailhead_test_utils::TestHarness;
use trailhead_test_utils::fixtures::SAMPLE_LISTINGS_JSON;

struct Workspace {
    dir: tempfile::TempDir,
    config: PathBuf,
    listings: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let db = dir.path().join("reviews.db");
        let config = dir.path().join("trailhead.toml");
        std::fs::write(
            &config,
            format!(
                "[storage]\ndatabase_path = {:?}\n\n[reviews]\npage_size = 2\n",
                db.display().to_string()
            ),
        )
        .unwrap();
        let listings = dir.path().join("listings.json");
        std::fs::write(&listings, SAMPLE_LISTINGS_JSON).unwrap();
        Self {
            dir,
            config,
            listings,
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_trailhead"))
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    }

    fn listings_arg(&self) -> &str {
        path_str(&self.listings)
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---- CLI: search ----

#[test]
fn cli_search_filters_and_sorts() {
    let ws = Workspace::new();
    let out = ws.run(&[
        "search",
        "--listings",
        ws.listings_arg(),
        "--query",
        "location=Manali&sort=rating",
        "--json",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let ids: Vec<&str> = json["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["trek-hampta", "place-hadimba", "stay-manali-cottage"]);
    assert_eq!(json["total"], 3);
    assert_eq!(json["degraded"], false);
    // Facets come from the whole candidate set, not the filtered results.
    assert_eq!(json["facets"]["locations"].as_array().unwrap().len(), 4);
}

#[test]
fn cli_search_limit_keeps_total() {
    let ws = Workspace::new();
    let out = ws.run(&["search", "--listings", ws.listings_arg(), "--limit", "2", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
    assert_eq!(json["total"], 7);
}

#[test]
fn cli_search_reflects_recorded_reviews() {
    let ws = Workspace::new();
    let search = || {
        let out = ws.run(&[
            "search",
            "--listings",
            ws.listings_arg(),
            "--query",
            "sort=rating",
            "--json",
        ]);
        assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
        serde_json::from_str::<serde_json::Value>(&stdout(&out)).unwrap()
    };

    // No database yet: upstream ratings, cab-airport last at 3.5.
    let before = search();
    let results = before["results"].as_array().unwrap();
    assert_eq!(results.last().unwrap()["id"], "cab-airport");

    ws.run(&["listings", "import", "--listings", ws.listings_arg()]);
    let add = ws.run(&[
        "reviews", "add", "--listing", "cab-airport", "--token", "tok", "--rating", "5",
        "--comment", "Waited through a delayed flight",
    ]);
    assert!(add.status.success(), "stderr: {}", String::from_utf8_lossy(&add.stderr));

    let after = search();
    let top = &after["results"][0];
    assert_eq!(top["id"], "cab-airport");
    assert_eq!(top["rating"], 5.0);
    assert_eq!(top["review_count"], 1);
}

#[test]
fn cli_search_missing_file_is_degraded_not_fatal() {
    let ws = Workspace::new();
    let out = ws.run(&["search", "--listings", "nope.json"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Try again"));
}

// ---- CLI: reviews ----

#[test]
fn cli_import_add_and_list_reviews() {
    let ws = Workspace::new();

    let import = ws.run(&["listings", "import", "--listings", ws.listings_arg()]);
    assert!(import.status.success());
    assert!(stdout(&import).contains("7 new"));

    let again = ws.run(&["listings", "import", "--listings", ws.listings_arg()]);
    assert!(stdout(&again).contains("0 new, 7 already registered"));

    for (rating, comment) in [(5, "Stunning pass"), (3, "Cold nights"), (4, "Great guide")] {
        let rating = rating.to_string();
        let add = ws.run(&[
            "reviews", "add", "--listing", "guide-kasol", "--token", "tok", "--author", "Ira",
            "--rating", &rating, "--comment", comment,
        ]);
        assert!(add.status.success(), "stderr: {}", String::from_utf8_lossy(&add.stderr));
    }

    // guide-kasol started at {3.9, 14}.
    let last = ws.run(&[
        "reviews", "add", "--listing", "guide-kasol", "--token", "tok", "--author", "Ira",
        "--rating", "5", "--comment", "Would go again",
    ]);
    assert!(stdout(&last).contains("from 18 reviews"));

    let first = ws.run(&["reviews", "list", "--listing", "guide-kasol", "--json"]);
    let page: serde_json::Value = serde_json::from_str(&stdout(&first)).unwrap();
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["comment"], "Would go again");
    assert_eq!(page["has_more"], true);

    let cursor = page["cursor"].as_str().unwrap();
    let second = ws.run(&[
        "reviews", "list", "--listing", "guide-kasol", "--cursor", cursor, "--json",
    ]);
    let page: serde_json::Value = serde_json::from_str(&stdout(&second)).unwrap();
    let comments: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["comment"].as_str().unwrap())
        .collect();
    assert_eq!(comments, ["Cold nights", "Stunning pass"]);

    let doctor = ws.run(&["doctor", "--plain"]);
    assert!(stdout(&doctor).contains("All checks passed."));
}

#[test]
fn cli_rejects_bad_input_with_exit_code_two() {
    let ws = Workspace::new();
    ws.run(&["listings", "import", "--listings", ws.listings_arg()]);

    let bad_rating = ws.run(&[
        "reviews", "add", "--listing", "cab-airport", "--token", "tok", "--rating", "6",
        "--comment", "Too fast",
    ]);
    assert_eq!(bad_rating.status.code(), Some(2));

    let no_token = ws.run(&[
        "reviews", "add", "--listing", "cab-airport", "--token", "", "--rating", "4",
        "--comment", "Fine",
    ]);
    assert_eq!(no_token.status.code(), Some(2));

    let bad_cursor = ws.run(&["reviews", "list", "--listing", "cab-airport", "--cursor", "%%%"]);
    assert_eq!(bad_cursor.status.code(), Some(2));
}

#[test]
fn cli_invalid_config_exits_nonzero() {
    let ws = Workspace::new();
    std::fs::write(&ws.config, "[reviews]\npage_sise = 3\n").unwrap();
    let out = ws.run(&["doctor"]);
    assert_eq!(out.status.code(), Some(1));
}

// ---- Library pipeline ----

#[tokio::test]
async fn first_review_replaces_stale_upstream_rating() {
    let harness = TestHarness::builder().with_sqlite().build().await.unwrap();

    let before = harness.search.search_query(&harness.listings, "sort=rating");
    assert_eq!(before.results.last().unwrap().id.0, "cab-airport");

    // cab-airport arrives with rating 3.5 but no reviews behind it.
    harness
        .submit("cab-airport", 5, "Driver waited an hour for our delayed flight")
        .await
        .unwrap();
    let cab = harness.aggregate("cab-airport").await.unwrap();
    assert_eq!(cab.review_count, 1);
    assert_eq!(cab.rating(), 5.0);

    let source = StoreAggregates::new(
        StaticListings::new(harness.listings.clone()),
        Arc::clone(&harness.store),
    );
    let criteria = harness.search.codec().decode("sort=rating");
    let after = harness.search.search_source(&source, &criteria).await;
    assert!(!after.degraded);
    assert_eq!(after.results[0].id.0, "cab-airport");
    assert_eq!(after.results[0].rating, 5.0);
    assert_eq!(after.results[0].review_count, 1);
}

#[tokio::test]
async fn feed_walk_matches_submission_order() {
    let harness = TestHarness::builder().build().await.unwrap();
    for i in 0..7 {
        harness
            .submit("bike-enfield", 4, &format!("ride {i}"))
            .await
            .unwrap();
    }

    let feed = harness.read_feed("bike-enfield", 3).await.unwrap();
    let comments: Vec<&str> = feed.iter().map(|d| d.comment.as_str()).collect();
    assert_eq!(
        comments,
        ["ride 6", "ride 5", "ride 4", "ride 3", "ride 2", "ride 1", "ride 0"]
    );
    assert_eq!(
        harness.pager.state(&ListingId::from("bike-enfield")),
        trailhead_reviews::FeedState::Loaded { has_more: false }
    );
}

#[tokio::test]
async fn store_outage_does_not_break_search() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.mock().fail_next(1);

    let err = harness.submit("trek-hampta", 5, "Epic").await.unwrap_err();
    assert!(matches!(err, trailhead_core::TrailheadError::StoreUnavailable { .. }));

    let results = harness.search.search_query(&harness.listings, "q=trek");
    assert_eq!(results.total, 1);
    let page = harness
        .pager
        .first_page(&ListingId::from("trek-hampta"), 5)
        .await
        .unwrap();
    assert!(matches!(page, PageFetch::Loaded(p) if p.items.is_empty()));
}
