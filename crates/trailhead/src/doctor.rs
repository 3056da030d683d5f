// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `trailhead doctor` command implementation.
//!
//! Runs diagnostic checks against the review store to find configuration
//! problems and aggregate drift.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use trailhead_config::TrailheadConfig;
use trailhead_core::{HealthStatus, ReviewStore, TrailheadError};
use trailhead_storage::SqliteReviewStore;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `trailhead doctor` command.
///
/// With `--plain` (or when stdout is not a terminal), disables colored output.
pub async fn run_doctor(config: &TrailheadConfig, plain: bool) -> Result<(), TrailheadError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let mut results = vec![CheckResult::new(
        "Configuration",
        CheckStatus::Pass,
        "valid",
        Instant::now(),
    )];

    let db_path = &config.storage.database_path;
    if std::path::Path::new(db_path).exists() {
        let start = Instant::now();
        match SqliteReviewStore::open(&config.storage).await {
            Ok(store) => {
                results.push(check_health(&store).await);
                results.push(check_aggregates(&store).await);
                store.close().await?;
            }
            Err(e) => results.push(CheckResult::new(
                "Database",
                CheckStatus::Fail,
                format!("cannot open {db_path}: {e}"),
                start,
            )),
        }
    } else {
        results.push(CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (created by `listings import`)"),
            Instant::now(),
        ));
    }

    print_report(&results, use_color);
    Ok(())
}

/// Check the store answers a trivial query.
pub async fn check_health(store: &dyn ReviewStore) -> CheckResult {
    let start = Instant::now();
    match store.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new("Database", CheckStatus::Pass, "connected", start),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Database", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Database", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Check no listing holds more review documents than its aggregate counts.
///
/// Imported listings start from the upstream count with no documents behind
/// it, so `review_count` may exceed the document count. The reverse means an
/// aggregate update was lost.
pub async fn check_aggregates(store: &dyn ReviewStore) -> CheckResult {
    let start = Instant::now();
    let listings = match store.listings().await {
        Ok(listings) => listings,
        Err(e) => return CheckResult::new("Aggregates", CheckStatus::Fail, e.to_string(), start),
    };

    let mut drifted = Vec::new();
    let mut documents = 0u64;
    for (id, aggregate) in &listings {
        let count = match store.count_reviews(id).await {
            Ok(count) => count,
            Err(e) => {
                return CheckResult::new("Aggregates", CheckStatus::Fail, e.to_string(), start);
            }
        };
        documents += count;
        if count > u64::from(aggregate.review_count) {
            drifted.push(format!("{id} ({count} reviews, count {})", aggregate.review_count));
        }
    }

    if drifted.is_empty() {
        CheckResult::new(
            "Aggregates",
            CheckStatus::Pass,
            format!("{} listings, {documents} reviews", listings.len()),
            start,
        )
    } else {
        CheckResult::new(
            "Aggregates",
            CheckStatus::Fail,
            format!("undercounted: {}", drifted.join(", ")),
            start,
        )
    }
}

fn print_report(results: &[CheckResult], use_color: bool) {
    println!();
    println!("  trailhead doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", format_line(result, use_color));
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("    {symbol} {:<16} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!("    {tag} {:<16} {} ({duration_ms}ms)", result.name, result.message)
    }
}
