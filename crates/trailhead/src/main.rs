// SPDX-FileCopyrightText: 2026 Trailhead Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trailhead - faceted travel listing search with review aggregation.
//!
//! This is the binary entry point for the `trailhead` CLI.

mod doctor;
mod listings;
mod reviews;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use trailhead_config::TrailheadConfig;
use trailhead_core::TrailheadError;

/// Trailhead - faceted travel listing search with review aggregation.
#[derive(Parser, Debug)]
#[command(name = "trailhead", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Filter and rank listings from a JSON file.
    Search(search::SearchArgs),
    /// Manage listing aggregates in the review store.
    Listings {
        #[command(subcommand)]
        command: ListingsCommand,
    },
    /// Submit and browse reviews.
    Reviews {
        #[command(subcommand)]
        command: ReviewsCommand,
    },
    /// Run diagnostic checks against the configuration and review store.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ListingsCommand {
    /// Register every listing in a JSON file with the review store.
    Import(listings::ImportArgs),
}

#[derive(Subcommand, Debug)]
enum ReviewsCommand {
    /// Record a review and update the listing's aggregate.
    Add(reviews::AddArgs),
    /// Show one page of a listing's reviews, newest first.
    List(reviews::ListArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => trailhead_config::load_and_validate_path(path),
        None => trailhead_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            trailhead_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("trailhead: {e}");
        std::process::exit(exit_code(&e));
    }
}

async fn run(command: Commands, config: &TrailheadConfig) -> Result<(), TrailheadError> {
    match command {
        Commands::Search(args) => search::run_search(config, args).await,
        Commands::Listings {
            command: ListingsCommand::Import(args),
        } => listings::run_import(config, args).await,
        Commands::Reviews { command } => match command {
            ReviewsCommand::Add(args) => reviews::run_add(config, args).await,
            ReviewsCommand::List(args) => reviews::run_list(config, args).await,
        },
        Commands::Doctor { plain } => doctor::run_doctor(config, plain).await,
    }
}

/// 2 for caller mistakes, 1 for everything else.
fn exit_code(err: &TrailheadError) -> i32 {
    match err {
        TrailheadError::Validation { .. }
        | TrailheadError::Auth
        | TrailheadError::InvalidCursor(_)
        | TrailheadError::ListingNotFound(_) => 2,
        _ => 1,
    }
}

/// Initialize the tracing subscriber with the configured log level.
///
/// `RUST_LOG` overrides the configured level when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("trailhead={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
