//! # Stack Pulse
//!
//! Scrapes Stack Overflow question metadata by keyword, persists it in
//! SQLite, derives per-question metrics (hotness, sentiment, display
//! labels), and serves an interactive dashboard with optional side-by-side
//! keyword comparison.
//!
//! ## Usage
//!
//! ```sh
//! stack_pulse serve --bind 127.0.0.1:8080
//! stack_pulse scrape "borrow checker"
//! stack_pulse reset
//! ```
//!
//! ## Architecture
//!
//! The application is a straight pipeline, fanned out per dashboard request:
//! 1. **Fetch**: one search API call per keyword (only when the store has no
//!    rows for it yet)
//! 2. **Store**: append-only SQLite table, deduplicated by url at read time
//! 3. **Prepare**: decode titles, derive metrics, dedup by title
//! 4. **Charts**: independent builders producing renderable chart data
//! 5. **Page**: one HTML dashboard embedding the chart set per keyword

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod charts;
mod cli;
mod error;
mod fetch;
mod models;
mod page;
mod prepare;
mod server;
mod store;

use cli::{Cli, Command, DEFAULT_BIND};
use server::AppState;
use store::QuestionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("stack_pulse starting up");

    let args = Cli::parse();
    let store = QuestionStore::new(&args.db_path);
    let command = args.command.unwrap_or(Command::Serve {
        bind: DEFAULT_BIND.to_string(),
    });

    match command {
        Command::Serve { bind } => {
            let state = Arc::new(AppState {
                store,
                client: reqwest::Client::new(),
            });
            let app = server::router(state);
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!(%bind, db_path = %args.db_path, "Dashboard listening");
            axum::serve(listener, app).await?;
        }
        Command::Scrape { keyword } => {
            let client = reqwest::Client::new();
            let rows = fetch::fetch_questions(&client, &keyword).await?;
            let count = store.append(&keyword, &rows)?;
            let elapsed = start_time.elapsed();
            info!(%keyword, count, ?elapsed, "Scrape complete");
        }
        Command::Reset => {
            store.reset()?;
            info!(db_path = %args.db_path, "Store reset");
        }
    }

    Ok(())
}
