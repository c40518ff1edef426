//! # Directory Search CLI (`dsearch`)
//!
//! Loads the user directory from the configured endpoint and searches it.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dsearch fetch` | Load the records and list them |
//! | `dsearch search "<query>"` | Load, run one query, print matches |
//! | `dsearch interactive` | Each stdin line replaces the search box content |
//!
//! ## Examples
//!
//! ```bash
//! dsearch search "leanne gra"
//! dsearch --endpoint http://127.0.0.1:8080/users search bret --json
//! RUST_LOG=directory_search=debug dsearch interactive
//! ```
//!
//! Diagnostics go to stderr (`RUST_LOG`, default `warn`); stdout carries
//! only results.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use directory_search::config::{self, Config};
use directory_search::render;
use directory_search::session::SearchSession;
use directory_search::source::HttpRecordSource;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Incremental prefix search over a remote user directory.
#[derive(Parser)]
#[command(name = "dsearch", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when it is missing.
    #[arg(long, global = true, default_value = "./config/dsearch.toml")]
    config: PathBuf,

    /// Override `source.endpoint` from the config file.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load all records and list them.
    Fetch,

    /// Run a single query.
    ///
    /// Words are matched as prefixes of whitespace-separated tokens in the
    /// name, username, email, and company name. Every word must match.
    Search {
        /// The search query string. Empty matches everything.
        query: String,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Read search terms from stdin, one per line, as if typed into a search box.
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut cfg = config::load_or_default(&cli.config)?;
    if let Some(endpoint) = cli.endpoint {
        cfg.source.endpoint = endpoint;
        cfg.validate()?;
    }

    match cli.command {
        Commands::Fetch => run_fetch(&cfg).await?,
        Commands::Search { query, json } => run_search(&cfg, &query, json).await?,
        Commands::Interactive => run_interactive(&cfg).await?,
    }

    Ok(())
}

async fn loaded_session(cfg: &Config) -> Result<SearchSession> {
    let source = HttpRecordSource::new(&cfg.source)?;
    let session = SearchSession::new(Arc::new(source), cfg.search.debounce());
    session.load().await;
    if let Some(err) = session.status().error {
        bail!("{}", err);
    }
    Ok(session)
}

async fn run_fetch(cfg: &Config) -> Result<()> {
    let session = loaded_session(cfg).await?;
    let records = session.current_view();
    println!("{} records", records.len());
    for r in &records {
        println!("{:<6} {:<28} @{:<20} {}", r.id, r.name, r.username, r.email);
    }
    Ok(())
}

async fn run_search(cfg: &Config, query: &str, json: bool) -> Result<()> {
    let session = loaded_session(cfg).await?;
    session.submit(query);
    render::print_results(&session.current_view(), json)
}

async fn run_interactive(cfg: &Config) -> Result<()> {
    let session = SearchSession::from_config(cfg)?;
    let mut updates = session.subscribe();

    let printer = tokio::spawn(async move {
        let mut last_shown: Option<(Vec<u64>, Option<String>)> = None;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if snapshot.loading {
                continue;
            }
            let key = (
                snapshot.results.iter().map(|r| r.id).collect::<Vec<_>>(),
                snapshot.error.clone(),
            );
            if last_shown.as_ref() == Some(&key) {
                continue;
            }
            last_shown = Some(key);
            if let Some(err) = &snapshot.error {
                println!("Error: {}", err);
            }
            print!("{}", render::format_results(&snapshot.results));
            let _ = std::io::stdout().flush();
        }
    });

    let prompt = atty::is(atty::Stream::Stdin);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if prompt {
            eprint!("search> ");
            let _ = std::io::stderr().flush();
        }
        match lines.next_line().await? {
            Some(line) => session.set_search_term(&line),
            None => break,
        }
    }

    // Input may end before the initial load does; wait for it, then let the
    // last debounced query land before tearing down.
    let mut load_status = session.subscribe();
    let _ = load_status.wait_for(|s| !s.loading).await;
    tokio::time::sleep(cfg.search.debounce() + Duration::from_millis(50)).await;
    drop(session);
    let _ = printer.await;
    Ok(())
}
