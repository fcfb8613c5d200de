//! StaySync CLI - operator surface for the reservation ledger
//!
//! Runs sync cycles, answers availability questions, and prints the
//! consolidated ledger and detected double-bookings.

mod cli;

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDateTime;
use clap::Parser;
use staysync_core::{
    check_availability, Clock, LedgerStore, QueryWindow, SyncReport, SyncService, SystemClock,
};
use staysync_domain::{
    apply_default_hours, parse_flexible, Ledger, PortfolioConfig, StayBoundary, StaySyncError,
};
use staysync_infra::{CachedFeedProvider, CsvSheetClient, IcalFeedProvider, SqliteLedgerStore};
use thiserror::Error;

use crate::cli::{Cli, Commands};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    App(#[from] StaySyncError),
    #[error("Unrecognized date: {0:?} (expected dd/mm/yyyy or yyyy-mm-dd)")]
    UnrecognizedDate(String),
    #[error("No ledger stored yet; run `staysync sync` first")]
    NoLedger,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("staysync=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Sync { no_backfill } => run_sync(&config, no_backfill).await?,
        Commands::Check { from, to, apartments } => {
            run_check(&config, &from, &to, apartments).await?;
        }
        Commands::Ledger => run_ledger(&config).await?,
        Commands::Conflicts => run_conflicts(&config).await?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PortfolioConfig, CliError> {
    let config = match path {
        Some(path) => staysync_infra::config::load_from_file(path)?,
        None => staysync_infra::config::load()?,
    };
    Ok(config)
}

/// Wire the adapters into a sync service over the given store.
fn build_service(
    config: &PortfolioConfig,
    store: Arc<dyn LedgerStore>,
    backfill: bool,
) -> Result<SyncService, CliError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let feeds = Arc::new(CachedFeedProvider::new(
        Arc::new(IcalFeedProvider::new()?),
        config.cache_ttl_seconds,
        clock.clone(),
    ));

    let mut sheet = CsvSheetClient::new(config.sheet_key.clone())?;
    if let Some(url) = &config.append_webhook {
        sheet = sheet.with_append_url(url.clone());
    }

    // Without a webhook there is nowhere to write backfill rows; they are
    // still reported in the logs.
    let backfill = backfill && config.append_webhook.is_some();

    let service =
        SyncService::new(feeds, Arc::new(sheet), store, clock, config.clone())
            .with_backfill(backfill);
    Ok(service)
}

async fn run_sync(config: &PortfolioConfig, no_backfill: bool) -> Result<(), CliError> {
    let store = Arc::new(SqliteLedgerStore::open(&config.database_path)?);
    let service = build_service(config, store, !no_backfill)?;

    let report = service.run().await?;
    print_report(&report);
    Ok(())
}

async fn run_check(
    config: &PortfolioConfig,
    from: &str,
    to: &str,
    apartments: Vec<String>,
) -> Result<(), CliError> {
    let start = parse_cli_date(from, StayBoundary::CheckIn)?;
    let end = parse_cli_date(to, StayBoundary::CheckOut)?;
    let window = QueryWindow::new(start, end)?;

    let store = SqliteLedgerStore::open(&config.database_path)?;
    let ledger = store.load().await?.ok_or(CliError::NoLedger)?;

    let result = check_availability(&ledger, &apartments, &window);

    println!("Stay {} - {}", window.start(), window.end());
    println!("Free:     {}", join_or_dash(&result.free));
    println!("Occupied: {}", join_or_dash(&result.occupied));
    Ok(())
}

async fn run_ledger(config: &PortfolioConfig) -> Result<(), CliError> {
    let store = SqliteLedgerStore::open(&config.database_path)?;
    let ledger = store.load().await?.ok_or(CliError::NoLedger)?;

    print_ledger(&ledger);
    Ok(())
}

/// Run the pipeline against a throwaway store: conflicts are detected from
/// fresh source data without touching the persisted ledger or the sheets.
async fn run_conflicts(config: &PortfolioConfig) -> Result<(), CliError> {
    let store = Arc::new(SqliteLedgerStore::in_memory()?);
    let service = build_service(config, store, false)?;

    let report = service.run().await?;
    if report.conflicts.is_empty() {
        println!("No double-bookings detected.");
        return Ok(());
    }

    println!("{} double-booking(s) detected:", report.conflicts.len());
    for conflict in &report.conflicts {
        println!("  [{}] {}  <->  {}", conflict.apartment_id, conflict.first, conflict.second);
    }
    Ok(())
}

/// Parse an operator-supplied date, defaulting bare dates to the check-in or
/// check-out hour.
fn parse_cli_date(input: &str, boundary: StayBoundary) -> Result<NaiveDateTime, CliError> {
    let parsed =
        parse_flexible(input).ok_or_else(|| CliError::UnrecognizedDate(input.to_string()))?;
    Ok(apply_default_hours(parsed, boundary))
}

fn join_or_dash(apartments: &[String]) -> String {
    if apartments.is_empty() {
        "-".to_string()
    } else {
        apartments.join(", ")
    }
}

fn print_report(report: &SyncReport) {
    println!("Sync completed at {}", report.synced_at);
    println!("  apartments processed: {}", report.apartments_processed);
    println!("  sources failed:       {}", report.sources_failed);
    println!("  events merged:        {}", report.events_merged);
    println!("  rows dropped:         {}", report.rows_dropped);
    println!("  rows backfilled:      {}", report.backfilled);
    println!("  ledger size:          {}", report.ledger_size);

    if !report.conflicts.is_empty() {
        println!("  double-bookings:      {}", report.conflicts.len());
        for conflict in &report.conflicts {
            println!(
                "    [{}] {}  <->  {}",
                conflict.apartment_id, conflict.first, conflict.second
            );
        }
    }
}

fn print_ledger(ledger: &Ledger) {
    println!("Ledger synced at {} ({} reservations)", ledger.synced_at, ledger.len());
    println!(
        "{:>4}  {:<10} {:<16} {:<16} {:<12} {:<10} {}",
        "id", "apartment", "check-in", "check-out", "origin", "status", "summary"
    );
    for event in &ledger.reservations {
        println!(
            "{:>4}  {:<10} {:<16} {:<16} {:<12} {:<10} {}",
            event.reservation_id,
            event.apartment_id,
            event.start.format("%d/%m/%Y %H:%M"),
            event.end.format("%d/%m/%Y %H:%M"),
            event.origin,
            event.status,
            event.summary
        );
    }
}
