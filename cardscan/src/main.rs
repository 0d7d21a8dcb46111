//! cardscan - Collectible card price tracker
//!
//! Subcommands:
//! - `scan`: build or reuse the catalog, price it, replace `current.json`
//! - `promote`: copy the current snapshot to `baseline.json`
//! - `report`: compare baseline against current
//! - `benchmark`: scan synthetic catalogs without touching the data directory

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use cardscan::catalog::{build_catalog, mock_raw_catalog, synthetic_catalog, CatalogStore};
use cardscan::pricing::{BatchFetcher, BatchProgress, MockPriceSource};
use cardscan::report::{generate_report, render_report};
use cardscan::scan::{build_snapshot, perform_scan_with, SCAN_BATCH_SIZE, SCAN_CONCURRENCY};
use cardscan::FetchConfig;
use cardscan_common::config::{
    load_scanner_config, save_scanner_config, BootstrapConfig, DataDirResolver, ScannerConfig,
};
use cardscan_common::store::DataPaths;
use cardscan_common::{time, Error};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for cardscan
#[derive(Parser, Debug)]
#[command(name = "cardscan")]
#[command(about = "Collectible card price tracker")]
#[command(version)]
struct Args {
    /// Directory holding catalog, snapshots, config and scan log
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price the catalog and replace the current snapshot
    Scan {
        /// Comma-separated rarities; persisted and forces a catalog rebuild
        #[arg(long, value_delimiter = ',')]
        rarities: Option<Vec<String>>,

        /// Mock pricing seed (YYYY-MM-DD); defaults to today
        #[arg(long)]
        seed: Option<String>,
    },
    /// Promote the current snapshot to baseline
    Promote,
    /// Compare baseline against current
    Report {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Scan synthetic catalogs of the given sizes
    Benchmark {
        #[arg(long, value_delimiter = ',', default_value = "1000,2500,5000")]
        sizes: Vec<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let bootstrap = BootstrapConfig::load_default();

    let default_level = if args.verbose {
        "debug".to_string()
    } else {
        bootstrap.logging.level.clone()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
        profile = env!("BUILD_PROFILE"),
        "cardscan starting"
    );

    match run(args, bootstrap).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<Error>()
                .map(Error::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(args: Args, bootstrap: BootstrapConfig) -> Result<()> {
    match args.command {
        Command::Benchmark { sizes } => run_benchmark(&sizes).await,
        Command::Scan { rarities, seed } => {
            let paths = open_data_dir(args.data_dir, bootstrap)?;
            run_scan(&paths, rarities, seed).await
        }
        Command::Promote => {
            let paths = open_data_dir(args.data_dir, bootstrap)?;
            let count = cardscan::promote_baseline(&paths, time::now())?;
            println!("Promoted {} records to baseline", count);
            Ok(())
        }
        Command::Report { json } => {
            let paths = open_data_dir(args.data_dir, bootstrap)?;
            let report = generate_report(&paths, time::now())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report));
            }
            Ok(())
        }
    }
}

fn open_data_dir(cli_arg: Option<PathBuf>, bootstrap: BootstrapConfig) -> Result<DataPaths> {
    let data_dir = DataDirResolver::new()
        .with_cli_arg(cli_arg)
        .with_bootstrap(bootstrap)
        .resolve();
    let paths = DataPaths::new(data_dir);
    paths.ensure_exists()?;
    info!(data_dir = %paths.root().display(), "Using data directory");
    Ok(paths)
}

async fn run_scan(paths: &DataPaths, rarities: Option<Vec<String>>, seed: Option<String>) -> Result<()> {
    let config_path = paths.config();
    let mut config = load_scanner_config(&config_path);
    let force_rebuild = match rarities {
        Some(rarities) => {
            let rarities: Vec<String> = rarities
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect();
            if rarities.is_empty() {
                return Err(Error::Config("--rarities names no rarity".to_string()).into());
            }
            config = ScannerConfig { rarities };
            save_scanner_config(&config_path, &config)?;
            true
        }
        None => false,
    };

    let source = match seed {
        Some(seed) => {
            NaiveDate::parse_from_str(&seed, "%Y-%m-%d")
                .map_err(|_| Error::Config(format!("seed must be YYYY-MM-DD, got {:?}", seed)))?;
            MockPriceSource::with_seed(seed)
        }
        None => MockPriceSource::new(),
    };

    let catalog_store = CatalogStore::new(paths.catalog());
    let catalog = catalog_store.ensure(
        || build_catalog(&mock_raw_catalog(), Some(&config.rarities)),
        force_rebuild,
    )?;

    let (tx, mut rx) = mpsc::unbounded_channel::<BatchProgress>();
    let progress_task = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            debug!(
                completed = progress.completed,
                total = progress.total,
                failed = progress.failed,
                "Scan progress"
            );
        }
    });

    let fetcher = BatchFetcher::new(FetchConfig::new(SCAN_BATCH_SIZE, SCAN_CONCURRENCY)).with_progress(tx);
    let outcome = perform_scan_with(paths, &catalog, &source, &fetcher).await?;
    drop(fetcher);
    progress_task.await.context("Progress task panicked")?;

    let priced = outcome.records.iter().filter(|r| r.price.is_some()).count();
    println!(
        "Scanned {} cards ({} priced, {} failed batches) in {}ms",
        outcome.summary.total, priced, outcome.summary.failed, outcome.summary.duration_ms
    );
    Ok(())
}

async fn run_benchmark(sizes: &[usize]) -> Result<()> {
    let source = MockPriceSource::new();
    let mut rng = StdRng::from_entropy();

    for &size in sizes {
        let catalog = synthetic_catalog(size, &mut rng);

        let mut distribution: BTreeMap<&str, usize> = BTreeMap::new();
        for card in &catalog {
            *distribution.entry(card.rarity.as_str()).or_default() += 1;
        }

        let start = Instant::now();
        let outcome = build_snapshot(&catalog, &source).await;
        let elapsed = start.elapsed();
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            catalog.len() as f64 / elapsed.as_secs_f64()
        } else {
            f64::INFINITY
        };

        println!("Catalog size: {}", size);
        for (rarity, count) in &distribution {
            println!("  {:<10} {:>6}", rarity, count);
        }
        println!(
            "  Duration: {}ms  Throughput: {:.0} cards/s  Failed batches: {}",
            elapsed.as_millis(),
            throughput,
            outcome.summary.failed
        );
        info!(size, duration_ms = elapsed.as_millis() as u64, "Benchmark run complete");
    }
    Ok(())
}
