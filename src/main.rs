//! FlowGuard - Main Entry Point
//!
//! collect (optional) -> index -> classify -> decide -> report

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use flowguard_core::constants::{APP_NAME, APP_VERSION, DEFAULT_LIMIT};
use flowguard_core::error::Stage;
use flowguard_core::logic::collector::{self, CollectorError};
use flowguard_core::logic::index::DirectoryIndex;
use flowguard_core::logic::policy::PolicyFile;
use flowguard_core::logic::scorer::{HeuristicScorer, SemanticScorer, ZeroShotScorer};
use flowguard_core::logic::store::SqliteStore;
use flowguard_core::{Config, Pipeline, PipelineError};

#[derive(Parser, Debug)]
#[command(name = "flowguard", version, about = "Label captured flows and score a response policy")]
struct Args {
    /// Maximum number of unlabeled records to classify this run
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    /// Capture live traffic for this many seconds first (0 = skip)
    #[arg(long, default_value_t = 0, value_name = "SECS")]
    collect: u64,

    /// Flow record database (overrides FLOWGUARD_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Decision policy artifact (overrides FLOWGUARD_POLICY_PATH)
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Write the run report as JSON to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// -v debug, -vv trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<PipelineError>() {
                Some(pipeline) => log::error!("Run failed at {} stage: {:#}", pipeline.stage(), e),
                None => log::error!("Run failed: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = Config::from_env();
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(policy) = args.policy {
        config.policy_path = policy;
    }
    log::debug!("Database: {}", config.db_path.display());
    log::debug!("Policy: {}", config.policy_path.display());

    if args.collect > 0 {
        let command = config
            .collector_command
            .as_deref()
            .ok_or(PipelineError::CollectionFailure(CollectorError::NotConfigured))?;
        collector::collect_blocking(command, Duration::from_secs(args.collect))
            .map_err(PipelineError::from)?;
    }

    let store = SqliteStore::open(&config.db_path)
        .map_err(|source| PipelineError::StoreUnavailable {
            stage: Stage::Classification,
            source,
        })
        .with_context(|| format!("opening {}", config.db_path.display()))?;

    let scorer: Box<dyn SemanticScorer> = match &config.scorer_url {
        Some(url) => Box::new(ZeroShotScorer::new(url, &config.scorer_model, config.scorer_token.clone())),
        None => {
            log::warn!("No scorer endpoint configured - using heuristic scoring");
            Box::new(HeuristicScorer::new())
        }
    };

    let index = DirectoryIndex::new(&config.index_dir, config.index_build_command.clone());
    let policy = PolicyFile::new(&config.policy_path).with_checksum(config.policy_sha256.clone());

    let report = Pipeline::new(&store, scorer.as_ref(), &index, &policy)
        .with_thresholds(config.thresholds)
        .with_batch_size(config.batch_size)
        .run(args.limit)?;

    println!("{}", report);

    if let Some(path) = args.report {
        report
            .write_json(&path)
            .with_context(|| format!("writing report to {}", path.display()))?;
        log::info!("Report saved to {}", path.display());
    }

    Ok(())
}
