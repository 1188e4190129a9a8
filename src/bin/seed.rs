//! Operator CLI: seed a session and its tasks directly into the durable
//! store, the same path `POST /sessions` takes.

use std::process::ExitCode;

use clap::Parser;
use scour::config::AppConfig;
use scour_core::security::UrlValidator;
use scour_core::{CrawlSession, CrawlTask, SessionRules};
use scour_store::{CrawlStore, SqliteStore};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "scour-seed")]
struct Args {
    #[arg(long, default_value = "config.yaml")]
    config: String,

    #[arg(long)]
    name: String,

    /// One or more absolute seed URLs.
    #[arg(long = "seed", required = true)]
    seeds: Vec<String>,

    #[arg(long, default_value_t = 0)]
    max_depth: u32,
}

#[tokio::main]
async fn main() -> ExitCode {
    scour::logging::init();

    let args = Args::parse();

    let validator = UrlValidator::default();
    for seed in &args.seeds {
        if let Err(e) = validator.validate_url(seed) {
            error!(seed = %seed, error = %e, "seed rejected");
            return ExitCode::FAILURE;
        }
    }

    let config = match AppConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let store = match SqliteStore::connect(&config.store.database_path).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to open crawl store");
            return ExitCode::FAILURE;
        }
    };

    let mut rules = SessionRules::default();
    rules.max_depth = args.max_depth;

    let session = CrawlSession::new(args.name, args.seeds.clone(), rules);
    if let Err(e) = store.create_crawl_session(&session).await {
        error!(error = %e, "failed to persist session");
        return ExitCode::FAILURE;
    }

    let tasks: Vec<CrawlTask> = args
        .seeds
        .iter()
        .map(|seed| CrawlTask::new(session.id, seed.clone()).with_max_depth(args.max_depth))
        .collect();
    if let Err(e) = store.create_tasks(&tasks).await {
        error!(error = %e, "failed to persist seed tasks");
        return ExitCode::FAILURE;
    }

    info!(session_id = %session.id, tasks = tasks.len(), "session seeded");
    ExitCode::SUCCESS
}
