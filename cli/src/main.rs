mod cli;
mod commands;
mod format;
mod output;

use bmtree::{config, error::Result, utils, Repository, SqliteStore};
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    // Initialize logger; RUST_LOG still wins over --debug
    let default_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: cli::Cli) -> Result<()> {
    if args.version {
        println!("bmtree {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration
    let cfg = if let Some(config_path) = &args.config {
        config::Config::load_from_path(config_path)?
    } else {
        config::Config::load()
    };

    let db_path = if let Some(path) = &args.db {
        path.clone()
    } else {
        utils::get_default_dbdir().join("bookmarks.db")
    };

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let store = SqliteStore::init(&db_path, Duration::from_millis(cfg.connect_timeout_ms))?;
    let repo = Repository::new(store);

    cli::handle_args(args, &repo, &cfg)
}
