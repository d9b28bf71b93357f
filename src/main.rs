mod models;
mod service;
mod utils;

use crate::models::config::load_config;
use crate::models::deployment_pair::DeploymentPair;
use crate::models::dry_run_mode::DryRunMode;
use crate::service::deployer::Deployer;
use crate::service::identity::{EnvIdentity, IdentityProvider, StaticIdentity};
use crate::service::timestamp::LocalClock;
use crate::utils::progress::create_progress_bar;
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "RustyDeploy")]
#[command(about = "Installs replacement files, keeping timestamped backups of the originals", long_about = None)]
struct Cli {
    /// JSON config; deploy.json is used when neither this nor --pair is given
    #[arg(short = 'c', long = "config", env = "RUSTYDEPLOY_CONFIG")]
    config_file: Option<String>,

    /// SOURCE=DESTINATION, may be repeated
    #[arg(short = 'p', long = "pair", value_name = "SOURCE=DESTINATION")]
    pairs: Vec<DeploymentPair>,

    /// Use this user name instead of the one from the environment
    #[arg(short = 'u', long = "user")]
    user: Option<String>,

    #[arg(
        short = 'l',
        long = "log-level",
        default_value = "info",
        env = "LOG_LEVEL"
    )]
    log_level: String,

    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    #[arg(short = 'v', long = "validate-only")]
    validate_only: bool,

    #[arg(short = 'd', long = "dry-run")]
    dry_run: bool,
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_logging(&args.log_level);

    match cli_main(args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .init();
}

fn cli_main(args: Cli) -> Result<u8> {
    info!("RustyDeploy starting...");

    // Strip any surrounding quotes from config file path
    let config_file = args
        .config_file
        .map(|file| file.trim_matches(|c| c == '"' || c == '\'').to_string());

    let config = load_config(config_file, &args.pairs).context("Failed to load configuration")?;
    debug!("Loaded config: {:?}", &config);

    if args.validate_only {
        info!("Configuration is valid. Exiting (--validate-only mode).");
        return Ok(0);
    }

    let dry_run_mode = if args.dry_run {
        info!("Running in DRY RUN mode - no file will be backed up or replaced");
        DryRunMode::Simulate
    } else {
        DryRunMode::None
    };

    let identity: Box<dyn IdentityProvider> = match args.user {
        Some(user) => {
            info!("Using user name from the command line: {}", user);
            Box::new(StaticIdentity(user))
        }
        None => Box::new(EnvIdentity),
    };

    let deployer = Deployer::new(identity, Box::new(LocalClock))
        .dry_run_mode(dry_run_mode)
        .max_threads(config.max_threads);

    let pairs = config.deployment_pairs();
    let progress = if args.quiet {
        None
    } else {
        Some(create_progress_bar(
            pairs.len() as u64,
            &format!("{}Deploying", dry_run_mode.progress_prefix()),
        ))
    };

    let report = deployer
        .deploy(&pairs, progress.as_ref())
        .context("Deployment aborted")?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    println!("{}", report);

    if dry_run_mode.is_dry_run() {
        info!("DRY RUN completed - no files were backed up or replaced");
    } else if report.is_success() {
        info!(
            "Deployment completed successfully, {} backup(s) created",
            report.backups().count()
        );
    } else {
        warn!(
            "{} of {} file(s) were not deployed; restore from the backups listed above if needed",
            report.failed_count(),
            report.outcomes.len()
        );
    }
    Ok(report.exit_code())
}
