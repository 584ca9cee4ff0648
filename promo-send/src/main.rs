//! promo-send - Background daemon for scheduled promotional posting
//!
//! Authenticates once, then runs the posting scheduler until a shutdown
//! signal arrives or the platform rejects the credentials.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use libpromocast::logging::{LogFormat, LoggingConfig};
use libpromocast::{
    Config, Pipeline, PromocastError, SchedulePolicy, Scheduler, SystemClock, TokioSleeper,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "promo-send")]
#[command(version)]
#[command(about = "Background daemon for scheduled promotional posting")]
#[command(long_about = "\
promo-send - Background daemon for scheduled promotional posting

DESCRIPTION:
    promo-send is a long-running daemon that publishes one promotional post
    per cycle and sleeps between cycles according to the configured
    cadence. Failed cycles wait a short cooldown and start over with fresh
    content; rate-limited cycles wait the rate-limit cooldown.

USAGE:
    # Run in foreground (logs to stderr)
    promo-send

    # Use a specific configuration file
    promo-send --config ./promocast.toml

    # Publish a single post and exit
    promo-send --once

SIGNALS:
    SIGTERM, SIGINT - Graceful shutdown (finishes the current post)

CONFIGURATION:
    Configuration file: ~/.config/promocast/config.toml

    [schedule]
    daily_quota = 6
    failure_cooldown = \"5m\"
    rate_limit_cooldown = \"15m\"

    [schedule.cadence]
    kind = \"uniform\"
    min = \"2h\"
    max = \"4h\"

EXIT CODES:
    0 - Clean shutdown
    1 - Runtime error
    2 - Authentication failure
")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Skip the generative provider and use the fallback pool
    #[arg(long)]
    no_generate: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json, pretty)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<PromocastError>()
            .map(PromocastError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn init_logging(verbose: bool, format: Option<LogFormat>) {
    let mut logging = LoggingConfig::from_env("info");
    logging.verbose = verbose;
    if let Some(format) = format {
        logging.format = format;
    }
    logging.init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_with_overrides(cli.config.as_deref())?;
    let policy = SchedulePolicy::from_config(&config.schedule).map_err(PromocastError::from)?;
    let mut pipeline = Pipeline::from_config(&config, !cli.no_generate)?;

    info!(platform = %pipeline.platform_name(), "promo-send daemon starting");
    pipeline.authenticate().await?;

    let shutdown = Arc::new(AtomicBool::new(false));
    setup_signal_handlers(shutdown.clone()).context("signal setup failed")?;

    let mut rng = StdRng::from_entropy();
    let mut scheduler = Scheduler::new(
        pipeline,
        policy,
        SystemClock,
        TokioSleeper::new(shutdown.clone()),
        shutdown,
    );

    if cli.once {
        let tick = scheduler.tick(&mut rng).await?;
        println!("{}", serde_json::to_string_pretty(&tick)?);
        info!("promo-send: ran one cycle, exiting");
    } else {
        scheduler.run(&mut rng).await?;
    }

    info!("promo-send daemon stopped");
    Ok(())
}

/// Set up signal handlers for graceful shutdown
#[cfg(unix)]
fn setup_signal_handlers(shutdown: Arc<AtomicBool>) -> std::io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!(signal = sig, "Received shutdown signal, stopping gracefully...");
            shutdown.store(true, Ordering::SeqCst);
        }
    });

    Ok(())
}

#[cfg(not(unix))]
fn setup_signal_handlers(shutdown: Arc<AtomicBool>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, stopping gracefully...");
            shutdown.store(true, Ordering::SeqCst);
        }
    });
    Ok(())
}
