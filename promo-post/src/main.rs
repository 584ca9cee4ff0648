//! promo-post - Run a single promotional posting cycle

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use libpromocast::logging::LoggingConfig;
use libpromocast::platforms::mock::MockPlatform;
use libpromocast::scheduler::SchedulePolicy;
use libpromocast::{Config, CycleReport, Pipeline, PromocastError, PublishErrorKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "promo-post")]
#[command(version)]
#[command(about = "Generate, validate, compose and publish one promotional post")]
#[command(long_about = "\
promo-post - Run a single promotional posting cycle

DESCRIPTION:
    Produces one draft (generated, or from the fallback pool), validates it
    against the content rules, appends a call-to-action and hashtags, and
    publishes it once. Nothing is retried.

USAGE:
    # Preview a post without credentials
    promo-post --dry-run

    # Check the configuration and fallback pool
    promo-post --check

    # Publish one post and print the result as JSON
    promo-post --format json

EXIT CODES:
    0 - Posted (or dry run / check succeeded)
    1 - Publish failed or runtime error
    2 - Authentication failed
")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Compose a post without publishing it
    #[arg(long)]
    dry_run: bool,

    /// Validate configuration and exit
    #[arg(long, conflicts_with = "dry_run")]
    check: bool,

    /// Skip the generative provider and use the fallback pool
    #[arg(long)]
    no_generate: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<PromocastError>()
                .map(PromocastError::exit_code)
                .unwrap_or(1);
            std::process::exit(code);
        }
    }
}

fn init_logging(verbose: bool) {
    let mut logging = LoggingConfig::from_env("warn");
    logging.verbose = verbose;
    logging.init();
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = Config::load_with_overrides(cli.config.as_deref())?;
    let generate = !cli.no_generate;
    let mut rng = StdRng::from_entropy();

    if cli.check {
        return check(&config, generate, cli.format);
    }

    if cli.dry_run {
        let platform =
            MockPlatform::new_simple("dry-run").counting_as(config.platform.kind.length_counting());
        let pipeline = Pipeline::from_config_with_platform(&config, Box::new(platform), generate)?;
        let report = pipeline.dry_run(&mut rng).await;
        print_report(&report, cli.format)?;
        return Ok(0);
    }

    let mut pipeline = Pipeline::from_config(&config, generate)?;
    pipeline.authenticate().await?;
    let report = pipeline.run_cycle(&mut rng).await;
    print_report(&report, cli.format)?;

    let code = match report.result.as_ref() {
        Some(result) if result.success => 0,
        Some(result) if result.error_kind == Some(PublishErrorKind::AuthFailure) => 2,
        _ => 1,
    };
    Ok(code)
}

fn check(config: &Config, generate: bool, format: OutputFormat) -> anyhow::Result<i32> {
    let platform =
        MockPlatform::new_simple("check").counting_as(config.platform.kind.length_counting());
    let pipeline = Pipeline::from_config_with_platform(config, Box::new(platform), generate)?;
    SchedulePolicy::from_config(&config.schedule).context("invalid schedule")?;

    let rules = pipeline.validator().rules();
    let pool = pipeline.source().pool().len();
    match format {
        OutputFormat::Json => {
            let summary = json!({
                "ok": true,
                "platform": config.platform.kind,
                "min_len": rules.min_len,
                "max_len": rules.max_len,
                "fallback_messages": pool,
                "platform_limit": pipeline.composer().ceiling(),
                "generator": pipeline.source().has_generator(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!("Configuration OK");
            println!("  content length: {}..={}", rules.min_len, rules.max_len);
            println!("  fallback messages: {}", pool);
            println!("  platform limit: {}", pipeline.composer().ceiling());
            println!(
                "  generator: {}",
                if pipeline.source().has_generator() {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
    }
    Ok(0)
}

fn print_report(report: &CycleReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!("{}", report.text);
            if let Some(result) = &report.result {
                match (&result.platform_id, &result.error_message) {
                    (Some(id), _) => eprintln!("Posted ({}): {}", report.origin, id),
                    (None, Some(message)) => eprintln!("Failed: {}", message),
                    (None, None) => eprintln!("Failed"),
                }
            }
        }
    }
    Ok(())
}
