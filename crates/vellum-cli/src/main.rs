use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use vellum_cli::cli::Cli;
use vellum_config::{ConfigLoader, VellumConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load(cli.config.as_deref()).await?;
    if let Some(dir) = cli.dir() {
        config.content_root = dir.to_path_buf();
    }

    init_logging(&cli, &config);
    debug!(content_root = %config.content_root.display(), "Configuration loaded");

    let mode = cli.mode(config.reconcile.auto_patch);
    let result = vellum_cli::run(&config, mode).await?;

    let summary = result.summary;
    println!(
        "{} processed, {} changed, {} skipped, {} failed",
        summary.processed, summary.changed, summary.skipped, summary.failed
    );
    if let Some(path) = &result.report {
        println!("Report: {}", path.display());
    }

    if result.exit_code() != 0 {
        std::process::exit(result.exit_code());
    }
    Ok(())
}

/// CLI flags, then `logging.level` from config, then `RUST_LOG`, then warn.
fn init_logging(cli: &Cli, config: &VellumConfig) {
    let env_filter = match cli.level_filter() {
        Some(level) => EnvFilter::new(level.to_string()),
        None => match config.logging.level.as_deref() {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
