mod app;
mod cli;
mod config;
mod ui;

use clap::Parser;
use crawl_logging::{crawl_info, crawl_warn, LevelFilter, LogDestination};

use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The logger is configured from the file, so load problems are reported after init.
    let (config, load_error) = match config::load_config(&cli.config) {
        Ok(config) => (config, None),
        Err(err) => (config::DashboardConfig::default(), Some(err)),
    };
    let config = config.with_cli(&cli);

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match &config.log_file {
        Some(path) => LogDestination::File(path.clone()),
        None => LogDestination::Terminal,
    };
    crawl_logging::initialize(destination, level);

    if let Some(err) = load_error {
        crawl_warn!("Using default configuration: {:#}", err);
    }
    crawl_info!("Starting crawl dashboard with {:?}", config.backend);

    app::run(config)
}
