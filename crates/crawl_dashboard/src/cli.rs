use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "crawl-dashboard",
    version,
    about = "Submit URLs for crawling and manage their lifecycle from the terminal"
)]
pub struct Cli {
    /// RON configuration file; defaults apply when it does not exist.
    #[arg(long, default_value = ".crawl_dashboard.ron")]
    pub config: PathBuf,

    /// Crawl service to talk to, overriding the configuration file.
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// API root of the crawl service, e.g. http://localhost:8000/api/v1/
    #[arg(long)]
    pub base_url: Option<String>,

    /// Write logs to this file instead of the configured destination.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process simulation.
    Local,
    /// REST API of a running crawl service.
    Http,
}
