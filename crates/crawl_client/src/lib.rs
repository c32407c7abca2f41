//! Crawl client: remote crawl service adapters and the mutation orchestrator.
mod handle;
mod http;
mod local;
mod orchestrator;
mod service;
mod types;

pub use handle::{CommandSettled, OrchestratorHandle};
pub use http::{HttpCrawlService, HttpSettings};
pub use local::LocalCrawlService;
pub use orchestrator::Orchestrator;
pub use service::CrawlService;
pub use types::CrawlError;
