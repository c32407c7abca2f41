use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crawl_client::{CrawlService, HttpCrawlService, HttpSettings, LocalCrawlService};
use crawl_core::PolicyTable;
use crawl_logging::crawl_info;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cli::{BackendKind, Cli};

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1/";
const DEFAULT_LOG_FILE: &str = "crawl_dashboard.log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendConfig {
    Local {
        latency_ms: u64,
    },
    Http {
        base_url: String,
        connect_timeout_secs: u64,
        request_timeout_secs: u64,
        page_size: u32,
    },
}

impl BackendConfig {
    fn http(base_url: impl Into<String>) -> Self {
        BackendConfig::Http {
            base_url: base_url.into(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            page_size: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub backend: BackendConfig,
    pub policies: PolicyTable,
    /// Seconds between automatic refreshes; 0 disables them.
    pub refresh_interval_secs: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Local { latency_ms: 150 },
            policies: PolicyTable::default(),
            refresh_interval_secs: 5,
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

impl DashboardConfig {
    /// Applies command line overrides on top of the file configuration.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        match (cli.backend, &cli.base_url) {
            (Some(BackendKind::Local), _) => {
                if !matches!(self.backend, BackendConfig::Local { .. }) {
                    self.backend = DashboardConfig::default().backend;
                }
            }
            (Some(BackendKind::Http) | None, Some(base_url)) => {
                self.backend = match self.backend {
                    BackendConfig::Http {
                        connect_timeout_secs,
                        request_timeout_secs,
                        page_size,
                        ..
                    } => BackendConfig::Http {
                        base_url: base_url.clone(),
                        connect_timeout_secs,
                        request_timeout_secs,
                        page_size,
                    },
                    BackendConfig::Local { .. } => BackendConfig::http(base_url.clone()),
                };
            }
            (Some(BackendKind::Http), None) => {
                if !matches!(self.backend, BackendConfig::Http { .. }) {
                    self.backend = BackendConfig::http(DEFAULT_BASE_URL);
                }
            }
            (None, None) => {}
        }
        if let Some(path) = &cli.log_file {
            self.log_file = Some(path.clone());
        }
        self
    }
}

/// Reads the configuration file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> anyhow::Result<DashboardConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(DashboardConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    ron::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// The crawl service plus, in local mode, the simulator standing in for the crawl engine.
pub struct Backend {
    pub service: Arc<dyn CrawlService>,
    pub simulator: Option<Arc<LocalCrawlService>>,
}

pub fn build_backend(config: &BackendConfig) -> anyhow::Result<Backend> {
    match config {
        BackendConfig::Local { latency_ms } => {
            let simulator =
                Arc::new(LocalCrawlService::new().with_latency(Duration::from_millis(*latency_ms)));
            crawl_info!("Using simulated crawl service (latency {}ms)", latency_ms);
            Ok(Backend {
                service: simulator.clone(),
                simulator: Some(simulator),
            })
        }
        BackendConfig::Http {
            base_url,
            connect_timeout_secs,
            request_timeout_secs,
            page_size,
        } => {
            let base_url = Url::parse(base_url)
                .with_context(|| format!("invalid crawl service url {base_url}"))?;
            let settings = HttpSettings {
                connect_timeout: Duration::from_secs(*connect_timeout_secs),
                request_timeout: Duration::from_secs(*request_timeout_secs),
                page_size: *page_size,
                ..HttpSettings::new(base_url)
            };
            let service =
                HttpCrawlService::new(settings).context("failed to build http crawl client")?;
            crawl_info!("Using crawl service at {}", service_url(config));
            Ok(Backend {
                service: Arc::new(service),
                simulator: None,
            })
        }
    }
}

fn service_url(config: &BackendConfig) -> &str {
    match config {
        BackendConfig::Http { base_url, .. } => base_url,
        BackendConfig::Local { .. } => "local",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use crawl_core::ReconcilePolicy;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["crawl-dashboard"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dashboard.ron");
        fs::write(
            &path,
            r#"(
                backend: Http(
                    base_url: "http://crawler.internal/api/v1/",
                    connect_timeout_secs: 2,
                    request_timeout_secs: 4,
                    page_size: 50,
                ),
                policies: (start: OptimisticPatch),
                refresh_interval_secs: 0,
            )"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Http {
                base_url: "http://crawler.internal/api/v1/".to_string(),
                connect_timeout_secs: 2,
                request_timeout_secs: 4,
                page_size: 50,
            }
        );
        assert_eq!(config.policies.start, ReconcilePolicy::OptimisticPatch);
        assert_eq!(config.policies.stop, PolicyTable::default().stop);
        assert_eq!(config.refresh_interval_secs, 0);
        assert_eq!(config.log_file, DashboardConfig::default().log_file);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dashboard.ron");
        fs::write(&path, "(backend: Carrier(pigeon))").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse"));
    }

    #[test]
    fn base_url_flag_switches_to_http() {
        let config = DashboardConfig::default().with_cli(&cli(&["--base-url", "http://h/api/"]));
        assert_eq!(config.backend, BackendConfig::http("http://h/api/"));
    }

    #[test]
    fn http_flag_keeps_configured_timeouts() {
        let file = DashboardConfig {
            backend: BackendConfig::Http {
                base_url: "http://old/".to_string(),
                connect_timeout_secs: 1,
                request_timeout_secs: 2,
                page_size: 3,
            },
            ..DashboardConfig::default()
        };
        let config = file.with_cli(&cli(&["--backend", "http", "--base-url", "http://new/"]));
        assert_eq!(
            config.backend,
            BackendConfig::Http {
                base_url: "http://new/".to_string(),
                connect_timeout_secs: 1,
                request_timeout_secs: 2,
                page_size: 3,
            }
        );
    }

    #[test]
    fn local_flag_overrides_http_file() {
        let file = DashboardConfig {
            backend: BackendConfig::http("http://old/"),
            ..DashboardConfig::default()
        };
        let config = file.with_cli(&cli(&["--backend", "local", "--log-file", "x.log"]));
        assert!(matches!(config.backend, BackendConfig::Local { .. }));
        assert_eq!(config.log_file, Some(PathBuf::from("x.log")));
    }

    #[test]
    fn invalid_base_url_fails_backend_build() {
        assert!(build_backend(&BackendConfig::http("not a url")).is_err());
        let local = build_backend(&BackendConfig::Local { latency_ms: 0 }).unwrap();
        assert!(local.simulator.is_some());
    }
}
