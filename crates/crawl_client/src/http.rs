use std::time::Duration;

use crawl_core::{CrawlJob, JobAnalysis, JobId};
use crawl_logging::crawl_debug;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::{CrawlError, CrawlService};

/// The service caps a listing page at this many jobs.
const MAX_PAGE_SIZE: u32 = 100;
/// 404 detail for a job that exists but has not been analyzed.
const ANALYSIS_MISSING: &str = "Analysis not found";

#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// API root; routes such as `urls/` are resolved against it.
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub page_size: u32,
}

impl HttpSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            page_size: MAX_PAGE_SIZE,
        }
    }
}

/// [`CrawlService`] backed by the dashboard's REST API.
#[derive(Debug, Clone)]
pub struct HttpCrawlService {
    client: reqwest::Client,
    base_url: Url,
    page_size: u32,
}

impl HttpCrawlService {
    pub fn new(settings: HttpSettings) -> Result<Self, CrawlError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| CrawlError::unavailable(err.to_string()))?;

        let mut base_url = settings.base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            page_size: settings.page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    fn endpoint(&self, route: &str) -> Result<Url, CrawlError> {
        self.base_url
            .join(route)
            .map_err(|err| CrawlError::unavailable(format!("invalid endpoint {route}: {err}")))
    }
}

#[async_trait::async_trait]
impl CrawlService for HttpCrawlService {
    async fn list_jobs(&self) -> Result<Vec<CrawlJob>, CrawlError> {
        let mut jobs = Vec::new();
        let mut skip: u64 = 0;
        loop {
            let mut url = self.endpoint("urls/")?;
            url.query_pairs_mut()
                .append_pair("skip", &skip.to_string())
                .append_pair("limit", &self.page_size.to_string());

            let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
            let page: Vec<CrawlJob> = read_json(response, None).await?;
            let fetched = page.len();
            jobs.extend(page);
            if fetched < self.page_size as usize {
                break;
            }
            skip += fetched as u64;
        }
        crawl_debug!("Listed {} jobs from {}", jobs.len(), self.base_url);
        Ok(jobs)
    }

    async fn add_job(&self, url: &str) -> Result<CrawlJob, CrawlError> {
        let mut endpoint = self.endpoint("urls/")?;
        endpoint.query_pairs_mut().append_pair("url", url);
        let response = self
            .client
            .post(endpoint)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response, None).await
    }

    async fn start_job(&self, id: JobId) -> Result<(), CrawlError> {
        let endpoint = self.endpoint(&format!("urls/{id}/start"))?;
        let response = self
            .client
            .post(endpoint)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        expect_success(response, Some(id)).await
    }

    async fn stop_job(&self, id: JobId) -> Result<(), CrawlError> {
        let endpoint = self.endpoint(&format!("urls/{id}/stop"))?;
        let response = self
            .client
            .post(endpoint)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        expect_success(response, Some(id)).await
    }

    async fn delete_jobs(&self, ids: &[JobId]) -> Result<(), CrawlError> {
        let endpoint = self.endpoint("urls/")?;
        let response = self
            .client
            .delete(endpoint)
            .json(ids)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            // Deleting jobs that are already gone is a no-op.
            crawl_debug!("Delete of {:?} found nothing to remove", ids);
            return Ok(());
        }
        expect_success(response, None).await
    }

    async fn reanalyze_jobs(&self, ids: &[JobId]) -> Result<(), CrawlError> {
        let endpoint = self.endpoint("urls/reanalyze")?;
        let response = self
            .client
            .post(endpoint)
            .json(ids)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        expect_success(response, ids.first().copied()).await
    }

    async fn get_analysis(&self, id: JobId) -> Result<Option<JobAnalysis>, CrawlError> {
        let endpoint = self.endpoint(&format!("urls/{id}"))?;
        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if response.status() != StatusCode::NOT_FOUND {
            return read_json(response, Some(id)).await.map(Some);
        }
        let body = response.text().await.unwrap_or_default();
        match extract_detail(&body) {
            Some(detail) if detail == ANALYSIS_MISSING => Ok(None),
            _ => Err(CrawlError::NotFound { id }),
        }
    }
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    id: Option<JobId>,
) -> Result<T, CrawlError> {
    if !response.status().is_success() {
        return Err(error_from_response(response, id).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|err| CrawlError::unavailable(format!("invalid response body: {err}")))
}

async fn expect_success(response: Response, id: Option<JobId>) -> Result<(), CrawlError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_from_response(response, id).await)
    }
}

async fn error_from_response(response: Response, id: Option<JobId>) -> CrawlError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body).unwrap_or_else(|| status.to_string());
    classify_status(status, id, detail)
}

fn classify_status(status: StatusCode, id: Option<JobId>, detail: String) -> CrawlError {
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => CrawlError::NotFound { id },
        // A missing route means a misconfigured base url, not a bad request.
        (StatusCode::NOT_FOUND, None) => CrawlError::unavailable(detail),
        (status, _) if status.is_client_error() => CrawlError::rejected(detail),
        _ => CrawlError::unavailable(detail),
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: serde_json::Value,
}

/// Pulls the `detail` member out of an error body. Structured details
/// (validation errors) are rendered as JSON text.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> CrawlError {
    if err.is_timeout() {
        return CrawlError::unavailable(format!("request timed out: {err}"));
    }
    CrawlError::unavailable(err.to_string())
}
