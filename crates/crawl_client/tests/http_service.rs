use std::sync::{Arc, Once};
use std::time::Duration;

use crawl_client::{CrawlError, CrawlService, HttpCrawlService, HttpSettings, Orchestrator};
use crawl_core::{CrawlJob, JobAnalysis, JobStatus, JobStore};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(crawl_logging::initialize_for_tests);
}

fn not_found(detail: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({ "detail": detail }))
}

fn service_for(server: &MockServer) -> HttpCrawlService {
    init_logging();
    let base = Url::parse(&format!("{}/api/v1", server.uri())).unwrap();
    HttpCrawlService::new(HttpSettings::new(base)).unwrap()
}

#[tokio::test]
async fn list_jobs_reads_service_order_and_ignores_extra_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/urls/"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 2, "url": "https://b.example", "status": "running", "user_id": "u1" },
            {
                "id": 1,
                "url": "https://a.example",
                "status": "done",
                "created_at": "2025-01-01T00:00:00"
            }
        ])))
        .mount(&server)
        .await;

    let jobs = service_for(&server).list_jobs().await.unwrap();
    assert_eq!(
        jobs,
        vec![
            CrawlJob::new(2, "https://b.example", JobStatus::Running),
            CrawlJob::new(1, "https://a.example", JobStatus::Done),
        ]
    );
}

#[tokio::test]
async fn list_jobs_follows_pages_until_short_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/urls/"))
        .and(query_param("skip", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "url": "https://c.example", "status": "queued" },
            { "id": 2, "url": "https://b.example", "status": "queued" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/urls/"))
        .and(query_param("skip", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "url": "https://a.example", "status": "stopped" }
        ])))
        .mount(&server)
        .await;

    let base = Url::parse(&format!("{}/api/v1/", server.uri())).unwrap();
    let settings = HttpSettings {
        page_size: 2,
        ..HttpSettings::new(base)
    };
    let service = HttpCrawlService::new(settings).unwrap();
    let ids: Vec<_> = service
        .list_jobs()
        .await
        .unwrap()
        .iter()
        .map(|job| job.id)
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[tokio::test]
async fn add_job_passes_url_as_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/urls/"))
        .and(query_param("url", "https://example.com/a?b=c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12, "url": "https://example.com/a?b=c", "status": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let job = service_for(&server)
        .add_job("https://example.com/a?b=c")
        .await
        .unwrap();
    assert_eq!(job, CrawlJob::new(12, "https://example.com/a?b=c", JobStatus::Queued));
}

#[tokio::test]
async fn duplicate_submission_is_rejected_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/urls/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "URL already submitted." })),
        )
        .mount(&server)
        .await;

    let err = service_for(&server)
        .add_job("https://example.com")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CrawlError::RemoteRejected {
            detail: "URL already submitted.".to_string()
        }
    );
}

#[tokio::test]
async fn start_and_stop_hit_job_routes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/urls/5/start"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/urls/5/stop"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server);
    service.start_job(5).await.unwrap();
    service.stop_job(5).await.unwrap();
}

#[tokio::test]
async fn unknown_job_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/urls/999/start"))
        .respond_with(not_found("URL not found"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/urls/reanalyze"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let service = service_for(&server);
    assert_eq!(
        service.start_job(999).await.unwrap_err(),
        CrawlError::NotFound { id: 999 }
    );
    assert_eq!(
        service.reanalyze_jobs(&[999]).await.unwrap_err(),
        CrawlError::NotFound { id: 999 }
    );
}

#[tokio::test]
async fn bulk_routes_send_id_lists() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/urls/"))
        .and(body_json(json!([7])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/urls/reanalyze"))
        .and(body_json(json!([8])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server);
    service.delete_jobs(&[7]).await.unwrap();
    service.reanalyze_jobs(&[8]).await.unwrap();
}

#[tokio::test]
async fn server_errors_are_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/urls/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = service_for(&server).list_jobs().await.unwrap_err();
    assert!(matches!(err, CrawlError::RemoteUnavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn slow_service_times_out_as_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/urls/1/stop"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(250)))
        .mount(&server)
        .await;

    init_logging();
    let base = Url::parse(&format!("{}/api/v1/", server.uri())).unwrap();
    let settings = HttpSettings {
        request_timeout: Duration::from_millis(50),
        ..HttpSettings::new(base)
    };
    let err = HttpCrawlService::new(settings)
        .unwrap()
        .stop_job(1)
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::RemoteUnavailable(_)));
}

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    init_logging();
    // Port 9 (discard) on localhost is not expected to accept HTTP.
    let base = Url::parse("http://127.0.0.1:9/api/v1/").unwrap();
    let settings = HttpSettings {
        connect_timeout: Duration::from_millis(200),
        request_timeout: Duration::from_millis(500),
        ..HttpSettings::new(base)
    };
    let err = HttpCrawlService::new(settings)
        .unwrap()
        .list_jobs()
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::RemoteUnavailable(_)));
}

#[tokio::test]
async fn deleting_already_deleted_job_succeeds_and_drops_it_locally() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/urls/"))
        .and(body_json(json!([5])))
        .respond_with(not_found("URL not found"))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server);
    service.delete_jobs(&[5]).await.unwrap();

    let store = Arc::new(JobStore::new());
    store.replace_all(vec![
        CrawlJob::new(6, "https://b.example", JobStatus::Queued),
        CrawlJob::new(5, "https://a.example", JobStatus::Done),
    ]);
    let orchestrator = Orchestrator::new(Arc::new(service), store.clone());
    orchestrator.delete(5).await.unwrap();
    assert_eq!(
        store.list(),
        vec![CrawlJob::new(6, "https://b.example", JobStatus::Queued)]
    );
}

#[tokio::test]
async fn analysis_is_read_from_job_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/urls/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Example Domain",
            "internal_links": 2,
            "broken_links": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let analysis = service_for(&server).get_analysis(9).await.unwrap();
    let expected = JobAnalysis::default()
        .with_field("title", "Example Domain")
        .with_field("internal_links", 2)
        .with_field("broken_links", json!([]));
    assert_eq!(analysis, Some(expected));
}

#[tokio::test]
async fn missing_analysis_and_missing_job_are_told_apart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/urls/3"))
        .respond_with(not_found("Analysis not found"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/urls/4"))
        .respond_with(not_found("URL not found"))
        .mount(&server)
        .await;

    let service = service_for(&server);
    assert_eq!(service.get_analysis(3).await.unwrap(), None);
    assert_eq!(
        service.get_analysis(4).await.unwrap_err(),
        CrawlError::NotFound { id: 4 }
    );
}
