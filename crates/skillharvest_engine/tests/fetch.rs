use std::sync::Once;
use std::time::Duration;

use skillharvest_engine::{
    FailureKind, FetchOutcome, FetchSettings, JobFetcher, ReqwestJobFetcher, BROWSER_USER_AGENT,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(harvest_logging::initialize_for_tests);
}

const ACTIVE_JOB: &str = r#"{
    "title": "Backend Developer",
    "company_name": "Initech",
    "speciality": "python",
    "description": "Стек: Django, PostgreSQL.",
    "active": true
}"#;

fn settings_for(server: &MockServer) -> FetchSettings {
    FetchSettings {
        base_url: server.uri(),
        retry_base: Duration::from_millis(10),
        ..FetchSettings::default()
    }
}

#[tokio::test]
async fn active_job_is_found() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ACTIVE_JOB, "application/json"))
        .mount(&server)
        .await;

    let fetcher = ReqwestJobFetcher::new(settings_for(&server)).expect("client");
    let outcome = fetcher.fetch(1).await.expect("fetch ok");

    let FetchOutcome::Found(record) = outcome else {
        panic!("expected a found job, got {outcome:?}");
    };
    assert_eq!(record.id, 1);
    assert_eq!(record.title, "Backend Developer");
    assert_eq!(record.company_name, "Initech");
    assert_eq!(record.speciality.as_deref(), Some("python"));
    assert!(record.active);
}

#[tokio::test]
async fn missing_job_is_not_found() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/7"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestJobFetcher::new(settings_for(&server)).expect("client");
    let outcome = fetcher.fetch(7).await.expect("fetch ok");
    assert_eq!(outcome, FetchOutcome::NotFound);
}

#[tokio::test]
async fn inactive_job_is_classified() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"title": "Old role", "active": false}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestJobFetcher::new(settings_for(&server)).expect("client");
    let outcome = fetcher.fetch(2).await.expect("fetch ok");
    assert_eq!(outcome, FetchOutcome::Inactive);
}

#[tokio::test]
async fn transient_status_is_retried() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/3"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/3"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ACTIVE_JOB, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReqwestJobFetcher::new(settings_for(&server)).expect("client");
    let outcome = fetcher.fetch(3).await.expect("fetch ok");
    assert!(matches!(outcome, FetchOutcome::Found(_)));
}

#[tokio::test]
async fn retries_exhaust_to_transient_failure() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/4"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_retries: 2,
        ..settings_for(&server)
    };
    let fetcher = ReqwestJobFetcher::new(settings).expect("client");
    let err = fetcher.fetch(4).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Transient);
}

#[tokio::test]
async fn unexpected_status_is_fatal_without_retry() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/5"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReqwestJobFetcher::new(settings_for(&server)).expect("client");
    let err = fetcher.fetch(5).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Fatal);
    assert!(err.message.contains("403"));
}

#[tokio::test]
async fn malformed_payload_is_fatal() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/6"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&server)
        .await;

    let fetcher = ReqwestJobFetcher::new(settings_for(&server)).expect("client");
    let err = fetcher.fetch(6).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Fatal);
    assert!(err.message.starts_with("malformed payload"));
}

#[tokio::test]
async fn browser_user_agent_is_presented() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/8"))
        .and(header("user-agent", BROWSER_USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"active": false}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestJobFetcher::new(settings_for(&server)).expect("client");
    let outcome = fetcher.fetch(8).await.expect("fetch ok");
    assert_eq!(outcome, FetchOutcome::Inactive);
}

#[tokio::test]
async fn slow_response_times_out_as_transient() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_raw(ACTIVE_JOB, "application/json"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        max_retries: 0,
        ..settings_for(&server)
    };
    let fetcher = ReqwestJobFetcher::new(settings).expect("client");
    let err = fetcher.fetch(9).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Transient);
}
