//! HTTP surface: one `POST /parse` endpoint driving a harvest per request.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use harvest_logging::harvest_error;
use skillharvest_core::{HarvestReport, JobId};
use skillharvest_engine::HarvestScheduler;

/// Shared service state.
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<HarvestScheduler>,
}

/// Query parameters of `POST /parse`.
#[derive(Debug, Deserialize)]
pub struct ParseParams {
    #[serde(default = "default_start_id")]
    pub start_id: JobId,
    #[serde(default = "default_end_id")]
    pub end_id: JobId,
}

fn default_start_id() -> JobId {
    1
}

fn default_end_id() -> JobId {
    100
}

/// Response envelope shared by success and error replies.
#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<HarvestReport>,
}

/// Builds the service router.
pub fn router(scheduler: Arc<HarvestScheduler>) -> Router {
    Router::new()
        .route("/parse", post(parse_jobs))
        .with_state(AppState { scheduler })
}

/// Runs one harvest over the requested range.
///
/// Per-item failures are already folded into the report; an error reply
/// means the harvest environment itself broke.
pub async fn parse_jobs(
    State(state): State<AppState>,
    Query(params): Query<ParseParams>,
) -> Result<Json<ParseResponse>, (StatusCode, Json<ParseResponse>)> {
    match state
        .scheduler
        .harvest(params.start_id..=params.end_id)
        .await
    {
        Ok(report) => Ok(Json(ParseResponse {
            status: "success".to_string(),
            message: "Parsing completed".to_string(),
            report: Some(report),
        })),
        Err(err) => {
            harvest_error!("parse failed: {err}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ParseResponse {
                    status: "error".to_string(),
                    message: err.to_string(),
                    report: None,
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use skillharvest_core::{SkillFact, TextSkillExtractor};
    use skillharvest_engine::{
        FetchSettings, HarvestSettings, MemorySkillStore, RatePolicy, ReqwestJobFetcher,
        SchedulePolicy, SkillStore, StoreError,
    };
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scheduler_over(server: &MockServer, store: Arc<dyn SkillStore>) -> Arc<HarvestScheduler> {
        let settings = FetchSettings {
            base_url: server.uri(),
            max_retries: 0,
            ..FetchSettings::default()
        };
        let fetcher = Arc::new(ReqwestJobFetcher::new(settings).expect("client"));
        Arc::new(HarvestScheduler::new(
            fetcher,
            TextSkillExtractor::new(),
            store,
            HarvestSettings {
                concurrency: 2,
                policy: SchedulePolicy::WorkerQueue,
                rate: RatePolicy::none(),
            },
        ))
    }

    #[tokio::test]
    async fn parse_returns_success_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
                "title": "Backend Developer",
                "company_name": "Initech",
                "speciality": "rust",
                "active": true
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let scheduler = scheduler_over(&server, Arc::new(MemorySkillStore::new()));
        let state = AppState { scheduler };
        let params = ParseParams {
            start_id: 1,
            end_id: 2,
        };

        let reply = parse_jobs(State(state), Query(params))
            .await
            .expect("success");
        let body = serde_json::to_value(&reply.0).expect("serialize");
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Parsing completed");
        assert_eq!(body["report"]["processed"], 1);
        assert_eq!(body["report"]["not_found"], 1);
        assert_eq!(body["report"]["outcomes"][0]["skills"][0], "RUST");
    }

    #[test]
    fn parse_params_default_to_first_hundred() {
        let params: ParseParams = serde_json::from_value(json!({})).expect("parse");
        assert_eq!(params.start_id, 1);
        assert_eq!(params.end_id, 100);
    }

    struct PanickingStore;

    #[async_trait::async_trait]
    impl SkillStore for PanickingStore {
        async fn ensure_persisted(&self, _fact: &SkillFact) -> Result<Option<String>, StoreError> {
            panic!("store blew up");
        }
    }

    #[tokio::test]
    async fn broken_environment_maps_to_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
                "title": "Role",
                "company_name": "Acme",
                "speciality": "go",
                "active": true
            })))
            .mount(&server)
            .await;

        let scheduler = scheduler_over(&server, Arc::new(PanickingStore));
        let state = AppState { scheduler };
        let params = ParseParams {
            start_id: 1,
            end_id: 1,
        };

        let (status, reply) = parse_jobs(State(state), Query(params))
            .await
            .expect_err("worker panic surfaces");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.0.status, "error");
        assert!(reply.0.report.is_none());
    }
}
