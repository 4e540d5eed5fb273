use std::time::Duration;

use harvest_logging::harvest_debug;
use skillharvest_core::{JobId, JobRecord};

use crate::types::{FailureKind, FetchError, FetchOutcome};

/// User agent presented to the job API.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Statuses worth retrying: rate limits and server-side overload.
const RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

/// Wire-level settings for the job API client.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Retries after the initial attempt, transient failures only.
    pub max_retries: u32,
    /// Backoff base: the n-th retry waits `retry_base * 2^n`.
    pub retry_base: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://jobs.yourcodereview.com".to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base: Duration::from_millis(500),
        }
    }
}

/// Wire-level client: one job record by identifier, outcome classified.
#[async_trait::async_trait]
pub trait JobFetcher: Send + Sync {
    async fn fetch(&self, job_id: JobId) -> Result<FetchOutcome, FetchError>;
}

/// [`JobFetcher`] over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestJobFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestJobFetcher {
    /// Builds the shared HTTP client. Failure here means the client
    /// environment itself is unusable, a batch-level condition.
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Fatal, err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn job_url(&self, job_id: JobId) -> String {
        format!(
            "{}/api/jobs/{}",
            self.settings.base_url.trim_end_matches('/'),
            job_id
        )
    }

    async fn fetch_once(&self, job_id: JobId) -> Result<FetchOutcome, FetchError> {
        let response = self
            .client
            .get(self.job_url(job_id))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(FetchOutcome::NotFound);
        }
        if !status.is_success() {
            let kind = if RETRYABLE_STATUS.contains(&status.as_u16()) {
                FailureKind::Transient
            } else {
                FailureKind::Fatal
            };
            return Err(FetchError::new(kind, format!("http status {status}")));
        }

        let body = response.text().await.map_err(map_reqwest_error)?;
        let mut record: JobRecord = serde_json::from_str(&body).map_err(|err| {
            FetchError::new(FailureKind::Fatal, format!("malformed payload: {err}"))
        })?;
        record.id = job_id;

        if record.active {
            Ok(FetchOutcome::Found(record))
        } else {
            Ok(FetchOutcome::Inactive)
        }
    }
}

#[async_trait::async_trait]
impl JobFetcher for ReqwestJobFetcher {
    async fn fetch(&self, job_id: JobId) -> Result<FetchOutcome, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(job_id).await {
                Err(err)
                    if err.kind == FailureKind::Transient
                        && attempt < self.settings.max_retries =>
                {
                    let delay = self.settings.retry_base * 2u32.pow(attempt);
                    attempt += 1;
                    harvest_debug!(
                        "job {job_id}: {}, retry {attempt}/{} in {delay:?}",
                        err.message,
                        self.settings.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Transient, format!("timeout: {err}"));
    }
    if err.is_connect() {
        return FetchError::new(FailureKind::Transient, format!("connect: {err}"));
    }
    // Mid-body disconnects and protocol hiccups are worth one more try.
    FetchError::new(FailureKind::Transient, err.to_string())
}
