use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use harvest_logging::{harvest_debug, harvest_info, harvest_warn};
use rand::Rng;
use skillharvest_core::{HarvestOutcome, HarvestReport, JobId, TextSkillExtractor};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::fetch::JobFetcher;
use crate::store::SkillStore;
use crate::types::{FetchOutcome, HarvestError};

/// Uniform random pause taken before each fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    /// Shortest pause.
    pub jitter_min: Duration,
    /// Longest pause. Zero disables pacing entirely.
    pub jitter_max: Duration,
}

impl RatePolicy {
    /// No pacing at all.
    pub fn none() -> Self {
        Self {
            jitter_min: Duration::ZERO,
            jitter_max: Duration::ZERO,
        }
    }

    fn delay(&self) -> Duration {
        if self.jitter_max.is_zero() {
            return Duration::ZERO;
        }
        let min_ms = self.jitter_min.as_millis() as u64;
        let max_ms = (self.jitter_max.as_millis() as u64).max(min_ms);
        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            jitter_min: Duration::from_millis(50),
            jitter_max: Duration::from_millis(100),
        }
    }
}

/// How the jobs of a range are spread over workers.
///
/// Every policy yields the same report counts for the same inputs; they
/// differ only in dispatch shape and outcome arrival order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchedulePolicy {
    /// One task per job, at most `concurrency` in flight at a time.
    #[default]
    FanOut,
    /// Fixed pool of workers draining a shared queue.
    WorkerQueue,
    /// Range split into contiguous batches, one worker per batch.
    Partitioned,
}

/// Scheduler tuning knobs.
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Upper bound on jobs in flight (or worker count, per policy).
    pub concurrency: usize,
    pub policy: SchedulePolicy,
    pub rate: RatePolicy,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            concurrency: 10,
            policy: SchedulePolicy::default(),
            rate: RatePolicy::default(),
        }
    }
}

/// Drives fetch, extract, and persist over a job-id range under one
/// scheduling policy, with per-item failure isolation.
pub struct HarvestScheduler {
    ctx: PipelineContext,
    settings: HarvestSettings,
}

impl HarvestScheduler {
    pub fn new(
        fetcher: Arc<dyn JobFetcher>,
        extractor: TextSkillExtractor,
        store: Arc<dyn SkillStore>,
        settings: HarvestSettings,
    ) -> Self {
        Self {
            ctx: PipelineContext {
                fetcher,
                extractor: Arc::new(extractor),
                store,
                rate: settings.rate,
            },
            settings,
        }
    }

    /// Harvests the whole range to completion.
    pub async fn harvest(
        &self,
        range: RangeInclusive<JobId>,
    ) -> Result<HarvestReport, HarvestError> {
        self.harvest_with_cancel(range, CancellationToken::new())
            .await
    }

    /// Harvests the range until done or `cancel` fires. Jobs already in
    /// flight when the token fires finish and are counted; jobs not yet
    /// started are skipped and appear in no counter.
    pub async fn harvest_with_cancel(
        &self,
        range: RangeInclusive<JobId>,
        cancel: CancellationToken,
    ) -> Result<HarvestReport, HarvestError> {
        let ids: Vec<JobId> = range.collect();
        harvest_info!(
            "harvest start: {} jobs, {:?} policy, concurrency {}",
            ids.len(),
            self.settings.policy,
            self.settings.concurrency
        );

        let outcomes = match self.settings.policy {
            SchedulePolicy::FanOut => self.run_fan_out(ids, &cancel).await?,
            SchedulePolicy::WorkerQueue => self.run_worker_queue(ids, &cancel).await?,
            SchedulePolicy::Partitioned => self.run_partitioned(ids, &cancel).await?,
        };

        let mut report = HarvestReport::default();
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Completed(done) => report.record_outcome(done),
                ItemOutcome::NotFound => report.not_found += 1,
                ItemOutcome::Inactive => report.inactive += 1,
                ItemOutcome::Failed => report.failed += 1,
                ItemOutcome::Skipped => {}
            }
        }

        harvest_info!(
            "harvest done: {} processed, {} new skills, {} not found, {} inactive, {} failed",
            report.processed,
            report.new_skills,
            report.not_found,
            report.inactive,
            report.failed
        );
        Ok(report)
    }

    /// Items run as spawned tasks so a panicking item is joined into a
    /// [`HarvestError::Worker`], the same way the pooled policies fail.
    async fn run_fan_out(
        &self,
        ids: Vec<JobId>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ItemOutcome>, HarvestError> {
        let width = self.settings.concurrency.max(1);
        let joined = stream::iter(ids)
            .map(|job_id| {
                let ctx = self.ctx.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move { ctx.guarded_item(job_id, &cancel).await })
            })
            .buffer_unordered(width)
            .collect::<Vec<_>>()
            .await;

        joined
            .into_iter()
            .map(|item| item.map_err(|err| HarvestError::Worker(err.to_string())))
            .collect()
    }

    async fn run_worker_queue(
        &self,
        ids: Vec<JobId>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ItemOutcome>, HarvestError> {
        let queue = Arc::new(Mutex::new(VecDeque::from(ids)));
        let workers = self.settings.concurrency.max(1);
        let mut set = JoinSet::new();
        for _ in 0..workers {
            let ctx = self.ctx.clone();
            let queue = Arc::clone(&queue);
            let cancel = cancel.clone();
            set.spawn(async move {
                let mut outcomes = Vec::new();
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let next = queue.lock().await.pop_front();
                    let Some(job_id) = next else { break };
                    outcomes.push(ctx.guarded_item(job_id, &cancel).await);
                }
                outcomes
            });
        }

        collect_workers(set).await
    }

    async fn run_partitioned(
        &self,
        ids: Vec<JobId>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ItemOutcome>, HarvestError> {
        let workers = self.settings.concurrency.max(1);
        let chunk = ids.len().div_ceil(workers).max(1);
        let mut set = JoinSet::new();
        for batch in ids.chunks(chunk) {
            let batch = batch.to_vec();
            let ctx = self.ctx.clone();
            let cancel = cancel.clone();
            set.spawn(async move {
                let mut outcomes = Vec::new();
                for job_id in batch {
                    if cancel.is_cancelled() {
                        break;
                    }
                    outcomes.push(ctx.guarded_item(job_id, &cancel).await);
                }
                outcomes
            });
        }

        collect_workers(set).await
    }
}

/// Per-item result before aggregation.
enum ItemOutcome {
    Completed(HarvestOutcome),
    NotFound,
    Inactive,
    Failed,
    Skipped,
}

/// Shared pipeline state handed to every worker.
#[derive(Clone)]
struct PipelineContext {
    fetcher: Arc<dyn JobFetcher>,
    extractor: Arc<TextSkillExtractor>,
    store: Arc<dyn SkillStore>,
    rate: RatePolicy,
}

impl PipelineContext {
    /// One job under cancellation and pacing. Jitter runs before the fetch
    /// so concurrent workers do not hit the remote in lockstep.
    async fn guarded_item(&self, job_id: JobId, cancel: &CancellationToken) -> ItemOutcome {
        if cancel.is_cancelled() {
            return ItemOutcome::Skipped;
        }
        // Thread-local RNG must not be held across an await.
        let delay = self.rate.delay();
        if !delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return ItemOutcome::Skipped,
            }
        }
        self.process_one(job_id).await
    }

    async fn process_one(&self, job_id: JobId) -> ItemOutcome {
        let record = match self.fetcher.fetch(job_id).await {
            Ok(FetchOutcome::Found(record)) => record,
            Ok(FetchOutcome::NotFound) => {
                harvest_debug!("job {job_id}: not found");
                return ItemOutcome::NotFound;
            }
            Ok(FetchOutcome::Inactive) => {
                harvest_debug!("job {job_id}: listing is inactive");
                return ItemOutcome::Inactive;
            }
            Err(err) => {
                harvest_warn!("job {job_id}: fetch failed ({}): {}", err.kind, err.message);
                return ItemOutcome::Failed;
            }
        };

        let facts = self.extractor.extract(&record);
        let mut skills = Vec::new();
        for fact in &facts {
            match self.store.ensure_persisted(fact).await {
                Ok(Some(name)) => {
                    harvest_debug!("job {job_id}: new skill {name}");
                    skills.push(name);
                }
                Ok(None) => {}
                Err(err) => {
                    harvest_warn!("job {job_id}: store failed: {err}");
                    return ItemOutcome::Failed;
                }
            }
        }

        harvest_info!(
            "job {job_id}: {} at {}, {} new skills",
            record.title,
            record.company_name,
            skills.len()
        );
        ItemOutcome::Completed(HarvestOutcome {
            job_id,
            title: record.title,
            company: record.company_name,
            skills,
        })
    }
}

async fn collect_workers(
    mut set: JoinSet<Vec<ItemOutcome>>,
) -> Result<Vec<ItemOutcome>, HarvestError> {
    let mut outcomes = Vec::new();
    while let Some(joined) = set.join_next().await {
        let worker = joined.map_err(|err| HarvestError::Worker(err.to_string()))?;
        outcomes.extend(worker);
    }
    Ok(outcomes)
}
