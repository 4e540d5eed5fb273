//! Command-line entry point: one-shot harvests and the HTTP service.
mod service;

use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;

use harvest_logging::{harvest_info, LogDestination};
use skillharvest_core::{JobId, TextSkillExtractor};
use skillharvest_engine::{
    FetchSettings, HarvestError, HarvestScheduler, HarvestSettings, MemorySkillStore, RatePolicy,
    ReqwestJobFetcher, SchedulePolicy, SkillStore, SqliteSkillStore,
};

#[derive(Parser)]
#[command(
    name = "skillharvest",
    about = "Harvests skill facts from remote job listings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest one job-id range and print the report as JSON.
    Run {
        /// First job id, inclusive.
        #[arg(long, default_value_t = 1)]
        start_id: JobId,
        /// Last job id, inclusive.
        #[arg(long, default_value_t = 100)]
        end_id: JobId,
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Serve harvests over HTTP (`POST /parse`).
    Serve {
        /// Listen port.
        #[arg(long, default_value_t = 8001)]
        port: u16,
        #[command(flatten)]
        common: CommonOpts,
    },
}

#[derive(Args)]
struct CommonOpts {
    /// Base URL of the job API.
    #[arg(long, default_value = "https://jobs.yourcodereview.com")]
    base_url: String,
    /// SQLite database URL, created if missing; omitted means a volatile
    /// in-memory store.
    #[arg(long)]
    database_url: Option<String>,
    /// Jobs in flight at a time (or worker count, per policy).
    #[arg(long, default_value_t = 10)]
    concurrency: usize,
    /// Scheduling policy.
    #[arg(long, value_enum, default_value = "fan-out")]
    policy: PolicyArg,
    /// Where log output goes.
    #[arg(long, value_enum, default_value = "terminal")]
    log: LogArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    FanOut,
    WorkerQueue,
    Partitioned,
}

impl From<PolicyArg> for SchedulePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::FanOut => SchedulePolicy::FanOut,
            PolicyArg::WorkerQueue => SchedulePolicy::WorkerQueue,
            PolicyArg::Partitioned => SchedulePolicy::Partitioned,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LogArg {
    File,
    Terminal,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(value: LogArg) -> Self {
        match value {
            LogArg::File => LogDestination::File,
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::Both => LogDestination::Both,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            start_id,
            end_id,
            common,
        } => run(start_id, end_id, common).await,
        Commands::Serve { port, common } => serve(port, common).await,
    }
}

async fn run(start_id: JobId, end_id: JobId, common: CommonOpts) -> anyhow::Result<()> {
    harvest_logging::initialize(common.log.into());
    let scheduler = build_scheduler(&common).await?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            harvest_info!("interrupt received, finishing jobs in flight");
            interrupt.cancel();
        }
    });

    let report = scheduler
        .harvest_with_cancel(start_id..=end_id, cancel)
        .await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn serve(port: u16, common: CommonOpts) -> anyhow::Result<()> {
    harvest_logging::initialize(common.log.into());
    let scheduler = Arc::new(build_scheduler(&common).await?);
    let app = service::router(scheduler);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("bind port {port}"))?;
    harvest_info!("serving on port {port}");
    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}

async fn build_scheduler(common: &CommonOpts) -> anyhow::Result<HarvestScheduler> {
    let fetch = FetchSettings {
        base_url: common.base_url.clone(),
        ..FetchSettings::default()
    };
    let fetcher = Arc::new(
        ReqwestJobFetcher::new(fetch).map_err(|err| HarvestError::Client(err.message))?,
    );

    let store: Arc<dyn SkillStore> = match &common.database_url {
        Some(url) => Arc::new(
            SqliteSkillStore::connect(url)
                .await
                .map_err(HarvestError::Store)?,
        ),
        None => Arc::new(MemorySkillStore::new()),
    };

    let settings = HarvestSettings {
        concurrency: common.concurrency,
        policy: common.policy.into(),
        rate: RatePolicy::default(),
    };
    Ok(HarvestScheduler::new(
        fetcher,
        TextSkillExtractor::new(),
        store,
        settings,
    ))
}
