//! Skillharvest engine: wire client, stores, and the harvest scheduler.
mod fetch;
mod scheduler;
mod store;
mod sqlite_store;
mod types;

pub use fetch::{FetchSettings, JobFetcher, ReqwestJobFetcher, BROWSER_USER_AGENT};
pub use scheduler::{HarvestScheduler, HarvestSettings, RatePolicy, SchedulePolicy};
pub use sqlite_store::SqliteSkillStore;
pub use store::{MemorySkillStore, SkillStore};
pub use types::{FailureKind, FetchError, FetchOutcome, HarvestError, StoreError};
