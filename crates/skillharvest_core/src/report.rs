use serde::Serialize;

use crate::job::JobId;

/// Per-job result: the skills newly persisted for one found, active job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestOutcome {
    pub job_id: JobId,
    pub title: String,
    pub company: String,
    pub skills: Vec<String>,
}

/// Aggregate result of one harvest over an identifier range.
///
/// `outcomes` arrival order is whatever the scheduling policy produced;
/// consumers must not read meaning into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    pub processed: usize,
    pub new_skills: usize,
    pub not_found: usize,
    pub inactive: usize,
    pub failed: usize,
    pub outcomes: Vec<HarvestOutcome>,
}

impl HarvestReport {
    /// Folds one completed job into the report.
    pub fn record_outcome(&mut self, outcome: HarvestOutcome) {
        self.processed += 1;
        self.new_skills += outcome.skills.len();
        self.outcomes.push(outcome);
    }
}
