//! Skillharvest core: pure skill extraction and report types.
mod catalog;
mod extract;
mod job;
mod report;
mod skill;

pub use catalog::{SkillCatalog, LABEL_MARKERS, STOPWORDS, TECH_PATTERNS};
pub use extract::TextSkillExtractor;
pub use job::{JobId, JobRecord};
pub use report::{HarvestOutcome, HarvestReport};
pub use skill::{SkillCategory, SkillEntity, SkillFact};
