use serde::Deserialize;

pub type JobId = u64;

/// One job posting as returned by the remote API.
///
/// The payload is partner-controlled, so field absence is tolerated: text
/// fields default to empty/None and a missing `active` reads as inactive.
/// The identifier is not part of the payload; the fetcher fills it in from
/// the requested ID.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct JobRecord {
    #[serde(skip)]
    pub id: JobId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub speciality: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub active: bool,
}
