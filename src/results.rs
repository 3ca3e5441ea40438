use crate::error::{CrawlError, ErrorKind};
use crate::record::Record;
use serde::{Deserialize, Serialize};

/// States of a frontier traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrawlState {
    Running,
    /// Every record field is set
    Complete,
    /// Frontier emptied (or the visit cap hit) first
    Exhausted,
    /// The browser session died; surfaced as an error
    Failed,
}

/// A per-step error absorbed by the traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    /// Link being handled, if the step had one
    pub link: Option<String>,
    pub kind: ErrorKind,
    pub message: String,
}

impl StepFailure {
    pub fn new(link: Option<&str>, error: &CrawlError) -> Self {
        Self {
            link: link.map(str::to_string),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Result of crawling one origin site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlOutcome {
    /// `Complete` or `Exhausted`
    pub state: CrawlState,

    /// Possibly partial; unset fields serialize as null
    pub record: Record,

    /// Links fetched, in visit order
    pub visited: Vec<String>,

    pub failures: Vec<StepFailure>,

    /// Stopped by `max_visits` rather than an empty frontier
    #[serde(default)]
    pub visit_cap_reached: bool,
}

/// What happened to one candidate site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteReport {
    pub site_url: String,

    /// Links the traversal started from
    pub seed_links: usize,

    /// Why the site was not crawled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CrawlOutcome>,

    /// Record handed to the CRM sink
    pub delivered: bool,
}

impl SiteReport {
    pub fn skipped(site_url: &str, reason: impl Into<String>) -> Self {
        Self {
            site_url: site_url.to_string(),
            seed_links: 0,
            skipped: Some(reason.into()),
            outcome: None,
            delivered: false,
        }
    }

    pub fn crawled(site_url: &str, seed_links: usize, outcome: CrawlOutcome, delivered: bool) -> Self {
        Self {
            site_url: site_url.to_string(),
            seed_links,
            skipped: None,
            outcome: Some(outcome),
            delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_outcome_serializes_nulls() {
        let outcome = CrawlOutcome {
            state: CrawlState::Exhausted,
            record: Record {
                email: Some("a@x.com".into()),
                ..Record::default()
            },
            visited: vec!["https://jane.example/".into()],
            failures: vec![],
            visit_cap_reached: false,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["state"], json!("EXHAUSTED"));
        assert_eq!(
            value["record"],
            json!({ "email": "a@x.com", "name": null, "bio": null, "offering": null })
        );
    }

    #[test]
    fn test_step_failure_from_error() {
        let failure = StepFailure::new(
            Some("https://jane.example/a"),
            &CrawlError::OracleInvalidResponse("bad".into()),
        );
        assert_eq!(failure.kind, ErrorKind::OracleInvalidResponse);
        assert_eq!(failure.link.as_deref(), Some("https://jane.example/a"));
    }
}
