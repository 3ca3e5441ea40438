//! Seams to the external oracle service.
//!
//! The traits return the raw JSON the service answered with; the adapters in
//! [`ranking`], [`extraction`] and [`classify`] validate that JSON against the
//! request before anything reaches the crawl state.

pub mod classify;
pub mod extraction;
pub mod openai;
pub mod prompts;
pub mod ranking;

use crate::error::CrawlError;
use crate::record::{Field, Record};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};

/// Request for the next link to visit
#[derive(Debug, Serialize)]
pub struct RankingRequest<'a> {
    pub missing_fields: &'a [Field],
    pub frontier: &'a [String],
}

/// Request for field values on one page
#[derive(Debug, Serialize)]
pub struct ExtractionRequest<'a> {
    pub page_text: &'a str,
    pub current_record: &'a Record,
}

/// Picks the most promising link; answers `{"url": "..."}`
#[async_trait]
pub trait LinkOracle: Send + Sync {
    async fn rank(&self, request: &RankingRequest<'_>) -> Result<Value, CrawlError>;
}

/// Extracts record fields from page text; answers `{"email", "name", "bio", "offering"}`
#[async_trait]
pub trait FieldOracle: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest<'_>) -> Result<Value, CrawlError>;
}

/// Narrows url lists; answers `{"data": ["...", ...]}`
#[async_trait]
pub trait SiteOracle: Send + Sync {
    /// Keep sites likely run by an individual creator
    async fn personal_sites(&self, urls: &[String]) -> Result<Value, CrawlError>;

    /// Keep links likely to hold owner contact details or offerings
    async fn relevant_links(&self, links: &[String]) -> Result<Value, CrawlError>;
}

/// Deterministic ranking: always the oldest link still in the frontier
#[derive(Debug, Clone, Copy, Default)]
pub struct BreadthFirstRanker;

#[async_trait]
impl LinkOracle for BreadthFirstRanker {
    async fn rank(&self, request: &RankingRequest<'_>) -> Result<Value, CrawlError> {
        match request.frontier.first() {
            Some(head) => Ok(json!({ "url": head })),
            None => Err(CrawlError::OracleInvalidResponse(
                "cannot rank an empty frontier".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_breadth_first_picks_head() {
        let frontier = vec!["https://a.example/x".to_string(), "https://a.example/y".to_string()];
        let response = BreadthFirstRanker
            .rank(&RankingRequest {
                missing_fields: &Field::ALL,
                frontier: &frontier,
            })
            .await
            .unwrap();
        assert_eq!(response, json!({ "url": "https://a.example/x" }));
    }

    #[tokio::test]
    async fn test_breadth_first_rejects_empty_frontier() {
        let err = BreadthFirstRanker
            .rank(&RankingRequest {
                missing_fields: &[],
                frontier: &[],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::OracleInvalidResponse(_)));
    }
}
