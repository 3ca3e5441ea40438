use crate::error::CrawlError;
use crate::oracle::SiteOracle;
use serde_json::Value;
use std::collections::HashSet;

/// Wraps a [`SiteOracle`]; answers are reduced to members of the input list.
pub struct SiteClassifier<'a> {
    oracle: &'a dyn SiteOracle,
}

impl<'a> SiteClassifier<'a> {
    pub fn new(oracle: &'a dyn SiteOracle) -> Self {
        Self { oracle }
    }

    pub async fn personal_sites(&self, candidates: &[String]) -> Result<Vec<String>, CrawlError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let response = self.oracle.personal_sites(candidates).await?;
        let kept = retain_listed(&response, candidates)?;
        ::log::info!(
            "Personal site filter kept {} of {} candidates",
            kept.len(),
            candidates.len()
        );
        Ok(kept)
    }

    pub async fn relevant_links(&self, links: &[String]) -> Result<Vec<String>, CrawlError> {
        if links.is_empty() {
            return Ok(Vec::new());
        }
        let response = self.oracle.relevant_links(links).await?;
        let kept = retain_listed(&response, links)?;
        ::log::info!("Relevant link filter kept {} of {} links", kept.len(), links.len());
        Ok(kept)
    }
}

/// Items of `input` named in `{"data": [...]}`, in input order
pub fn retain_listed(response: &Value, input: &[String]) -> Result<Vec<String>, CrawlError> {
    let Some(Value::Array(items)) = response.get("data") else {
        return Err(CrawlError::OracleInvalidResponse(format!(
            "expected a data array, got {response}"
        )));
    };

    let mut listed = HashSet::new();
    for item in items {
        match item {
            Value::String(url) => {
                listed.insert(url.trim().to_string());
            }
            other => {
                return Err(CrawlError::OracleInvalidResponse(format!(
                    "data entries must be strings, got {other}"
                )));
            }
        }
    }

    let unknown = listed.iter().filter(|url| !input.contains(*url)).count();
    if unknown > 0 {
        ::log::debug!("Dropping {} urls the oracle invented", unknown);
    }

    Ok(input
        .iter()
        .filter(|url| listed.contains(url.as_str()))
        .cloned()
        .collect())
}
