use crate::crawlers::frontier::Frontier;
use crate::error::CrawlError;
use crate::oracle::{LinkOracle, RankingRequest};
use crate::record::Field;
use serde_json::Value;

/// Wraps a [`LinkOracle`] so only frontier members come back.
///
/// One oracle call per [`RankingAdapter::choose`]; no retries here.
pub struct RankingAdapter<'a> {
    oracle: &'a dyn LinkOracle,
}

impl<'a> RankingAdapter<'a> {
    pub fn new(oracle: &'a dyn LinkOracle) -> Self {
        Self { oracle }
    }

    /// Ask for the next link given what is still missing.
    ///
    /// Returns the frontier's own copy of the chosen link.
    pub async fn choose(&self, frontier: &Frontier, missing: &[Field]) -> Result<String, CrawlError> {
        let request = RankingRequest {
            missing_fields: missing,
            frontier: frontier.links(),
        };
        let response = self.oracle.rank(&request).await?;
        let chosen = parse_choice(&response)?;

        match frontier.find(&chosen) {
            Some(link) => Ok(link.to_string()),
            None => Err(CrawlError::OracleInvalidResponse(format!(
                "ranked link {chosen} is not in the frontier"
            ))),
        }
    }
}

/// Read `{"url": "..."}`
pub fn parse_choice(response: &Value) -> Result<String, CrawlError> {
    match response.get("url") {
        Some(Value::String(url)) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        Some(other) => Err(CrawlError::OracleInvalidResponse(format!(
            "ranking url must be a non-empty string, got {other}"
        ))),
        None => Err(CrawlError::OracleInvalidResponse(format!(
            "ranking response has no url: {response}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRanker;
    use serde_json::json;

    fn frontier() -> Frontier {
        Frontier::from_seeds(vec![
            "https://jane.example/about".to_string(),
            "https://jane.example/contact".to_string(),
        ])
    }

    #[test]
    fn test_parse_choice_shapes() {
        assert_eq!(
            parse_choice(&json!({ "url": " https://jane.example/about " })).unwrap(),
            "https://jane.example/about"
        );
        assert!(parse_choice(&json!({ "url": "" })).is_err());
        assert!(parse_choice(&json!({ "url": 3 })).is_err());
        assert!(parse_choice(&json!({ "link": "https://jane.example/about" })).is_err());
    }

    #[tokio::test]
    async fn test_choose_returns_frontier_copy() {
        let ranker = ScriptedRanker::new(vec![json!({ "url": "https://jane.example/contact#form" })]);
        let adapter = RankingAdapter::new(&ranker);
        let chosen = adapter.choose(&frontier(), &Field::ALL).await.unwrap();
        assert_eq!(chosen, "https://jane.example/contact");
        assert_eq!(ranker.calls(), 1);
    }

    #[tokio::test]
    async fn test_choose_rejects_outside_link() {
        let ranker = ScriptedRanker::new(vec![json!({ "url": "https://jane.example/shop" })]);
        let adapter = RankingAdapter::new(&ranker);
        let err = adapter.choose(&frontier(), &Field::ALL).await.unwrap_err();
        assert!(matches!(err, CrawlError::OracleInvalidResponse(_)));
        assert_eq!(ranker.calls(), 1);
    }

    #[tokio::test]
    async fn test_choose_sends_missing_fields() {
        let ranker = ScriptedRanker::new(vec![json!({ "url": "https://jane.example/about" })]);
        let adapter = RankingAdapter::new(&ranker);
        adapter
            .choose(&frontier(), &[Field::Bio, Field::Offering])
            .await
            .unwrap();
        assert_eq!(ranker.requests()[0].0, vec![Field::Bio, Field::Offering]);
    }
}
