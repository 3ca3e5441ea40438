use crate::config::OracleConfig;
use crate::error::CrawlError;
use crate::oracle::prompts;
use crate::oracle::{ExtractionRequest, FieldOracle, LinkOracle, RankingRequest, SiteOracle};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

/// Oracle backed by an OpenAI-compatible chat completions endpoint
/// with strict JSON-schema structured output.
pub struct OpenAiOracle {
    http: reqwest::Client,
    api_key: String,
    config: OracleConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiOracle {
    /// Build a client; the API key is read from `config.api_key_env`
    pub fn from_config(config: &OracleConfig) -> Result<Self, CrawlError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            CrawlError::Config(format!("{} is not set", config.api_key_env))
        })?;
        Self::new(config, &api_key)
    }

    pub fn new(config: &OracleConfig, api_key: &str) -> Result<Self, CrawlError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CrawlError::Config(format!("http client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            config: config.clone(),
        })
    }

    fn headers(&self) -> Result<HeaderMap, CrawlError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| CrawlError::Config(format!("api key: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn structured(
        &self,
        model: &str,
        system: String,
        user: String,
        schema_name: &str,
        schema: Value,
    ) -> Result<Value, CrawlError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: json!({
                "type": "json_schema",
                "json_schema": { "name": schema_name, "strict": true, "schema": schema }
            }),
        };

        ::log::debug!("Oracle request {} using {}", schema_name, model);

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| CrawlError::OracleTransport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CrawlError::OracleTransport(format!(
                "{schema_name} ({status}): {error_text}"
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CrawlError::OracleInvalidResponse(format!("{schema_name}: {e}")))?;

        parse_content(body)
    }
}

/// Decode the first choice's content as JSON
pub(crate) fn parse_content(body: ChatResponse) -> Result<Value, CrawlError> {
    let Some(choice) = body.choices.into_iter().next() else {
        return Err(CrawlError::OracleInvalidResponse("no choices returned".to_string()));
    };
    if let Some(refusal) = choice.message.refusal {
        return Err(CrawlError::OracleInvalidResponse(format!("refused: {refusal}")));
    }
    let content = choice
        .message
        .content
        .ok_or_else(|| CrawlError::OracleInvalidResponse("empty message".to_string()))?;

    serde_json::from_str(&content)
        .map_err(|e| CrawlError::OracleInvalidResponse(format!("content is not JSON: {e}")))
}

#[async_trait]
impl LinkOracle for OpenAiOracle {
    async fn rank(&self, request: &RankingRequest<'_>) -> Result<Value, CrawlError> {
        self.structured(
            &self.config.ranking_model,
            prompts::ranking_prompt(request),
            prompts::ranking_input(request),
            "next_link",
            prompts::ranking_schema(),
        )
        .await
    }
}

#[async_trait]
impl FieldOracle for OpenAiOracle {
    async fn extract(&self, request: &ExtractionRequest<'_>) -> Result<Value, CrawlError> {
        self.structured(
            &self.config.extraction_model,
            prompts::extraction_prompt(request.current_record),
            request.page_text.to_string(),
            "page_contact_fields",
            prompts::extraction_schema(),
        )
        .await
    }
}

#[async_trait]
impl SiteOracle for OpenAiOracle {
    async fn personal_sites(&self, urls: &[String]) -> Result<Value, CrawlError> {
        self.structured(
            &self.config.classification_model,
            prompts::PERSONAL_SITES.to_string(),
            serde_json::to_string(urls).unwrap_or_default(),
            "personal_sites",
            prompts::url_list_schema(),
        )
        .await
    }

    async fn relevant_links(&self, links: &[String]) -> Result<Value, CrawlError> {
        self.structured(
            &self.config.classification_model,
            prompts::RELEVANT_LINKS.to_string(),
            serde_json::to_string(links).unwrap_or_default(),
            "relevant_links",
            prompts::url_list_schema(),
        )
        .await
    }
}
