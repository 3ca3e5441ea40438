//! Scripted collaborators for unit tests.

use crate::crawlers::browser::Browser;
use crate::crm::{CrmPayload, CrmSink};
use crate::error::CrawlError;
use crate::oracle::{ExtractionRequest, FieldOracle, LinkOracle, RankingRequest, SiteOracle};
use crate::record::{Field, Record};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Markup for a page whose text is `marker` followed by `links`
pub fn page(marker: &str, links: &[&str]) -> String {
    let anchors = links
        .iter()
        .map(|href| format!("<a href=\"{href}\">{href}</a>"))
        .collect::<String>();
    format!("<html><head><title>{marker}</title></head><body><p>{marker}</p>{anchors}</body></html>")
}

/// Extraction answer with every field given; `None` becomes the "not found" sentinel
pub fn answer(email: Option<&str>, name: Option<&str>, bio: Option<&str>, offering: Option<&str>) -> Value {
    let or_sentinel = |value: Option<&str>| value.unwrap_or("not found").to_string();
    json!({
        "email": or_sentinel(email),
        "name": or_sentinel(name),
        "bio": or_sentinel(bio),
        "offering": or_sentinel(offering),
    })
}

#[derive(Default)]
pub struct FakeBrowser {
    pages: HashMap<String, Result<String, CrawlError>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, markup: String) -> Self {
        self.pages.insert(url.to_string(), Ok(markup));
        self
    }

    pub fn failing(mut self, url: &str, error: CrawlError) -> Self {
        self.pages.insert(url.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<String, CrawlError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(result) => result.clone(),
            None => Err(CrawlError::Navigation {
                url: url.to_string(),
                message: "404".to_string(),
            }),
        }
    }
}

/// Plays back scripted answers, then behaves breadth-first
pub struct ScriptedRanker {
    script: Mutex<VecDeque<Result<Value, CrawlError>>>,
    repeat: Option<Value>,
    requests: Mutex<Vec<(Vec<Field>, Vec<String>)>>,
}

impl ScriptedRanker {
    pub fn new(answers: Vec<Value>) -> Self {
        Self::with_results(answers.into_iter().map(Ok).collect())
    }

    pub fn with_results(results: Vec<Result<Value, CrawlError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers `value` forever
    pub fn always(value: Value) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            repeat: Some(value),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<(Vec<Field>, Vec<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LinkOracle for ScriptedRanker {
    async fn rank(&self, request: &RankingRequest<'_>) -> Result<Value, CrawlError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.missing_fields.to_vec(), request.frontier.to_vec()));
        if let Some(value) = &self.repeat {
            return Ok(value.clone());
        }
        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(json!({ "url": request.frontier.first() })),
        }
    }
}

/// Answers by page marker, or from a queue
pub struct ScriptedExtractor {
    by_marker: Vec<(String, Value)>,
    queue: Mutex<VecDeque<Value>>,
    requests: Mutex<Vec<(String, Record)>>,
}

impl ScriptedExtractor {
    pub fn new(answers: Vec<Value>) -> Self {
        Self {
            by_marker: Vec::new(),
            queue: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The first marker contained in the page text selects the answer
    pub fn by_page(answers: Vec<(&str, Value)>) -> Self {
        Self {
            by_marker: answers
                .into_iter()
                .map(|(marker, value)| (marker.to_string(), value))
                .collect(),
            queue: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, Record)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FieldOracle for ScriptedExtractor {
    async fn extract(&self, request: &ExtractionRequest<'_>) -> Result<Value, CrawlError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.page_text.to_string(), request.current_record.clone()));

        if let Some((_, value)) = self
            .by_marker
            .iter()
            .find(|(marker, _)| request.page_text.contains(marker.as_str()))
        {
            return Ok(value.clone());
        }
        Ok(self
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| answer(None, None, None, None)))
    }
}

/// Keeps everything unless told which urls to keep
pub struct ScriptedSites {
    personal: Option<Result<Value, CrawlError>>,
    relevant: Option<Result<Value, CrawlError>>,
    calls: Mutex<usize>,
}

impl ScriptedSites {
    pub fn keep_all() -> Self {
        Self {
            personal: None,
            relevant: None,
            calls: Mutex::new(0),
        }
    }

    pub fn personal(mut self, result: Result<Value, CrawlError>) -> Self {
        self.personal = Some(result);
        self
    }

    pub fn relevant(mut self, result: Result<Value, CrawlError>) -> Self {
        self.relevant = Some(result);
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl SiteOracle for ScriptedSites {
    async fn personal_sites(&self, urls: &[String]) -> Result<Value, CrawlError> {
        *self.calls.lock().unwrap() += 1;
        self.personal.clone().unwrap_or_else(|| Ok(json!({ "data": urls })))
    }

    async fn relevant_links(&self, links: &[String]) -> Result<Value, CrawlError> {
        *self.calls.lock().unwrap() += 1;
        self.relevant.clone().unwrap_or_else(|| Ok(json!({ "data": links })))
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub delivered: Vec<CrmPayload>,
}

impl CrmSink for MemorySink {
    fn deliver(&mut self, payload: &CrmPayload) -> Result<(), CrawlError> {
        self.delivered.push(payload.clone());
        Ok(())
    }
}
