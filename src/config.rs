use crate::filter::LinkFilterConfig;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for a prospecting run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProspectorConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Endpoints tried when `webdriver_url` refuses the session
    #[serde(default = "default_fallback_webdriver_urls")]
    pub fallback_webdriver_urls: Vec<String>,

    /// Run the browser without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Upper bound on a single page load
    #[serde(default = "default_page_load_timeout_secs")]
    pub page_load_timeout_secs: u64,

    /// Fetch attempts allowed per site; `null` removes the cap
    #[serde(default = "default_max_visits")]
    pub max_visits: Option<usize>,

    /// How the next link is picked
    #[serde(default)]
    pub ranking: RankingStrategy,

    /// Consecutive ranking failures before the frontier head is taken instead
    #[serde(default = "default_max_ranking_failures")]
    pub max_ranking_failures: usize,

    /// Queue same-origin links discovered on visited pages
    #[serde(default)]
    pub follow_discovered_links: bool,

    /// Ask the oracle to keep only sites run by individual creators
    #[serde(default = "default_true")]
    pub filter_personal_sites: bool,

    /// Ask the oracle to narrow the seed links before crawling
    #[serde(default = "default_true")]
    pub filter_relevant_links: bool,

    /// Page text beyond this many characters is not sent for extraction
    #[serde(default = "default_max_page_chars")]
    pub max_page_chars: usize,

    #[serde(default)]
    pub link_filter: LinkFilterConfig,

    #[serde(default)]
    pub oracle: OracleConfig,
}

/// Strategy for picking the next link of a traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RankingStrategy {
    /// Ask the ranking oracle
    #[default]
    Oracle,
    /// Discovery order, no oracle call
    BreadthFirst,
}

/// Settings for the OpenAI-compatible oracle service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_oracle_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_extraction_model")]
    pub extraction_model: String,

    #[serde(default = "default_ranking_model")]
    pub ranking_model: String,

    #[serde(default = "default_classification_model")]
    pub classification_model: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ProspectorConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Apply `WEBDRIVER_URL` if it is set and non-empty
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn limits(&self) -> CrawlLimits {
        CrawlLimits {
            page_load_timeout: self.page_load_timeout(),
            max_visits: self.max_visits,
            max_ranking_failures: self.max_ranking_failures.max(1),
            follow_discovered_links: self.follow_discovered_links,
        }
    }
}

impl Default for ProspectorConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            fallback_webdriver_urls: default_fallback_webdriver_urls(),
            headless: true,
            page_load_timeout_secs: default_page_load_timeout_secs(),
            max_visits: default_max_visits(),
            ranking: RankingStrategy::default(),
            max_ranking_failures: default_max_ranking_failures(),
            follow_discovered_links: false,
            filter_personal_sites: true,
            filter_relevant_links: true,
            max_page_chars: default_max_page_chars(),
            link_filter: LinkFilterConfig::default(),
            oracle: OracleConfig::default(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_oracle_base_url(),
            api_key_env: default_api_key_env(),
            extraction_model: default_extraction_model(),
            ranking_model: default_ranking_model(),
            classification_model: default_classification_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Bounds for one frontier traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    pub page_load_timeout: Duration,
    pub max_visits: Option<usize>,
    pub max_ranking_failures: usize,
    pub follow_discovered_links: bool,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        ProspectorConfig::default().limits()
    }
}

fn default_true() -> bool {
    true
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_fallback_webdriver_urls() -> Vec<String> {
    vec![
        "http://localhost:9515".to_string(), // ChromeDriver default
        "http://127.0.0.1:4444".to_string(),
    ]
}

fn default_page_load_timeout_secs() -> u64 {
    60
}

fn default_max_visits() -> Option<usize> {
    Some(30)
}

fn default_max_ranking_failures() -> usize {
    3
}

fn default_max_page_chars() -> usize {
    60_000
}

fn default_oracle_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_extraction_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ranking_model() -> String {
    "gpt-4.1-nano".to_string()
}

fn default_classification_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}
