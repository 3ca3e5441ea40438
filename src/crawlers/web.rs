use crate::config::ProspectorConfig;
use crate::crawlers::browser::Browser;
use crate::error::CrawlError;
use async_trait::async_trait;
use fantoccini::wd::{Capabilities, TimeoutConfiguration};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Errors that mean the WebDriver session can no longer be used
const SESSION_LOST_MARKERS: &[&str] = &[
    "unable to find session",
    "invalid session id",
    "session deleted",
    "no such window",
    "chrome not reachable",
    "disconnected",
];

/// A single WebDriver session shared by every crawl step of a run
pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    /// Connects to the configured WebDriver, then to the fallback endpoints
    pub async fn connect(config: &ProspectorConfig) -> Result<Self, CrawlError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities(config.headless));

        let endpoints = std::iter::once(config.webdriver_url.as_str()).chain(
            config
                .fallback_webdriver_urls
                .iter()
                .map(String::as_str)
                .filter(|url| *url != config.webdriver_url),
        );

        for url in endpoints {
            match builder.connect(url).await {
                Ok(client) => {
                    ::log::debug!("Connected to WebDriver at {}", url);
                    let browser = Self { client };
                    browser.set_page_load_timeout(config.page_load_timeout()).await;
                    return Ok(browser);
                }
                Err(e) => {
                    ::log::warn!("Failed to connect to WebDriver at {}: {}", url, e);
                }
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(CrawlError::DriverFatal(format!(
            "no WebDriver reachable at {}",
            config.webdriver_url
        )))
    }

    /// Ask the driver itself to stop loads that outlive `page_load`
    async fn set_page_load_timeout(&self, page_load: Duration) {
        let timeouts = TimeoutConfiguration::new(None, Some(page_load), None);
        if let Err(e) = self.client.update_timeouts(timeouts).await {
            ::log::warn!("WebDriver refused page load timeout: {}", e);
        }
    }

    /// End the WebDriver session
    pub async fn close(self) -> Result<(), CrawlError> {
        self.client
            .close()
            .await
            .map_err(|e| CrawlError::DriverFatal(format!("closing session: {e}")))
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn navigate(&self, url: &str, page_load: Duration) -> Result<String, CrawlError> {
        let started = Instant::now();
        ::log::debug!("NAVIGATE: {}", url);

        match timeout(page_load, self.client.goto(url)).await {
            Err(_) => {
                return Err(CrawlError::FetchTimeout {
                    url: url.to_string(),
                    timeout: page_load,
                });
            }
            Ok(Err(e)) => return Err(classify_command_error(&e, "accessing", url, page_load)),
            Ok(Ok(())) => {}
        }

        let remaining = page_load.saturating_sub(started.elapsed());
        if let Err(e) = self
            .client
            .wait()
            .at_most(remaining.max(Duration::from_secs(1)))
            .for_element(Locator::Css("body"))
            .await
        {
            return Err(classify_command_error(&e, "waiting for body of", url, page_load));
        }

        let source = self
            .client
            .source()
            .await
            .map_err(|e| classify_command_error(&e, "getting source for", url, page_load))?;

        ::log::debug!(
            "Loaded {} in {:.2} seconds",
            url,
            started.elapsed().as_secs_f64()
        );
        Ok(source)
    }
}

/// Chrome options for an unattended session
fn capabilities(headless: bool) -> Capabilities {
    let mut args = vec![
        "--ignore-certificate-errors",
        "--allow-insecure-localhost",
        "--log-level=3",
    ];
    if headless {
        args.push("--headless=new");
    }

    let mut caps = Capabilities::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": args, "excludeSwitches": ["enable-logging"] }),
    );
    caps
}

/// Maps a WebDriver command failure onto the crawl's error kinds
fn classify_command_error(
    error: &fantoccini::error::CmdError,
    context: &str,
    url: &str,
    page_load: Duration,
) -> CrawlError {
    let message = error.to_string();
    classify_message(&message, context, url, page_load)
}

fn classify_message(message: &str, context: &str, url: &str, page_load: Duration) -> CrawlError {
    let lowered = message.to_lowercase();
    if SESSION_LOST_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        ::log::warn!("Lost WebDriver session while {} {}", context, url);
        return CrawlError::DriverFatal(message.to_string());
    }
    if lowered.contains("timeout") || lowered.contains("timed out") {
        return CrawlError::FetchTimeout {
            url: url.to_string(),
            timeout: page_load,
        };
    }
    ::log::error!("Failed {} {}: {}", context, url, message);
    CrawlError::Navigation {
        url: url.to_string(),
        message: format!("{context}: {message}"),
    }
}
