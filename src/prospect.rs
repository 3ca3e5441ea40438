use crate::config::{ProspectorConfig, RankingStrategy};
use crate::crawlers::browser::Browser;
use crate::crawlers::engine::FrontierCrawler;
use crate::crawlers::web::WebDriverBrowser;
use crate::crm::{CrmPayload, CrmSink};
use crate::error::CrawlError;
use crate::filter::{LinkFilter, site_origin};
use crate::oracle::classify::SiteClassifier;
use crate::oracle::openai::OpenAiOracle;
use crate::oracle::{BreadthFirstRanker, FieldOracle, LinkOracle, SiteOracle};
use crate::parsers::ParsedPage;
use crate::results::SiteReport;

/// Runs candidate sites through filtering, traversal and CRM hand-off, one site at a time
pub struct Prospector<'a> {
    config: &'a ProspectorConfig,
    browser: &'a dyn Browser,
    link_oracle: &'a dyn LinkOracle,
    field_oracle: &'a dyn FieldOracle,
    site_oracle: &'a dyn SiteOracle,
    sink: &'a mut dyn CrmSink,
}

impl<'a> Prospector<'a> {
    pub fn new(
        config: &'a ProspectorConfig,
        browser: &'a dyn Browser,
        link_oracle: &'a dyn LinkOracle,
        field_oracle: &'a dyn FieldOracle,
        site_oracle: &'a dyn SiteOracle,
        sink: &'a mut dyn CrmSink,
    ) -> Self {
        Self {
            config,
            browser,
            link_oracle,
            field_oracle,
            site_oracle,
            sink,
        }
    }

    /// Prospect every candidate; stops early only when the browser session dies
    pub async fn run(&mut self, candidates: &[String]) -> Result<Vec<SiteReport>, CrawlError> {
        let mut unique: Vec<String> = Vec::new();
        for candidate in candidates {
            if !unique.contains(candidate) {
                unique.push(candidate.clone());
            }
        }

        let sites = if self.config.filter_personal_sites {
            let classifier = SiteClassifier::new(self.site_oracle);
            match classifier.personal_sites(&unique).await {
                Ok(sites) => sites,
                Err(e) => {
                    ::log::warn!("Personal site filter failed, keeping all candidates: {}", e);
                    unique
                }
            }
        } else {
            unique
        };

        let mut reports = Vec::with_capacity(sites.len());
        for site in &sites {
            match self.prospect_site(site).await {
                Ok(report) => reports.push(report),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    ::log::warn!("Skipping {}: {}", site, e);
                    reports.push(SiteReport::skipped(site, e.to_string()));
                }
            }
        }
        Ok(reports)
    }

    /// Discover seed links on the site's root page, then crawl them
    pub async fn prospect_site(&mut self, candidate: &str) -> Result<SiteReport, CrawlError> {
        let origin = site_origin(candidate)?;
        let filter = LinkFilter::new(&origin, &self.config.link_filter)?;
        ::log::info!("Prospecting {} via {}", candidate, origin);

        let markup = self
            .browser
            .navigate(origin.as_str(), self.config.page_load_timeout())
            .await?;
        let root = ParsedPage::parse(&markup, &origin, &filter);
        if root.links.is_empty() {
            ::log::info!("No links found in {}", candidate);
            return Ok(SiteReport::skipped(candidate, "no same-origin links"));
        }
        ::log::info!("Found {} links in {}", root.links.len(), origin);

        let seeds = if self.config.filter_relevant_links {
            let classifier = SiteClassifier::new(self.site_oracle);
            match classifier.relevant_links(&root.links).await {
                Ok(relevant) => relevant,
                Err(e) => {
                    ::log::warn!("Relevant link filter failed for {}, using all links: {}", origin, e);
                    root.links
                }
            }
        } else {
            root.links
        };
        if seeds.is_empty() {
            ::log::info!("No relevant links found in {}", candidate);
            return Ok(SiteReport::skipped(candidate, "no relevant links"));
        }

        let crawler = FrontierCrawler::new(
            self.browser,
            self.link_oracle,
            self.field_oracle,
            &filter,
            self.config.limits(),
            self.config.max_page_chars,
        );
        let seed_count = seeds.len();
        let outcome = crawler.crawl(seeds).await?;

        let payload = CrmPayload::new(candidate, &outcome.record);
        let delivered = if payload.is_deliverable() {
            match self.sink.deliver(&payload) {
                Ok(()) => true,
                Err(e) => {
                    ::log::error!("Failed to deliver {} to CRM sink: {}", candidate, e);
                    false
                }
            }
        } else {
            ::log::info!("No email found for {}, not delivering", candidate);
            false
        };

        Ok(SiteReport::crawled(candidate, seed_count, outcome, delivered))
    }
}

/// Connect the WebDriver session and oracle client described by `config` and prospect `candidates`
pub async fn run_with_config(
    config: &ProspectorConfig,
    candidates: &[String],
    sink: &mut dyn CrmSink,
) -> Result<Vec<SiteReport>, CrawlError> {
    let oracle = OpenAiOracle::from_config(&config.oracle)?;
    let breadth_first = BreadthFirstRanker;
    let link_oracle: &dyn LinkOracle = match config.ranking {
        RankingStrategy::Oracle => &oracle,
        RankingStrategy::BreadthFirst => &breadth_first,
    };

    let browser = WebDriverBrowser::connect(config).await?;
    let result = Prospector::new(config, &browser, link_oracle, &oracle, &oracle, sink)
        .run(candidates)
        .await;

    if let Err(e) = browser.close().await {
        ::log::warn!("Failed to close WebDriver session: {}", e);
    }
    result
}
