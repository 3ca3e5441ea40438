use crate::config::CrawlLimits;
use crate::crawlers::browser::Browser;
use crate::crawlers::frontier::Frontier;
use crate::error::CrawlError;
use crate::filter::{LinkFilter, normalize_link};
use crate::oracle::extraction::ExtractionAdapter;
use crate::oracle::ranking::RankingAdapter;
use crate::oracle::{FieldOracle, LinkOracle};
use crate::parsers::ParsedPage;
use crate::record::Record;
use crate::results::{CrawlOutcome, CrawlState, StepFailure};
use std::collections::HashSet;
use url::Url;

/// Oracle-guided traversal of one origin's links.
///
/// Each iteration asks the ranking oracle for a frontier link, fetches and
/// normalizes it, extracts fields and merges them into the record. Stops when
/// the record is complete, the frontier is empty or the visit cap is hit.
pub struct FrontierCrawler<'a> {
    browser: &'a dyn Browser,
    ranking: RankingAdapter<'a>,
    extraction: ExtractionAdapter<'a>,
    filter: &'a LinkFilter,
    limits: CrawlLimits,
}

/// Mutable state owned by a single crawl
struct Traversal {
    state: CrawlState,
    frontier: Frontier,
    /// Normalized links already fetched
    visited: HashSet<String>,
    visit_order: Vec<String>,
    record: Record,
    failures: Vec<StepFailure>,
    ranking_failures: usize,
    visit_cap_reached: bool,
}

impl Traversal {
    fn new(seeds: Vec<String>) -> Self {
        Self {
            state: CrawlState::Running,
            frontier: Frontier::from_seeds(seeds),
            visited: HashSet::new(),
            visit_order: Vec::new(),
            record: Record::default(),
            failures: Vec::new(),
            ranking_failures: 0,
            visit_cap_reached: false,
        }
    }

    fn absorb(&mut self, link: Option<&str>, error: &CrawlError) {
        ::log::warn!(
            "Crawl step failed ({:?}) for {}: {}",
            error.kind(),
            link.unwrap_or("<ranking>"),
            error
        );
        self.failures.push(StepFailure::new(link, error));
    }

    fn into_outcome(self) -> CrawlOutcome {
        CrawlOutcome {
            state: self.state,
            record: self.record,
            visited: self.visit_order,
            failures: self.failures,
            visit_cap_reached: self.visit_cap_reached,
        }
    }
}

impl<'a> FrontierCrawler<'a> {
    pub fn new(
        browser: &'a dyn Browser,
        link_oracle: &'a dyn LinkOracle,
        field_oracle: &'a dyn FieldOracle,
        filter: &'a LinkFilter,
        limits: CrawlLimits,
        max_page_chars: usize,
    ) -> Self {
        Self {
            browser,
            ranking: RankingAdapter::new(link_oracle),
            extraction: ExtractionAdapter::new(field_oracle, max_page_chars),
            filter,
            limits,
        }
    }

    /// Crawl from `seeds` until the record is complete or nothing is left to visit.
    ///
    /// Only [`CrawlError::DriverFatal`] is returned as an error.
    pub async fn crawl(&self, seeds: Vec<String>) -> Result<CrawlOutcome, CrawlError> {
        let mut traversal = Traversal::new(seeds);
        ::log::info!(
            "Starting traversal of {} with {} seed links",
            self.filter.origin(),
            traversal.frontier.len()
        );

        while traversal.state == CrawlState::Running {
            if traversal.frontier.is_empty() {
                traversal.state = CrawlState::Exhausted;
                break;
            }

            if let Some(cap) = self.limits.max_visits {
                if traversal.visit_order.len() >= cap {
                    ::log::info!("Visit cap of {} reached for {}", cap, self.filter.origin());
                    traversal.visit_cap_reached = true;
                    traversal.state = CrawlState::Exhausted;
                    break;
                }
            }

            let Some(link) = self.next_link(&mut traversal).await else {
                continue;
            };

            if traversal.visited.contains(&normalize_link(&link)) {
                ::log::debug!("Skipping already visited link: {}", link);
                traversal.frontier.remove(&link);
                continue;
            }

            traversal.frontier.remove(&link);
            traversal.visited.insert(normalize_link(&link));
            traversal.visit_order.push(link.clone());
            ::log::info!(
                "Visiting {} ({} left in frontier)",
                link,
                traversal.frontier.len()
            );

            let page = match self.fetch(&link).await {
                Ok(page) => page,
                Err(e) if e.is_fatal() => {
                    ::log::error!(
                        "Traversal of {} ended {:?} at {}: {}",
                        self.filter.origin(),
                        CrawlState::Failed,
                        link,
                        e
                    );
                    return Err(e);
                }
                Err(e) => {
                    traversal.absorb(Some(link.as_str()), &e);
                    continue;
                }
            };

            if self.limits.follow_discovered_links {
                self.enqueue_discovered(&mut traversal, page.links);
            }

            match self.extraction.extract(&page.text, &traversal.record).await {
                Ok(fields) => {
                    traversal.record = std::mem::take(&mut traversal.record).merge(fields);
                    ::log::debug!("Record after {}: {:?}", link, traversal.record);
                }
                Err(e) => {
                    traversal.absorb(Some(link.as_str()), &e);
                    continue;
                }
            }

            if traversal.record.is_complete() {
                ::log::info!("All fields found for {}", self.filter.origin());
                traversal.state = CrawlState::Complete;
            }
        }

        ::log::info!(
            "Traversal of {} ended {:?} after {} visits",
            self.filter.origin(),
            traversal.state,
            traversal.visit_order.len()
        );
        Ok(traversal.into_outcome())
    }

    /// Ask the ranking oracle for a link.
    ///
    /// After `max_ranking_failures` consecutive failures the frontier head is used
    /// so the traversal always makes progress.
    async fn next_link(&self, traversal: &mut Traversal) -> Option<String> {
        let missing = traversal.record.missing_fields();
        match self.ranking.choose(&traversal.frontier, &missing).await {
            Ok(link) => {
                traversal.ranking_failures = 0;
                Some(link)
            }
            Err(e) => {
                traversal.absorb(None, &e);
                traversal.ranking_failures += 1;
                if traversal.ranking_failures < self.limits.max_ranking_failures {
                    return None;
                }
                traversal.ranking_failures = 0;
                let head = traversal.frontier.head().map(str::to_string);
                if let Some(head) = &head {
                    ::log::warn!("Ranking kept failing, falling back to {}", head);
                }
                head
            }
        }
    }

    async fn fetch(&self, link: &str) -> Result<ParsedPage, CrawlError> {
        let markup = self
            .browser
            .navigate(link, self.limits.page_load_timeout)
            .await?;
        let page_url = Url::parse(link).unwrap_or_else(|_| self.filter.origin().clone());
        Ok(ParsedPage::parse(&markup, &page_url, self.filter))
    }

    fn enqueue_discovered(&self, traversal: &mut Traversal, links: Vec<String>) {
        let mut queued = 0;
        for link in links {
            if traversal.visited.contains(&normalize_link(&link)) {
                continue;
            }
            if traversal.frontier.push(link) {
                queued += 1;
            }
        }
        if queued > 0 {
            ::log::debug!("Queued {} discovered links", queued);
        }
    }
}
