use clap::Parser;
use creator_prospector::config::{ProspectorConfig, RankingStrategy};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "prospector")]
#[command(about = "Crawls creator sites for outreach contact records")]
#[command(version)]
pub struct Args {
    /// Candidate site URLs (search results, blog posts, ...)
    pub sites: Vec<String>,

    /// File with one candidate URL per line
    #[arg(long)]
    pub sites_file: Option<PathBuf>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver endpoint (overrides config and WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Page load timeout in seconds
    #[arg(long)]
    pub page_load_timeout: Option<u64>,

    /// Maximum pages fetched per site
    #[arg(long)]
    pub max_visits: Option<usize>,

    /// How the next link of a site is picked
    #[arg(long, value_enum)]
    pub ranking: Option<RankingStrategy>,

    /// Crawl every candidate instead of asking which are personal sites
    #[arg(long)]
    pub no_site_filter: bool,

    /// Crawl every same-origin link instead of asking which look relevant
    #[arg(long)]
    pub no_link_filter: bool,

    /// Also queue links discovered on visited pages
    #[arg(long)]
    pub follow_links: bool,

    /// Append CRM payloads to this file instead of stdout
    #[arg(long)]
    pub crm_out: Option<PathBuf>,
}

impl Args {
    /// Layer command-line overrides on top of `config`
    pub fn apply(&self, config: &mut ProspectorConfig) {
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        }
        if let Some(secs) = self.page_load_timeout {
            config.page_load_timeout_secs = secs;
        }
        if let Some(max_visits) = self.max_visits {
            config.max_visits = Some(max_visits);
        }
        if let Some(ranking) = self.ranking {
            config.ranking = ranking;
        }
        if self.no_site_filter {
            config.filter_personal_sites = false;
        }
        if self.no_link_filter {
            config.filter_relevant_links = false;
        }
        if self.follow_links {
            config.follow_discovered_links = true;
        }
    }

    /// Candidates from the command line followed by those in `--sites-file`
    pub fn candidates(&self) -> std::io::Result<Vec<String>> {
        let mut candidates = self.sites.clone();
        if let Some(path) = &self.sites_file {
            let contents = std::fs::read_to_string(path)?;
            candidates.extend(
                contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(str::to_string),
            );
        }
        Ok(candidates)
    }
}
