use crate::error::CrawlError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Links whose path ends in one of these are images, never pages
pub const IMAGE_LINK_PATTERN: &str = r"(?i)\.(jpg|jpeg|png|gif|bmp|svg|webp|ico)$";

/// User-adjustable patterns for same-origin links
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Regex patterns for URLs to include (if empty, all URLs are included unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over include patterns)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Decides which links belong to one origin's crawl
#[derive(Debug)]
pub struct LinkFilter {
    origin: Url,
    image_regex: Regex,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl LinkFilter {
    /// Create a filter scoped to the origin of `site`
    pub fn new(site: &Url, config: &LinkFilterConfig) -> Result<Self, CrawlError> {
        let compile = |pattern: &String| {
            Regex::new(pattern).map_err(|e| CrawlError::Config(format!("bad pattern {pattern}: {e}")))
        };
        let include_regexes = config
            .include_patterns
            .iter()
            .map(compile)
            .collect::<Result<Vec<_>, _>>()?;
        let exclude_regexes = config
            .exclude_patterns
            .iter()
            .map(compile)
            .collect::<Result<Vec<_>, _>>()?;
        let image_regex = Regex::new(IMAGE_LINK_PATTERN)
            .map_err(|e| CrawlError::Config(format!("image pattern: {e}")))?;

        Ok(Self {
            origin: origin_root(site),
            image_regex,
            include_regexes,
            exclude_regexes,
        })
    }

    /// Origin root (`scheme://host[:port]/`) this filter is scoped to
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Determine if a URL should be added to the frontier
    pub fn accepts(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if url.origin() != self.origin.origin() {
            return false;
        }

        if is_image_link(&self.image_regex, url) {
            return false;
        }

        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|regex| regex.is_match(url_str)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|regex| regex.is_match(url_str))
    }

    /// Resolve `href` against the page it appeared on and normalize it, if it belongs to this crawl
    pub fn resolve(&self, page_url: &Url, href: &str) -> Option<String> {
        let resolved = page_url.join(href.trim()).ok()?;
        if !self.accepts(&resolved) {
            ::log::trace!("Link filter rejected: {}", resolved);
            return None;
        }
        Some(normalize_url(&resolved).to_string())
    }
}

fn is_image_link(image_regex: &Regex, url: &Url) -> bool {
    image_regex.is_match(url.path())
}

/// Create a normalized version of the URL (fragment removed)
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

/// Normalize a link string for comparison, falling back to the trimmed text
pub fn normalize_link(link: &str) -> String {
    let trimmed = link.trim();
    match Url::parse(trimmed) {
        Ok(url) => normalize_url(&url).to_string(),
        Err(_) => trimmed.split('#').next().unwrap_or(trimmed).to_string(),
    }
}

/// Reduce a URL to its origin root, e.g. `https://host/path?q` becomes `https://host/`
pub fn origin_root(url: &Url) -> Url {
    let mut root = url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    root
}

/// Parse a candidate site URL into its origin root
pub fn site_origin(candidate: &str) -> Result<Url, CrawlError> {
    let url = Url::parse(candidate.trim()).map_err(|e| CrawlError::InvalidUrl {
        url: candidate.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(CrawlError::InvalidUrl {
            url: candidate.to_string(),
            reason: "not an http(s) page".to_string(),
        });
    }
    Ok(origin_root(&url))
}
