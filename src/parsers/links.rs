use crate::filter::LinkFilter;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static LINK_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)\s]*)\)").unwrap());

/// Every `(text, href)` pair in normalized text, in order of appearance
pub fn link_references(text: &str) -> Vec<(String, String)> {
    LINK_REFERENCE
        .captures_iter(text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Ordered, deduplicated links of normalized text that belong to the filter's origin.
///
/// Relative references resolve against `page_url`; fragments are dropped before
/// comparison, query strings are kept.
pub fn extract_links(text: &str, page_url: &Url, filter: &LinkFilter) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for (_, href) in link_references(text) {
        if href.is_empty() || href.starts_with('#') {
            continue;
        }
        if let Some(link) = filter.resolve(page_url, &href) {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }

    ::log::debug!(
        "Link extractor kept {} links for {}",
        links.len(),
        filter.origin()
    );
    links
}
