pub mod html;
pub mod links;

#[cfg(test)]
mod tests;

use crate::filter::LinkFilter;
use url::Url;

/// A fetched page after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// Link-annotated readable text
    pub text: String,
    /// Same-origin links in order of first appearance
    pub links: Vec<String>,
}

impl ParsedPage {
    /// Normalize markup fetched from `page_url` and collect the links that stay
    /// within the filter's origin
    pub fn parse(markup: &str, page_url: &Url, filter: &LinkFilter) -> Self {
        let text = html::normalize(markup);
        let links = links::extract_links(&text, page_url, filter);
        Self { text, links }
    }
}
