use crate::filter::normalize_link;

/// Links not yet visited for one crawl, in discovery order.
///
/// A link appears at most once, compared without its fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontier {
    links: Vec<String>,
}

impl Frontier {
    pub fn from_seeds<I: IntoIterator<Item = String>>(seeds: I) -> Self {
        let mut frontier = Self::default();
        for seed in seeds {
            frontier.push(seed);
        }
        frontier
    }

    /// Append `link` unless an equivalent link is already queued
    pub fn push(&mut self, link: String) -> bool {
        if self.find(&link).is_some() {
            return false;
        }
        self.links.push(link);
        true
    }

    /// The queued link equivalent to `link`
    pub fn find(&self, link: &str) -> Option<&str> {
        let wanted = normalize_link(link);
        self.links
            .iter()
            .find(|queued| normalize_link(queued) == wanted)
            .map(String::as_str)
    }

    pub fn contains(&self, link: &str) -> bool {
        self.find(link).is_some()
    }

    pub fn remove(&mut self, link: &str) -> bool {
        let wanted = normalize_link(link);
        let before = self.links.len();
        self.links.retain(|queued| normalize_link(queued) != wanted);
        self.links.len() != before
    }

    /// Oldest queued link
    pub fn head(&self) -> Option<&str> {
        self.links.first().map(String::as_str)
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
