#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod crawlers;
pub mod crm;
pub mod error;
pub mod filter;
pub mod oracle;
pub mod parsers;
pub mod prospect;
pub mod record;
pub mod results;

#[cfg(test)]
mod testing;

// Re-export commonly used types for convenience
pub use config::ProspectorConfig;
pub use crawlers::browser::Browser;
pub use crawlers::engine::FrontierCrawler;
pub use error::CrawlError;
pub use prospect::Prospector;
pub use record::Record;
pub use results::{CrawlOutcome, CrawlState, SiteReport};
