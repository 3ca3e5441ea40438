use crate::error::CrawlError;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Flat key/value hand-off for one prospected site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmPayload {
    pub site_url: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub offering: Option<String>,
}

impl CrmPayload {
    pub fn new(site_url: &str, record: &Record) -> Self {
        Self {
            site_url: site_url.to_string(),
            email: record.email.clone(),
            name: record.name.clone(),
            bio: record.bio.clone(),
            offering: record.offering.clone(),
        }
    }

    /// Records without an email are never handed off
    pub fn is_deliverable(&self) -> bool {
        self.email.is_some()
    }
}

/// Receiver of finished records
pub trait CrmSink: Send {
    fn deliver(&mut self, payload: &CrmPayload) -> Result<(), CrawlError>;
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<Box<dyn Write + Send>> {
    /// Append to `path`, or write to stdout when no path is given
    pub fn open(path: Option<&Path>) -> io::Result<Self> {
        let writer: Box<dyn Write + Send> = match path {
            Some(path) => Box::new(OpenOptions::new().create(true).append(true).open(path)?),
            None => Box::new(io::stdout()),
        };
        Ok(Self::new(writer))
    }
}

impl<W: Write + Send> CrmSink for JsonLinesSink<W> {
    fn deliver(&mut self, payload: &CrmPayload) -> Result<(), CrawlError> {
        serde_json::to_writer(&mut self.writer, payload).map_err(|e| CrawlError::Sink(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .map_err(|e| CrawlError::Sink(e.to_string()))?;
        ::log::info!("Delivered record for {} to CRM sink", payload.site_url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_is_flat_with_nulls() {
        let record = Record {
            email: Some("a@x.com".into()),
            name: Some("Jane".into()),
            ..Record::default()
        };
        let payload = CrmPayload::new("https://jane.example/blog/post", &record);
        assert!(payload.is_deliverable());
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "site_url": "https://jane.example/blog/post",
                "email": "a@x.com",
                "name": "Jane",
                "bio": null,
                "offering": null
            })
        );
    }

    #[test]
    fn test_payload_without_email_not_deliverable() {
        let record = Record {
            name: Some("Jane".into()),
            ..Record::default()
        };
        assert!(!CrmPayload::new("https://jane.example/", &record).is_deliverable());
    }

    #[test]
    fn test_json_lines_sink_writes_one_line_per_payload() {
        let mut sink = JsonLinesSink::new(Vec::new());
        let record = Record {
            email: Some("a@x.com".into()),
            ..Record::default()
        };
        sink.deliver(&CrmPayload::new("https://a.example/", &record)).unwrap();
        sink.deliver(&CrmPayload::new("https://b.example/", &record)).unwrap();

        let written = String::from_utf8(sink.into_inner()).unwrap();
        let lines = written.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        let first: CrmPayload = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.site_url, "https://a.example/");
    }
}
