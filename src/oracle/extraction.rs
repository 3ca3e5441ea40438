use crate::error::CrawlError;
use crate::oracle::{ExtractionRequest, FieldOracle};
use crate::record::{ExtractedFields, Field, FieldValue, Record};
use serde_json::Value;

/// Wraps a [`FieldOracle`] and validates its answer shape.
pub struct ExtractionAdapter<'a> {
    oracle: &'a dyn FieldOracle,
    max_page_chars: usize,
}

impl<'a> ExtractionAdapter<'a> {
    pub fn new(oracle: &'a dyn FieldOracle, max_page_chars: usize) -> Self {
        Self {
            oracle,
            max_page_chars,
        }
    }

    /// One oracle call for `page_text`; the current record shows what is still needed
    pub async fn extract(&self, page_text: &str, record: &Record) -> Result<ExtractedFields, CrawlError> {
        let request = ExtractionRequest {
            page_text: truncate_chars(page_text, self.max_page_chars),
            current_record: record,
        };
        let response = self.oracle.extract(&request).await?;
        parse_fields(&response)
    }
}

/// All four keys must be present, each a string or null
pub fn parse_fields(response: &Value) -> Result<ExtractedFields, CrawlError> {
    let Some(object) = response.as_object() else {
        return Err(CrawlError::OracleInvalidResponse(format!(
            "extraction response is not an object: {response}"
        )));
    };

    let read = |field: Field| -> Result<FieldValue, CrawlError> {
        match object.get(field.key()) {
            Some(Value::String(raw)) => Ok(FieldValue::from_answer(Some(raw.as_str()))),
            Some(Value::Null) => Ok(FieldValue::NotFound),
            Some(other) => Err(CrawlError::OracleInvalidResponse(format!(
                "field {field} must be a string or null, got {other}"
            ))),
            None => Err(CrawlError::OracleInvalidResponse(format!(
                "extraction response is missing {field}"
            ))),
        }
    };

    Ok(ExtractedFields {
        email: read(Field::Email)?,
        name: read(Field::Name)?,
        bio: read(Field::Bio)?,
        offering: read(Field::Offering)?,
    })
}

/// Longest prefix of `text` with at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedExtractor;
    use serde_json::json;

    #[test]
    fn test_parse_fields_accepts_strings_and_nulls() {
        let fields = parse_fields(&json!({
            "email": "a@x.com",
            "name": "not found",
            "bio": null,
            "offering": "Watercolour course"
        }))
        .unwrap();
        assert_eq!(fields.email, FieldValue::Found("a@x.com".into()));
        assert_eq!(fields.name, FieldValue::NotFound);
        assert_eq!(fields.bio, FieldValue::NotFound);
        assert_eq!(fields.offering, FieldValue::Found("Watercolour course".into()));
    }

    #[test]
    fn test_parse_fields_rejects_missing_key() {
        let err = parse_fields(&json!({ "email": "a@x.com", "name": null, "bio": null })).unwrap_err();
        assert!(err.to_string().contains("offering"));
    }

    #[test]
    fn test_parse_fields_rejects_wrong_shape() {
        assert!(parse_fields(&json!(["a@x.com"])).is_err());
        assert!(
            parse_fields(&json!({ "email": 1, "name": null, "bio": null, "offering": null })).is_err()
        );
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[tokio::test]
    async fn test_extract_sends_truncated_text_and_record() {
        let extractor = ScriptedExtractor::new(vec![json!({
            "email": null, "name": "Jane", "bio": null, "offering": null
        })]);
        let adapter = ExtractionAdapter::new(&extractor, 5);
        let record = Record {
            email: Some("a@x.com".into()),
            ..Record::default()
        };
        let fields = adapter.extract("0123456789", &record).await.unwrap();
        assert_eq!(fields.name, FieldValue::Found("Jane".into()));

        let (text, seen) = extractor.requests().remove(0);
        assert_eq!(text, "01234");
        assert_eq!(seen, record);
    }
}
