use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields of a [`Record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Email,
    Name,
    Bio,
    Offering,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Email, Field::Name, Field::Bio, Field::Offering];

    /// Key used in oracle payloads and the CRM payload
    pub fn key(&self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::Name => "name",
            Field::Bio => "bio",
            Field::Offering => "offering",
        }
    }

    /// What the oracle should look for
    pub fn describe(&self) -> &'static str {
        match self {
            Field::Email => "the email address of the site owner",
            Field::Name => "the site owner's name",
            Field::Bio => "a short personal bio of the owner, usable to personalise outreach",
            Field::Offering => "the course or product the owner sells",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One oracle answer for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Found(String),
    NotFound,
}

impl FieldValue {
    /// Sentinels the extraction oracle uses in place of a value
    const SENTINELS: [&'static str; 5] = ["not found", "not available", "unknown", "null", "n/a"];

    /// Classify a raw answer, collapsing blanks and sentinels to `NotFound`
    pub fn from_answer(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return FieldValue::NotFound;
        };
        let trimmed = raw.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if trimmed.is_empty() || Self::SENTINELS.contains(&lowered.as_str()) {
            FieldValue::NotFound
        } else {
            FieldValue::Found(trimmed.to_string())
        }
    }

    fn into_option(self) -> Option<String> {
        match self {
            FieldValue::Found(value) => Some(value),
            FieldValue::NotFound => None,
        }
    }
}

/// Candidate values produced by one extraction call. Every field is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub email: FieldValue,
    pub name: FieldValue,
    pub bio: FieldValue,
    pub offering: FieldValue,
}

impl ExtractedFields {
    pub fn not_found() -> Self {
        Self {
            email: FieldValue::NotFound,
            name: FieldValue::NotFound,
            bio: FieldValue::NotFound,
            offering: FieldValue::NotFound,
        }
    }
}

/// Contact record assembled for one origin site.
///
/// Each field moves from unset to a non-empty value at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub email: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub offering: Option<String>,
}

impl Record {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Email => self.email.as_deref(),
            Field::Name => self.name.as_deref(),
            Field::Bio => self.bio.as_deref(),
            Field::Offering => self.offering.as_deref(),
        }
    }

    /// Fields still unset, in declaration order
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        Field::ALL.iter().all(|field| self.get(*field).is_some())
    }

    /// Fill unset fields from `candidate`; set fields are never replaced.
    pub fn merge(self, candidate: ExtractedFields) -> Record {
        Record {
            email: self.email.or(candidate.email.into_option()),
            name: self.name.or(candidate.name.into_option()),
            bio: self.bio.or(candidate.bio.into_option()),
            offering: self.offering.or(candidate.offering.into_option()),
        }
    }
}
