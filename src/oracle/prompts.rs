use crate::oracle::RankingRequest;
use crate::record::{Field, Record};
use serde_json::{Value, json};

pub const PERSONAL_SITES: &str = "You review search results for outreach. \
Keep only URLs of blogs or sites run by a real independent person: a creator, coach, \
artist or solo educator. Drop company sites, agencies, software tools and their documentation, \
news outlets, marketplaces and other platforms that are not one person's site. \
Answer with the kept URLs exactly as given.";

pub const RELEVANT_LINKS: &str = "You are given the links found on a personal website. \
Keep only links likely to show the owner's email address, the owner's name, \
personal background usable to personalise outreach, or a course or product they sell \
(for example about, contact, shop, courses, work-with-me pages). \
Answer with the kept links exactly as given.";

/// System prompt for picking the next link
pub fn ranking_prompt(request: &RankingRequest<'_>) -> String {
    let wanted = request
        .missing_fields
        .iter()
        .map(|field| format!("- {}", field.describe()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You guide a crawler through one personal website.\n\
         Still missing:\n{wanted}\n\n\
         Pick exactly one link from the list in the user message that is most likely to \
         contain the missing information. Answer with that link copied exactly."
    )
}

/// User message for picking the next link
pub fn ranking_input(request: &RankingRequest<'_>) -> String {
    serde_json::to_string_pretty(request).unwrap_or_default()
}

/// System prompt for extracting fields, showing what is already known
pub fn extraction_prompt(record: &Record) -> String {
    let wanted = Field::ALL
        .iter()
        .map(|field| format!("- {}: {}", field.key(), field.describe()))
        .collect::<Vec<_>>()
        .join("\n");
    let known = serde_json::to_string_pretty(record).unwrap_or_default();

    format!(
        "You extract contact details from one page of a personal website.\n\
         Fields:\n{wanted}\n\n\
         Known so far (null means still missing):\n{known}\n\n\
         Answer with every field. Use null for anything the page does not state. \
         Never guess an email address."
    )
}

pub fn ranking_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "url": { "type": "string" } },
        "required": ["url"],
        "additionalProperties": false
    })
}

pub fn extraction_schema() -> Value {
    let nullable = json!({ "type": ["string", "null"] });
    let properties = Field::ALL
        .iter()
        .map(|field| (field.key().to_string(), nullable.clone()))
        .collect::<serde_json::Map<_, _>>();
    let required = Field::ALL.iter().map(|field| field.key()).collect::<Vec<_>>();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

pub fn url_list_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "data": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["data"],
        "additionalProperties": false
    })
}
