use ai_client::strip_code_blocks;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::traits::JudgmentProvider;

/// The four claim attributes used to build search queries. Every field is a
/// single non-blank string or absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    pub person: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub event_type: Option<String>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.person.is_none()
            && self.location.is_none()
            && self.country.is_none()
            && self.event_type.is_none()
    }
}

#[derive(Debug, Error)]
pub enum EntityParseError {
    #[error("entity payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("entity payload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Flatten one decoded field. Arrays have their string, number and bool
/// elements joined with a single space; other non-string values and blank
/// strings are absent.
fn normalize(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        // Scalar elements keep their text ("Route", 66 -> "Route 66")
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    normalize(obj.get(key))
}

pub fn parse_entities(raw: &str) -> Result<Entities, EntityParseError> {
    let value: Value = serde_json::from_str(strip_code_blocks(raw))?;
    let obj = match value {
        Value::Object(obj) => obj,
        other => return Err(EntityParseError::NotAnObject(kind(&other))),
    };

    Ok(Entities {
        person: field(&obj, "person"),
        location: field(&obj, "location"),
        country: field(&obj, "country"),
        event_type: field(&obj, "event_type"),
    })
}

/// Decode failures are soft: the claim simply gets no entities.
pub fn parse_entities_lenient(raw: &str) -> Entities {
    match parse_entities(raw) {
        Ok(entities) => entities,
        Err(e) => {
            warn!(error = %e, "Entity extraction returned an unusable payload, continuing without entities");
            Entities::default()
        }
    }
}

/// Ranked search queries for a claim, most specific first. Falls back to the
/// claim text when no entity rule applies. Duplicates are kept.
pub fn build_search_queries(entities: &Entities, claim: &str) -> Vec<String> {
    let Entities {
        person,
        location,
        country,
        event_type,
    } = entities;

    let mut queries = Vec::new();

    if let (Some(person), Some(country), Some(event)) = (person, country, event_type) {
        queries.push(format!("{person} {event} {country}"));
    }
    if let (Some(location), Some(event)) = (location, event_type) {
        queries.push(format!("{location} {event}"));
    }
    if let (Some(country), Some(event)) = (country, event_type) {
        queries.push(format!("{country} {event}"));
    }
    if let Some(person) = person {
        queries.push(person.clone());
    }

    if queries.is_empty() {
        queries.push(claim.to_string());
    }
    queries
}

/// Ask the judge for a claim's entities. A failed model call is an error; a
/// garbled payload is not.
pub async fn extract_entities(judge: &dyn JudgmentProvider, claim: &str) -> Result<Entities> {
    let raw = judge
        .extract_entities(claim)
        .await
        .context("Entity extraction failed")?;
    let entities = parse_entities_lenient(&raw);
    debug!(claim, ?entities, "Entities extracted");
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(
        person: Option<&str>,
        location: Option<&str>,
        country: Option<&str>,
        event_type: Option<&str>,
    ) -> Entities {
        Entities {
            person: person.map(String::from),
            location: location.map(String::from),
            country: country.map(String::from),
            event_type: event_type.map(String::from),
        }
    }

    #[test]
    fn queries_follow_priority_order() {
        let e = entities(Some("Jane Doe"), None, Some("Chad"), Some("flood"));
        assert_eq!(
            build_search_queries(&e, "X happened"),
            vec!["Jane Doe flood Chad", "Chad flood", "Jane Doe"]
        );
    }

    #[test]
    fn all_rules_fire_when_everything_present() {
        let e = entities(Some("Jane Doe"), Some("N'Djamena"), Some("Chad"), Some("flood"));
        assert_eq!(
            build_search_queries(&e, "X happened"),
            vec![
                "Jane Doe flood Chad",
                "N'Djamena flood",
                "Chad flood",
                "Jane Doe"
            ]
        );
    }

    #[test]
    fn no_entities_falls_back_to_claim() {
        assert_eq!(
            build_search_queries(&Entities::default(), "X happened"),
            vec!["X happened"]
        );
    }

    #[test]
    fn event_without_place_or_person_falls_back() {
        let e = entities(None, None, None, Some("flood"));
        assert_eq!(build_search_queries(&e, "X happened"), vec!["X happened"]);
    }

    #[test]
    fn duplicate_queries_are_kept() {
        let e = entities(None, Some("Chad"), Some("Chad"), Some("flood"));
        assert_eq!(
            build_search_queries(&e, "X happened"),
            vec!["Chad flood", "Chad flood"]
        );
    }

    #[test]
    fn arrays_are_joined_with_space() {
        let e = parse_entities(r#"{"person": null, "location": ["Paris", "France"]}"#).unwrap();
        assert_eq!(e.location.as_deref(), Some("Paris France"));
        assert_eq!(e.person, None);
    }

    #[test]
    fn array_numbers_keep_their_text() {
        let e = parse_entities(
            r#"{"location": ["Route", 66], "event_type": ["Flight", 370, null, ["MH"]]}"#,
        )
        .unwrap();
        assert_eq!(e.location.as_deref(), Some("Route 66"));
        assert_eq!(e.event_type.as_deref(), Some("Flight 370"));
    }

    #[test]
    fn decodes_fenced_json() {
        let raw = "```json\n{\"person\": \"Jane Doe\", \"country\": \"Chad\", \"event_type\": \"flood\", \"location\": null}\n```";
        assert_eq!(
            parse_entities(raw).unwrap(),
            entities(Some("Jane Doe"), None, Some("Chad"), Some("flood"))
        );
    }

    #[test]
    fn non_string_and_blank_values_are_absent() {
        let e = parse_entities(
            r#"{"person": 42, "location": "  ", "country": [], "event_type": {"kind": "flood"}}"#,
        )
        .unwrap();
        assert!(e.is_empty());
    }

    #[test]
    fn non_json_yields_empty_entities() {
        assert!(parse_entities("Sorry, I can't help with that.").is_err());
        assert_eq!(
            parse_entities_lenient("Sorry, I can't help with that."),
            Entities::default()
        );
    }

    #[test]
    fn non_object_payload_is_a_decode_failure() {
        let err = parse_entities(r#"["Jane Doe"]"#).unwrap_err();
        assert!(matches!(err, EntityParseError::NotAnObject("array")));
        assert!(parse_entities_lenient("null").is_empty());
    }
}
