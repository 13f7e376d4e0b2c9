use serde_json::Value;
use tracing::warn;

use crate::error::{QueryError, Result};
use crate::models::intent::Intent;
use crate::models::location::{Coordinates, Location};

fn coerce_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn validate_location(raw: &Value) -> Option<Location> {
    let name = raw
        .get("name")
        .and_then(coerce_to_string)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())?;

    let latitude = raw.get("latitude").and_then(Value::as_f64);
    let longitude = raw.get("longitude").and_then(Value::as_f64);

    match latitude.zip(longitude).and_then(|(lat, lng)| Coordinates::new(lat, lng)) {
        Some(coordinates) => Some(Location::at(name, coordinates)),
        None => {
            warn!(stage = "validate", location = %name, "Extracted location has no usable coordinates");
            Some(Location::named(name))
        }
    }
}

fn validate_cuisine(raw: Option<&Value>) -> Option<String> {
    raw.and_then(coerce_to_string).filter(|cuisine| !cuisine.is_empty())
}

fn validate_keywords(raw: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = raw else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(coerce_to_string)
        .map(|keyword| keyword.trim().to_string())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

/// Enforces the shape of a parsed backend reply. Optional fields degrade to `None`;
/// a reply without a single usable keyword is rejected.
pub fn validate_intent(raw: &Value) -> Result<Intent> {
    let location = raw.get("location").and_then(validate_location);
    let cuisine = validate_cuisine(raw.get("cuisine"));
    let keywords = validate_keywords(raw.get("keywords"));

    if keywords.is_empty() {
        warn!(stage = "validate", raw = %raw, "Backend reply carried no keywords");
        return Err(QueryError::NoKeywords);
    }

    Ok(Intent {
        location,
        cuisine,
        keywords,
    })
}
