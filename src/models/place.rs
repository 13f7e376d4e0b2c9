use serde::{Deserialize, Serialize};

use crate::models::location::Location;

#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    pub anchor: Option<Location>,
    pub keywords: Vec<String>,
    pub page: u32,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct PlaceResult {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<PlaceResult>,
    pub has_more: bool,
    pub total: u64,
    pub page: u32,
}

impl SearchResponse {
    pub fn empty(page: u32) -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            total: 0,
            page,
        }
    }
}

/// Rounds a coordinate to 6 decimal places (roughly 0.1 m).
pub fn round_coordinate(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
