use async_trait::async_trait;
use reqwest::Response;
use serde_json::Value;

use crate::error::Result;
use crate::models::location::Coordinates;
use crate::services::projection::LambertGrid;

pub mod kakao_local;
pub mod naver_local;

/// Geodetic system a provider reports its coordinates in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CoordinateSystem {
    /// `x` is longitude and `y` latitude, in degrees.
    Wgs84,
    /// `x`/`y` are cells of a Lambert conformal conic grid.
    Lambert(LambertGrid),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderQuery {
    pub query: String,
    pub size: u32,
    pub page: u32,
    pub center: Option<Coordinates>,
    pub radius_meters: u32,
}

/// A place record as the provider sent it, coordinates still unparsed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawPlace {
    pub name: String,
    pub x: Option<String>,
    pub y: Option<String>,
    pub road_address: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProviderPage {
    /// `None` when the result array was missing or not an array.
    pub records: Option<Vec<RawPlace>>,
    pub total_count: Option<u64>,
    pub is_end: bool,
}

#[async_trait]
pub trait PlaceSearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn max_page_size(&self) -> u32;

    fn coordinate_system(&self) -> CoordinateSystem;

    async fn search(&self, query: &ProviderQuery) -> Result<ProviderPage>;
}

/// Renders a JSON scalar as text; providers are inconsistent about numbers vs strings.
pub(crate) fn text_field(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(text) => Some(text.trim().to_string()).filter(|text| !text.is_empty()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Pulls a human readable message out of a failed provider response: the JSON
/// `message_key` field when present, otherwise the raw body.
pub(crate) async fn error_message(response: Response, message_key: &str) -> Option<String> {
    let body = response.text().await.ok()?;
    let body = body.trim();

    match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get(message_key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(body.to_string()).filter(|body| !body.is_empty())),
        Err(_) => Some(body.to_string()).filter(|body| !body.is_empty()),
    }
}
