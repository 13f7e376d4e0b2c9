use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{QueryError, Result};
use crate::providers::{
    error_message, text_field, CoordinateSystem, PlaceSearchProvider, ProviderPage, ProviderQuery,
    RawPlace,
};
use crate::services::projection::KOREA_GRID;

pub const NAVER_MAX_PAGE_SIZE: u32 = 5;

const PROVIDER: &str = "naver";

/// Naver local search. It has no radius filter, so the anchor is ignored and
/// only the keywords (which carry the location name) steer the results.
pub struct NaverLocalProvider {
    http: Client,
    base_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl NaverLocalProvider {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        }
    }
}

fn strip_markup(text: &str) -> String {
    text.replace("<b>", "").replace("</b>", "")
}

fn parse_item(item: &Value) -> Option<RawPlace> {
    item.as_object()?;
    Some(RawPlace {
        name: text_field(item, "title").map(|title| strip_markup(&title)).unwrap_or_default(),
        x: text_field(item, "mapx"),
        y: text_field(item, "mapy"),
        road_address: text_field(item, "roadAddress"),
        address: text_field(item, "address"),
        phone: text_field(item, "telephone"),
        category: text_field(item, "category"),
    })
}

fn parse_page(body: &Value, start: u64, display: u64) -> ProviderPage {
    let records = body
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_item).collect());
    let total_count = body.get("total").and_then(Value::as_u64);

    ProviderPage {
        records,
        total_count,
        is_end: total_count.is_some_and(|total| start + display > total),
    }
}

#[async_trait]
impl PlaceSearchProvider for NaverLocalProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn max_page_size(&self) -> u32 {
        NAVER_MAX_PAGE_SIZE
    }

    fn coordinate_system(&self) -> CoordinateSystem {
        CoordinateSystem::Lambert(KOREA_GRID)
    }

    async fn search(&self, query: &ProviderQuery) -> Result<ProviderPage> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(QueryError::ConfigMissing { name: "NAVER_CLIENT_ID" })?;
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or(QueryError::ConfigMissing { name: "NAVER_CLIENT_SECRET" })?;

        let display = u64::from(query.size.clamp(1, NAVER_MAX_PAGE_SIZE));
        let start = u64::from(query.page.max(1) - 1) * display + 1;
        let params = [
            ("query", query.query.clone()),
            ("display", display.to_string()),
            ("start", start.to_string()),
            ("sort", "random".to_string()),
        ];
        debug!(stage = "search", provider = PROVIDER, ?params, "Calling place search");

        let response = self
            .http
            .get(format!("{}/v1/search/local.json", self.base_url))
            .header("X-Naver-Client-Id", client_id)
            .header("X-Naver-Client-Secret", client_secret)
            .query(&params)
            .send()
            .await
            .map_err(|source| QueryError::ProviderTransport { provider: PROVIDER, source })?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response, "errorMessage").await;
            warn!(stage = "search", provider = PROVIDER, status = status.as_u16(), ?message, "Place search failed");
            return Err(QueryError::ProviderError {
                provider: PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            warn!(stage = "search", provider = PROVIDER, error = %e, "Place search returned a non JSON body");
            QueryError::ProviderMalformed { provider: PROVIDER }
        })?;

        Ok(parse_page(&body, start, display))
    }
}
