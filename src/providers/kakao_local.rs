use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{QueryError, Result};
use crate::providers::{
    error_message, text_field, CoordinateSystem, PlaceSearchProvider, ProviderPage, ProviderQuery,
    RawPlace,
};

pub const KAKAO_MAX_PAGE_SIZE: u32 = 15;
pub const KAKAO_MAX_RADIUS_METERS: u32 = 20_000;

const PROVIDER: &str = "kakao";

/// Kakao Local keyword search.
pub struct KakaoLocalProvider {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl KakaoLocalProvider {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

fn parse_document(document: &Value) -> Option<RawPlace> {
    document.as_object()?;
    Some(RawPlace {
        name: text_field(document, "place_name").unwrap_or_default(),
        x: text_field(document, "x"),
        y: text_field(document, "y"),
        road_address: text_field(document, "road_address_name"),
        address: text_field(document, "address_name"),
        phone: text_field(document, "phone"),
        category: text_field(document, "category_name"),
    })
}

fn parse_page(body: &Value) -> ProviderPage {
    let records = body
        .get("documents")
        .and_then(Value::as_array)
        .map(|documents| documents.iter().filter_map(parse_document).collect());
    let meta = body.get("meta");

    ProviderPage {
        records,
        total_count: meta.and_then(|meta| meta.get("total_count")).and_then(Value::as_u64),
        is_end: meta
            .and_then(|meta| meta.get("is_end"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

#[async_trait]
impl PlaceSearchProvider for KakaoLocalProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn max_page_size(&self) -> u32 {
        KAKAO_MAX_PAGE_SIZE
    }

    fn coordinate_system(&self) -> CoordinateSystem {
        CoordinateSystem::Wgs84
    }

    async fn search(&self, query: &ProviderQuery) -> Result<ProviderPage> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(QueryError::ConfigMissing { name: "KAKAO_REST_API_KEY" })?;

        let mut params = vec![
            ("query", query.query.clone()),
            ("size", query.size.min(KAKAO_MAX_PAGE_SIZE).to_string()),
            ("page", query.page.to_string()),
        ];
        if let Some(center) = query.center {
            params.push(("x", center.longitude.to_string()));
            params.push(("y", center.latitude.to_string()));
            params.push(("radius", query.radius_meters.min(KAKAO_MAX_RADIUS_METERS).to_string()));
        }
        debug!(stage = "search", provider = PROVIDER, ?params, "Calling place search");

        let response = self
            .http
            .get(format!("{}/v2/local/search/keyword.json", self.base_url))
            .header(AUTHORIZATION, format!("KakaoAK {}", api_key))
            .query(&params)
            .send()
            .await
            .map_err(|source| QueryError::ProviderTransport { provider: PROVIDER, source })?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response, "message").await;
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

        Ok(parse_page(&body))
    }
}
