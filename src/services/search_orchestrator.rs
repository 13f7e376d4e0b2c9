use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{QueryError, Result};
use crate::models::place::{round_coordinate, PlaceResult, SearchRequest, SearchResponse};
use crate::providers::{CoordinateSystem, PlaceSearchProvider, ProviderQuery, RawPlace};

pub const SEARCH_RADIUS_METERS: u32 = 20_000;

pub fn build_query(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|keyword| keyword.trim())
        .filter(|keyword| !keyword.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok()
}

/// Normalises one provider record. Records whose coordinates do not resolve to
/// finite numbers are dropped.
pub fn to_place_result(raw: RawPlace, system: CoordinateSystem) -> Option<PlaceResult> {
    let x = parse_coordinate(raw.x.as_deref())?;
    let y = parse_coordinate(raw.y.as_deref())?;

    let (lat, lng) = match system {
        CoordinateSystem::Wgs84 => (y, x),
        CoordinateSystem::Lambert(grid) => grid.to_wgs84(x, y),
    };
    if !lat.is_finite() || !lng.is_finite() {
        return None;
    }

    Some(PlaceResult {
        name: raw.name,
        lat: round_coordinate(lat),
        lng: round_coordinate(lng),
        address: raw.road_address.or(raw.address).unwrap_or_default(),
        phone: raw.phone,
        category: raw.category,
    })
}

/// Runs one page of a keyword search against the configured provider.
pub struct SearchOrchestrator {
    provider: Arc<dyn PlaceSearchProvider>,
    page_size: u32,
}

impl SearchOrchestrator {
    pub fn new(provider: Arc<dyn PlaceSearchProvider>, page_size: u32) -> Self {
        Self {
            provider,
            page_size,
        }
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let query = build_query(&request.keywords);
        if query.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let provider_query = ProviderQuery {
            query,
            size: self.page_size.clamp(1, self.provider.max_page_size()),
            page: request.page.max(1),
            center: request.anchor.as_ref().and_then(|anchor| anchor.coordinates()),
            radius_meters: SEARCH_RADIUS_METERS,
        };
        let page = self.provider.search(&provider_query).await?;

        let Some(records) = page.records else {
            warn!(
                stage = "search",
                provider = self.provider.name(),
                query = %provider_query.query,
                "Provider response had no result array"
            );
            return Ok(SearchResponse::empty(provider_query.page));
        };

        let system = self.provider.coordinate_system();
        let received = records.len();
        let items: Vec<PlaceResult> = records
            .into_iter()
            .filter_map(|record| to_place_result(record, system))
            .collect();

        let total = page.total_count.unwrap_or(items.len() as u64);
        let has_more = !page.is_end && !items.is_empty();

        info!(
            stage = "search",
            provider = self.provider.name(),
            query = %provider_query.query,
            page = provider_query.page,
            received,
            kept = items.len(),
            total,
            "Place search completed"
        );

        Ok(SearchResponse {
            items,
            has_more,
            total,
            page: provider_query.page,
        })
    }
}
