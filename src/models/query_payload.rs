use serde::Deserialize;
use serde_with::{serde_as, DefaultOnError, DisplayFromStr, PickFirst};

use crate::models::location::Coordinates;

/// Inbound body of `POST /api/parse-query`. Numeric fields accept numbers or
/// numeric strings. Coordinate fields keep presence separate from validity
/// (`Some(None)` is present but unusable) so the short names win whenever sent.
#[serde_as]
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub query: Option<String>,

    #[serde_as(as = "Option<DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>>")]
    pub current_lat: Option<Option<f64>>,

    #[serde_as(as = "Option<DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>>")]
    pub current_latitude: Option<Option<f64>>,

    #[serde_as(as = "Option<DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>>")]
    pub current_lng: Option<Option<f64>>,

    #[serde_as(as = "Option<DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>>")]
    pub current_longitude: Option<Option<f64>>,

    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    pub page: Option<f64>,
}

impl QueryPayload {
    /// Parses a request body. Valid JSON that is not an object carries no fields.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if value.is_object() {
            serde_json::from_value(value)
        } else {
            Ok(Self::default())
        }
    }

    pub fn query_text(&self) -> &str {
        self.query.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn caller_coordinates(&self) -> Option<Coordinates> {
        let latitude = self.current_lat.or(self.current_latitude).flatten()?;
        let longitude = self.current_lng.or(self.current_longitude).flatten()?;
        Coordinates::new(latitude, longitude)
    }

    pub fn page(&self) -> u32 {
        match self.page {
            Some(page) if page.is_finite() && page >= 1.0 => page.trunc().min(u32::MAX as f64) as u32,
            _ => 1,
        }
    }
}
