use serde::{Deserialize, Serialize};

pub const CURRENT_LOCATION_LABEL: &str = "현재 위치";

/// A validated latitude/longitude pair in WGS84 degrees.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Returns `None` unless both values are finite and inside the WGS84 range.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        valid.then_some(Self { latitude, longitude })
    }
}

/// A place the user referred to. The coordinates are either both present or both
/// absent; a location with a name and no coordinates is "named but uncertain".
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Location {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Location {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn at(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            latitude: Some(coordinates.latitude),
            longitude: Some(coordinates.longitude),
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Coordinates::new(latitude, longitude),
            _ => None,
        }
    }

    pub fn is_uncertain(&self) -> bool {
        self.coordinates().is_none()
    }
}
