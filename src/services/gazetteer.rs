use tracing::info;

use crate::models::location::{Coordinates, Location};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GazetteerEntry {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl GazetteerEntry {
    pub fn to_location(&self) -> Location {
        Location {
            name: self.name.to_string(),
            latitude: Some(self.latitude),
            longitude: Some(self.longitude),
        }
    }
}

/// Well known commercial districts and stations. Used to catch coordinates the
/// language backend made up.
pub static KNOWN_PLACES: &[GazetteerEntry] = &[
    GazetteerEntry { name: "강남역", latitude: 37.497942, longitude: 127.027621 },
    GazetteerEntry { name: "강남", latitude: 37.497942, longitude: 127.027621 },
    GazetteerEntry { name: "역삼역", latitude: 37.500643, longitude: 127.036377 },
    GazetteerEntry { name: "신논현", latitude: 37.504598, longitude: 127.025060 },
    GazetteerEntry { name: "홍대입구역", latitude: 37.557527, longitude: 126.924467 },
    GazetteerEntry { name: "홍대", latitude: 37.556318, longitude: 126.922651 },
    GazetteerEntry { name: "합정", latitude: 37.549463, longitude: 126.913739 },
    GazetteerEntry { name: "연남동", latitude: 37.562562, longitude: 126.925611 },
    GazetteerEntry { name: "신촌", latitude: 37.555134, longitude: 126.936893 },
    GazetteerEntry { name: "이태원", latitude: 37.534542, longitude: 126.994596 },
    GazetteerEntry { name: "한남동", latitude: 37.534657, longitude: 127.000793 },
    GazetteerEntry { name: "명동", latitude: 37.563692, longitude: 126.982600 },
    GazetteerEntry { name: "종로", latitude: 37.570380, longitude: 126.991986 },
    GazetteerEntry { name: "익선동", latitude: 37.574260, longitude: 126.989669 },
    GazetteerEntry { name: "을지로", latitude: 37.566065, longitude: 126.991325 },
    GazetteerEntry { name: "성수", latitude: 37.544581, longitude: 127.055961 },
    GazetteerEntry { name: "건대입구", latitude: 37.540693, longitude: 127.070230 },
    GazetteerEntry { name: "잠실", latitude: 37.513261, longitude: 127.100133 },
    GazetteerEntry { name: "여의도", latitude: 37.521624, longitude: 126.924191 },
    GazetteerEntry { name: "압구정", latitude: 37.527072, longitude: 127.028461 },
    GazetteerEntry { name: "가로수길", latitude: 37.520664, longitude: 127.022990 },
    GazetteerEntry { name: "서울역", latitude: 37.554648, longitude: 126.972559 },
    GazetteerEntry { name: "판교", latitude: 37.394761, longitude: 127.111217 },
    GazetteerEntry { name: "해운대", latitude: 35.163101, longitude: 129.163635 },
    GazetteerEntry { name: "서면", latitude: 35.157980, longitude: 129.059110 },
];

/// Finds the most specific known place mentioned in `query`. Longer names win so
/// that "강남역" is preferred over "강남".
pub fn lookup(query: &str) -> Option<&'static GazetteerEntry> {
    KNOWN_PLACES
        .iter()
        .filter(|entry| query.contains(entry.name))
        .max_by_key(|entry| entry.name.chars().count())
}

/// Prompt annotation nudging the backend toward the known coordinates.
pub fn coordinate_hint(entry: &GazetteerEntry) -> String {
    format!(
        "참고: \"{}\"의 중심 좌표는 위도 {:.6}, 경도 {:.6} 입니다.",
        entry.name, entry.latitude, entry.longitude
    )
}

fn names_overlap(left: &str, right: &str) -> bool {
    let left = left.trim();
    let right = right.trim();
    !left.is_empty() && !right.is_empty() && (left.contains(right) || right.contains(left))
}

/// Reconciles an extracted location with the gazetteer match for the same query.
///
/// A missing or unrelated extraction is replaced by the known place; an overlapping
/// extraction keeps its name and only borrows the coordinates it lacks.
pub fn correct_location(
    extracted: Option<Location>,
    known: Option<&GazetteerEntry>,
) -> Option<Location> {
    let Some(entry) = known else {
        return extracted;
    };

    match extracted {
        Some(location) if names_overlap(&location.name, entry.name) => {
            if location.is_uncertain() {
                let coordinates = Coordinates {
                    latitude: entry.latitude,
                    longitude: entry.longitude,
                };
                Some(Location::at(location.name, coordinates))
            } else {
                Some(location)
            }
        }
        other => {
            info!(
                stage = "gazetteer",
                extracted = ?other.as_ref().map(|location| location.name.as_str()),
                known = entry.name,
                "Overriding extracted location with known place"
            );
            Some(entry.to_location())
        }
    }
}
