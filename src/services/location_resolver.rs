use tracing::info;

use crate::error::{QueryError, Result};
use crate::models::intent::Intent;
use crate::models::location::{Coordinates, Location, CURRENT_LOCATION_LABEL};

/// Picks the geographic anchor for a search.
///
/// Extracted coordinates win, then the caller's position (keeping the extracted
/// name if there was one). A named but uncertain location with no caller
/// position searches unanchored, since its name already travels in the
/// keywords. With no location at all and no caller position there is nothing
/// to search around.
pub fn resolve_anchor(intent: &Intent, caller: Option<Coordinates>) -> Result<Option<Location>> {
    if let Some(location) = intent.location.as_ref().filter(|location| !location.is_uncertain()) {
        return Ok(Some(location.clone()));
    }

    if let Some(coordinates) = caller {
        let name = intent.location_name().unwrap_or(CURRENT_LOCATION_LABEL);
        info!(stage = "resolve", %name, "Falling back to caller position");
        return Ok(Some(Location::at(name, coordinates)));
    }

    match &intent.location {
        Some(location) => {
            info!(stage = "resolve", name = %location.name, "Searching without an anchor");
            Ok(None)
        }
        None => Err(QueryError::LocationUnresolvable),
    }
}

/// Anchor for the empty-query "nearby" search.
pub fn nearby_anchor(caller: Coordinates) -> Location {
    Location::at(CURRENT_LOCATION_LABEL, caller)
}
