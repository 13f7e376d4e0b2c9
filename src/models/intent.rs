use serde::{Deserialize, Serialize};

use crate::models::location::Location;

/// Structured search intent pulled out of the free-text query.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Intent {
    pub location: Option<Location>,
    pub cuisine: Option<String>,
    pub keywords: Vec<String>,
}

impl Intent {
    pub fn location_name(&self) -> Option<&str> {
        self.location.as_ref().map(|location| location.name.as_str())
    }
}
