use serde::{Deserialize, Serialize};

/// Every listing on the marketplace is located in Mexico.
pub const DEFAULT_COUNTRY: &str = "Mexico";

/// Structured location derived from a free-form address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub country: String,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            state: None,
            city: None,
        }
    }
}
