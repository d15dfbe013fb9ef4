//! Listing record produced by one extraction pass

use serde::{Deserialize, Serialize};
use std::fmt;

use super::location::Location;
use super::spec_table::{CategoryMap, SpecTable};

/// Kind of property being offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Apartment,
    Land,
    Commercial,
    Unknown,
}

impl PropertyType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Apartment => "apartment",
            Self::Land => "land",
            Self::Commercial => "commercial",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commercial operation of the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Sale,
    Rent,
    Transfer,
    Unknown,
}

impl OperationType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Rent => "rent",
            Self::Transfer => "transfer",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an extraction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    /// The pass completed and found core listing data
    Success,
    /// The pass completed but found neither price, physical fields nor categories
    Partial,
    /// The pass was aborted by an unexpected failure
    Error,
}

/// Set `slot` from `candidate` only when `slot` is still empty.
///
/// Returns `true` when the slot was filled. This is the single merge rule of a
/// pass: the first source to produce a value for a field keeps it.
pub fn fill_missing<T>(slot: &mut Option<T>, candidate: Option<T>) -> bool {
    if slot.is_some() {
        return false;
    }
    match candidate {
        Some(value) => {
            *slot = Some(value);
            true
        }
        None => false,
    }
}

/// Typed record of one listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    // Identity
    pub url: String,
    pub ml_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,

    // Commerce
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub property_type: Option<PropertyType>,
    pub operation_type: Option<OperationType>,

    // Physical
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub built_area_m2: Option<f64>,
    pub lot_area_m2: Option<f64>,
    pub parking_spaces: Option<u32>,

    // Location
    pub raw_address: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,

    pub seller_name: Option<String>,

    #[serde(default)]
    pub categories: CategoryMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_spec_table: Option<SpecTable>,
    pub elapsed_seconds: Option<f64>,

    pub status: ExtractionStatus,
    pub error_message: Option<String>,
}

impl ListingRecord {
    /// Fresh record for one page visit
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ml_id: None,
            title: None,
            description: None,
            price: None,
            currency: None,
            property_type: None,
            operation_type: None,
            bedrooms: None,
            bathrooms: None,
            built_area_m2: None,
            lot_area_m2: None,
            parking_spaces: None,
            raw_address: None,
            country: None,
            state: None,
            city: None,
            seller_name: None,
            categories: CategoryMap::new(),
            raw_spec_table: None,
            elapsed_seconds: None,
            status: ExtractionStatus::Success,
            error_message: None,
        }
    }

    /// Merge a parsed location without overwriting fields already set.
    pub fn apply_location(&mut self, location: Location) {
        fill_missing(&mut self.country, Some(location.country));
        fill_missing(&mut self.state, location.state);
        fill_missing(&mut self.city, location.city);
    }

    /// Whether any of the five physical fields is still open
    pub const fn has_missing_physical_fields(&self) -> bool {
        self.bedrooms.is_none()
            || self.bathrooms.is_none()
            || self.built_area_m2.is_none()
            || self.lot_area_m2.is_none()
            || self.parking_spaces.is_none()
    }

    const fn has_any_physical_field(&self) -> bool {
        self.bedrooms.is_some()
            || self.bathrooms.is_some()
            || self.built_area_m2.is_some()
            || self.lot_area_m2.is_some()
            || self.parking_spaces.is_some()
    }

    /// Whether the pass found anything worth reporting as a success
    pub fn has_core_data(&self) -> bool {
        self.price.is_some() || self.has_any_physical_field() || !self.categories.is_empty()
    }

    /// Number of optional scalar fields holding a value
    pub fn populated_field_count(&self) -> usize {
        [
            self.ml_id.is_some(),
            self.title.is_some(),
            self.description.is_some(),
            self.price.is_some(),
            self.currency.is_some(),
            self.property_type.is_some(),
            self.operation_type.is_some(),
            self.bedrooms.is_some(),
            self.bathrooms.is_some(),
            self.built_area_m2.is_some(),
            self.lot_area_m2.is_some(),
            self.parking_spaces.is_some(),
            self.raw_address.is_some(),
            self.country.is_some(),
            self.state.is_some(),
            self.city.is_some(),
            self.seller_name.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Mark the pass as aborted, keeping whatever was already populated.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = ExtractionStatus::Error;
        self.error_message = Some(message.into());
    }
}
