//! Attribute table types
//!
//! Listing pages group their attributes into category tables whose names and
//! rows differ from one listing to the next. These types keep the discovered
//! structure in page order.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field name -> value string, in page order
pub type FieldMap = IndexMap<String, String>;

/// Category name -> fields, in page order
pub type CategoryMap = IndexMap<String, FieldMap>;

/// Summary counters stamped on every extracted table dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecTableMetadata {
    pub total_categories: usize,
    pub total_fields: usize,
    pub extracted_at: DateTime<Utc>,
}

/// Full nested dump of a listing's attribute tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecTable {
    pub categories: CategoryMap,
    pub metadata: SpecTableMetadata,
}

impl SpecTable {
    /// Build a dump and compute its totals.
    pub fn new(categories: CategoryMap) -> Self {
        let total_fields = categories.values().map(FieldMap::len).sum();
        Self {
            metadata: SpecTableMetadata {
                total_categories: categories.len(),
                total_fields,
                extracted_at: Utc::now(),
            },
            categories,
        }
    }

    pub fn empty() -> Self {
        Self::new(CategoryMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
