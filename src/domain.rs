//! Domain module - listing entities and value objects
//!
//! Plain data types shared by the extraction pipeline and its callers.
//! Nothing in here touches a page.

pub mod listing;
pub mod location;
pub mod spec_table;

pub use listing::{ExtractionStatus, ListingRecord, OperationType, PropertyType, fill_missing};
pub use location::{DEFAULT_COUNTRY, Location};
pub use spec_table::{CategoryMap, FieldMap, SpecTable, SpecTableMetadata};
