//! Listing page parsing
//!
//! Field extractors for MercadoLibre real-estate listing pages and the
//! resolver that merges them into one record. Every extractor works against
//! the [`PageHandle`](crate::infrastructure::page::PageHandle) abstraction,
//! so the same code runs on a live browser page or a static snapshot.

pub mod address;
pub mod config;
pub mod context;
pub mod description;
pub mod error;
pub mod expansion;
pub mod listing_resolver;
pub mod location;
pub mod numeric;
pub mod scalar_fields;
pub mod spec_table;

// Re-export public types
pub use address::looks_like_address;
pub use config::{ExpansionConfig, ListingSelectors, ParsingConfig, SpecTableSelectors};
pub use context::ResolveContext;
pub use description::{PatternTier, PhysicalField};
pub use error::{ExtractionError, ExtractionResult};
pub use expansion::{FallbackExpander, PanelState};
pub use listing_resolver::{ListingResolver, apply_category_fields, infer_areas};
pub use location::{normalize_state, parse_location};
pub use numeric::{Numeric, parse_numeric, parse_price, parse_quantity};
pub use scalar_fields::ScalarFieldExtractor;
pub use spec_table::{SpecTableExtractor, canonicalize_categories, normalize_category_name};
