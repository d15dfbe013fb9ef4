//! ML Listing Extractor - hybrid field extraction for MercadoLibre Mexico
//! real-estate listing pages
//!
//! A rendered listing page goes in, one [`ListingRecord`] comes out. Fields
//! are pulled from page scalars, the collapsible attribute tables and
//! free-text patterns, and the first source to produce a field keeps it.
//!
//! ```no_run
//! use ml_listing_extractor::{ListingResolver, ParsingConfig, StaticPage};
//!
//! # async fn run(html: &str) -> anyhow::Result<()> {
//! let resolver = ListingResolver::new(&ParsingConfig::default())?;
//! let page = StaticPage::new("https://casas.mercadolibre.com.mx/MLM-123-casa", html);
//! let record = resolver.resolve(&page, None, false).await;
//! println!("{}", serde_json::to_string_pretty(&record)?);
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod domain;
pub mod infrastructure;

pub use domain::{ExtractionStatus, ListingRecord, Location, SpecTable};
pub use infrastructure::parsing::{ListingResolver, ParsingConfig, ResolveContext};
pub use infrastructure::{AppConfig, ExtractionError, Navigator, PageHandle, StaticPage};
