//! Infrastructure layer for page access, parsing, configuration and logging
//!
//! The browser itself lives outside this crate. Everything here talks to a
//! page through the [`page::PageHandle`] trait.

pub mod config;
pub mod logging;
pub mod page;
pub mod parsing;
pub mod parsing_error;
pub mod static_page;

// Re-export commonly used items
pub use config::{AppConfig, ConfigError, LoggingConfig};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use page::{ElementHandle, Navigator, PageError, PageHandle, PageResult};
pub use parsing::{ListingResolver, ParsingConfig};
pub use parsing_error::{ExtractionError, ExtractionResult};
pub use static_page::StaticPage;
