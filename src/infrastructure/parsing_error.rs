//! Extraction error types
//!
//! Every fallback tier returns a typed result. Expected misses (`NotFound`,
//! `ParseFailure`, `StructuralAbsence`) and recoverable page errors send the
//! pipeline to the next tier; anything else aborts the pass.

use thiserror::Error;
use tracing::debug;

use super::page::PageError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("No element matched '{selector}'")]
    NotFound { selector: String },

    #[error("Could not parse {field} from '{raw}'")]
    ParseFailure { field: String, raw: String },

    #[error("Specification container '{selector}' is absent")]
    StructuralAbsence { selector: String },

    #[error("Page handle failure: {0}")]
    Page(#[from] PageError),

    #[error("Invalid extraction configuration: {message}")]
    Configuration { message: String },
}

impl ExtractionError {
    pub fn not_found(selector: &str) -> Self {
        Self::NotFound {
            selector: selector.to_string(),
        }
    }

    pub fn parse_failure(field: &str, raw: &str) -> Self {
        Self::ParseFailure {
            field: field.to_string(),
            raw: raw.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if the next fallback tier should run after this error
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::ParseFailure { .. } | Self::StructuralAbsence { .. } => {
                true
            }
            Self::Page(error) => error.is_recoverable(),
            Self::Configuration { .. } => false,
        }
    }
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Turn a recoverable miss into `Ok(None)` and keep fatal errors as errors.
pub fn recover<T>(result: ExtractionResult<T>) -> ExtractionResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) if error.is_recoverable() => {
            debug!("Fallback tier missed: {}", error);
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recover_maps_misses_to_none() {
        let miss: ExtractionResult<u32> = Err(ExtractionError::not_found(".price"));
        assert_eq!(recover(miss), Ok(None));

        let parse: ExtractionResult<u32> =
            Err(ExtractionError::parse_failure("price", "consultar"));
        assert_eq!(recover(parse), Ok(None));

        let timeout: ExtractionResult<u32> = Err(PageError::Timeout {
            what: "h1".to_string(),
            timeout_ms: 100,
        }
        .into());
        assert_eq!(recover(timeout), Ok(None));

        assert_eq!(recover(Ok(7)), Ok(Some(7)));
    }

    #[test]
    fn test_recover_keeps_fatal_errors() {
        let closed: ExtractionResult<u32> =
            Err(PageError::Disconnected("target closed".to_string()).into());
        assert!(matches!(
            recover(closed),
            Err(ExtractionError::Page(PageError::Disconnected(_)))
        ));

        let config: ExtractionResult<u32> = Err(ExtractionError::configuration("bad pattern"));
        assert!(recover(config).is_err());
    }
}
