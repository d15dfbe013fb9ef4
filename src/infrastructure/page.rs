//! Page handle contracts
//!
//! The extraction pipeline never drives a browser itself. It talks to a
//! rendered page through [`PageHandle`] and, optionally, to a [`Navigator`]
//! that knows how to open collapsed attribute panels. Each call is a
//! suspension point; one operation is in flight per page at a time.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Script understood by page handles as "return the visible text of the body".
pub const BODY_INNER_TEXT_SCRIPT: &str = "() => document.body.innerText";

/// Opaque reference to an element owned by a page handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Failures reported by a page handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("Timed out after {timeout_ms}ms waiting for {what}")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Element {0:?} is not attached to the page")]
    Detached(ElementHandle),

    #[error("Unsupported page operation: {0}")]
    Unsupported(String),

    #[error("Page connection lost: {0}")]
    Disconnected(String),

    #[error("Page operation failed: {0}")]
    Other(String),
}

impl PageError {
    /// Recoverable errors mean "this attempt found nothing"; the next fallback runs.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::InvalidSelector { .. }
                | Self::Detached(_)
                | Self::Unsupported(_)
        )
    }
}

pub type PageResult<T> = Result<T, PageError>;

/// Capability to query and drive a rendered listing page.
///
/// Implementations may hold non-`Send` DOM state, so futures are not required
/// to be `Send`.
#[async_trait(?Send)]
pub trait PageHandle {
    /// Current page URL
    async fn url(&self) -> PageResult<String>;

    /// Document title, if any
    async fn title(&self) -> PageResult<Option<String>>;

    /// First element in the document matching `selector`
    async fn query_selector(&self, selector: &str) -> PageResult<Option<ElementHandle>>;

    /// All elements in the document matching `selector`, in document order
    async fn query_selector_all(&self, selector: &str) -> PageResult<Vec<ElementHandle>>;

    /// First descendant of `scope` matching `selector`
    async fn query_within(
        &self,
        scope: ElementHandle,
        selector: &str,
    ) -> PageResult<Option<ElementHandle>>;

    /// All descendants of `scope` matching `selector`
    async fn query_all_within(
        &self,
        scope: ElementHandle,
        selector: &str,
    ) -> PageResult<Vec<ElementHandle>>;

    /// Raw text content of an element, including hidden descendants
    async fn text_content(&self, element: ElementHandle) -> PageResult<Option<String>>;

    /// Rendered text of an element. Defaults to the raw text content.
    async fn inner_text(&self, element: ElementHandle) -> PageResult<Option<String>> {
        self.text_content(element).await
    }

    async fn attribute(&self, element: ElementHandle, name: &str) -> PageResult<Option<String>>;

    async fn is_visible(&self, element: ElementHandle) -> PageResult<bool>;

    async fn click(&self, element: ElementHandle) -> PageResult<()>;

    /// Evaluate a script in the page and return its JSON result
    async fn evaluate(&self, script: &str) -> PageResult<serde_json::Value>;

    /// Visible text of the whole body
    async fn body_text(&self) -> PageResult<String> {
        match self.evaluate(BODY_INNER_TEXT_SCRIPT).await? {
            serde_json::Value::String(text) => Ok(text),
            serde_json::Value::Null => Ok(String::new()),
            other => Err(PageError::Other(format!(
                "body text probe returned a non-string value: {other}"
            ))),
        }
    }

    /// Wait until an element matching `selector` exists
    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> PageResult<ElementHandle>;

    /// Fixed delay, used to let the page settle after interactions
    async fn wait_for_timeout(&self, delay: Duration);
}

/// Site-aware navigation capability supplied by the caller
#[async_trait(?Send)]
pub trait Navigator {
    /// Open the collapsed attribute panel if there is one.
    ///
    /// Returns `true` when the panel is (or already was) expanded.
    async fn expand_attribute_panel(&self, page: &dyn PageHandle) -> PageResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(
            PageError::Timeout {
                what: "h1".to_string(),
                timeout_ms: 500
            }
            .is_recoverable()
        );
        assert!(PageError::Detached(ElementHandle::new(3)).is_recoverable());
        assert!(PageError::Unsupported("evaluate".to_string()).is_recoverable());
        assert!(!PageError::Disconnected("target closed".to_string()).is_recoverable());
        assert!(!PageError::Other("boom".to_string()).is_recoverable());
    }
}
