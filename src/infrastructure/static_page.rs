//! Page handle over a saved HTML snapshot
//!
//! `StaticPage` parses a captured listing page with `scraper` and answers the
//! [`PageHandle`] contract against that fixed DOM. The document never changes:
//! clicks are recorded, waits return immediately and are tallied.

use async_trait::async_trait;
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Node, Selector};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::page::{BODY_INNER_TEXT_SCRIPT, ElementHandle, PageError, PageHandle, PageResult};

const NON_RENDERED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

pub struct StaticPage {
    url: String,
    document: Html,
    elements: Vec<NodeId>,
    handles: HashMap<NodeId, ElementHandle>,
    clicks: RefCell<Vec<ElementHandle>>,
    waited: Cell<Duration>,
}

impl StaticPage {
    pub fn new(url: impl Into<String>, html: &str) -> Self {
        let document = Html::parse_document(html);
        let elements: Vec<NodeId> = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .map(|element| element.id())
            .collect();
        let handles = elements
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, ElementHandle::new(index as u64)))
            .collect();

        debug!("Static page loaded with {} elements", elements.len());

        Self {
            url: url.into(),
            document,
            elements,
            handles,
            clicks: RefCell::new(Vec::new()),
            waited: Cell::new(Duration::ZERO),
        }
    }

    /// Elements clicked so far, in click order
    pub fn clicked(&self) -> Vec<ElementHandle> {
        self.clicks.borrow().clone()
    }

    /// Total delay requested through `wait_for_timeout`
    pub fn total_wait(&self) -> Duration {
        self.waited.get()
    }

    fn element(&self, handle: ElementHandle) -> PageResult<ElementRef<'_>> {
        usize::try_from(handle.id())
            .ok()
            .and_then(|index| self.elements.get(index))
            .and_then(|id| self.document.tree.get(*id))
            .and_then(ElementRef::wrap)
            .ok_or(PageError::Detached(handle))
    }

    fn handle_of(&self, element: ElementRef<'_>) -> Option<ElementHandle> {
        self.handles.get(&element.id()).copied()
    }

    fn compile(selector: &str) -> PageResult<Selector> {
        Selector::parse(selector).map_err(|e| PageError::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{e:?}"),
        })
    }

    fn is_hidden(element: ElementRef<'_>) -> bool {
        std::iter::once(element)
            .chain(element.ancestors().filter_map(ElementRef::wrap))
            .any(|el| {
                let value = el.value();
                if value.attr("hidden").is_some() || NON_RENDERED_TAGS.contains(&value.name()) {
                    return true;
                }
                value.attr("style").is_some_and(|style| {
                    let style: String = style
                        .chars()
                        .filter(|c| !c.is_whitespace())
                        .collect::<String>()
                        .to_lowercase();
                    style.contains("display:none") || style.contains("visibility:hidden")
                })
            })
    }

    /// Rendered text of `element`: hidden subtrees skipped, whitespace collapsed
    fn rendered_text(element: ElementRef<'_>) -> String {
        let mut words = Vec::new();
        for node in element.descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };
            let parent_hidden = node
                .parent()
                .and_then(ElementRef::wrap)
                .is_some_and(Self::is_hidden);
            if parent_hidden {
                continue;
            }
            words.extend(text.split_whitespace());
        }
        words.join(" ")
    }

    /// Visible body text, one trimmed text node per line
    fn visible_body_text(&self) -> String {
        let Ok(body) = Self::compile("body") else {
            return String::new();
        };
        let Some(body) = self.document.select(&body).next() else {
            return String::new();
        };

        body.descendants()
            .filter_map(|node| {
                let Node::Text(text) = node.value() else {
                    return None;
                };
                let parent = node.parent().and_then(ElementRef::wrap)?;
                if Self::is_hidden(parent) {
                    return None;
                }
                let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
                (!line.is_empty()).then_some(line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait(?Send)]
impl PageHandle for StaticPage {
    async fn url(&self) -> PageResult<String> {
        Ok(self.url.clone())
    }

    async fn title(&self) -> PageResult<Option<String>> {
        let selector = Self::compile("title")?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty()))
    }

    async fn query_selector(&self, selector: &str) -> PageResult<Option<ElementHandle>> {
        let selector = Self::compile(selector)?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .and_then(|el| self.handle_of(el)))
    }

    async fn query_selector_all(&self, selector: &str) -> PageResult<Vec<ElementHandle>> {
        let selector = Self::compile(selector)?;
        Ok(self
            .document
            .select(&selector)
            .filter_map(|el| self.handle_of(el))
            .collect())
    }

    async fn query_within(
        &self,
        scope: ElementHandle,
        selector: &str,
    ) -> PageResult<Option<ElementHandle>> {
        let scope = self.element(scope)?;
        let selector = Self::compile(selector)?;
        Ok(scope
            .select(&selector)
            .next()
            .and_then(|el| self.handle_of(el)))
    }

    async fn query_all_within(
        &self,
        scope: ElementHandle,
        selector: &str,
    ) -> PageResult<Vec<ElementHandle>> {
        let scope = self.element(scope)?;
        let selector = Self::compile(selector)?;
        Ok(scope
            .select(&selector)
            .filter_map(|el| self.handle_of(el))
            .collect())
    }

    async fn text_content(&self, element: ElementHandle) -> PageResult<Option<String>> {
        let element = self.element(element)?;
        Ok(Some(element.text().collect()))
    }

    async fn inner_text(&self, element: ElementHandle) -> PageResult<Option<String>> {
        let element = self.element(element)?;
        if Self::is_hidden(element) {
            return Ok(Some(String::new()));
        }
        Ok(Some(Self::rendered_text(element)))
    }

    async fn attribute(&self, element: ElementHandle, name: &str) -> PageResult<Option<String>> {
        let element = self.element(element)?;
        Ok(element.value().attr(name).map(str::to_string))
    }

    async fn is_visible(&self, element: ElementHandle) -> PageResult<bool> {
        let element = self.element(element)?;
        Ok(!Self::is_hidden(element))
    }

    async fn click(&self, element: ElementHandle) -> PageResult<()> {
        self.element(element)?;
        self.clicks.borrow_mut().push(element);
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> PageResult<serde_json::Value> {
        if script.trim() == BODY_INNER_TEXT_SCRIPT {
            return Ok(serde_json::Value::String(self.visible_body_text()));
        }
        Err(PageError::Unsupported(format!(
            "static snapshots cannot evaluate '{script}'"
        )))
    }

    async fn body_text(&self) -> PageResult<String> {
        Ok(self.visible_body_text())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> PageResult<ElementHandle> {
        self.query_selector(selector)
            .await?
            .ok_or_else(|| PageError::Timeout {
                what: selector.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })
    }

    async fn wait_for_timeout(&self, delay: Duration) {
        self.waited.set(self.waited.get() + delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"
        <html>
          <head><title> Casa en Venta </title><style>.x { color: red; }</style></head>
          <body>
            <h1>Casa en Venta en Cuernavaca</h1>
            <div class="card">
              <p class="addr">Calle Morelos   123,
                 Centro</p>
              <span hidden>secreto</span>
            </div>
            <div style="display: none"><button class="more">Ver más</button></div>
            <script>var tracking = 1;</script>
          </body>
        </html>
    "#;

    #[tokio::test]
    async fn test_queries_resolve_in_document_order() {
        let page = StaticPage::new("https://example.test/MLM-1", SNAPSHOT);

        let h1 = page.query_selector("h1").await.unwrap().unwrap();
        let text = page.inner_text(h1).await.unwrap();
        assert_eq!(text.as_deref(), Some("Casa en Venta en Cuernavaca"));

        let card = page.query_selector(".card").await.unwrap().unwrap();
        let addr = page.query_within(card, "p").await.unwrap().unwrap();
        assert_eq!(
            page.inner_text(addr).await.unwrap().as_deref(),
            Some("Calle Morelos 123, Centro")
        );
        assert!(page.query_within(card, "h1").await.unwrap().is_none());
        assert_eq!(page.title().await.unwrap().as_deref(), Some("Casa en Venta"));
    }

    #[test]
    fn test_url_and_title_without_a_runtime() {
        let page = StaticPage::new("https://example.test/MLM-7", "<html><body></body></html>");
        assert_eq!(
            tokio_test::block_on(page.url()).unwrap(),
            "https://example.test/MLM-7"
        );
        assert_eq!(tokio_test::block_on(page.title()).unwrap(), None);
    }

    #[tokio::test]
    async fn test_visibility_and_body_text() {
        let page = StaticPage::new("u", SNAPSHOT);

        let button = page.query_selector("button.more").await.unwrap().unwrap();
        assert!(!page.is_visible(button).await.unwrap());

        let body = page.body_text().await.unwrap();
        assert!(body.contains("Casa en Venta en Cuernavaca"));
        assert!(!body.contains("secreto"));
        assert!(!body.contains("tracking"));
        assert!(!body.contains("Ver más"));
    }

    #[tokio::test]
    async fn test_click_and_wait_are_recorded() {
        let page = StaticPage::new("u", SNAPSHOT);
        let button = page.query_selector("button").await.unwrap().unwrap();

        page.click(button).await.unwrap();
        page.wait_for_timeout(Duration::from_millis(1500)).await;
        page.wait_for_timeout(Duration::from_millis(500)).await;

        assert_eq!(page.clicked(), vec![button]);
        assert_eq!(page.total_wait(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_errors() {
        let page = StaticPage::new("u", SNAPSHOT);

        let invalid = page.query_selector("p[").await.unwrap_err();
        assert!(matches!(invalid, PageError::InvalidSelector { .. }));

        let missing = page
            .wait_for_selector(".ui-pdp-price", Duration::from_millis(250))
            .await
            .unwrap_err();
        assert_eq!(
            missing,
            PageError::Timeout {
                what: ".ui-pdp-price".to_string(),
                timeout_ms: 250
            }
        );

        let detached = page.text_content(ElementHandle::new(9_999)).await.unwrap_err();
        assert!(matches!(detached, PageError::Detached(_)));

        let script = page.evaluate("() => window.location.href").await.unwrap_err();
        assert!(script.is_recoverable());
        assert_eq!(
            page.evaluate(BODY_INNER_TEXT_SCRIPT).await.unwrap(),
            serde_json::Value::String(page.body_text().await.unwrap())
        );
    }
}
