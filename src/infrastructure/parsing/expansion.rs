//! Built-in expansion of the collapsed attribute panel
//!
//! Used when the caller does not supply its own [`Navigator`]. Real-estate
//! listings render either the full "product" panel or a collapsed
//! "property" panel behind a "see all" button.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use super::config::ExpansionConfig;
use super::error::{ExtractionError, ExtractionResult, recover};
use crate::infrastructure::page::{ElementHandle, Navigator, PageHandle, PageResult};

/// Which attribute panel layout the page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Expanded,
    Collapsed,
    Unidentified,
}

#[derive(Debug, Clone)]
pub struct FallbackExpander {
    config: ExpansionConfig,
}

impl FallbackExpander {
    pub const fn new(config: ExpansionConfig) -> Self {
        Self { config }
    }

    /// Detect the panel layout from the visible page text
    pub async fn panel_state(&self, page: &dyn PageHandle) -> ExtractionResult<PanelState> {
        let text = recover(page.body_text().await.map_err(ExtractionError::from))?
            .unwrap_or_default();

        let state = if text.contains(&self.config.expanded_marker) {
            PanelState::Expanded
        } else if text.contains(&self.config.collapsed_marker) {
            PanelState::Collapsed
        } else {
            PanelState::Unidentified
        };
        debug!("Attribute panel state: {:?}", state);
        Ok(state)
    }

    /// Expand the panel if it is collapsed.
    ///
    /// Returns `false` only when a collapsed panel could not be opened.
    pub async fn expand(&self, page: &dyn PageHandle) -> ExtractionResult<bool> {
        match self.panel_state(page).await? {
            PanelState::Expanded | PanelState::Unidentified => return Ok(true),
            PanelState::Collapsed => {}
        }

        let Some(button) = self.find_expand_control(page).await? else {
            debug!("No expansion control found for collapsed panel");
            return Ok(false);
        };

        if !recover(page.is_visible(button).await.map_err(ExtractionError::from))?
            .unwrap_or(false)
        {
            debug!("Expansion control is not visible");
            return Ok(false);
        }

        page.click(button).await?;
        page.wait_for_timeout(Duration::from_millis(self.config.settle_ms)).await;
        info!("Expanded collapsed attribute panel");
        Ok(true)
    }

    /// Four strategies, most specific first
    async fn find_expand_control(
        &self,
        page: &dyn PageHandle,
    ) -> ExtractionResult<Option<ElementHandle>> {
        let keyword = self.config.label_keyword.to_lowercase();
        let phrase = self.config.label_phrase.to_lowercase();
        let exact = self.config.button_label.trim().to_string();

        let strategies: [(&str, Box<dyn Fn(&str) -> bool + '_>); 4] = [
            ("button", Box::new(|label: &str| label == exact)),
            (
                self.config.button_class_selector.as_str(),
                Box::new(|label: &str| label.to_lowercase().contains(&keyword)),
            ),
            (
                self.config.collapse_button_selector.as_str(),
                Box::new(|label: &str| {
                    let label = label.to_lowercase();
                    label.contains(&keyword) || label.contains(&phrase)
                }),
            ),
            (
                "button",
                Box::new(|label: &str| {
                    let label = label.to_lowercase();
                    label.contains(&keyword) && label.contains(&phrase)
                }),
            ),
        ];

        for (index, (selector, accepts)) in strategies.iter().enumerate() {
            let candidates = recover(
                page.query_selector_all(selector)
                    .await
                    .map_err(ExtractionError::from),
            )?
            .unwrap_or_default();

            for candidate in candidates {
                let label = recover(
                    page.inner_text(candidate)
                        .await
                        .map_err(ExtractionError::from),
                )?
                .flatten()
                .unwrap_or_default();
                if accepts(label.trim()) {
                    debug!("Expansion control found by strategy {}", index + 1);
                    return Ok(Some(candidate));
                }
            }
        }

        Ok(None)
    }
}

#[async_trait(?Send)]
impl Navigator for FallbackExpander {
    async fn expand_attribute_panel(&self, page: &dyn PageHandle) -> PageResult<bool> {
        match self.expand(page).await {
            Ok(expanded) => Ok(expanded),
            Err(ExtractionError::Page(error)) => Err(error),
            Err(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::static_page::StaticPage;

    fn expander() -> FallbackExpander {
        FallbackExpander::new(ExpansionConfig::default())
    }

    #[tokio::test]
    async fn test_expanded_panel_needs_no_click() {
        let page = StaticPage::new(
            "u",
            "<body><h2>Características del producto</h2><button>Ver todas las características</button></body>",
        );
        assert_eq!(expander().panel_state(&page).await.unwrap(), PanelState::Expanded);
        assert!(expander().expand(&page).await.unwrap());
        assert!(page.clicked().is_empty());
    }

    #[tokio::test]
    async fn test_collapsed_panel_clicks_exact_label() {
        let page = StaticPage::new(
            "u",
            r#"<body>
                <h2>Características del inmueble</h2>
                <button>Ver más fotos</button>
                <button id="all">Ver todas las características</button>
            </body>"#,
        );
        let target = page.query_selector("#all").await.unwrap().unwrap();

        assert!(expander().expand(&page).await.unwrap());
        assert_eq!(page.clicked(), vec![target]);
        assert_eq!(page.total_wait(), Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn test_collapsed_panel_uses_class_strategy() {
        let page = StaticPage::new(
            "u",
            r#"<body>
                <h2>Características del inmueble</h2>
                <a class="ui-pdp-collapsable__action ui-vpp-highlighted-specs__striped-collapsed__action">
                    Mostrar características
                </a>
            </body>"#,
        );
        let target = page.query_selector("a").await.unwrap().unwrap();

        assert!(expander().expand(&page).await.unwrap());
        assert_eq!(page.clicked(), vec![target]);
    }

    #[tokio::test]
    async fn test_collapsed_panel_without_visible_control() {
        let page = StaticPage::new(
            "u",
            r#"<body>
                <h2>Características del inmueble</h2>
                <button hidden>Ver todas las características</button>
            </body>"#,
        );
        assert!(!expander().expand(&page).await.unwrap());
        assert!(page.clicked().is_empty());
    }

    #[tokio::test]
    async fn test_unidentified_interface_proceeds() {
        let page = StaticPage::new("u", "<body><p>Sin tabla</p></body>");
        assert_eq!(
            expander().panel_state(&page).await.unwrap(),
            PanelState::Unidentified
        );
        assert!(expander().expand_attribute_panel(&page).await.unwrap());
    }
}
