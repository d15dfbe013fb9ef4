//! Parsing configuration for listing extraction
//!
//! Centralized CSS selector chains, interface markers and settle delays.
//! Every chain is tried in order; the first hit wins.

use serde::{Deserialize, Serialize};

use crate::infrastructure::config::defaults;

/// Main parsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Scalar field selectors
    pub listing: ListingSelectors,

    /// Attribute table selectors
    pub spec_table: SpecTableSelectors,

    /// Collapsed panel detection and expansion
    pub expansion: ExpansionConfig,

    /// Delay before reading attribute tables
    pub spec_settle_ms: u64,

    /// Cap on the backup description text
    pub backup_text_max_chars: usize,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            listing: ListingSelectors::default(),
            spec_table: SpecTableSelectors::default(),
            expansion: ExpansionConfig::default(),
            spec_settle_ms: defaults::SPEC_SETTLE_MS,
            backup_text_max_chars: defaults::BACKUP_TEXT_MAX_CHARS,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// CSS selectors for scalar listing fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    pub title: Vec<String>,
    pub description: Vec<String>,
    pub canonical_link: Vec<String>,
    pub price: Vec<String>,
    pub currency_symbol: Vec<String>,
    pub subtitle: Vec<String>,
    pub seller: Vec<String>,

    /// Address strategy 1: the listing's own location line
    pub address_primary: Vec<String>,

    /// Address strategy 2: broad class-based candidates
    pub address_broad: Vec<String>,

    /// Description-like blocks for the last regex tier
    pub backup_description: Vec<String>,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            title: strings(&["h1", ".ui-pdp-title"]),
            description: strings(&[
                "[data-testid=\"content\"]",
                ".ui-pdp-description__content",
            ]),
            canonical_link: strings(&["link[rel=\"canonical\"]", "meta[property=\"og:url\"]"]),
            price: strings(&[
                ".price-tag-fraction",
                ".andes-money-amount__fraction",
                ".ui-pdp-price__fraction",
            ]),
            currency_symbol: strings(&[
                ".andes-money-amount__currency-symbol",
                ".price-tag-symbol",
            ]),
            subtitle: strings(&[
                ".ui-pdp-subtitle",
                ".ui-pdp-header__subtitle .ui-pdp-subtitle",
                ".ui-pdp-header__subtitle span",
                "span.ui-pdp-subtitle",
            ]),
            seller: strings(&[
                ".ui-vip-profile-info__info-container .ui-vip-profile-info__info-link h3",
                ".ui-vip-profile-info__info-container h3",
                ".ui-vip-profile-info__info-link h3",
                "h3.ui-pdp-color--BLACK.ui-pdp-size--XSMALL.ui-pdp-family--REGULAR",
            ]),
            address_primary: strings(&[
                "p.ui-pdp-color--BLACK.ui-pdp-size--SMALL.ui-pdp-family--REGULAR.ui-pdp-media__title",
            ]),
            address_broad: strings(&[
                "p[class*=\"ui-pdp\"]",
                "span[class*=\"ui-pdp\"]",
                ".ui-pdp-container p",
                ".ui-pdp-media__title",
                "p.ui-pdp-color--BLACK",
            ]),
            backup_description: strings(&[
                ".ui-pdp-description",
                ".ui-pdp-description__content",
                "[data-testid=\"description\"]",
                ".item-description",
                ".description-content",
            ]),
        }
    }
}

/// CSS selectors for the attribute tables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecTableSelectors {
    pub container: Vec<String>,
    pub table: String,
    pub heading: Vec<String>,
    pub row: String,
    pub label_cell: String,
    pub value_cell: String,
    pub label_inner: String,
    pub value_inner: String,
    pub any_cell: String,
}

impl Default for SpecTableSelectors {
    fn default() -> Self {
        Self {
            container: strings(&[
                ".ui-pdp-container__row.ui-pdp-container__row--technical-specifications",
                ".ui-vpp-highlighted-specs",
                "#technical_specifications",
            ]),
            table: ".ui-vpp-striped-specs__table".to_string(),
            heading: strings(&[
                "h3",
                "h4",
                "h2",
                ".ui-vpp-striped-specs__header",
                "[class*=\"header\"]",
                "[class*=\"title\"]",
            ]),
            row: "tr".to_string(),
            label_cell: "th".to_string(),
            value_cell: "td".to_string(),
            label_inner: "div".to_string(),
            value_inner: "span".to_string(),
            any_cell: "th, td".to_string(),
        }
    }
}

/// Interface markers and expansion controls of the attribute panel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Heading shown when the full panel is already rendered
    pub expanded_marker: String,

    /// Heading shown when the panel starts collapsed
    pub collapsed_marker: String,

    /// Exact label of the expansion button
    pub button_label: String,

    pub button_class_selector: String,
    pub collapse_button_selector: String,

    /// Lowercase phrases accepted in a button label
    pub label_keyword: String,
    pub label_phrase: String,

    /// Delay after clicking the expansion control
    pub settle_ms: u64,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            expanded_marker: "Características del producto".to_string(),
            collapsed_marker: "Características del inmueble".to_string(),
            button_label: "Ver todas las características".to_string(),
            button_class_selector:
                ".ui-pdp-collapsable__action.ui-vpp-highlighted-specs__striped-collapsed__action"
                    .to_string(),
            collapse_button_selector: "button[class*=\"collapsable\"], button[class*=\"collapse\"]"
                .to_string(),
            label_keyword: "características".to_string(),
            label_phrase: "ver todas".to_string(),
            settle_ms: defaults::EXPANSION_SETTLE_MS,
        }
    }
}
