//! Page-specific scalar field extraction
//!
//! Each field has its own selector fallback chain. Every step writes through
//! [`fill_missing`], so a value found earlier in the pass is never replaced.

use regex::Regex;
use tracing::debug;

use super::address::looks_like_address;
use super::config::ListingSelectors;
use super::error::{ExtractionError, ExtractionResult, recover};
use super::numeric::parse_price;
use crate::domain::listing::{ListingRecord, OperationType, PropertyType, fill_missing};
use crate::infrastructure::page::{ElementHandle, PageHandle};

const LISTING_ID_PATTERN: &str = r"MLM-?\d+";
const DEFAULT_CURRENCY: &str = "MXN";

const MIN_TITLE_CHARS: usize = 6;
const MIN_DESCRIPTION_CHARS: usize = 21;
const MIN_SUBTITLE_CHARS: usize = 4;
const MIN_SELLER_CHARS: usize = 2;

const PROPERTY_KEYWORDS: &[(PropertyType, &[&str])] = &[
    (PropertyType::House, &["casa", "casas"]),
    (
        PropertyType::Apartment,
        &["departamento", "departamentos", "depto", "dpto"],
    ),
    (PropertyType::Land, &["terreno", "terrenos", "lote", "lotes"]),
    (
        PropertyType::Commercial,
        &["local", "locales", "oficina", "oficinas", "bodega", "bodegas"],
    ),
];

const OPERATION_KEYWORDS: &[(OperationType, &[&str])] = &[
    (
        OperationType::Sale,
        &["venta", "ventas", "preventa", "preventas", "remate"],
    ),
    (
        OperationType::Rent,
        &["renta", "rentas", "alquiler", "alquila", "arriendo"],
    ),
    (
        OperationType::Transfer,
        &["traspaso", "traspasos", "cesion", "cesión"],
    ),
];

/// Property type named in `text`, matched on whole words
pub fn detect_property_type(text: &str) -> Option<PropertyType> {
    detect_keyword(text, PROPERTY_KEYWORDS)
}

/// Operation type named in `text`, matched on whole words
pub fn detect_operation_type(text: &str) -> Option<OperationType> {
    detect_keyword(text, OPERATION_KEYWORDS)
}

fn detect_keyword<T: Copy>(text: &str, table: &[(T, &[&str])]) -> Option<T> {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| words.contains(k)))
        .map(|(kind, _)| *kind)
}

/// Currency code implied by a price symbol
pub fn currency_from_symbol(symbol: &str) -> &'static str {
    let symbol = symbol.to_uppercase();
    if symbol.contains("US") || symbol.contains("U$S") {
        "USD"
    } else {
        DEFAULT_CURRENCY
    }
}

pub struct ScalarFieldExtractor {
    selectors: ListingSelectors,
    listing_id: Regex,
    backup_text_max_chars: usize,
}

impl ScalarFieldExtractor {
    pub fn new(
        selectors: ListingSelectors,
        backup_text_max_chars: usize,
    ) -> ExtractionResult<Self> {
        let listing_id = Regex::new(LISTING_ID_PATTERN)
            .map_err(|e| ExtractionError::configuration(format!("listing id pattern: {e}")))?;
        Ok(Self {
            selectors,
            listing_id,
            backup_text_max_chars,
        })
    }

    /// Site identifier from a URL-like string
    pub fn listing_id_from(&self, text: &str) -> Option<String> {
        let path = url::Url::parse(text)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| text.to_string());
        self.listing_id
            .find(&path)
            .map(|m| m.as_str().to_string())
    }

    /// Identifier, title and description
    pub async fn extract_metadata(
        &self,
        page: &dyn PageHandle,
        record: &mut ListingRecord,
    ) -> ExtractionResult<()> {
        let from_url = self.listing_id_from(&record.url);
        fill_missing(&mut record.ml_id, from_url);

        if record.ml_id.is_none() {
            for selector in &self.selectors.canonical_link {
                let Some(element) = first_match(page, selector).await? else {
                    continue;
                };
                let mut target = recover(attribute(page, element, "href").await)?.flatten();
                if target.is_none() {
                    target = recover(attribute(page, element, "content").await)?.flatten();
                }
                if fill_missing(
                    &mut record.ml_id,
                    target.and_then(|t| self.listing_id_from(&t)),
                ) {
                    break;
                }
            }
        }

        let title = first_text(page, &self.selectors.title, MIN_TITLE_CHARS).await?;
        fill_missing(&mut record.title, title);

        let description =
            first_text(page, &self.selectors.description, MIN_DESCRIPTION_CHARS).await?;
        fill_missing(&mut record.description, description);

        debug!(
            "Metadata: id={:?} title_found={} description_found={}",
            record.ml_id,
            record.title.is_some(),
            record.description.is_some()
        );
        Ok(())
    }

    /// Price from the first fraction selector that holds a number, plus currency
    pub async fn extract_price(
        &self,
        page: &dyn PageHandle,
        record: &mut ListingRecord,
    ) -> ExtractionResult<()> {
        for selector in &self.selectors.price {
            if let Some(price) = recover(self.price_at(page, selector).await)? {
                fill_missing(&mut record.price, Some(price));
                break;
            }
        }

        if record.price.is_some() {
            let symbol = first_text(page, &self.selectors.currency_symbol, 1).await?;
            let currency = symbol.as_deref().map_or(DEFAULT_CURRENCY, currency_from_symbol);
            fill_missing(&mut record.currency, Some(currency.to_string()));
        }
        Ok(())
    }

    async fn price_at(&self, page: &dyn PageHandle, selector: &str) -> ExtractionResult<f64> {
        let element = page
            .query_selector(selector)
            .await?
            .ok_or_else(|| ExtractionError::not_found(selector))?;
        let text = page.inner_text(element).await?.unwrap_or_default();
        parse_price(&text).ok_or_else(|| ExtractionError::parse_failure("price", text.trim()))
    }

    /// Property and operation type: subtitle, then title, then unknown
    pub async fn extract_types(
        &self,
        page: &dyn PageHandle,
        record: &mut ListingRecord,
    ) -> ExtractionResult<()> {
        let subtitle = first_text(page, &self.selectors.subtitle, MIN_SUBTITLE_CHARS).await?;
        if let Some(subtitle) = subtitle {
            debug!("Subtitle: {}", subtitle);
            fill_missing(&mut record.property_type, detect_property_type(&subtitle));
            fill_missing(&mut record.operation_type, detect_operation_type(&subtitle));
        }

        if record.property_type.is_none() || record.operation_type.is_none() {
            let heading = match record.title.clone() {
                Some(title) => Some(title),
                None => first_text(page, &self.selectors.title, 1).await?,
            };
            if let Some(heading) = heading {
                fill_missing(&mut record.property_type, detect_property_type(&heading));
                fill_missing(&mut record.operation_type, detect_operation_type(&heading));
            }
        }

        fill_missing(&mut record.property_type, Some(PropertyType::Unknown));
        fill_missing(&mut record.operation_type, Some(OperationType::Unknown));
        Ok(())
    }

    pub async fn extract_seller(
        &self,
        page: &dyn PageHandle,
        record: &mut ListingRecord,
    ) -> ExtractionResult<()> {
        let seller = first_text(page, &self.selectors.seller, MIN_SELLER_CHARS).await?;
        fill_missing(&mut record.seller_name, seller);
        Ok(())
    }

    /// Address from the location line, then broad candidates, then page text lines
    pub async fn extract_address(
        &self,
        page: &dyn PageHandle,
        record: &mut ListingRecord,
    ) -> ExtractionResult<()> {
        if record.raw_address.is_some() {
            return Ok(());
        }

        for (strategy, chain) in [
            ("primary", &self.selectors.address_primary),
            ("broad", &self.selectors.address_broad),
        ] {
            for selector in chain {
                let candidates = recover(
                    page.query_selector_all(selector)
                        .await
                        .map_err(ExtractionError::from),
                )?
                .unwrap_or_default();
                for candidate in candidates {
                    let Some(text) = recover(text_of(page, candidate).await)?.flatten() else {
                        continue;
                    };
                    if looks_like_address(&text) {
                        debug!("Address found by {} strategy via '{}'", strategy, selector);
                        record.raw_address = Some(text);
                        return Ok(());
                    }
                }
            }
        }

        let body = recover(page.body_text().await.map_err(ExtractionError::from))?
            .unwrap_or_default();
        let line = body
            .lines()
            .map(str::trim)
            .find(|line| looks_like_address(line))
            .map(str::to_string);
        if line.is_some() {
            debug!("Address found in page text");
        }
        fill_missing(&mut record.raw_address, line);
        Ok(())
    }

    /// Text for the last regex tier: description-like blocks, else visible page text
    pub async fn backup_description(
        &self,
        page: &dyn PageHandle,
    ) -> ExtractionResult<Option<String>> {
        let mut blocks = Vec::new();
        for selector in &self.selectors.backup_description {
            let Some(element) = first_match(page, selector).await? else {
                continue;
            };
            if let Some(text) = recover(text_of(page, element).await)?.flatten() {
                blocks.push(text);
            }
        }

        let text = if blocks.is_empty() {
            recover(page.body_text().await.map_err(ExtractionError::from))?.unwrap_or_default()
        } else {
            blocks.join("\n")
        };

        let text: String = text.chars().take(self.backup_text_max_chars).collect();
        Ok((!text.trim().is_empty()).then_some(text))
    }
}

async fn first_match(
    page: &dyn PageHandle,
    selector: &str,
) -> ExtractionResult<Option<ElementHandle>> {
    Ok(recover(
        page.query_selector(selector)
            .await
            .map_err(ExtractionError::from),
    )?
    .flatten())
}

async fn attribute(
    page: &dyn PageHandle,
    element: ElementHandle,
    name: &str,
) -> ExtractionResult<Option<String>> {
    Ok(page
        .attribute(element, name)
        .await?
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

async fn text_of(
    page: &dyn PageHandle,
    element: ElementHandle,
) -> ExtractionResult<Option<String>> {
    Ok(page
        .inner_text(element)
        .await?
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty()))
}

/// First selector in `chain` whose element text has at least `min_chars` characters
async fn first_text(
    page: &dyn PageHandle,
    chain: &[String],
    min_chars: usize,
) -> ExtractionResult<Option<String>> {
    for selector in chain {
        let Some(element) = first_match(page, selector).await? else {
            continue;
        };
        let Some(text) = recover(text_of(page, element).await)?.flatten() else {
            continue;
        };
        if text.chars().count() >= min_chars {
            return Ok(Some(text));
        }
    }
    Ok(None)
}
