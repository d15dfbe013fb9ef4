//! Attribute table extraction
//!
//! Reads the dynamically structured "technical specifications" tables into
//! an ordered category -> field -> value mapping, then folds the discovered
//! category names into a small canonical set.

use std::time::Duration;
use tracing::{debug, info, warn};

use super::config::SpecTableSelectors;
use super::error::{ExtractionError, ExtractionResult, recover};
use super::expansion::FallbackExpander;
use crate::domain::spec_table::{CategoryMap, FieldMap, SpecTable};
use crate::infrastructure::page::{ElementHandle, Navigator, PageHandle};

/// Canonical category buckets and the phrases that select them
const CANONICAL_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "principales",
        &["principales", "caracteristicas principales", "características principales"],
    ),
    ("servicios", &["servicios", "servicio"]),
    ("ambientes", &["ambientes", "ambiente"]),
    ("seguridad", &["seguridad", "proteccion", "protección"]),
    (
        "comodidades_y_equipamiento",
        &["comodidades", "equipamiento", "comodidades y equipamiento"],
    ),
];

pub struct SpecTableExtractor {
    selectors: SpecTableSelectors,
    expander: FallbackExpander,
    settle: Duration,
}

impl SpecTableExtractor {
    pub const fn new(
        selectors: SpecTableSelectors,
        expander: FallbackExpander,
        settle: Duration,
    ) -> Self {
        Self {
            selectors,
            expander,
            settle,
        }
    }

    /// Extract every attribute category on the page.
    ///
    /// Expands the collapsed panel first, using `navigator` when given and the
    /// built-in expander otherwise. A page without a specifications container
    /// yields an empty table.
    pub async fn extract_spec_categories(
        &self,
        page: &dyn PageHandle,
        navigator: Option<&dyn Navigator>,
    ) -> ExtractionResult<SpecTable> {
        let navigator = navigator.unwrap_or(&self.expander);
        match navigator.expand_attribute_panel(page).await {
            Ok(expanded) => debug!("Attribute panel expansion result: {}", expanded),
            Err(e) if e.is_recoverable() => warn!("Attribute panel expansion skipped: {}", e),
            Err(e) => return Err(e.into()),
        }
        page.wait_for_timeout(self.settle).await;

        let Some(container) = recover(self.locate_container(page).await)? else {
            info!("No specifications container on page");
            return Ok(SpecTable::empty());
        };

        let tables = recover(
            page.query_all_within(container, &self.selectors.table)
                .await
                .map_err(ExtractionError::from),
        )?
        .unwrap_or_default();
        debug!("Found {} attribute tables", tables.len());

        let mut categories = CategoryMap::new();
        for (index, table) in tables.into_iter().enumerate() {
            match self.extract_category(page, table, index + 1).await {
                Ok((_, fields)) if fields.is_empty() => {}
                Ok((name, fields)) => {
                    let merged = categories.entry(name).or_default();
                    for (field, value) in fields {
                        merged.insert(field, value);
                    }
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping attribute table {}: {}", index + 1, e);
                }
                Err(e) => return Err(e),
            }
        }

        let table = SpecTable::new(categories);
        info!(
            "Extracted {} attribute categories with {} fields",
            table.metadata.total_categories, table.metadata.total_fields
        );
        Ok(table)
    }

    async fn locate_container(&self, page: &dyn PageHandle) -> ExtractionResult<ElementHandle> {
        for selector in &self.selectors.container {
            let found = recover(
                page.query_selector(selector)
                    .await
                    .map_err(ExtractionError::from),
            )?
            .flatten();
            if let Some(container) = found {
                debug!("Specifications container matched '{}'", selector);
                return Ok(container);
            }
        }
        Err(ExtractionError::StructuralAbsence {
            selector: self.selectors.container.join(" | "),
        })
    }

    async fn extract_category(
        &self,
        page: &dyn PageHandle,
        table: ElementHandle,
        position: usize,
    ) -> ExtractionResult<(String, FieldMap)> {
        let mut name = None;
        for selector in &self.selectors.heading {
            let heading = recover(
                page.query_within(table, selector)
                    .await
                    .map_err(ExtractionError::from),
            )?
            .flatten();
            let Some(heading) = heading else { continue };
            if let Some(text) = element_text(page, heading).await? {
                name = Some(normalize_category_name(&text));
                break;
            }
        }
        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("category_{position}"));

        let rows = page.query_all_within(table, &self.selectors.row).await?;
        let mut fields = FieldMap::new();
        for row in rows {
            match self.extract_row(page, row).await {
                Ok(Some((field, value))) => {
                    fields.insert(field, value);
                }
                Ok(None) => {}
                Err(e) if e.is_recoverable() => debug!("Skipping row in '{}': {}", name, e),
                Err(e) => return Err(e),
            }
        }

        debug!("Category '{}' has {} fields", name, fields.len());
        Ok((name, fields))
    }

    async fn extract_row(
        &self,
        page: &dyn PageHandle,
        row: ElementHandle,
    ) -> ExtractionResult<Option<(String, String)>> {
        let label_cell = page.query_within(row, &self.selectors.label_cell).await?;
        let value_cell = page.query_within(row, &self.selectors.value_cell).await?;

        let (name, value) = if let (Some(label_cell), Some(value_cell)) = (label_cell, value_cell) {
            let name = nested_or_own_text(page, label_cell, &self.selectors.label_inner).await?;
            let value = nested_or_own_text(page, value_cell, &self.selectors.value_inner).await?;
            (name, value)
        } else {
            let cells = page.query_all_within(row, &self.selectors.any_cell).await?;
            if cells.len() < 2 {
                return Ok(None);
            }
            (
                element_text(page, cells[0]).await?,
                element_text(page, cells[1]).await?,
            )
        };

        Ok(accept_field(name, value))
    }
}

/// Trimmed non-empty rendered text of an element
async fn element_text(
    page: &dyn PageHandle,
    element: ElementHandle,
) -> ExtractionResult<Option<String>> {
    Ok(page
        .inner_text(element)
        .await?
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty()))
}

/// Text of the first `inner` descendant, else the cell's own text
async fn nested_or_own_text(
    page: &dyn PageHandle,
    cell: ElementHandle,
    inner: &str,
) -> ExtractionResult<Option<String>> {
    if let Some(nested) = page.query_within(cell, inner).await? {
        if let Some(text) = element_text(page, nested).await? {
            return Ok(Some(text));
        }
    }
    element_text(page, cell).await
}

/// Keep a row only when both sides are present, distinct and the name is meaningful.
fn accept_field(name: Option<String>, value: Option<String>) -> Option<(String, String)> {
    let (name, value) = (name?, value?);
    if name.chars().count() <= 1 || name == value {
        return None;
    }
    Some((name, value))
}

/// Lowercase, underscores for spaces and dashes, `ñ` folded, punctuation dropped
pub fn normalize_category_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().to_lowercase().chars() {
        match c {
            'ñ' => out.push('n'),
            ' ' | '-' | '_' => {
                if !out.is_empty() && !out.ends_with('_') {
                    out.push('_');
                }
            }
            c if c.is_alphanumeric() => out.push(c),
            c if c.is_whitespace() => {
                if !out.is_empty() && !out.ends_with('_') {
                    out.push('_');
                }
            }
            _ => {}
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Canonical bucket for a discovered category name, if any
pub fn canonical_category(name: &str) -> Option<&'static str> {
    let probe = name.to_lowercase().replace('_', " ");
    CANONICAL_CATEGORIES
        .iter()
        .find(|(_, variants)| variants.iter().any(|variant| probe.contains(variant)))
        .map(|(canonical, _)| *canonical)
}

/// Fold discovered categories into canonical buckets.
///
/// Empty categories are dropped. Categories landing in the same bucket are
/// merged and later fields win on name collisions.
pub fn canonicalize_categories(raw: &CategoryMap) -> CategoryMap {
    let mut canonical = CategoryMap::new();
    for (name, fields) in raw {
        if fields.is_empty() {
            continue;
        }
        let bucket = canonical_category(name)
            .map_or_else(|| normalize_category_name(name), str::to_string);
        let merged = canonical.entry(bucket).or_default();
        for (field, value) in fields {
            merged.insert(field.clone(), value.clone());
        }
    }
    canonical
}
