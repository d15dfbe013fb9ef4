//! Hybrid field resolver
//!
//! Runs one extraction pass over a listing page and assembles a
//! [`ListingRecord`]. Sources are consulted in priority order (page
//! scalars, attribute tables, description patterns, general patterns) and a
//! field keeps the first value any source produced for it.

use std::time::Duration;
use tracing::{debug, error, info};

use super::config::ParsingConfig;
use super::context::ResolveContext;
use super::description::{PatternTier, PhysicalField};
use super::error::ExtractionResult;
use super::expansion::FallbackExpander;
use super::location::parse_location;
use super::numeric::parse_quantity;
use super::scalar_fields::ScalarFieldExtractor;
use super::spec_table::{SpecTableExtractor, canonicalize_categories};
use crate::domain::listing::{ExtractionStatus, ListingRecord, fill_missing};
use crate::domain::location::DEFAULT_COUNTRY;
use crate::domain::spec_table::FieldMap;
use crate::infrastructure::page::{Navigator, PageHandle};

const PRINCIPAL_CATEGORY: &str = "principales";

/// Lots up to this size without a built area are assumed mostly built over
const SMALL_LOT_MAX_M2: f64 = 200.0;
const SMALL_LOT_BUILT_RATIO: f64 = 0.75;
const LOT_FROM_BUILT_RATIO: f64 = 1.2;

pub struct ListingResolver {
    scalars: ScalarFieldExtractor,
    spec_tables: SpecTableExtractor,
    description_tier: PatternTier,
    general_tier: PatternTier,
}

impl ListingResolver {
    pub fn new(config: &ParsingConfig) -> ExtractionResult<Self> {
        let expander = FallbackExpander::new(config.expansion.clone());
        Ok(Self {
            scalars: ScalarFieldExtractor::new(
                config.listing.clone(),
                config.backup_text_max_chars,
            )?,
            spec_tables: SpecTableExtractor::new(
                config.spec_table.clone(),
                expander,
                Duration::from_millis(config.spec_settle_ms),
            ),
            description_tier: PatternTier::description()?,
            general_tier: PatternTier::general()?,
        })
    }

    /// Extract one listing page. Never fails: an aborted pass comes back with
    /// `status = error`, a message, and every field populated before the failure.
    pub async fn resolve(
        &self,
        page: &dyn PageHandle,
        navigator: Option<&dyn Navigator>,
        include_raw_table: bool,
    ) -> ListingRecord {
        let context = ResolveContext::new().with_raw_table(include_raw_table);
        self.resolve_with_context(page, navigator, &context).await
    }

    pub async fn resolve_with_context(
        &self,
        page: &dyn PageHandle,
        navigator: Option<&dyn Navigator>,
        context: &ResolveContext,
    ) -> ListingRecord {
        let mut record = match page.url().await {
            Ok(url) => ListingRecord::new(url),
            Err(e) => {
                error!("Cannot read page URL: {}", e);
                let mut record = ListingRecord::new(String::new());
                record.mark_failed(e.to_string());
                record.elapsed_seconds = Some(context.elapsed().as_secs_f64());
                return record;
            }
        };
        info!("Resolving listing {}", record.url);

        match self.run_pass(page, navigator, context, &mut record).await {
            Ok(()) => finalize(&mut record),
            Err(e) => {
                error!("Extraction aborted for {}: {}", record.url, e);
                record.mark_failed(e.to_string());
            }
        }

        record.elapsed_seconds = Some(context.elapsed().as_secs_f64());
        info!(
            "Resolved {} in {:.2}s: status={:?}, {} fields, {} categories",
            record.url,
            record.elapsed_seconds.unwrap_or_default(),
            record.status,
            record.populated_field_count(),
            record.categories.len()
        );
        record
    }

    async fn run_pass(
        &self,
        page: &dyn PageHandle,
        navigator: Option<&dyn Navigator>,
        context: &ResolveContext,
        record: &mut ListingRecord,
    ) -> ExtractionResult<()> {
        // 1. identity
        self.scalars.extract_metadata(page, record).await?;

        // 2. page scalars
        self.scalars.extract_price(page, record).await?;
        self.scalars.extract_types(page, record).await?;
        self.scalars.extract_seller(page, record).await?;
        self.scalars.extract_address(page, record).await?;

        // 3. location
        if let Some(address) = record.raw_address.as_deref() {
            let location = parse_location(address);
            record.apply_location(location);
        }

        // 4-5. attribute tables
        let table = self
            .spec_tables
            .extract_spec_categories(page, navigator)
            .await?;
        for (name, fields) in canonicalize_categories(&table.categories) {
            if !record.categories.contains_key(&name) {
                record.categories.insert(name, fields);
            }
        }

        // 6. physical fields from table labels
        let from_tables = apply_category_fields(record);
        debug!("Attribute tables filled {} physical fields", from_tables);

        // 6b. listing description
        if record.has_missing_physical_fields() {
            if let Some(description) = record.description.clone() {
                self.description_tier.fill_missing(&description, record);
            }
        }

        // 6c. general patterns over backup text
        if record.has_missing_physical_fields() {
            if let Some(text) = self.scalars.backup_description(page).await? {
                self.general_tier.fill_missing(&text, record);
            }
        }

        // 7. area inference
        infer_areas(record);

        // 8. raw dump
        if context.include_raw_table {
            record.raw_spec_table = Some(table);
        }

        Ok(())
    }
}

/// Defaults and status for a pass that ran to completion
fn finalize(record: &mut ListingRecord) {
    if record.price.is_some() {
        fill_missing(&mut record.currency, Some("MXN".to_string()));
    }
    fill_missing(&mut record.country, Some(DEFAULT_COUNTRY.to_string()));
    record.status = if record.has_core_data() {
        ExtractionStatus::Success
    } else {
        ExtractionStatus::Partial
    };
}

/// Keyword-scan attribute labels for the physical fields.
///
/// Reads the `principales` category, or every category in page order when the
/// listing has none. The first label matching a field decides it.
pub fn apply_category_fields(record: &mut ListingRecord) -> usize {
    let sources: Vec<FieldMap> = match record.categories.get(PRINCIPAL_CATEGORY) {
        Some(principal) => vec![principal.clone()],
        None => record.categories.values().cloned().collect(),
    };

    let mut filled = 0;
    for field in PhysicalField::ALL {
        if field.is_set(record) {
            continue;
        }
        let matched = sources
            .iter()
            .flat_map(FieldMap::iter)
            .find(|(label, _)| field.matches_label(label));
        let Some((label, value)) = matched else {
            continue;
        };
        let accepted = parse_quantity(value).is_some_and(|number| field.fill(record, number));
        if accepted {
            filled += 1;
        } else {
            debug!("Label '{}' value '{}' not usable for {:?}", label, value, field);
        }
    }
    filled
}

/// Fill a missing area from the other one and keep `lot >= built`.
pub fn infer_areas(record: &mut ListingRecord) {
    match (record.built_area_m2, record.lot_area_m2) {
        (None, Some(lot)) if lot <= SMALL_LOT_MAX_M2 => {
            record.built_area_m2 = Some(lot * SMALL_LOT_BUILT_RATIO);
            debug!("Inferred built area from lot area {}", lot);
        }
        (Some(built), None) => {
            record.lot_area_m2 = Some(built * LOT_FROM_BUILT_RATIO);
            debug!("Inferred lot area from built area {}", built);
        }
        (Some(built), Some(lot)) if lot < built => {
            record.lot_area_m2 = Some(built);
            debug!("Raised lot area {} to built area {}", lot, built);
        }
        _ => {}
    }
}
