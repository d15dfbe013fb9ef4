//! Regex tiers over free text
//!
//! When the attribute tables leave physical fields open, the listing's own
//! description is searched with context-aware patterns, and after that a
//! backup text (description-like blocks or the visible page) is searched
//! with broader label/number patterns. Fields already set are never touched.

use regex::Regex;
use tracing::debug;

use super::error::{ExtractionError, ExtractionResult};
use super::numeric::{Numeric, parse_numeric};
use crate::domain::listing::{ListingRecord, fill_missing};

const BEDROOM: &str = r"(?:recámaras?|recamaras?|habitaci[oó]n(?:es)?|dormitorios?)";
const BATHROOM: &str = r"(?:baños?|banos?|sanitarios?|wc)";
const PARKING: &str = r"(?:estacionamientos?|garages?|cocheras?|cajon(?:es)?|cajón)";
const PARKING_MENTION: &str = r"(?:estacionamiento|garage|cochera|cajón)";
const AREA_UNIT: &str = r"(?:m²|m2|mts2?\.?|metros?(?:\s+cuadrados)?)";
const INTEGER: &str = r"(\d+)";
const NUMBER: &str = r"(\d+(?:[.,]\d+)?(?:\s*½)?)";
const SUBJECT: &str = r"(?:casa|propiedad|inmueble|departamento|residencia)";

/// Physical listing fields the text tiers can fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalField {
    Bedrooms,
    Bathrooms,
    BuiltArea,
    LotArea,
    Parking,
}

impl PhysicalField {
    pub const ALL: [Self; 5] = [
        Self::Bedrooms,
        Self::Bathrooms,
        Self::BuiltArea,
        Self::LotArea,
        Self::Parking,
    ];

    /// Keyword match against an attribute label such as "Superficie construida"
    pub fn matches_label(self, label: &str) -> bool {
        let label = label.to_lowercase();
        let keywords: &[&str] = match self {
            Self::Bedrooms => &["recámara", "recamara"],
            Self::Bathrooms => &["baño", "bano"],
            Self::BuiltArea => &["superficie construida", "construida"],
            Self::LotArea => &["superficie total", "terreno"],
            Self::Parking => &["estacionamiento", "garage", "cochera"],
        };
        keywords.iter().any(|keyword| label.contains(keyword))
    }

    pub const fn is_set(self, record: &ListingRecord) -> bool {
        match self {
            Self::Bedrooms => record.bedrooms.is_some(),
            Self::Bathrooms => record.bathrooms.is_some(),
            Self::BuiltArea => record.built_area_m2.is_some(),
            Self::LotArea => record.lot_area_m2.is_some(),
            Self::Parking => record.parking_spaces.is_some(),
        }
    }

    /// Store `value` if the field is still empty and the value fits the field.
    pub fn fill(self, record: &mut ListingRecord, value: Numeric) -> bool {
        match self {
            Self::Bedrooms => fill_missing(&mut record.bedrooms, value.as_count()),
            Self::Bathrooms => fill_missing(&mut record.bathrooms, value.as_quantity()),
            Self::BuiltArea => fill_missing(&mut record.built_area_m2, value.as_area()),
            Self::LotArea => fill_missing(&mut record.lot_area_m2, value.as_area()),
            Self::Parking => fill_missing(&mut record.parking_spaces, value.as_count()),
        }
    }
}

/// An ordered set of patterns per field; the first pattern yielding a value wins.
pub struct PatternTier {
    name: &'static str,
    rules: Vec<(PhysicalField, Vec<Regex>)>,
}

impl PatternTier {
    fn compile(
        name: &'static str,
        sources: Vec<(PhysicalField, Vec<String>)>,
    ) -> ExtractionResult<Self> {
        let mut rules = Vec::with_capacity(sources.len());
        for (field, patterns) in sources {
            let compiled = patterns
                .iter()
                .map(|pattern| {
                    Regex::new(&format!("(?i){pattern}")).map_err(|e| {
                        ExtractionError::configuration(format!(
                            "{name} pattern for {field:?} failed to compile: {e}"
                        ))
                    })
                })
                .collect::<ExtractionResult<Vec<_>>>()?;
            rules.push((field, compiled));
        }
        Ok(Self { name, rules })
    }

    /// Patterns tuned for listing descriptions ("casa de 3 recámaras", "2½ baños")
    pub fn description() -> ExtractionResult<Self> {
        Self::compile(
            "description",
            vec![
                (
                    PhysicalField::Bedrooms,
                    vec![
                        format!(r"{INTEGER}\s*y\s*{INTEGER}\s*{BEDROOM}"),
                        format!(r"{SUBJECT}\s+(?:de|con)\s+{INTEGER}\s*{BEDROOM}"),
                        format!(r"{INTEGER}\s*{BEDROOM}"),
                        format!(r"{BEDROOM}\s*[:\-]?\s*{INTEGER}"),
                    ],
                ),
                (
                    PhysicalField::Bathrooms,
                    vec![
                        format!(r"{SUBJECT}\s+(?:de|con)\s+{NUMBER}\s*{BATHROOM}"),
                        format!(r"{NUMBER}\s*{BATHROOM}"),
                        format!(r"{BATHROOM}\s*[:\-]?\s*{NUMBER}"),
                    ],
                ),
                (
                    PhysicalField::BuiltArea,
                    vec![
                        format!(
                            r"(?:superficie|área|area)\s+(?:construida|de\s+construcci[oó]n)\s*(?:de\s*)?[:\-]?\s*{NUMBER}\s*{AREA_UNIT}?"
                        ),
                        format!(r"construcci[oó]n\s*(?:de\s*)?[:\-]?\s*{NUMBER}\s*{AREA_UNIT}"),
                        format!(r"{NUMBER}\s*{AREA_UNIT}\s*(?:de\s*)?(?:construcci[oó]n|construidos?)"),
                    ],
                ),
                (
                    PhysicalField::LotArea,
                    vec![
                        format!(r"(?:superficie\s+total|terreno|lote)\s*(?:de\s*)?[:\-]?\s*{NUMBER}\s*{AREA_UNIT}"),
                        format!(r"{NUMBER}\s*{AREA_UNIT}\s*(?:de\s*)?(?:terreno|lote|superficie)"),
                    ],
                ),
                (
                    PhysicalField::Parking,
                    vec![
                        format!(r"{INTEGER}\s*(?:lugares?\s+de\s+)?{PARKING}"),
                        format!(r"{PARKING}\s*(?:para\s*)?[:\-]?\s*{INTEGER}"),
                        PARKING_MENTION.to_string(),
                    ],
                ),
            ],
        )
    }

    /// Broad label/number patterns for arbitrary page text
    pub fn general() -> ExtractionResult<Self> {
        Self::compile(
            "general",
            vec![
                (
                    PhysicalField::Bedrooms,
                    vec![
                        format!(r"{BEDROOM}\s*[:\-]?\s*{INTEGER}"),
                        format!(r"{INTEGER}\s*{BEDROOM}"),
                        format!(r"{INTEGER}\s*(?:rec|hab|dorm)\b"),
                    ],
                ),
                (
                    PhysicalField::Bathrooms,
                    vec![
                        format!(r"{BATHROOM}\s*[:\-]?\s*{NUMBER}"),
                        format!(r"{NUMBER}\s*{BATHROOM}"),
                    ],
                ),
                (
                    PhysicalField::BuiltArea,
                    vec![
                        format!(
                            r"(?:superficie\s+construida|construcci[oó]n|construidos?)\s*[:\-]?\s*{NUMBER}\s*{AREA_UNIT}?"
                        ),
                        format!(r"{NUMBER}\s*{AREA_UNIT}\s*(?:de\s*)?(?:construcci[oó]n|construidos?)"),
                    ],
                ),
                (
                    PhysicalField::LotArea,
                    vec![
                        format!(r"(?:superficie\s+total|terreno|lote)\s*[:\-]?\s*{NUMBER}\s*{AREA_UNIT}?"),
                        format!(r"{NUMBER}\s*{AREA_UNIT}\s*(?:de\s*)?(?:terreno|lote)"),
                    ],
                ),
                (
                    PhysicalField::Parking,
                    vec![
                        format!(r"{PARKING}\s*[:\-]?\s*{INTEGER}"),
                        format!(r"{INTEGER}\s*{PARKING}"),
                        PARKING_MENTION.to_string(),
                    ],
                ),
            ],
        )
    }

    /// Fill every still-empty physical field that a pattern finds in `text`.
    ///
    /// Returns the number of fields filled.
    pub fn fill_missing(&self, text: &str, record: &mut ListingRecord) -> usize {
        let text = text.to_lowercase();
        let mut filled = 0;

        for (field, patterns) in &self.rules {
            if field.is_set(record) {
                continue;
            }
            for pattern in patterns {
                let Some(value) = first_value(pattern, &text) else {
                    continue;
                };
                if field.fill(record, value) {
                    debug!("{} tier filled {:?} with {:?}", self.name, field, value);
                    filled += 1;
                    break;
                }
            }
        }

        filled
    }
}

/// Largest number captured by the first match; a pattern with no groups counts as one.
fn first_value(pattern: &Regex, text: &str) -> Option<Numeric> {
    let captures = pattern.captures(text)?;
    if captures.len() == 1 {
        return Some(Numeric::Integer(1));
    }
    captures
        .iter()
        .skip(1)
        .flatten()
        .filter_map(|m| parse_numeric(m.as_str()))
        .max_by(|a, b| a.as_f64().total_cmp(&b.as_f64()))
}
