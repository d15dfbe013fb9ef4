//! Locale-tolerant number parsing for listing text
//!
//! Mexican listings mix "2,550,000", "131.5", "2.550.000" and "2½" freely.
//! These helpers never panic and answer `None` for anything unparseable.

use serde::{Deserialize, Serialize};

const HALF_GLYPH: char = '½';

/// A parsed number, kept integral when the text was integral
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Integer(i64),
    Decimal(f64),
}

impl Numeric {
    fn from_f64(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < 9.0e15 {
            Self::Integer(value as i64)
        } else {
            Self::Decimal(value)
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(value) => value as f64,
            Self::Decimal(value) => value,
        }
    }

    /// Non-negative whole count (bedrooms, parking). Decimals are truncated.
    pub fn as_count(self) -> Option<u32> {
        match self {
            Self::Integer(value) => u32::try_from(value).ok(),
            Self::Decimal(value) if value >= 0.0 && value < f64::from(u32::MAX) => {
                Some(value.trunc() as u32)
            }
            Self::Decimal(_) => None,
        }
    }

    /// Strictly positive area in square meters
    pub fn as_area(self) -> Option<f64> {
        let value = self.as_f64();
        (value > 0.0).then_some(value)
    }

    /// Non-negative decimal quantity (bathrooms)
    pub fn as_quantity(self) -> Option<f64> {
        let value = self.as_f64();
        (value >= 0.0).then_some(value)
    }
}

/// Parse a number out of free text.
///
/// Only digits, commas and periods are kept. A lone comma is a decimal
/// separator; repeated commas or periods are thousands grouping; with both
/// present the commas group thousands and the period is decimal. A `½`
/// after an integer adds one half.
pub fn parse_numeric(text: &str) -> Option<Numeric> {
    if text.contains(HALF_GLYPH) {
        return parse_half_units(text).map(Numeric::Decimal);
    }

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let commas = cleaned.matches(',').count();
    let periods = cleaned.matches('.').count();
    let normalized = match (commas, periods) {
        (1, 0) => cleaned.replace(',', "."),
        (0, 2..) => cleaned.replace('.', ""),
        (1.., _) => cleaned.replace(',', ""),
        (0, _) => cleaned,
    };

    let value: f64 = normalized.parse().ok()?;
    value.is_finite().then(|| Numeric::from_f64(value))
}

/// "2½" and "2 ½" -> 2.5, "½" -> 0.5
fn parse_half_units(text: &str) -> Option<f64> {
    let glyph_at = text.find(HALF_GLYPH)?;
    let before = text[..glyph_at].trim_end();
    let digits: String = before
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let whole = if digits.is_empty() {
        0.0
    } else {
        digits.parse::<f64>().ok()?
    };
    Some(whole + 0.5)
}

/// Parse the first number in a value cell, ignoring trailing units ("180 m2").
pub fn parse_quantity(text: &str) -> Option<Numeric> {
    let start = text.find(|c: char| c.is_ascii_digit() || c == HALF_GLYPH)?;
    let mut end = text[start..]
        .find(|c: char| !(c.is_ascii_digit() || c == ',' || c == '.' || c == HALF_GLYPH))
        .map_or(text.len(), |offset| start + offset);
    // "2 ½"
    let rest = text[end..].trim_start();
    if rest.starts_with(HALF_GLYPH) {
        end = text.len() - rest.len() + HALF_GLYPH.len_utf8();
    }
    parse_numeric(&text[start..end])
}

/// Price fractions carry the integer amount with grouping separators only.
pub fn parse_price(text: &str) -> Option<f64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok().filter(|value| value.is_finite())
}
