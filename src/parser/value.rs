//! Numeric value and unit extraction
//!
//! Ordered regex cascade: explicit percent, explicit degree, preposition
//! plus number with unit inference from the numeric range, bare number as
//! last resort. The range heuristic (31-100 percent, 5-30 degree) is a
//! known imprecision at the boundaries ("stelle auf 28" reads as degrees
//! even when percent was meant).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Unit attached to an extracted numeric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Percent (levels, dimmers, blinds)
    Percent,
    /// Degrees (temperatures)
    Degree,
}

/// A numeric value extracted from the utterance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractedValue {
    /// The parsed number
    pub value: f64,
    /// Unit, if stated explicitly or inferred from the range
    pub unit: Option<Unit>,
}

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*(?:%|prozent)").expect("valid regex"));

static DEGREE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*(?:°|grad)").expect("valid regex"));

static PREPOSITION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:auf|um|zu)\s+(\d+(?:[.,]\d+)?)").expect("valid regex"));

static BARE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)").expect("valid regex"));

/// Extract a numeric value with unit from lowercased text
///
/// Returns `None` when no number is present or the match does not parse;
/// a missing value never aborts intent construction, the caller simply
/// proceeds without one.
pub fn extract_value(text: &str) -> Option<ExtractedValue> {
    if let Some(value) = capture_number(&PERCENT_RE, text) {
        return Some(ExtractedValue {
            value,
            unit: Some(Unit::Percent),
        });
    }

    if let Some(value) = capture_number(&DEGREE_RE, text) {
        return Some(ExtractedValue {
            value,
            unit: Some(Unit::Degree),
        });
    }

    if let Some(value) = capture_number(&PREPOSITION_RE, text) {
        return Some(ExtractedValue {
            value,
            unit: infer_unit_from_range(value),
        });
    }

    capture_number(&BARE_NUMBER_RE, text).map(|value| ExtractedValue { value, unit: None })
}

/// Range-based unit guess: 31-100 reads as percent, 5-30 as degrees
///
/// Values like 4 or 101 stay unitless.
fn infer_unit_from_range(value: f64) -> Option<Unit> {
    if (31.0..=100.0).contains(&value) {
        Some(Unit::Percent)
    } else if (5.0..=30.0).contains(&value) {
        Some(Unit::Degree)
    } else {
        None
    }
}

fn capture_number(re: &Regex, text: &str) -> Option<f64> {
    let captures = re.captures(text)?;
    let raw = captures.get(1)?.as_str().replace(',', ".");
    raw.parse::<f64>().ok()
}

impl Unit {
    /// German suffix used in confirmations
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Percent => " Prozent",
            Unit::Degree => " Grad",
        }
    }
}
