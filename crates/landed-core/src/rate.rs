//! # Duty Rate Parser
//!
//! Turns the free-text rate of a tariff column into a fraction of CIF value.
//!
//! ## Recognized Notations (first match wins)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input (trimmed, lowercased)      Notation        Fraction              │
//! │  ─────────────────────────────    ─────────────   ───────────────────── │
//! │  "...free..."                     Free            0                     │
//! │  "2.5%"                           AdValorem       2.5 / 100             │
//! │  "4.4¢/kg"     (needs weight)     PerKilogram     4.4 × kg / (100×CIF)  │
//! │  "$1.00/unit"  (needs quantity)   PerUnit         1.00 × qty / CIF      │
//! │  "", "0.9¢ each", "$1.11/t", ...  Unrecognized    0                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Compound rates such as `"6.4% + 1.2¢/kg"` resolve to their first
//! matching notation in the order above.
//!
//! The parser is total: it never fails. When nothing matches, the result is
//! [`ParsedRate::UNRECOGNIZED`], which callers can tell apart from a genuine
//! `Free` through [`ParsedRate::is_recognized`].

use regex::Regex;
use std::sync::LazyLock;

use crate::money::Money;
use crate::types::{ParsedRate, RateNotation};

const DECIMAL: &str = r"(\d+(?:\.\d*)?|\.\d+)";

static AD_VALOREM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{DECIMAL}\s*%")).expect("ad valorem pattern"));

static PER_KILOGRAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{DECIMAL}\s*¢/kg")).expect("per-kilogram pattern"));

static PER_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\${DECIMAL}/unit")).expect("per-unit pattern"));

/// Parses one rate string for a specific shipment.
///
/// ## Arguments
/// * `rate_text` - Rate as published ("Free", "2.5%", "4.4¢/kg", "$1.00/unit")
/// * `unit_weight` - Shipment weight in kg; required by per-kilogram rates
/// * `quantity` - Unit count; required by per-unit rates
/// * `cif_value` - Denominator for specific rates
///
/// ## Example
/// ```rust
/// use landed_core::money::Money;
/// use landed_core::rate::parse;
/// use landed_core::types::RateNotation;
///
/// let cif = Money::from_dollars(10_600);
///
/// let rate = parse("2.5¢/kg", Some(500.0), None, cif);
/// assert_eq!(rate.notation, RateNotation::PerKilogram);
/// assert_eq!(rate.fraction, (2.5 * 500.0) / (100.0 * 10_600.0));
///
/// let rate = parse("see note 3", Some(500.0), Some(5), cif);
/// assert!(!rate.is_recognized());
/// assert_eq!(rate.fraction, 0.0);
/// ```
pub fn parse(
    rate_text: &str,
    unit_weight: Option<f64>,
    quantity: Option<u32>,
    cif_value: Money,
) -> ParsedRate {
    let text = rate_text.trim().to_lowercase();
    if text.is_empty() {
        return ParsedRate::UNRECOGNIZED;
    }

    if text.contains("free") {
        return ParsedRate {
            fraction: 0.0,
            notation: RateNotation::Free,
        };
    }

    if let Some(percent) = capture_decimal(&AD_VALOREM, &text) {
        return recognized(percent / 100.0, RateNotation::AdValorem);
    }

    let cif_dollars = cif_value.to_dollars_f64();

    if let (Some(cents_per_kg), Some(weight)) = (capture_decimal(&PER_KILOGRAM, &text), unit_weight) {
        return recognized(
            (cents_per_kg * weight) / (100.0 * cif_dollars),
            RateNotation::PerKilogram,
        );
    }

    if let (Some(dollars_per_unit), Some(qty)) = (capture_decimal(&PER_UNIT, &text), quantity) {
        return recognized(
            (dollars_per_unit * f64::from(qty)) / cif_dollars,
            RateNotation::PerUnit,
        );
    }

    ParsedRate::UNRECOGNIZED
}

/// First decimal captured by `pattern`, if any.
fn capture_decimal(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Keeps `fraction ≥ 0` and finite. A zero or negative CIF makes specific
/// rates degenerate; they collapse to 0 but keep their notation.
fn recognized(fraction: f64, notation: RateNotation) -> ParsedRate {
    let fraction = if fraction.is_finite() && fraction > 0.0 {
        fraction
    } else {
        0.0
    };
    ParsedRate { fraction, notation }
}

// =============================================================================
// Unit Tests
// =============================================================================
