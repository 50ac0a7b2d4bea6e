//! # Domain Types
//!
//! Core domain types used throughout Landed.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT                        REFERENCE DATA          OUTPUT            │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐    │
//! │  │ShipmentParameters│   │  HtsRateRecord   │   │CalculationResult │    │
//! │  │ ──────────────── │   │ ──────────────── │   │ ──────────────── │    │
//! │  │ hts_code         │──►│ hts_code (key)   │──►│ cif_value        │    │
//! │  │ product_cost     │   │ description      │   │ duties[column]   │    │
//! │  │ freight          │   │ rates[column]    │   │ total_duty       │    │
//! │  │ insurance        │   └──────────────────┘   │ landed_cost      │    │
//! │  │ unit_weight      │                          │ warnings         │    │
//! │  │ quantity         │   ┌──────────────────┐   └──────────────────┘    │
//! │  └──────────────────┘   │   RateColumn     │                           │
//! │                         │ General          │   ┌──────────────────┐    │
//! │                         │ Special          │   │   ParsedRate     │    │
//! │                         │ Column2          │   │ fraction ≥ 0     │    │
//! │                         └──────────────────┘   │ notation         │    │
//! │                                                └──────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// HTS Code
// =============================================================================

/// A Harmonized Tariff Schedule number in canonical `DDDD.DD.DD.DD` form.
///
/// Construction validates the shape; lookups compare the canonical string
/// exactly (no prefix or fuzzy matching).
///
/// ```rust
/// use landed_core::types::HtsCode;
///
/// let code = HtsCode::parse("0102.21.00.00").unwrap();
/// assert_eq!(code.heading(), "0102");
/// assert_eq!(code.chapter(), "01");
/// assert!(HtsCode::parse("0102210000").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "String", into = "String")]
#[ts(export)]
pub struct HtsCode(String);

impl HtsCode {
    /// Group widths of the canonical form.
    const GROUPS: [usize; 4] = [4, 2, 2, 2];

    /// Parses a canonical HTS code. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let code = raw.trim();

        if code.is_empty() {
            return Err(ValidationError::Required {
                field: "hts_code".to_string(),
            });
        }

        let groups: Vec<&str> = code.split('.').collect();
        let well_formed = groups.len() == Self::GROUPS.len()
            && groups
                .iter()
                .zip(Self::GROUPS)
                .all(|(g, width)| g.len() == width && g.bytes().all(|b| b.is_ascii_digit()));

        if !well_formed {
            return Err(ValidationError::InvalidFormat {
                field: "hts_code".to_string(),
                reason: format!("expected DDDD.DD.DD.DD, got '{}'", code),
            });
        }

        Ok(HtsCode(code.to_string()))
    }

    /// The canonical string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-digit chapter (e.g. "01" for live animals).
    #[inline]
    pub fn chapter(&self) -> &str {
        &self.0[..2]
    }

    /// Four-digit heading (e.g. "0102" for live bovine animals).
    #[inline]
    pub fn heading(&self) -> &str {
        &self.0[..4]
    }

    /// Schedule section containing this code's chapter, if any.
    ///
    /// Chapters 98 and 99 (special classification provisions) belong to
    /// no section.
    pub fn section(&self) -> Option<HtsSection> {
        self.chapter().parse().ok().and_then(HtsSection::from_chapter)
    }
}

impl fmt::Display for HtsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HtsCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HtsCode::parse(s)
    }
}

impl TryFrom<String> for HtsCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HtsCode::parse(&value)
    }
}

impl From<HtsCode> for String {
    fn from(code: HtsCode) -> Self {
        code.0
    }
}

// =============================================================================
// HTS Section
// =============================================================================

/// One of the 21 sections (I-XXI) that group the schedule's chapters.
///
/// ```rust
/// use landed_core::types::{HtsCode, HtsSection};
///
/// let smartphones = HtsCode::parse("8517.12.00.50").unwrap();
/// let section = smartphones.section().unwrap();
/// assert_eq!(section.numeral(), "XVI");
/// assert_eq!(section.title(), "Machinery and Mechanical Appliances");
/// assert_eq!("xvi".parse::<HtsSection>().unwrap(), section);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "String", into = "String")]
#[ts(export)]
pub struct HtsSection(#[ts(type = "string")] u8);

impl HtsSection {
    /// (numeral, title, last chapter), in section order.
    const TABLE: [(&'static str, &'static str, u8); 21] = [
        ("I", "Live Animals; Animal Products", 5),
        ("II", "Vegetable Products", 14),
        ("III", "Animal or Vegetable Fats and Oils", 15),
        ("IV", "Prepared Foodstuffs; Beverages, Spirits and Vinegar", 24),
        ("V", "Mineral Products", 27),
        ("VI", "Products of the Chemical or Allied Industries", 38),
        ("VII", "Plastics and Articles Thereof; Rubber and Articles Thereof", 40),
        ("VIII", "Raw Hides and Skins, Leather, Furskins", 43),
        ("IX", "Wood and Articles of Wood", 46),
        ("X", "Pulp of Wood or Other Fibrous Cellulosic Material", 49),
        ("XI", "Textile and Textile Articles", 63),
        ("XII", "Footwear, Headgear, Umbrellas", 67),
        ("XIII", "Articles of Stone, Plaster, Cement", 70),
        ("XIV", "Natural or Cultured Pearls, Precious Stones", 71),
        ("XV", "Base Metals and Articles of Base Metal", 83),
        ("XVI", "Machinery and Mechanical Appliances", 85),
        ("XVII", "Vehicles, Aircraft, Vessels", 89),
        ("XVIII", "Optical, Photographic, Cinematographic Instruments", 92),
        ("XIX", "Arms and Ammunition", 93),
        ("XX", "Miscellaneous Manufactured Articles", 96),
        ("XXI", "Works of Art, Collectors Pieces", 97),
    ];

    /// Section for a chapter number (1-97).
    pub fn from_chapter(chapter: u8) -> Option<Self> {
        if chapter == 0 {
            return None;
        }
        Self::TABLE
            .iter()
            .position(|(_, _, last)| chapter <= *last)
            .map(|i| HtsSection(i as u8 + 1))
    }

    /// Section number, 1-21.
    #[inline]
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Roman numeral as printed in the schedule.
    pub fn numeral(&self) -> &'static str {
        Self::TABLE[usize::from(self.0 - 1)].0
    }

    pub fn title(&self) -> &'static str {
        Self::TABLE[usize::from(self.0 - 1)].1
    }
}

impl fmt::Display for HtsSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.numeral())
    }
}

impl FromStr for HtsSection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let numeral = s.trim().to_uppercase();
        Self::TABLE
            .iter()
            .position(|(n, _, _)| *n == numeral)
            .map(|i| HtsSection(i as u8 + 1))
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "section".to_string(),
                reason: format!("expected a numeral I-XXI, got '{}'", s.trim()),
            })
    }
}

impl TryFrom<String> for HtsSection {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HtsSection> for String {
    fn from(section: HtsSection) -> Self {
        section.numeral().to_string()
    }
}

/// Line count of one section in a stored schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SectionSummary {
    pub section: HtsSection,
    pub item_count: i64,
    /// Description of the section's lowest code.
    pub first_description: String,
}

// =============================================================================
// Rate Column
// =============================================================================

/// One of the published duty-rate columns of a tariff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RateColumn {
    /// Normal-trade-relations rate. Authoritative unless the caller claims a preference.
    #[default]
    General,
    /// Special / preferential programs (FTAs, GSP, ...).
    Special,
    /// Column 2: countries without normal trade relations.
    Column2,
}

impl RateColumn {
    /// All columns in schedule order.
    pub const ALL: [RateColumn; 3] = [RateColumn::General, RateColumn::Special, RateColumn::Column2];

    /// Heading as printed in the tariff schedule.
    pub fn label(&self) -> &'static str {
        match self {
            RateColumn::General => "General Rate of Duty",
            RateColumn::Special => "Special Rate of Duty",
            RateColumn::Column2 => "Column 2 Rate of Duty",
        }
    }
}

impl fmt::Display for RateColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateColumn::General => write!(f, "general"),
            RateColumn::Special => write!(f, "special"),
            RateColumn::Column2 => write!(f, "column2"),
        }
    }
}

impl FromStr for RateColumn {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" | "mfn" | "ntr" => Ok(RateColumn::General),
            "special" | "preferential" => Ok(RateColumn::Special),
            "column2" | "column_2" | "column 2" => Ok(RateColumn::Column2),
            _ => Err(ValidationError::NotAllowed {
                field: "rate_column".to_string(),
                allowed: RateColumn::ALL.iter().map(|c| c.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Shipment Parameters
// =============================================================================

/// Commercial values of one shipment. Built fresh per calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShipmentParameters {
    pub hts_code: HtsCode,
    pub product_cost: Money,
    pub freight: Money,
    pub insurance: Money,
    /// Shipment weight in kilograms, used by per-kilogram rates.
    pub unit_weight: f64,
    /// Number of units, used by per-unit rates.
    pub quantity: u32,
}

impl ShipmentParameters {
    /// Cost + insurance + freight. Exact; no rounding.
    #[inline]
    pub fn cif_value(&self) -> Money {
        self.product_cost + self.freight + self.insurance
    }
}

// =============================================================================
// HTS Rate Record
// =============================================================================

/// One tariff line: description plus the raw rate text of each column present.
///
/// Reference data. The calculator reads it and never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HtsRateRecord {
    pub hts_code: HtsCode,
    pub description: String,
    pub rates: BTreeMap<RateColumn, String>,
}

impl HtsRateRecord {
    /// Builds a record with all three columns, the shape of the published schedule.
    pub fn new(
        hts_code: HtsCode,
        description: impl Into<String>,
        general: impl Into<String>,
        special: impl Into<String>,
        column2: impl Into<String>,
    ) -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(RateColumn::General, general.into());
        rates.insert(RateColumn::Special, special.into());
        rates.insert(RateColumn::Column2, column2.into());

        HtsRateRecord {
            hts_code,
            description: description.into(),
            rates,
        }
    }

    /// Raw rate text for a column, if the column is present.
    pub fn rate(&self, column: RateColumn) -> Option<&str> {
        self.rates.get(&column).map(String::as_str)
    }
}

// =============================================================================
// Parsed Rate
// =============================================================================

/// Which notation a rate string was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RateNotation {
    /// Contains "free".
    Free,
    /// Percentage of CIF value ("2.5%").
    AdValorem,
    /// Cents per kilogram ("4.4¢/kg").
    PerKilogram,
    /// Dollars per unit ("$1.00/unit").
    PerUnit,
    /// Blank, unknown notation, or a specific rate missing its weight/quantity.
    /// The fraction is the 0.0 fallback, not a real free rate.
    Unrecognized,
}

/// A rate string converted to an ad-valorem-equivalent fraction of CIF value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParsedRate {
    /// duty / CIF for this shipment. Always finite and ≥ 0.
    pub fraction: f64,
    pub notation: RateNotation,
}

impl ParsedRate {
    /// The fallback for anything the parser can't interpret.
    pub const UNRECOGNIZED: ParsedRate = ParsedRate {
        fraction: 0.0,
        notation: RateNotation::Unrecognized,
    };

    /// False when the fraction is the 0.0 fallback.
    #[inline]
    pub fn is_recognized(&self) -> bool {
        self.notation != RateNotation::Unrecognized
    }

    /// The fraction as a percentage (display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.fraction * 100.0
    }
}

// =============================================================================
// Calculation Result
// =============================================================================

/// Duty for one rate column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DutyLine {
    /// Rate text exactly as published.
    pub rate_text: String,
    pub rate: ParsedRate,
    /// fraction × CIF, rounded to the cent.
    pub amount: Money,
}

/// Something a caller should surface next to the numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationWarning {
    /// The rate text didn't match any known notation and was treated as 0.
    UnrecognizedRate { column: RateColumn, rate_text: String },
    /// The record has no rate for the column chosen as the headline duty.
    MissingRateColumn { column: RateColumn },
}

/// Outcome of one landed-cost calculation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalculationResult {
    pub hts_code: HtsCode,
    pub description: String,
    pub product_cost: Money,
    pub freight: Money,
    pub insurance: Money,
    pub cif_value: Money,
    pub duties: BTreeMap<RateColumn, DutyLine>,
    /// Column whose amount became `total_duty`.
    pub applied_column: RateColumn,
    pub total_duty: Money,
    /// Always `cif_value + total_duty`.
    pub landed_cost: Money,
    pub warnings: Vec<CalculationWarning>,
}

impl CalculationResult {
    /// Duty line for a column, if the record had that column.
    pub fn duty(&self, column: RateColumn) -> Option<&DutyLine> {
        self.duties.get(&column)
    }

    /// True when every rate string was recognized and the headline column existed.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hts_code_parse() {
        let code = HtsCode::parse(" 0201.10.00.00 ").unwrap();
        assert_eq!(code.as_str(), "0201.10.00.00");
        assert_eq!(code.to_string(), "0201.10.00.00");

        assert!(HtsCode::parse("").is_err());
        assert!(HtsCode::parse("0201.10.00").is_err());
        assert!(HtsCode::parse("0201.10.00.0A").is_err());
        assert!(HtsCode::parse("201.10.00.00").is_err());
        assert!(HtsCode::parse("0201.10.00.00.00").is_err());
    }

    #[test]
    fn test_hts_code_serde_validates() {
        let code: HtsCode = serde_json::from_str("\"8471.30.01.00\"").unwrap();
        assert_eq!(code.heading(), "8471");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"8471.30.01.00\"");

        assert!(serde_json::from_str::<HtsCode>("\"8471\"").is_err());
    }

    #[test]
    fn test_section_from_chapter() {
        let section = |code: &str| HtsCode::parse(code).unwrap().section().map(|s| s.numeral());

        assert_eq!(section("0105.11.00.10"), Some("I"));
        assert_eq!(section("0201.10.00.00"), Some("I"));
        assert_eq!(section("0803.10.20.00"), Some("II"));
        assert_eq!(section("2804.40.00.00"), Some("VI"));
        assert_eq!(section("7201.10.00.00"), Some("XV"));
        assert_eq!(section("8471.30.01.00"), Some("XVI"));
        assert_eq!(section("9701.10.00.00"), Some("XXI"));

        assert_eq!(section("0000.00.00.00"), None);
        assert_eq!(section("9903.88.15.00"), None);
    }

    #[test]
    fn test_section_numeral_round_trip() {
        for chapter in 1..=97 {
            let section = HtsSection::from_chapter(chapter).unwrap();
            assert_eq!(section.numeral().parse::<HtsSection>().unwrap(), section);
        }
        assert_eq!(HtsSection::from_chapter(97).unwrap().number(), 21);
        assert!("XXII".parse::<HtsSection>().is_err());

        let json = serde_json::to_string(&HtsSection::from_chapter(72).unwrap()).unwrap();
        assert_eq!(json, "\"XV\"");
    }

    #[test]
    fn test_rate_column_parsing_and_order() {
        assert_eq!("general".parse::<RateColumn>().unwrap(), RateColumn::General);
        assert_eq!("Preferential".parse::<RateColumn>().unwrap(), RateColumn::Special);
        assert_eq!("column2".parse::<RateColumn>().unwrap(), RateColumn::Column2);
        assert!("column3".parse::<RateColumn>().is_err());

        assert!(RateColumn::General < RateColumn::Special);
        assert!(RateColumn::Special < RateColumn::Column2);
        assert_eq!(RateColumn::default(), RateColumn::General);
    }

    #[test]
    fn test_cif_value_is_exact_sum() {
        let shipment = ShipmentParameters {
            hts_code: HtsCode::parse("0101.30.00.00").unwrap(),
            product_cost: Money::from_dollars(10_000),
            freight: Money::from_dollars(500),
            insurance: Money::from_dollars(100),
            unit_weight: 500.0,
            quantity: 5,
        };
        assert_eq!(shipment.cif_value(), Money::from_dollars(10_600));
    }

    #[test]
    fn test_record_rate_lookup() {
        let record = HtsRateRecord::new(
            HtsCode::parse("0102.21.00.00").unwrap(),
            "Live cattle, purebred breeding animals",
            "2.5%",
            "Free",
            "5%",
        );
        assert_eq!(record.rate(RateColumn::General), Some("2.5%"));
        assert_eq!(record.rate(RateColumn::Column2), Some("5%"));
        assert_eq!(record.rates.len(), 3);
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let warning = CalculationWarning::UnrecognizedRate {
            column: RateColumn::Column2,
            rate_text: "$1.11/t".to_string(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "unrecognized_rate");
        assert_eq!(json["column"], "column2");
    }
}
