//! # Duty Calculator
//!
//! Composes CIF value, per-column duties and landed cost for one shipment.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ShipmentParameters                                                     │
//! │        │                                                                │
//! │        ├──► cif = cost + freight + insurance          (exact cents)     │
//! │        │                                                                │
//! │        ├──► RateTable::lookup(code) ──► None ──► HtsCodeNotFound        │
//! │        │                           └──► Err  ──► StoreUnavailable       │
//! │        ▼                                                                │
//! │  price_record()                                                         │
//! │        ├──► for each column present: rate::parse ──► fraction × cif     │
//! │        ├──► total_duty = duty of the headline column                    │
//! │        └──► landed_cost = cif + total_duty            (exact cents)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `calculate` is synchronous and holds no mutable state, so one calculator
//! can serve any number of threads as long as its table is `Send + Sync`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult, LookupError};
use crate::rate;
use crate::types::{
    CalculationResult, CalculationWarning, DutyLine, HtsCode, HtsRateRecord, RateColumn,
    RateNotation, ShipmentParameters,
};

/// Default number of nearby codes offered when a lookup misses.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

// =============================================================================
// Rate Table
// =============================================================================

/// Read-only access to tariff lines keyed by HTS code.
///
/// `Ok(None)` means the code is not in the schedule. `Err` means the table
/// itself could not answer.
pub trait RateTable: Send + Sync {
    /// Exact-match lookup.
    fn lookup(&self, code: &HtsCode) -> Result<Option<HtsRateRecord>, LookupError>;

    /// Known codes near `code`, at most `limit` of them.
    fn suggest(&self, _code: &HtsCode, _limit: usize) -> Vec<HtsCode> {
        Vec::new()
    }
}

impl<T: RateTable + ?Sized> RateTable for Arc<T> {
    fn lookup(&self, code: &HtsCode) -> Result<Option<HtsRateRecord>, LookupError> {
        (**self).lookup(code)
    }

    fn suggest(&self, code: &HtsCode, limit: usize) -> Vec<HtsCode> {
        (**self).suggest(code, limit)
    }
}

impl<T: RateTable + ?Sized> RateTable for &T {
    fn lookup(&self, code: &HtsCode) -> Result<Option<HtsRateRecord>, LookupError> {
        (**self).lookup(code)
    }

    fn suggest(&self, code: &HtsCode, limit: usize) -> Vec<HtsCode> {
        (**self).suggest(code, limit)
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Calculator settings, built once at startup and passed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Column whose duty becomes `total_duty`.
    pub headline_column: RateColumn,
    /// Cap on suggestions attached to a not-found error.
    pub suggestion_limit: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        CalculatorConfig {
            headline_column: RateColumn::General,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Landed-cost calculator over a [`RateTable`].
///
/// ## Example
/// ```rust
/// use landed_core::calculator::{CalculatorConfig, DutyCalculator};
/// use landed_core::money::Money;
/// use landed_core::schedule::RateSchedule;
/// use landed_core::types::{HtsCode, ShipmentParameters};
///
/// let calculator = DutyCalculator::new(RateSchedule::sample(), CalculatorConfig::default());
///
/// let result = calculator
///     .calculate(&ShipmentParameters {
///         hts_code: HtsCode::parse("0102.21.00.00").unwrap(),
///         product_cost: Money::from_dollars(5_000),
///         freight: Money::from_dollars(250),
///         insurance: Money::from_dollars(50),
///         unit_weight: 500.0,
///         quantity: 5,
///     })
///     .unwrap();
///
/// assert_eq!(result.total_duty.to_string(), "$132.50");
/// assert_eq!(result.landed_cost.to_string(), "$5,432.50");
/// ```
#[derive(Debug, Clone)]
pub struct DutyCalculator<T> {
    table: T,
    config: CalculatorConfig,
}

impl<T: RateTable> DutyCalculator<T> {
    pub fn new(table: T, config: CalculatorConfig) -> Self {
        DutyCalculator { table, config }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    /// Calculates with the configured headline column.
    pub fn calculate(&self, shipment: &ShipmentParameters) -> CoreResult<CalculationResult> {
        self.calculate_with_column(shipment, self.config.headline_column)
    }

    /// Calculates with an explicit headline column, e.g. `Special` once the
    /// caller has established preference-program eligibility.
    pub fn calculate_with_column(
        &self,
        shipment: &ShipmentParameters,
        column: RateColumn,
    ) -> CoreResult<CalculationResult> {
        let code = &shipment.hts_code;
        debug!(hts_code = %code, column = %column, "Looking up rate record");

        let record = match self.table.lookup(code)? {
            Some(record) => record,
            None => {
                let suggestions = self.table.suggest(code, self.config.suggestion_limit);
                debug!(hts_code = %code, suggestions = suggestions.len(), "HTS code not found");
                return Err(CoreError::HtsCodeNotFound {
                    code: code.clone(),
                    suggestions,
                });
            }
        };

        Ok(price_record(shipment, &record, column))
    }
}

/// Prices a shipment against an already-fetched record.
///
/// Pure; performs no lookup. Collaborators that fetch records themselves
/// (e.g. asynchronously) call this directly.
pub fn price_record(
    shipment: &ShipmentParameters,
    record: &HtsRateRecord,
    column: RateColumn,
) -> CalculationResult {
    let cif_value = shipment.cif_value();
    let mut warnings = Vec::new();
    let mut duties = BTreeMap::new();

    for (&rate_column, rate_text) in &record.rates {
        let rate = rate::parse(
            rate_text,
            Some(shipment.unit_weight),
            Some(shipment.quantity),
            cif_value,
        );

        if rate.notation == RateNotation::Unrecognized {
            warn!(
                hts_code = %record.hts_code,
                column = %rate_column,
                rate_text = %rate_text,
                "Unrecognized rate, treated as zero"
            );
            warnings.push(CalculationWarning::UnrecognizedRate {
                column: rate_column,
                rate_text: rate_text.clone(),
            });
        }

        duties.insert(
            rate_column,
            DutyLine {
                rate_text: rate_text.clone(),
                rate,
                amount: cif_value.apply_fraction(rate.fraction),
            },
        );
    }

    let total_duty = match duties.get(&column) {
        Some(line) => line.amount,
        None => {
            warn!(hts_code = %record.hts_code, column = %column, "Headline rate column missing");
            warnings.push(CalculationWarning::MissingRateColumn { column });
            Default::default()
        }
    };

    CalculationResult {
        hts_code: record.hts_code.clone(),
        description: record.description.clone(),
        product_cost: shipment.product_cost,
        freight: shipment.freight,
        insurance: shipment.insurance,
        cif_value,
        duties,
        applied_column: column,
        total_duty,
        landed_cost: cif_value + total_duty,
        warnings,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::schedule::RateSchedule;

    fn code(s: &str) -> HtsCode {
        HtsCode::parse(s).unwrap()
    }

    fn shipment(hts: &str, cost: i64, freight: i64, insurance: i64, weight: f64) -> ShipmentParameters {
        ShipmentParameters {
            hts_code: code(hts),
            product_cost: Money::from_dollars(cost),
            freight: Money::from_dollars(freight),
            insurance: Money::from_dollars(insurance),
            unit_weight: weight,
            quantity: 5,
        }
    }

    fn calculator() -> DutyCalculator<RateSchedule> {
        DutyCalculator::new(RateSchedule::sample(), CalculatorConfig::default())
    }

    struct UnavailableTable;

    impl RateTable for UnavailableTable {
        fn lookup(&self, _code: &HtsCode) -> Result<Option<HtsRateRecord>, LookupError> {
            Err(LookupError::new("sqlite", "unable to open database file"))
        }
    }

    #[test]
    fn test_free_rate_scenario() {
        let result = calculator()
            .calculate(&shipment("0101.30.00.00", 10_000, 500, 100, 500.0))
            .unwrap();

        assert_eq!(result.cif_value, Money::from_dollars(10_600));
        assert_eq!(result.total_duty, Money::zero());
        assert_eq!(result.landed_cost.to_string(), "$10,600.00");
        assert_eq!(result.description, "Live asses");
        assert!(result.is_clean());
    }

    #[test]
    fn test_ad_valorem_scenario() {
        let result = calculator()
            .calculate(&shipment("0102.21.00.00", 5_000, 250, 50, 500.0))
            .unwrap();

        assert_eq!(result.cif_value, Money::from_dollars(5_300));
        assert_eq!(result.total_duty, Money::from_major_minor(132, 50));
        assert_eq!(result.landed_cost, Money::from_major_minor(5_432, 50));
        assert_eq!(result.applied_column, RateColumn::General);

        // Every present column is priced, not just the headline.
        let column2 = result.duty(RateColumn::Column2).unwrap();
        assert_eq!(column2.rate_text, "5%");
        assert_eq!(column2.amount, Money::from_dollars(265));
        assert_eq!(result.duty(RateColumn::Special).unwrap().amount, Money::zero());
    }

    #[test]
    fn test_per_kilogram_scenario() {
        let result = calculator()
            .calculate(&shipment("0201.10.00.00", 8_000, 400, 80, 500.0))
            .unwrap();

        assert_eq!(result.cif_value, Money::from_dollars(8_480));
        assert_eq!(result.total_duty, Money::from_dollars(22));
        assert_eq!(result.landed_cost, Money::from_dollars(8_502));

        let general = result.duty(RateColumn::General).unwrap();
        assert_eq!(general.rate.notation, RateNotation::PerKilogram);
    }

    #[test]
    fn test_unknown_code_returns_suggestions() {
        let err = calculator()
            .calculate(&shipment("0102.29.00.00", 100, 0, 0, 1.0))
            .unwrap_err();

        match err {
            CoreError::HtsCodeNotFound { code: missing, suggestions } => {
                assert_eq!(missing, code("0102.29.00.00"));
                assert_eq!(suggestions.first(), Some(&code("0102.21.00.00")));
                assert!(suggestions.len() <= DEFAULT_SUGGESTION_LIMIT);
            }
            other => panic!("expected HtsCodeNotFound, got {other:?}"),
        }

        let err = calculator()
            .calculate(&shipment("9999.99.99.99", 100, 0, 0, 1.0))
            .unwrap_err();
        assert_eq!(err.to_string(), "No data found for HTS code 9999.99.99.99");
    }

    #[test]
    fn test_store_failure_is_not_not_found() {
        let calculator = DutyCalculator::new(UnavailableTable, CalculatorConfig::default());
        let err = calculator
            .calculate(&shipment("0101.30.00.00", 100, 0, 0, 1.0))
            .unwrap_err();

        assert!(matches!(err, CoreError::StoreUnavailable(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_landed_cost_is_cif_plus_duty() {
        let calculator = calculator();
        for record in calculator.table().records() {
            let hts = record.hts_code.as_str().to_string();
            let result = calculator
                .calculate(&shipment(&hts, 1_234, 56, 7, 42.5))
                .unwrap();
            assert_eq!(result.landed_cost, result.cif_value + result.total_duty, "{hts}");
            assert!(!result.total_duty.is_negative());
        }
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let calculator = calculator();
        let input = shipment("0201.10.00.00", 8_000, 400, 80, 500.0);
        assert_eq!(calculator.calculate(&input).unwrap(), calculator.calculate(&input).unwrap());
    }

    #[test]
    fn test_ad_valorem_duty_is_monotonic_in_cif() {
        let calculator = calculator();
        let mut previous: Option<CalculationResult> = None;
        for cost in (0..=20_000).step_by(997) {
            // Sodium, general rate 5.3%
            let result = calculator
                .calculate(&shipment("2805.11.00.00", cost, 125, 15, 10.0))
                .unwrap();
            if let Some(prev) = &previous {
                assert!(result.cif_value > prev.cif_value, "cost = {cost}");
                assert!(result.total_duty > prev.total_duty, "cost = {cost}");
                assert!(result.landed_cost > prev.landed_cost, "cost = {cost}");
            }
            previous = Some(result);
        }
    }

    #[test]
    fn test_per_kilogram_duty_is_constant_in_cif() {
        let calculator = calculator();
        let mut previous: Option<CalculationResult> = None;
        for cost in (0..=20_000).step_by(997) {
            // Beef, general rate 4.4¢/kg on 500 kg
            let result = calculator
                .calculate(&shipment("0201.10.00.00", cost, 125, 15, 500.0))
                .unwrap();
            assert_eq!(result.total_duty, Money::from_dollars(22), "cost = {cost}");
            if let Some(prev) = &previous {
                assert!(result.cif_value > prev.cif_value, "cost = {cost}");
                assert!(result.landed_cost > prev.landed_cost, "cost = {cost}");
            }
            previous = Some(result);
        }
    }

    #[test]
    fn test_extreme_amounts_saturate_instead_of_panicking() {
        let record = HtsRateRecord::new(code("2805.11.00.00"), "Sodium", "5.3%", "Free", "41%");
        let input = ShipmentParameters {
            hts_code: code("2805.11.00.00"),
            product_cost: Money::from_cents(i64::MAX),
            freight: Money::from_dollars(125),
            insurance: Money::from_dollars(15),
            unit_weight: 10.0,
            quantity: 5,
        };

        let result = price_record(&input, &record, RateColumn::General);
        assert_eq!(result.cif_value, Money::from_cents(i64::MAX));
        assert_eq!(result.landed_cost, Money::from_cents(i64::MAX));
        assert!(result.total_duty > Money::zero());
    }

    #[test]
    fn test_preferential_column_headline() {
        let input = shipment("0102.21.00.00", 5_000, 250, 50, 500.0);

        let result = calculator()
            .calculate_with_column(&input, RateColumn::Special)
            .unwrap();
        assert_eq!(result.applied_column, RateColumn::Special);
        assert_eq!(result.total_duty, Money::zero());
        assert_eq!(result.landed_cost, result.cif_value);

        let config = CalculatorConfig {
            headline_column: RateColumn::Column2,
            ..CalculatorConfig::default()
        };
        let result = DutyCalculator::new(RateSchedule::sample(), config)
            .calculate(&input)
            .unwrap();
        assert_eq!(result.total_duty, Money::from_dollars(265));
    }

    #[test]
    fn test_missing_headline_column_warns() {
        let mut record = HtsRateRecord::new(code("2804.40.00.00"), "Oxygen", "3.7%", "Free", "25%");
        record.rates.remove(&RateColumn::General);

        let result = price_record(
            &shipment("2804.40.00.00", 1_000, 0, 0, 1.0),
            &record,
            RateColumn::General,
        );

        assert_eq!(result.total_duty, Money::zero());
        assert_eq!(result.landed_cost, result.cif_value);
        assert_eq!(
            result.warnings,
            vec![CalculationWarning::MissingRateColumn {
                column: RateColumn::General
            }]
        );
        assert_eq!(result.duties.len(), 2);
    }

    #[test]
    fn test_unrecognized_rate_warns_without_failing() {
        // "$1.11/t" is the column 2 rate of pig iron.
        let result = calculator()
            .calculate(&shipment("7201.10.00.00", 1_000, 0, 0, 1_000.0))
            .unwrap();

        assert_eq!(result.total_duty, Money::zero());
        assert_eq!(
            result.warnings,
            vec![CalculationWarning::UnrecognizedRate {
                column: RateColumn::Column2,
                rate_text: "$1.11/t".to_string(),
            }]
        );
        assert!(!result.duty(RateColumn::Column2).unwrap().rate.is_recognized());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: CalculatorConfig = serde_json::from_str(r#"{"headline_column":"special"}"#).unwrap();
        assert_eq!(config.headline_column, RateColumn::Special);
        assert_eq!(config.suggestion_limit, DEFAULT_SUGGESTION_LIMIT);
    }
}
