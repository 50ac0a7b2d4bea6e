//! # Landed-Cost Service
//!
//! Runs calculations against the SQLite schedule.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculate(shipment)                                                    │
//! │       │                                                                 │
//! │       ├──► validate_shipment ───────── Err ──► CoreError::Validation    │
//! │       │                                                                 │
//! │       ├──► repo.get_by_code ────────── Err ──► CoreError::StoreUnavailable
//! │       │          │                                                      │
//! │       │          └── None ──► repo.suggest_codes ──► HtsCodeNotFound    │
//! │       ▼                                                                 │
//! │  landed_core::price_record(shipment, record, column)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One record read per calculation. No state is shared between calls
//! beyond the pool.

use tracing::debug;

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::hts::HtsRateRepository;
use landed_core::validation::validate_shipment;
use landed_core::{
    price_record, CalculationResult, CalculatorConfig, CoreError, CoreResult, LookupError,
    RateColumn, ShipmentParameters,
};

/// Async landed-cost calculator backed by SQLite.
#[derive(Debug, Clone)]
pub struct LandedCostService {
    rates: HtsRateRepository,
    config: CalculatorConfig,
}

impl LandedCostService {
    pub fn new(db: &Database, config: CalculatorConfig) -> Self {
        LandedCostService {
            rates: db.hts_rates(),
            config,
        }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Calculates with the configured headline column.
    pub async fn calculate(&self, shipment: &ShipmentParameters) -> CoreResult<CalculationResult> {
        self.calculate_with_column(shipment, self.config.headline_column)
            .await
    }

    /// Calculates with an explicit headline column.
    pub async fn calculate_with_column(
        &self,
        shipment: &ShipmentParameters,
        column: RateColumn,
    ) -> CoreResult<CalculationResult> {
        validate_shipment(shipment)?;

        let code = &shipment.hts_code;
        let record = self.rates.get_by_code(code).await.map_err(unavailable)?;

        let Some(record) = record else {
            let limit = u32::try_from(self.config.suggestion_limit).unwrap_or(u32::MAX);
            let suggestions = self
                .rates
                .suggest_codes(code, limit)
                .await
                .map_err(unavailable)?;

            debug!(hts_code = %code, suggestions = suggestions.len(), "HTS code not found");
            return Err(CoreError::HtsCodeNotFound {
                code: code.clone(),
                suggestions,
            });
        };

        Ok(price_record(shipment, &record, column))
    }
}

fn unavailable(err: DbError) -> CoreError {
    CoreError::StoreUnavailable(LookupError::from(err))
}

// =============================================================================
// Unit Tests
// =============================================================================
