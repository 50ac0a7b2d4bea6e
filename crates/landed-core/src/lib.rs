//! # landed-core: Duty Rate Parsing and Landed-Cost Calculation
//!
//! This crate turns an HTS code plus shipment values into import duty and
//! landed cost. It is pure computation with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Landed Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Callers (seed binary, services, frontends)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ landed-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   rate    │  │ calculator │  │ validation│  │   │
//! │  │   │  HtsCode  │  │  parse()  │  │ RateTable  │  │   rules   │  │   │
//! │  │   │  Money    │  │ ParsedRate│  │ DutyCalc   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ implements RateTable / price_record    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  landed-db (Database Layer)                     │   │
//! │  │         SQLite schedule, migrations, async service              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (HtsCode, ShipmentParameters, CalculationResult, ...)
//! - [`money`] - Money type with integer cents
//! - [`rate`] - Rate string parser
//! - [`calculator`] - RateTable trait and DutyCalculator
//! - [`schedule`] - In-memory RateTable and the sample schedule
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use landed_core::calculator::{CalculatorConfig, DutyCalculator};
//! use landed_core::schedule::RateSchedule;
//! use landed_core::{HtsCode, Money, ShipmentParameters};
//!
//! let calculator = DutyCalculator::new(RateSchedule::sample(), CalculatorConfig::default());
//!
//! let result = calculator
//!     .calculate(&ShipmentParameters {
//!         hts_code: HtsCode::parse("0201.10.00.00").unwrap(),
//!         product_cost: Money::from_dollars(8_000),
//!         freight: Money::from_dollars(400),
//!         insurance: Money::from_dollars(80),
//!         unit_weight: 500.0,
//!         quantity: 5,
//!     })
//!     .unwrap();
//!
//! // 4.4¢/kg on 500 kg
//! assert_eq!(result.total_duty, Money::from_dollars(22));
//! assert_eq!(result.landed_cost.to_string(), "$8,502.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod error;
pub mod money;
pub mod rate;
pub mod schedule;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculator::{price_record, CalculatorConfig, DutyCalculator, RateTable};
pub use error::{CoreError, CoreResult, LookupError, ValidationError};
pub use money::Money;
pub use schedule::RateSchedule;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum unit count accepted for one shipment.
pub const MAX_QUANTITY: u32 = 10_000_000;

/// Maximum length of a tariff line description.
pub const MAX_DESCRIPTION_LENGTH: usize = 1_000;

/// Maximum length of a description keyword search.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 100;
