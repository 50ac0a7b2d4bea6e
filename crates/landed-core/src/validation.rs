//! # Validation Module
//!
//! Input validation for shipments and schedule data.
//!
//! The calculator trusts its inputs. Anything that builds a
//! [`ShipmentParameters`] from user input runs it through here first.
//!
//! ## Usage
//! ```rust
//! use landed_core::validation::{validate_hts_code, validate_search_query};
//!
//! let code = validate_hts_code(" 0201.10.00.00 ").unwrap();
//! assert_eq!(code.as_str(), "0201.10.00.00");
//!
//! assert_eq!(validate_search_query("  cattle ").unwrap(), "cattle");
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{HtsCode, ShipmentParameters};
use crate::{MAX_DESCRIPTION_LENGTH, MAX_QUANTITY, MAX_SEARCH_QUERY_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates and canonicalizes an HTS code.
///
/// ## Example
/// ```rust
/// use landed_core::validation::validate_hts_code;
///
/// assert!(validate_hts_code("8517.12.00.50").is_ok());
/// assert!(validate_hts_code("8517.12").is_err());
/// assert!(validate_hts_code("").is_err());
/// ```
pub fn validate_hts_code(raw: &str) -> ValidationResult<HtsCode> {
    HtsCode::parse(raw)
}

/// Validates a tariff line description.
///
/// ## Rules
/// - Must not be empty
/// - At most MAX_DESCRIPTION_LENGTH characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LENGTH,
        });
    }

    Ok(())
}

/// Validates a description keyword search.
///
/// ## Returns
/// The trimmed query string. Empty is allowed and matches every line.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_QUERY_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_QUERY_LENGTH,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary input. Zero is allowed (e.g. prepaid freight).
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Rejects shipments whose cost, freight and insurance overflow when summed.
pub fn validate_cif_value(shipment: &ShipmentParameters) -> ValidationResult<()> {
    shipment
        .product_cost
        .checked_add(shipment.freight)
        .and_then(|sum| sum.checked_add(shipment.insurance))
        .map(|_| ())
        .ok_or_else(|| ValidationError::OutOfRange {
            field: "cif_value".to_string(),
            min: 0,
            max: i64::MAX,
        })
}

/// Validates a shipment weight in kilograms.
pub fn validate_unit_weight(weight: f64) -> ValidationResult<()> {
    if !weight.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "unit_weight".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if weight < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "unit_weight".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit count.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_QUANTITY
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(MAX_QUANTITY),
        });
    }

    Ok(())
}

/// Validates every field of a shipment, stopping at the first failure.
///
/// ## Example
/// ```rust
/// use landed_core::money::Money;
/// use landed_core::types::{HtsCode, ShipmentParameters};
/// use landed_core::validation::validate_shipment;
///
/// let mut shipment = ShipmentParameters {
///     hts_code: HtsCode::parse("0701.10.00.00").unwrap(),
///     product_cost: Money::from_dollars(1_200),
///     freight: Money::zero(),
///     insurance: Money::from_dollars(12),
///     unit_weight: 2_000.0,
///     quantity: 40,
/// };
/// assert!(validate_shipment(&shipment).is_ok());
///
/// shipment.freight = Money::from_cents(-1);
/// assert!(validate_shipment(&shipment).is_err());
/// ```
pub fn validate_shipment(shipment: &ShipmentParameters) -> ValidationResult<()> {
    validate_amount("product_cost", shipment.product_cost)?;
    validate_amount("freight", shipment.freight)?;
    validate_amount("insurance", shipment.insurance)?;
    validate_cif_value(shipment)?;
    validate_unit_weight(shipment.unit_weight)?;
    validate_quantity(shipment.quantity)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
