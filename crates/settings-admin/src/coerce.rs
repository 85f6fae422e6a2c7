//! Numeric coercion of raw form text into typed settings updates.

use crate::patch::SettingsUpdate;
use estimate_core::{AssumptionField, PriceField, UnknownName};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Name of the only nested object that holds numeric fields.
pub const ASSUMPTIONS_PARENT: &str = "assumptions";

/// Errors produced while turning form text into an update.
#[derive(Debug, Error, PartialEq)]
pub enum CoerceError {
    /// Text is neither blank nor a decimal/scientific number.
    #[error("{0:?} is not a number")]
    NotANumber(String),
    /// Field name is not part of the target object.
    #[error(transparent)]
    UnknownField(#[from] UnknownName),
    /// Parent object is not `assumptions`.
    #[error("unknown parent {0:?}; only \"assumptions\" holds nested numeric fields")]
    UnknownParent(String),
}

/// A numeric field addressed either at the top level or under `assumptions`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericField {
    /// Top-level price.
    Price(PriceField),
    /// Numeric assumption.
    Assumption(AssumptionField),
}

impl NumericField {
    /// Resolve a wire field name, optionally nested under `parent`.
    pub fn resolve(field: &str, parent: Option<&str>) -> Result<Self, CoerceError> {
        match parent {
            None => Ok(NumericField::Price(PriceField::from_str(field)?)),
            Some(ASSUMPTIONS_PARENT) => {
                Ok(NumericField::Assumption(AssumptionField::from_str(field)?))
            }
            Some(other) => Err(CoerceError::UnknownParent(other.to_string())),
        }
    }

    /// Build the update that writes `value` into this field.
    pub fn update(self, value: Decimal) -> SettingsUpdate {
        match self {
            NumericField::Price(f) => SettingsUpdate::Price(f, value),
            NumericField::Assumption(f) => SettingsUpdate::Assumption(f, value),
        }
    }
}

/// Parse user-entered text. Blank input is zero; anything else must be a
/// decimal (`12.5`, `-3`) or scientific (`1e3`) number that `Decimal` holds
/// exactly. Digit separators and values that would need rounding are rejected.
pub fn parse_numeric(text: &str) -> Result<Decimal, CoerceError> {
    let t = text.trim();
    if t.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let not_a_number = || CoerceError::NotANumber(text.to_string());
    if t.contains('_') {
        return Err(not_a_number());
    }
    let parsed = match t.split_once(['e', 'E']) {
        None => Decimal::from_str_exact(t),
        Some((mantissa, _)) => {
            Decimal::from_str_exact(mantissa).and_then(|_| Decimal::from_scientific(t))
        }
    };
    parsed.map_err(|_| not_a_number())
}

/// Coerce `text` into an update of `field`.
pub fn coerce(text: &str, field: NumericField) -> Result<SettingsUpdate, CoerceError> {
    Ok(field.update(parse_numeric(text)?))
}

/// Coerce `text` into an update addressed by wire names, e.g.
/// `coerce_named("350", "flooringCostPerSqFt", Some("assumptions"))`.
pub fn coerce_named(
    text: &str,
    field: &str,
    parent: Option<&str>,
) -> Result<SettingsUpdate, CoerceError> {
    coerce(text, NumericField::resolve(field, parent)?)
}
