use chrono::{NaiveDate, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsOfQuery {
    pub as_of: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPlanQuery {
    pub target: Option<String>,
    pub as_of: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Reference date for a request: `asOf` when given, otherwise today's UTC date.
pub fn resolve_as_of(as_of: Option<&str>) -> Result<NaiveDate, EngineError> {
    match as_of.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            EngineError::InvalidDate(format!("Parameter 'asOf' must be a YYYY-MM-DD date, got '{}'", raw))
        }),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Parses the `target` query parameter of the budget plan endpoint.
pub fn parse_target(target: Option<&str>) -> Result<Decimal, EngineError> {
    let raw = target
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EngineError::InvalidTarget("Parameter 'target' is required".to_string()))?;

    let value = match Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)) {
        Ok(value) => value,
        Err(_) => decimal_from_float(raw)?,
    };

    if value.is_sign_negative() && !value.is_zero() {
        return Err(EngineError::InvalidTarget("Target budget must be positive".to_string()));
    }

    Ok(value)
}

/// Fallback for numbers `Decimal` cannot parse directly: tiny magnitudes are rounded,
/// magnitudes beyond `Decimal::MAX` are rejected as out of range.
fn decimal_from_float(raw: &str) -> Result<Decimal, EngineError> {
    let float: f64 = raw
        .parse()
        .ok()
        .filter(|f: &f64| f.is_finite())
        .ok_or_else(|| EngineError::InvalidTarget(format!("Parameter 'target' is invalid: '{}'", raw)))?;

    if float < 0.0 {
        return Err(EngineError::InvalidTarget("Target budget must be positive".to_string()));
    }

    Decimal::from_f64(float).ok_or_else(|| {
        EngineError::InvalidTarget(format!(
            "Parameter 'target' is out of range: '{}' exceeds the maximum of {}",
            raw,
            Decimal::MAX
        ))
    })
}
