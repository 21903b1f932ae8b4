//! Field validation shared by the record loaders.

use crate::error::{AdvkitError, Result};
use std::collections::HashSet;

pub fn require_finite(id: &str, field: &str, v: f64) -> Result<()> {
    if !v.is_finite() {
        return Err(AdvkitError::invalid(id, format!("{field} must be a number")));
    }
    Ok(())
}

pub fn require_non_negative(id: &str, field: &str, v: f64) -> Result<()> {
    require_finite(id, field, v)?;
    if v < 0.0 {
        return Err(AdvkitError::invalid(
            id,
            format!("{field} must not be negative, got {v}"),
        ));
    }
    Ok(())
}

pub fn require_positive(id: &str, field: &str, v: f64) -> Result<()> {
    require_finite(id, field, v)?;
    if v <= 0.0 {
        return Err(AdvkitError::invalid(
            id,
            format!("{field} must be greater than zero, got {v}"),
        ));
    }
    Ok(())
}

/// Integer rating on an inclusive scale, e.g. FMEA 1..=10.
pub fn require_scale(id: &str, field: &str, v: u8, min: u8, max: u8) -> Result<()> {
    if v < min || v > max {
        return Err(AdvkitError::invalid(
            id,
            format!("{field} must be between {min} and {max}, got {v}"),
        ));
    }
    Ok(())
}

/// Accept a fraction in [0, 1] or a percent in (1, 100]; return the fraction.
pub fn normalize_fraction(id: &str, field: &str, v: f64) -> Result<f64> {
    require_non_negative(id, field, v)?;
    if v <= 1.0 {
        return Ok(v);
    }
    if v <= 100.0 {
        tracing::warn!(record = id, field, value = v, "treating value as a percentage");
        return Ok(v / 100.0);
    }
    Err(AdvkitError::invalid(
        id,
        format!("{field} must be a fraction or a percentage, got {v}"),
    ))
}

pub fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(AdvkitError::invalid("<blank>", "record id must not be empty"));
    }
    Ok(())
}

/// Duplicate ids are accepted but logged; reports keep every row.
pub fn warn_duplicate_ids<'a>(ids: impl IntoIterator<Item = &'a str>) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            tracing::warn!(record = id, "duplicate record id");
        }
    }
}
