//! Conversion between the canonical storage unit (kilograms) and display units.
//!
//! Kilograms are the ground truth: the pound factor is only ever applied as
//! `kg * LBS_PER_KG` or `lbs / LBS_PER_KG`, so no independently rounded inverse
//! factor can introduce drift.

use strum::{Display, EnumString};

pub const LBS_PER_KG: f32 = 2.20462;

/// Maximum deviation between a canonical weight and its original input.
pub const TOLERANCE_KG: f32 = 0.05;

#[derive(Debug, Default, Display, EnumString, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(ascii_case_insensitive)]
pub enum Unit {
    #[default]
    #[strum(to_string = "kg")]
    Kg,
    #[strum(to_string = "lbs", serialize = "lb")]
    Lbs,
}

pub fn to_canonical_kg(value: f32, unit: Unit) -> Result<f32, WeightError> {
    let value = check(value)?;
    Ok(match unit {
        Unit::Kg => value,
        Unit::Lbs => value / LBS_PER_KG,
    })
}

pub fn from_canonical_kg(kg: f32, unit: Unit) -> Result<f32, WeightError> {
    let kg = check(kg)?;
    Ok(match unit {
        Unit::Kg => kg,
        Unit::Lbs => kg * LBS_PER_KG,
    })
}

/// Round to the display resolution of the unit (0.1 kg or 0.5 lbs).
#[must_use]
pub fn round_for_display(value: f32, unit: Unit) -> f32 {
    match unit {
        Unit::Kg => (value * 10.0).round() / 10.0,
        Unit::Lbs => (value * 2.0).round() / 2.0,
    }
}

pub fn display_weight(kg: f32, unit: Unit) -> Result<f32, WeightError> {
    Ok(round_for_display(from_canonical_kg(kg, unit)?, unit))
}

fn check(value: f32) -> Result<f32, WeightError> {
    if !value.is_finite() {
        return Err(WeightError::NotFinite);
    }
    if value < 0.0 {
        return Err(WeightError::Negative(value));
    }
    Ok(value)
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum WeightError {
    #[error("Weight must not be negative ({0} < 0)")]
    Negative(f32),
    #[error("Weight must be a finite number")]
    NotFinite,
    #[error("Weight of {canonical_kg} kg does not match input of {input_value} {input_unit}")]
    Inconsistent {
        canonical_kg: f32,
        input_value: f32,
        input_unit: Unit,
    },
    #[error("Weight must be a decimal")]
    ParseError,
}
