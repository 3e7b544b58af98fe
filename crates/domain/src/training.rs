use std::fmt;

use derive_more::{Display, Into};

use crate::{TOLERANCE_KG, Unit, WeightError, from_canonical_kg, round_for_display, to_canonical_kg};

#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(1..1000).contains(&value) {
            return Err(RepsError::OutOfRange(value));
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 1 to 999 ({0})")]
    OutOfRange(u32),
    #[error("Reps must be an integer")]
    ParseError,
}

/// Rate of perceived exertion, stored in tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RPE(u8);

impl RPE {
    pub const ONE: RPE = RPE(10);
    pub const FIVE: RPE = RPE(50);
    pub const SEVEN: RPE = RPE(70);
    pub const EIGHT: RPE = RPE(80);
    pub const NINE: RPE = RPE(90);
    pub const TEN: RPE = RPE(100);

    pub fn new(value: f32) -> Result<Self, RPEError> {
        if !(1.0..=10.0).contains(&value) {
            return Err(RPEError::OutOfRange);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self((value * 10.0).round() as u8))
    }
}

impl From<RPE> for f32 {
    fn from(value: RPE) -> Self {
        f32::from(value.0) / 10.0
    }
}

impl TryFrom<&str> for RPE {
    type Error = RPEError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<f32>() {
            Ok(parsed_value) => RPE::new(parsed_value),
            Err(_) => Err(RPEError::ParseError),
        }
    }
}

impl fmt::Display for RPE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", f32::from(*self))
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum RPEError {
    #[error("RPE must be in the range 1.0 to 10.0")]
    OutOfRange,
    #[error("RPE must be a decimal")]
    ParseError,
}

/// A logged weight in canonical kilograms together with the value and unit
/// the user originally entered.
///
/// Arithmetic always uses `canonical_kg`. The original input is kept verbatim
/// for auditing and for showing the entry the way it was made.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightValue {
    canonical_kg: f32,
    input_value: f32,
    input_unit: Unit,
}

impl WeightValue {
    pub fn new(value: f32, unit: Unit) -> Result<Self, WeightError> {
        Ok(Self {
            canonical_kg: to_canonical_kg(value, unit)?,
            input_value: value,
            input_unit: unit,
        })
    }

    /// Rebuild a weight from its stored parts.
    pub fn from_parts(
        canonical_kg: f32,
        input_value: f32,
        input_unit: Unit,
    ) -> Result<Self, WeightError> {
        let derived_kg = to_canonical_kg(input_value, input_unit)?;
        from_canonical_kg(canonical_kg, Unit::Kg)?;

        if (derived_kg - canonical_kg).abs() > TOLERANCE_KG {
            return Err(WeightError::Inconsistent {
                canonical_kg,
                input_value,
                input_unit,
            });
        }

        Ok(Self {
            canonical_kg,
            input_value,
            input_unit,
        })
    }

    #[must_use]
    pub fn kg(&self) -> f32 {
        self.canonical_kg
    }

    #[must_use]
    pub fn input_value(&self) -> f32 {
        self.input_value
    }

    #[must_use]
    pub fn input_unit(&self) -> Unit {
        self.input_unit
    }

    /// Re-express the same canonical weight with a different input unit.
    #[must_use]
    pub fn with_unit(&self, unit: Unit) -> Self {
        Self {
            canonical_kg: self.canonical_kg,
            input_value: match (self.input_unit, unit) {
                (Unit::Kg, Unit::Kg) | (Unit::Lbs, Unit::Lbs) => self.input_value,
                (_, Unit::Kg) => self.canonical_kg,
                (_, Unit::Lbs) => self.canonical_kg * crate::LBS_PER_KG,
            },
            input_unit: unit,
        }
    }

    /// Value shown to the user: the original entry if it was made in `unit`,
    /// the rounded conversion otherwise.
    #[must_use]
    pub fn display(&self, unit: Unit) -> f32 {
        if unit == self.input_unit {
            self.input_value
        } else {
            self.display_canonical(unit)
        }
    }

    #[must_use]
    pub fn display_canonical(&self, unit: Unit) -> f32 {
        let value = match unit {
            Unit::Kg => self.canonical_kg,
            Unit::Lbs => self.canonical_kg * crate::LBS_PER_KG,
        };
        round_for_display(value, unit)
    }
}

/// Estimated one-rep maximum (Epley).
#[must_use]
pub fn epley(weight_kg: f32, reps: Reps) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let reps = u32::from(reps) as f32;
    weight_kg * (1.0 + reps / 30.0)
}
