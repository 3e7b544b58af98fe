use chrono::{DateTime, Utc};
use derive_more::Deref;
use uuid::Uuid;

use crate::{
    Name, NameError, PlanExerciseID, RPE, RPEError, Reps, RepsError, Unit, WeightError,
    WeightValue, epley,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SetRecord {
    pub id: SetID,
    pub exercise_name: Name,
    pub plan_exercise_id: Option<PlanExerciseID>,
    pub weight: WeightValue,
    pub reps: Reps,
    pub rpe: Option<RPE>,
    pub is_completed: bool,
    pub is_warmup: bool,
    pub created_at: DateTime<Utc>,
}

impl SetRecord {
    /// Validate raw input and create a new, not yet completed set.
    pub fn new(
        exercise_name: &str,
        weight: f32,
        unit: Unit,
        reps: u32,
        rpe: Option<f32>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SetError> {
        Ok(Self {
            id: SetID::generate(),
            exercise_name: Name::new(exercise_name)?,
            plan_exercise_id: None,
            weight: WeightValue::new(weight, unit)?,
            reps: Reps::new(reps)?,
            rpe: rpe.map(RPE::new).transpose()?,
            is_completed: false,
            is_warmup: false,
            created_at,
        })
    }

    #[must_use]
    pub fn with_warmup(mut self, is_warmup: bool) -> Self {
        self.is_warmup = is_warmup;
        self
    }

    #[must_use]
    pub fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    #[must_use]
    pub fn with_plan_exercise(mut self, plan_exercise_id: PlanExerciseID) -> Self {
        self.plan_exercise_id = Some(plan_exercise_id);
        self
    }

    /// Return a corrected copy of the set with the same id.
    ///
    /// A new unit without a new weight re-expresses the stored canonical
    /// weight in that unit.
    pub fn edit(&self, edit: &SetEdit) -> Result<Self, SetError> {
        let weight = match (edit.weight, edit.unit) {
            (Some(value), unit) => {
                WeightValue::new(value, unit.unwrap_or(self.weight.input_unit()))?
            }
            (None, Some(unit)) => self.weight.with_unit(unit),
            (None, None) => self.weight,
        };
        let reps = match edit.reps {
            Some(reps) => Reps::new(reps)?,
            None => self.reps,
        };
        let rpe = match edit.rpe {
            Some(rpe) => rpe.map(RPE::new).transpose()?,
            None => self.rpe,
        };

        Ok(Self {
            weight,
            reps,
            rpe,
            ..self.clone()
        })
    }

    #[must_use]
    pub fn toggle_completion(&self) -> Self {
        Self {
            is_completed: !self.is_completed,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn estimated_one_rep_max(&self) -> f32 {
        epley(self.weight.kg(), self.reps)
    }

    #[must_use]
    pub fn volume_kg(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let reps = u32::from(self.reps) as f32;
        self.weight.kg() * reps
    }

    /// Whether the set counts towards records and statistics.
    #[must_use]
    pub fn is_working_set(&self) -> bool {
        self.is_completed && !self.is_warmup
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SetEdit {
    pub weight: Option<f32>,
    pub unit: Option<Unit>,
    pub reps: Option<u32>,
    pub rpe: Option<Option<f32>>,
}

#[derive(Deref, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SetID(Uuid);

impl SetID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for SetID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for SetID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SetError {
    #[error("invalid exercise name: {0}")]
    InvalidName(#[from] NameError),
    #[error("invalid weight: {0}")]
    InvalidWeight(#[from] WeightError),
    #[error("invalid reps: {0}")]
    InvalidReps(#[from] RepsError),
    #[error("invalid RPE: {0}")]
    InvalidRPE(#[from] RPEError),
}

/// Whether `candidate` beats every prior completed working set of the same
/// exercise by estimated one-rep max.
///
/// Ties are not records, and a first set without any history to beat is not
/// a record either.
pub fn is_personal_record<'a>(
    candidate: &SetRecord,
    prior_sets: impl IntoIterator<Item = &'a SetRecord>,
) -> bool {
    if !candidate.is_working_set() {
        return false;
    }

    let best = prior_sets
        .into_iter()
        .filter(|s| {
            s.id != candidate.id
                && s.is_working_set()
                && s.exercise_name.matches(&candidate.exercise_name)
        })
        .map(SetRecord::estimated_one_rep_max)
        .reduce(f32::max);

    best.is_some_and(|best| candidate.estimated_one_rep_max() > best)
}

/// Personal record flags for a chronological sequence of sets.
#[must_use]
pub fn flag_personal_records(sets: &[SetRecord]) -> Vec<bool> {
    sets.iter()
        .enumerate()
        .map(|(i, set)| is_personal_record(set, &sets[..i]))
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 18, minute, 0).unwrap()
    }

    fn completed(exercise: &str, weight: f32, reps: u32, minute: u32) -> SetRecord {
        SetRecord::new(exercise, weight, Unit::Kg, reps, None, at(minute))
            .unwrap()
            .with_completed(true)
    }

    #[test]
    fn test_set_record_new() {
        let set = SetRecord::new("Squat", 100.0, Unit::Lbs, 5, None, at(0)).unwrap();
        assert_eq!(set.exercise_name, Name::new("Squat").unwrap());
        assert_approx_eq!(set.weight.kg(), 45.36, 0.01);
        assert_eq!(set.weight.input_value(), 100.0);
        assert_eq!(set.weight.input_unit(), Unit::Lbs);
        assert_eq!(set.reps, Reps::new(5).unwrap());
        assert_eq!(set.rpe, None);
        assert!(!set.is_completed);
        assert!(!set.is_warmup);
        assert!(!set.id.is_nil());
    }

    #[rstest]
    #[case("Squat", 100.0, 0, None, SetError::InvalidReps(RepsError::OutOfRange(0)))]
    #[case("Squat", 100.0, 5, Some(11.0), SetError::InvalidRPE(RPEError::OutOfRange))]
    #[case("Squat", 100.0, 5, Some(0.0), SetError::InvalidRPE(RPEError::OutOfRange))]
    #[case("Squat", -2.5, 5, None, SetError::InvalidWeight(WeightError::Negative(-2.5)))]
    #[case(" ", 100.0, 5, None, SetError::InvalidName(NameError::Empty))]
    fn test_set_record_new_invalid(
        #[case] exercise: &str,
        #[case] weight: f32,
        #[case] reps: u32,
        #[case] rpe: Option<f32>,
        #[case] expected: SetError,
    ) {
        assert_eq!(
            SetRecord::new(exercise, weight, Unit::Kg, reps, rpe, at(0)),
            Err(expected)
        );
    }

    #[test]
    fn test_set_record_edit() {
        let set = SetRecord::new("Bench Press", 60.0, Unit::Kg, 8, Some(8.0), at(0)).unwrap();

        let edited = set
            .edit(&SetEdit {
                weight: Some(135.0),
                unit: Some(Unit::Lbs),
                reps: Some(6),
                rpe: None,
            })
            .unwrap();
        assert_eq!(edited.id, set.id);
        assert_eq!(edited.weight.input_value(), 135.0);
        assert_eq!(edited.weight.input_unit(), Unit::Lbs);
        assert_approx_eq!(edited.weight.kg(), 61.235, 0.001);
        assert_eq!(edited.reps, Reps::new(6).unwrap());
        assert_eq!(edited.rpe, Some(RPE::EIGHT));
        assert_eq!(set.weight.kg(), 60.0);

        let edited = set
            .edit(&SetEdit {
                weight: Some(62.5),
                rpe: Some(None),
                ..SetEdit::default()
            })
            .unwrap();
        assert_eq!(edited.weight.input_unit(), Unit::Kg);
        assert_eq!(edited.weight.kg(), 62.5);
        assert_eq!(edited.rpe, None);

        let edited = set
            .edit(&SetEdit {
                unit: Some(Unit::Lbs),
                ..SetEdit::default()
            })
            .unwrap();
        assert_eq!(edited.weight.kg(), 60.0);
        assert_eq!(edited.weight.input_unit(), Unit::Lbs);
    }

    #[test]
    fn test_set_record_edit_invalid_leaves_original() {
        let set = SetRecord::new("Bench Press", 60.0, Unit::Kg, 8, None, at(0)).unwrap();
        assert_eq!(
            set.edit(&SetEdit {
                reps: Some(0),
                ..SetEdit::default()
            }),
            Err(SetError::InvalidReps(RepsError::OutOfRange(0)))
        );
        assert_eq!(set.reps, Reps::new(8).unwrap());
    }

    #[test]
    fn test_set_record_toggle_completion() {
        let set = SetRecord::new("Row", 50.0, Unit::Kg, 10, None, at(0)).unwrap();
        let toggled = set.toggle_completion();
        assert!(toggled.is_completed);
        assert_eq!(toggled.toggle_completion(), set);
    }

    #[test]
    fn test_set_record_volume() {
        assert_eq!(completed("Deadlift", 110.0, 3, 0).volume_kg(), 330.0);
    }

    #[test]
    fn test_is_personal_record_strictly_increasing() {
        let sets = vec![
            completed("Squat", 100.0, 5, 0),
            completed("Squat", 105.0, 5, 1),
            completed("Squat", 110.0, 5, 2),
        ];
        assert_eq!(flag_personal_records(&sets), vec![false, true, true]);
    }

    #[test]
    fn test_is_personal_record_plateau() {
        let sets = vec![
            completed("Squat", 100.0, 5, 0),
            completed("Squat", 105.0, 5, 1),
            completed("Squat", 105.0, 5, 2),
        ];
        assert_eq!(flag_personal_records(&sets), vec![false, true, false]);
    }

    #[test]
    fn test_is_personal_record_ignores_warmups_incomplete_and_other_exercises() {
        let prior = vec![
            completed("Squat", 200.0, 5, 0).with_warmup(true),
            SetRecord::new("Squat", 200.0, Unit::Kg, 5, None, at(1)).unwrap(),
            completed("Deadlift", 200.0, 5, 2),
            completed("squat", 100.0, 5, 3),
        ];
        assert!(is_personal_record(&completed("Squat", 101.0, 5, 4), &prior));
        assert!(!is_personal_record(&completed("Squat", 99.0, 5, 4), &prior));
        assert!(!is_personal_record(
            &completed("Squat", 150.0, 5, 4).with_warmup(true),
            &prior
        ));
        assert!(!is_personal_record(
            &completed("Squat", 150.0, 5, 4).toggle_completion(),
            &prior
        ));
    }

    #[test]
    fn test_set_id_nil() {
        assert!(SetID::nil().is_nil());
        assert_eq!(SetID::nil(), SetID::default());
    }
}
