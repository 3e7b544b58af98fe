use std::collections::BTreeSet;

use chrono::NaiveTime;
use derive_more::{AsRef, Deref, Display};
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};
use uuid::Uuid;

use crate::{Name, NameError, ReadError, UpdateError, UserID};

#[allow(async_fn_in_trait)]
pub trait PlanRepository {
    async fn read_current_plan(&self, user_id: UserID) -> Result<Option<WeeklyPlan>, ReadError>;
    /// Store `plan` as the user's current plan and return the stored copy.
    async fn write_plan(&self, user_id: UserID, plan: WeeklyPlan)
    -> Result<WeeklyPlan, UpdateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyPlan {
    pub id: PlanID,
    pub user_id: UserID,
    pub program_name: Name,
    pub weeks: u32,
    pub days_per_week: u32,
    pub days: Vec<PlanDay>,
}

impl WeeklyPlan {
    /// Check the invariants every stored plan must hold.
    pub fn validate(&self) -> Result<(), PlanError> {
        let mut weekdays = BTreeSet::new();
        for day in &self.days {
            if !weekdays.insert(day.weekday) {
                return Err(PlanError::DuplicateWeekday(day.weekday));
            }
            for exercise in &day.exercises {
                exercise.validate()?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn day(&self, weekday: Weekday) -> Option<&PlanDay> {
        self.days.iter().find(|d| d.weekday == weekday)
    }

    #[must_use]
    pub fn find_exercise(&self, id: PlanExerciseID) -> Option<(Weekday, &PlanExercise)> {
        self.days.iter().find_map(|d| {
            d.exercises
                .iter()
                .find(|e| e.id == id)
                .map(|e| (d.weekday, e))
        })
    }

    #[must_use]
    pub fn num_sets(&self) -> u32 {
        self.days.iter().map(PlanDay::num_sets).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanDay {
    pub weekday: Weekday,
    pub time: Option<NaiveTime>,
    pub focus: String,
    pub exercises: Vec<PlanExercise>,
}

impl PlanDay {
    #[must_use]
    pub fn new(weekday: Weekday, time: Option<NaiveTime>, focus: &str) -> Self {
        Self {
            weekday,
            time,
            focus: focus.trim().to_string(),
            exercises: vec![],
        }
    }

    #[must_use]
    pub fn find_by_name(&self, name: &Name) -> Option<&PlanExercise> {
        self.exercises.iter().find(|e| e.name.matches(name))
    }

    #[must_use]
    pub fn num_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanExercise {
    pub id: PlanExerciseID,
    pub name: Name,
    pub exercise_db_id: Option<CatalogID>,
    pub sets: u32,
    pub reps: RepScheme,
    pub origin: EntryOrigin,
}

impl PlanExercise {
    pub fn new(name: &str, sets: u32, reps: &str, origin: EntryOrigin) -> Result<Self, PlanError> {
        let exercise = Self {
            id: PlanExerciseID::generate(),
            name: Name::new(name)?,
            exercise_db_id: None,
            sets,
            reps: RepScheme::new(reps)?,
            origin,
        };
        exercise.validate()?;
        Ok(exercise)
    }

    #[must_use]
    pub fn with_catalog_id(mut self, exercise_db_id: CatalogID) -> Self {
        self.exercise_db_id = Some(exercise_db_id);
        self
    }

    fn validate(&self) -> Result<(), PlanError> {
        if self.sets == 0 {
            return Err(PlanError::InvalidSets(self.sets));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_manual(&self) -> bool {
        matches!(
            self.origin,
            EntryOrigin::ManuallyAdded | EntryOrigin::ManuallyEdited
        )
    }
}

/// How an exercise entry came to be in its current state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, StrumDisplay, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum EntryOrigin {
    #[default]
    Generated,
    ManuallyAdded,
    ManuallyEdited,
}

/// Target repetitions, e.g. `8-12`, `5` or `AMRAP`.
#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq)]
pub struct RepScheme(String);

impl RepScheme {
    pub fn new(reps: &str) -> Result<Self, PlanError> {
        let reps = reps.trim();
        if reps.is_empty() {
            return Err(PlanError::InvalidReps(reps.to_string()));
        }
        Ok(Self(reps.to_string()))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, StrumDisplay, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// Zero-based index starting on Monday.
    #[must_use]
    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn from_index(index: u32) -> Result<Self, PlanError> {
        Weekday::iter()
            .nth(index as usize)
            .ok_or(PlanError::InvalidWeekday(index))
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
            chrono::Weekday::Sun => Weekday::Sun,
        }
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlanID(Uuid);

impl PlanID {
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

impl From<Uuid> for PlanID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for PlanID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Stable identity of an exercise entry inside a plan, independent of its name.
#[derive(Deref, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlanExerciseID(Uuid);

impl PlanExerciseID {
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

impl From<Uuid> for PlanExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for PlanExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Opaque reference into the exercise catalog. Never validated.
#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CatalogID(String);

impl From<&str> for CatalogID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CatalogID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("more than one day on {0}")]
    DuplicateWeekday(Weekday),
    #[error("no day on {0}")]
    DayNotFound(Weekday),
    #[error("exercise not found")]
    ExerciseNotFound(PlanExerciseID),
    #[error("weekday index must be in the range 0 to 6 ({0})")]
    InvalidWeekday(u32),
    #[error("sets must be greater than zero ({0})")]
    InvalidSets(u32),
    #[error("reps must not be empty")]
    InvalidReps(String),
    #[error(transparent)]
    InvalidName(#[from] NameError),
}
