//! Row layout of the persisted state.
//!
//! A set row stores the canonical weight next to the weight as it was entered. Both are kept
//! verbatim, the input weight is never recomputed from the canonical one.

use std::str::FromStr;

use buddygym_domain as domain;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error(transparent)]
    InvalidName(#[from] domain::NameError),
    #[error(transparent)]
    InvalidWeight(#[from] domain::WeightError),
    #[error(transparent)]
    InvalidReps(#[from] domain::RepsError),
    #[error(transparent)]
    InvalidRPE(#[from] domain::RPEError),
    #[error(transparent)]
    InvalidPlan(#[from] domain::PlanError),
    #[error("unknown {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },
}

fn parse_variant<T: FromStr>(field: &'static str, value: &str) -> Result<T, RowError> {
    T::from_str(value).map_err(|_| RowError::UnknownVariant {
        field,
        value: value.to_string(),
    })
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub paused_seconds: i64,
}

impl From<&domain::WorkoutSession> for SessionRow {
    fn from(value: &domain::WorkoutSession) -> Self {
        Self {
            id: *value.id,
            user_id: *value.user_id,
            title: value.title.clone(),
            started_at: value.started_at,
            ended_at: value.ended_at,
            paused_at: value.paused_at,
            paused_seconds: value.paused.num_seconds(),
        }
    }
}

impl SessionRow {
    pub fn into_session(self, sets: Vec<domain::SetRecord>) -> domain::WorkoutSession {
        domain::WorkoutSession {
            id: self.id.into(),
            user_id: self.user_id.into(),
            title: self.title,
            started_at: self.started_at,
            ended_at: self.ended_at,
            paused_at: self.paused_at,
            paused: Duration::seconds(self.paused_seconds),
            sets,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SetRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub exercise_name: String,
    pub plan_exercise_id: Option<Uuid>,
    pub weight_kg: f32,
    pub input_weight: f32,
    pub input_unit: String,
    pub reps: u32,
    pub rpe: Option<f32>,
    pub is_completed: bool,
    pub is_warmup: bool,
    pub created_at: DateTime<Utc>,
}

impl SetRow {
    #[must_use]
    pub fn new(session_id: domain::WorkoutSessionID, set: &domain::SetRecord) -> Self {
        Self {
            id: *set.id,
            session_id: *session_id,
            exercise_name: set.exercise_name.to_string(),
            plan_exercise_id: set.plan_exercise_id.map(|id| *id),
            weight_kg: set.weight.kg(),
            input_weight: set.weight.input_value(),
            input_unit: set.weight.input_unit().to_string(),
            reps: u32::from(set.reps),
            rpe: set.rpe.map(f32::from),
            is_completed: set.is_completed,
            is_warmup: set.is_warmup,
            created_at: set.created_at,
        }
    }
}

impl TryFrom<SetRow> for domain::SetRecord {
    type Error = RowError;

    fn try_from(value: SetRow) -> Result<Self, Self::Error> {
        let input_unit = parse_variant::<domain::Unit>("unit", &value.input_unit)?;
        Ok(Self {
            id: value.id.into(),
            exercise_name: domain::Name::new(&value.exercise_name)?,
            plan_exercise_id: value.plan_exercise_id.map(domain::PlanExerciseID::from),
            weight: domain::WeightValue::from_parts(
                value.weight_kg,
                value.input_weight,
                input_unit,
            )?,
            reps: domain::Reps::new(value.reps)?,
            rpe: value.rpe.map(domain::RPE::new).transpose()?,
            is_completed: value.is_completed,
            is_warmup: value.is_warmup,
            created_at: value.created_at,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub program_name: String,
    pub weeks: u32,
    pub days_per_week: u32,
    pub days: Vec<PlanDayRow>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlanDayRow {
    pub weekday: u32,
    pub time: Option<NaiveTime>,
    pub focus: String,
    pub exercises: Vec<PlanExerciseRow>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlanExerciseRow {
    pub id: Uuid,
    pub name: String,
    pub exercise_db_id: Option<String>,
    pub sets: u32,
    pub reps: String,
    pub origin: String,
}

impl From<&domain::WeeklyPlan> for PlanRow {
    fn from(value: &domain::WeeklyPlan) -> Self {
        Self {
            id: *value.id,
            user_id: *value.user_id,
            program_name: value.program_name.to_string(),
            weeks: value.weeks,
            days_per_week: value.days_per_week,
            days: value
                .days
                .iter()
                .map(|d| PlanDayRow {
                    weekday: d.weekday.index(),
                    time: d.time,
                    focus: d.focus.clone(),
                    exercises: d
                        .exercises
                        .iter()
                        .map(|e| PlanExerciseRow {
                            id: *e.id,
                            name: e.name.to_string(),
                            exercise_db_id: e.exercise_db_id.as_ref().map(ToString::to_string),
                            sets: e.sets,
                            reps: e.reps.to_string(),
                            origin: e.origin.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl TryFrom<PlanRow> for domain::WeeklyPlan {
    type Error = RowError;

    fn try_from(value: PlanRow) -> Result<Self, Self::Error> {
        let plan = Self {
            id: value.id.into(),
            user_id: value.user_id.into(),
            program_name: domain::Name::new(&value.program_name)?,
            weeks: value.weeks,
            days_per_week: value.days_per_week,
            days: value
                .days
                .into_iter()
                .map(domain::PlanDay::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        };
        plan.validate()?;
        Ok(plan)
    }
}

impl TryFrom<PlanDayRow> for domain::PlanDay {
    type Error = RowError;

    fn try_from(value: PlanDayRow) -> Result<Self, Self::Error> {
        let mut day = domain::PlanDay::new(
            domain::Weekday::from_index(value.weekday)?,
            value.time,
            &value.focus,
        );
        for e in value.exercises {
            let exercise = domain::PlanExercise::new(
                &e.name,
                e.sets,
                &e.reps,
                parse_variant("origin", &e.origin)?,
            )?;
            day.exercises.push(domain::PlanExercise {
                id: e.id.into(),
                exercise_db_id: e.exercise_db_id.map(domain::CatalogID::from),
                ..exercise
            });
        }
        Ok(day)
    }
}
