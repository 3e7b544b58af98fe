use chrono::NaiveTime;

use crate::{
    EntryOrigin, Name, PlanDay, PlanError, PlanExercise, PlanID, RepScheme, UserID, WeeklyPlan,
    Weekday, WorkoutSession, statistics,
};

/// Producer of candidate plans, usually backed by a language model.
#[allow(async_fn_in_trait)]
pub trait PlanGenerator {
    async fn generate(&self, request: &PlanRequest) -> Result<WeeklyPlan, GenerationError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub user_id: UserID,
    pub text: String,
    pub context: PlanContext,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlanContext {
    pub current_plan_summary: Option<String>,
    pub history_summary: Option<String>,
}

impl PlanContext {
    #[must_use]
    pub fn new(current_plan: Option<&WeeklyPlan>, history: &[WorkoutSession]) -> Self {
        Self {
            current_plan_summary: current_plan.map(summarize_plan),
            history_summary: if history.is_empty() {
                None
            } else {
                Some(summarize_history(history))
            },
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("failed to extract constraints from request: {0}")]
    ConstraintExtractionFailed(String),
    #[error("plan generation failed: {0}")]
    GenerationFailed(String),
}

/// Generator that ignores the request and always returns the same three-day
/// full body plan.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackPlanGenerator;

impl PlanGenerator for FallbackPlanGenerator {
    async fn generate(&self, request: &PlanRequest) -> Result<WeeklyPlan, GenerationError> {
        fallback_plan(request.user_id)
            .map_err(|err| GenerationError::GenerationFailed(err.to_string()))
    }
}

pub fn fallback_plan(user_id: UserID) -> Result<WeeklyPlan, PlanError> {
    let time = NaiveTime::from_hms_opt(18, 0, 0);
    let day = |weekday: Weekday, exercises: &[(&str, &str)]| -> Result<PlanDay, PlanError> {
        let mut day = PlanDay::new(weekday, time, "Full Body");
        for (name, scheme) in exercises {
            let (sets, reps) = parse_set_scheme(scheme)?;
            day.exercises.push(PlanExercise::new(
                name,
                sets,
                reps.as_ref(),
                EntryOrigin::Generated,
            )?);
        }
        Ok(day)
    };

    let plan = WeeklyPlan {
        id: PlanID::generate(),
        user_id,
        program_name: Name::new("Fallback Plan")?,
        weeks: 1,
        days_per_week: 3,
        days: vec![
            day(
                Weekday::Mon,
                &[("Squat", "3x5"), ("Bench Press", "3x5"), ("Row", "3x8")],
            )?,
            day(
                Weekday::Wed,
                &[
                    ("Deadlift", "1x5"),
                    ("Overhead Press", "3x5"),
                    ("Pull-up", "3xAMRAP"),
                ],
            )?,
            day(
                Weekday::Fri,
                &[
                    ("Front Squat", "3x5"),
                    ("Incline Bench", "3x8"),
                    ("Lat Pulldown", "3x10"),
                ],
            )?,
        ],
    };
    plan.validate()?;
    Ok(plan)
}

/// Split a scheme like `3x5` into the number of sets and the reps per set.
///
/// A scheme without a set count, e.g. `8-12`, describes a single set.
pub fn parse_set_scheme(scheme: &str) -> Result<(u32, RepScheme), PlanError> {
    let scheme = scheme.trim();
    if let Some((sets, reps)) = scheme.split_once(['x', 'X', '×']) {
        if let Ok(sets) = sets.trim().parse::<u32>() {
            if sets == 0 {
                return Err(PlanError::InvalidSets(sets));
            }
            return Ok((sets, RepScheme::new(reps)?));
        }
    }
    Ok((1, RepScheme::new(scheme)?))
}

#[must_use]
pub fn summarize_plan(plan: &WeeklyPlan) -> String {
    let days = plan
        .days
        .iter()
        .map(|d| {
            let exercises = d
                .exercises
                .iter()
                .map(|e| format!("{} {}x{}", e.name, e.sets, e.reps))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} {}: {exercises}", d.weekday, d.focus)
        })
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} ({} weeks): {days}", plan.program_name, plan.weeks)
}

#[must_use]
pub fn summarize_history(history: &[WorkoutSession]) -> String {
    let records = statistics::top_personal_records(history, 5)
        .iter()
        .map(|r| format!("{} {}kg x{}", r.exercise, r.weight_kg, r.reps))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} sessions, best sets: {records}", history.len())
}
