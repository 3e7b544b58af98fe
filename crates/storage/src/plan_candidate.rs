//! Candidate plans as returned by the language model.
//!
//! The model is asked for JSON of the following shape:
//!
//! ```json
//! {
//!   "program_name": "Strength Base",
//!   "weeks": 4,
//!   "days_per_week": 3,
//!   "days": [
//!     {
//!       "weekday": 0,
//!       "time": "18:00",
//!       "focus": "Full Body",
//!       "exercises": [{ "name": "squat", "sets": [{ "reps": "3x5" }] }]
//!     }
//!   ]
//! }
//! ```
//!
//! Nothing in the response is trusted before it passed `parse`.

use buddygym_domain as domain;
use log::debug;
use serde::Deserialize;

use crate::settings::parse_time;

const WEEKS: std::ops::RangeInclusive<u32> = 1..=12;
const DAYS_PER_WEEK: std::ops::RangeInclusive<u32> = 1..=7;

#[derive(Deserialize, Debug)]
struct Candidate {
    program_name: String,
    weeks: u32,
    days_per_week: u32,
    days: Vec<CandidateDay>,
}

#[derive(Deserialize, Debug)]
struct CandidateDay {
    weekday: u32,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    focus: String,
    exercises: Vec<CandidateExercise>,
}

#[derive(Deserialize, Debug)]
struct CandidateExercise {
    name: String,
    sets: Vec<CandidateSet>,
}

#[derive(Deserialize, Debug)]
struct CandidateSet {
    reps: String,
}

fn failed(message: impl ToString) -> domain::GenerationError {
    domain::GenerationError::GenerationFailed(message.to_string())
}

/// Validate a model response and turn it into a plan of `user_id`.
///
/// Every exercise of the result is marked as generated.
pub fn parse(
    json: &str,
    user_id: domain::UserID,
) -> Result<domain::WeeklyPlan, domain::GenerationError> {
    let candidate: Candidate = serde_json::from_str(json.trim()).map_err(failed)?;

    if candidate.days.is_empty() {
        return Err(domain::GenerationError::ConstraintExtractionFailed(
            "plan contains no training days".to_string(),
        ));
    }
    if !WEEKS.contains(&candidate.weeks) {
        return Err(failed(format!(
            "weeks must be in the range 1 to 12 ({})",
            candidate.weeks
        )));
    }
    if !DAYS_PER_WEEK.contains(&candidate.days_per_week) {
        return Err(failed(format!(
            "days per week must be in the range 1 to 7 ({})",
            candidate.days_per_week
        )));
    }

    let mut days = candidate
        .days
        .into_iter()
        .map(parse_day)
        .collect::<Result<Vec<_>, _>>()?;
    days.sort_by_key(|d| d.weekday);

    let plan = domain::WeeklyPlan {
        id: domain::PlanID::generate(),
        user_id,
        program_name: domain::Name::new(&candidate.program_name).map_err(failed)?,
        weeks: candidate.weeks,
        days_per_week: candidate.days_per_week,
        days,
    };
    plan.validate().map_err(failed)?;
    debug!(
        "parsed plan candidate with {} days and {} sets",
        plan.days.len(),
        plan.num_sets()
    );

    Ok(plan)
}

fn parse_day(day: CandidateDay) -> Result<domain::PlanDay, domain::GenerationError> {
    let weekday = domain::Weekday::from_index(day.weekday).map_err(failed)?;
    let time = match day.time {
        Some(time) if time.len() == 5 => Some(parse_time(&time).map_err(failed)?),
        Some(time) => return Err(failed(format!("invalid time: {time}"))),
        None => None,
    };
    let mut result = domain::PlanDay::new(weekday, time, &day.focus);
    for exercise in day.exercises {
        result.exercises.push(parse_exercise(exercise)?);
    }
    Ok(result)
}

/// Collapse the set entries of an exercise into a set count and a rep
/// scheme. Entries like `3x5` count as three sets, differing rep schemes are
/// joined by `/`.
fn parse_exercise(
    exercise: CandidateExercise,
) -> Result<domain::PlanExercise, domain::GenerationError> {
    if exercise.sets.is_empty() {
        return Err(failed(format!("no sets for {}", exercise.name)));
    }

    let mut sets = 0;
    let mut reps: Vec<String> = vec![];
    for set in &exercise.sets {
        let (count, scheme) = domain::parse_set_scheme(&set.reps).map_err(failed)?;
        sets += count;
        let scheme = scheme.to_string();
        if !reps.contains(&scheme) {
            reps.push(scheme);
        }
    }

    domain::PlanExercise::new(
        &exercise.name,
        sets,
        &reps.join("/"),
        domain::EntryOrigin::Generated,
    )
    .map_err(failed)
}

/// Source of raw model output for a plan request.
#[allow(async_fn_in_trait)]
pub trait Completion {
    async fn complete(&self, request: &domain::PlanRequest)
    -> Result<String, domain::GenerationError>;
}

/// Plan generator that validates the output of a `Completion`.
pub struct CandidateGenerator<C> {
    completion: C,
}

impl<C> CandidateGenerator<C> {
    pub fn new(completion: C) -> Self {
        Self { completion }
    }
}

impl<C: Completion> domain::PlanGenerator for CandidateGenerator<C> {
    async fn generate(
        &self,
        request: &domain::PlanRequest,
    ) -> Result<domain::WeeklyPlan, domain::GenerationError> {
        let response = self.completion.complete(request).await?;
        parse(&response, request.user_id)
    }
}
