//! Mutations of a weekly plan.
//!
//! Every operation takes the current plan by reference and either returns the
//! complete new plan or an error. The input plan is never modified, so a
//! rejected mutation leaves no partial state behind.

use chrono::NaiveTime;

use crate::{
    CatalogID, EntryOrigin, Name, PlanDay, PlanError, PlanExercise, PlanExerciseID, RepScheme,
    WeeklyPlan, Weekday,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// The regenerated plan replaces the old one wholesale.
    #[default]
    Replace,
    /// Manual entries of the old plan survive on days present in both plans
    /// unless the regenerated day contains an exercise of the same name.
    PreserveEdits,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DayChanges {
    pub weekday: Option<Weekday>,
    pub time: Option<Option<NaiveTime>>,
    pub focus: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExerciseChanges {
    pub name: Option<String>,
    pub exercise_db_id: Option<Option<CatalogID>>,
    pub sets: Option<u32>,
    pub reps: Option<String>,
}

/// Name change of a plan exercise that logged sets have to follow.
#[derive(Debug, Clone, PartialEq)]
pub struct Rename {
    pub id: PlanExerciseID,
    pub from: Name,
    pub to: Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseEdit {
    pub plan: WeeklyPlan,
    pub rename: Option<Rename>,
}

pub fn add_day(plan: &WeeklyPlan, day: PlanDay) -> Result<WeeklyPlan, PlanError> {
    let mut plan = plan.clone();
    let position = plan
        .days
        .iter()
        .position(|d| d.weekday > day.weekday)
        .unwrap_or(plan.days.len());
    plan.days.insert(position, day);
    plan.validate()?;
    Ok(plan)
}

pub fn edit_day(
    plan: &WeeklyPlan,
    weekday: Weekday,
    changes: &DayChanges,
) -> Result<WeeklyPlan, PlanError> {
    let mut plan = plan.clone();
    let day = day_mut(&mut plan, weekday)?;
    if let Some(new_weekday) = changes.weekday {
        day.weekday = new_weekday;
    }
    if let Some(time) = changes.time {
        day.time = time;
    }
    if let Some(focus) = &changes.focus {
        day.focus = focus.trim().to_string();
    }
    plan.days.sort_by_key(|d| d.weekday);
    plan.validate()?;
    Ok(plan)
}

pub fn delete_day(plan: &WeeklyPlan, weekday: Weekday) -> Result<WeeklyPlan, PlanError> {
    let mut plan = plan.clone();
    let len = plan.days.len();
    plan.days.retain(|d| d.weekday != weekday);
    if plan.days.len() == len {
        return Err(PlanError::DayNotFound(weekday));
    }
    Ok(plan)
}

/// Append `exercise` to the day on `weekday` as a manually added entry.
pub fn add_exercise(
    plan: &WeeklyPlan,
    weekday: Weekday,
    exercise: PlanExercise,
) -> Result<WeeklyPlan, PlanError> {
    let mut plan = plan.clone();
    day_mut(&mut plan, weekday)?.exercises.push(PlanExercise {
        origin: EntryOrigin::ManuallyAdded,
        ..exercise
    });
    plan.validate()?;
    Ok(plan)
}

/// Overwrite the given fields of an exercise.
///
/// A manually added entry keeps its origin, every other entry becomes
/// manually edited. The catalog reference stays unless changed explicitly.
pub fn edit_exercise(
    plan: &WeeklyPlan,
    id: PlanExerciseID,
    changes: &ExerciseChanges,
) -> Result<ExerciseEdit, PlanError> {
    let mut plan = plan.clone();
    let exercise = plan
        .days
        .iter_mut()
        .flat_map(|d| d.exercises.iter_mut())
        .find(|e| e.id == id)
        .ok_or(PlanError::ExerciseNotFound(id))?;

    let mut rename = None;
    if let Some(name) = &changes.name {
        let name = Name::new(name)?;
        if name != exercise.name {
            rename = Some(Rename {
                id,
                from: exercise.name.clone(),
                to: name.clone(),
            });
        }
        exercise.name = name;
    }
    if let Some(exercise_db_id) = &changes.exercise_db_id {
        exercise.exercise_db_id.clone_from(exercise_db_id);
    }
    if let Some(sets) = changes.sets {
        exercise.sets = sets;
    }
    if let Some(reps) = &changes.reps {
        exercise.reps = RepScheme::new(reps)?;
    }
    if exercise.origin != EntryOrigin::ManuallyAdded {
        exercise.origin = EntryOrigin::ManuallyEdited;
    }

    plan.validate()?;
    Ok(ExerciseEdit { plan, rename })
}

pub fn delete_exercise(plan: &WeeklyPlan, id: PlanExerciseID) -> Result<WeeklyPlan, PlanError> {
    let mut plan = plan.clone();
    let day = plan
        .days
        .iter_mut()
        .find(|d| d.exercises.iter().any(|e| e.id == id))
        .ok_or(PlanError::ExerciseNotFound(id))?;
    day.exercises.retain(|e| e.id != id);
    Ok(plan)
}

/// Adopt a freshly generated plan.
///
/// The result keeps the identity and owner of `old` and takes everything else
/// from `candidate`. All candidate entries are treated as generated.
pub fn regenerate(
    old: &WeeklyPlan,
    candidate: &WeeklyPlan,
    mode: MergeMode,
) -> Result<WeeklyPlan, PlanError> {
    let mut plan = WeeklyPlan {
        id: old.id,
        user_id: old.user_id,
        ..candidate.clone()
    };
    for exercise in plan.days.iter_mut().flat_map(|d| d.exercises.iter_mut()) {
        exercise.origin = EntryOrigin::Generated;
    }

    if mode == MergeMode::PreserveEdits {
        for day in &mut plan.days {
            let Some(old_day) = old.day(day.weekday) else {
                continue;
            };
            let kept = old_day
                .exercises
                .iter()
                .filter(|e| e.is_manual() && day.find_by_name(&e.name).is_none())
                .cloned()
                .collect::<Vec<_>>();
            day.exercises.extend(kept);
        }
    }

    plan.validate()?;
    Ok(plan)
}

fn day_mut(plan: &mut WeeklyPlan, weekday: Weekday) -> Result<&mut PlanDay, PlanError> {
    plan.days
        .iter_mut()
        .find(|d| d.weekday == weekday)
        .ok_or(PlanError::DayNotFound(weekday))
}
