use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{Name, Reps, SetRecord, WorkoutSession, WorkoutSessionID};

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseFrequency {
    pub exercise: Name,
    pub sessions: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPoint {
    pub session_id: WorkoutSessionID,
    pub date: DateTime<Utc>,
    pub weight_kg: f32,
    pub reps: Reps,
    pub one_rep_max: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonalRecord {
    pub exercise: Name,
    pub weight_kg: f32,
    pub reps: Reps,
    pub one_rep_max: f32,
    pub achieved_at: DateTime<Utc>,
}

/// Exercises ranked by the number of sessions containing at least one set of
/// them.
///
/// Ties are broken by exercise name in ascending order, ignoring case.
#[must_use]
pub fn most_frequent_exercises(sessions: &[WorkoutSession], n: usize) -> Vec<ExerciseFrequency> {
    let mut counts: BTreeMap<String, ExerciseFrequency> = BTreeMap::new();

    for session in sessions {
        for group in session.exercises() {
            counts
                .entry(group.name.key())
                .or_insert_with(|| ExerciseFrequency {
                    exercise: group.name.clone(),
                    sessions: 0,
                })
                .sessions += 1;
        }
    }

    let mut result = counts.into_values().collect::<Vec<_>>();
    // Keys ascend, so the stable sort keeps name order among ties.
    result.sort_by(|a, b| b.sessions.cmp(&a.sessions));
    result.truncate(n);
    result
}

/// Best completed set of `exercise` per session for the `n` most recent
/// sessions, in chronological order.
#[must_use]
pub fn recent_progress(
    sessions: &[WorkoutSession],
    exercise: &Name,
    n: usize,
) -> Vec<ProgressPoint> {
    let mut points = sessions
        .iter()
        .filter_map(|session| {
            best_set(
                session
                    .sets
                    .iter()
                    .filter(|s| s.is_completed && s.exercise_name.matches(exercise)),
            )
            .map(|set| ProgressPoint {
                session_id: session.id,
                date: session.started_at,
                weight_kg: set.weight.kg(),
                reps: set.reps,
                one_rep_max: set.estimated_one_rep_max(),
            })
        })
        .collect::<Vec<_>>();

    points.sort_by_key(|p| p.date);
    let skip = points.len().saturating_sub(n);
    points.split_off(skip)
}

/// Best working set per exercise across all sessions, highest estimated
/// one-rep max first.
#[must_use]
pub fn top_personal_records(sessions: &[WorkoutSession], n: usize) -> Vec<PersonalRecord> {
    let mut best: BTreeMap<String, &SetRecord> = BTreeMap::new();

    for set in sessions
        .iter()
        .flat_map(|s| s.sets.iter())
        .filter(|s| s.is_working_set())
    {
        let entry = best.entry(set.exercise_name.key()).or_insert(set);
        if set.estimated_one_rep_max() > entry.estimated_one_rep_max() {
            *entry = set;
        }
    }

    let mut records = best
        .into_values()
        .map(|set| PersonalRecord {
            exercise: set.exercise_name.clone(),
            weight_kg: set.weight.kg(),
            reps: set.reps,
            one_rep_max: set.estimated_one_rep_max(),
            achieved_at: set.created_at,
        })
        .collect::<Vec<_>>();
    records.sort_by(|a, b| b.one_rep_max.total_cmp(&a.one_rep_max));
    records.truncate(n);
    records
}

fn best_set<'a>(sets: impl Iterator<Item = &'a SetRecord>) -> Option<&'a SetRecord> {
    sets.reduce(|best, set| {
        if set.estimated_one_rep_max() > best.estimated_one_rep_max() {
            set
        } else {
            best
        }
    })
}
