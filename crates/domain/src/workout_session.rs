use chrono::{DateTime, Duration, Utc};
use derive_more::Deref;
use uuid::Uuid;

use crate::{
    CreateError, DeleteError, Name, ReadError, Rename, SetID, SetRecord, UpdateError, UserID,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutSessionRepository {
    /// Most recent session of the user without an end time.
    async fn read_active_session(
        &self,
        user_id: UserID,
    ) -> Result<Option<WorkoutSession>, ReadError>;
    async fn create_session(&self, session: WorkoutSession)
    -> Result<WorkoutSession, CreateError>;
    async fn replace_session(
        &self,
        session: WorkoutSession,
    ) -> Result<WorkoutSession, UpdateError>;
    async fn append_set(
        &self,
        session_id: WorkoutSessionID,
        set: SetRecord,
    ) -> Result<SetRecord, CreateError>;
    async fn replace_set(
        &self,
        session_id: WorkoutSessionID,
        set: SetRecord,
    ) -> Result<SetRecord, UpdateError>;
    async fn delete_set(
        &self,
        session_id: WorkoutSessionID,
        set_id: SetID,
    ) -> Result<SetID, DeleteError>;
    async fn finish_session(
        &self,
        session_id: WorkoutSessionID,
        ended_at: DateTime<Utc>,
    ) -> Result<WorkoutSession, UpdateError>;
    /// Sessions of the user, most recent first.
    async fn read_history(
        &self,
        user_id: UserID,
        limit: usize,
    ) -> Result<Vec<WorkoutSession>, ReadError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub id: WorkoutSessionID,
    pub user_id: UserID,
    pub title: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    /// Accumulated time spent paused before `paused_at`.
    pub paused: Duration,
    pub sets: Vec<SetRecord>,
}

impl WorkoutSession {
    #[must_use]
    pub fn start(user_id: UserID, title: Option<&str>, now: DateTime<Utc>) -> Self {
        Self {
            id: WorkoutSessionID::generate(),
            user_id,
            title: title.map(str::to_string),
            started_at: now,
            ended_at: None,
            paused_at: None,
            paused: Duration::zero(),
            sets: vec![],
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Start time shifted forward by all completed pauses.
    #[must_use]
    pub fn effective_start(&self) -> DateTime<Utc> {
        self.started_at + self.paused
    }

    /// Elapsed training time, excluding pauses.
    #[must_use]
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        let end = self.ended_at.or(self.paused_at).unwrap_or(now);
        (end - self.effective_start()).max(Duration::zero())
    }

    /// Time of the last activity, used to detect abandoned sessions.
    #[must_use]
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.sets
            .iter()
            .map(|s| s.created_at)
            .max()
            .unwrap_or(self.started_at)
            .max(self.started_at)
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.ensure_active()?;
        if self.is_paused() {
            return Err(SessionError::AlreadyPaused);
        }
        self.paused_at = Some(now);
        Ok(())
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.ensure_active()?;
        let Some(paused_at) = self.paused_at.take() else {
            return Err(SessionError::NotPaused);
        };
        self.paused += (now - paused_at).max(Duration::zero());
        Ok(())
    }

    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.is_paused() {
            self.resume(now)?;
        }
        self.ensure_active()?;
        self.ended_at = Some(now);
        Ok(())
    }

    pub fn append_set(&mut self, set: SetRecord) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.sets.push(set);
        Ok(())
    }

    pub fn replace_set(&mut self, set: SetRecord) -> Result<(), SessionError> {
        self.ensure_active()?;
        let existing = self
            .sets
            .iter_mut()
            .find(|s| s.id == set.id)
            .ok_or(SessionError::SetNotFound(set.id))?;
        *existing = set;
        Ok(())
    }

    pub fn remove_set(&mut self, id: SetID) -> Result<SetRecord, SessionError> {
        self.ensure_active()?;
        let index = self
            .sets
            .iter()
            .position(|s| s.id == id)
            .ok_or(SessionError::SetNotFound(id))?;
        Ok(self.sets.remove(index))
    }

    #[must_use]
    pub fn find_set(&self, id: SetID) -> Option<&SetRecord> {
        self.sets.iter().find(|s| s.id == id)
    }

    /// Move sets logged under a renamed plan exercise to its new name.
    ///
    /// Finished sessions are history and stay untouched. Sets are matched by
    /// their linked plan exercise or by the old name, and get linked to the
    /// renamed exercise.
    pub fn apply_rename(&mut self, rename: &Rename) -> usize {
        if !self.is_active() {
            return 0;
        }
        let mut renamed = 0;
        for set in &mut self.sets {
            if set.plan_exercise_id == Some(rename.id) || set.exercise_name.matches(&rename.from) {
                set.exercise_name = rename.to.clone();
                set.plan_exercise_id = Some(rename.id);
                renamed += 1;
            }
        }
        renamed
    }

    /// Sets grouped by exercise in order of first appearance.
    #[must_use]
    pub fn exercises(&self) -> Vec<ExerciseGroup<'_>> {
        let mut groups: Vec<ExerciseGroup> = vec![];
        for set in self.sets_in_creation_order() {
            match groups
                .iter_mut()
                .find(|g| g.name.matches(&set.exercise_name))
            {
                Some(group) => group.sets.push(set),
                None => groups.push(ExerciseGroup {
                    name: set.exercise_name.clone(),
                    sets: vec![set],
                }),
            }
        }
        groups
    }

    /// Sets of one exercise numbered from 1 by creation order.
    #[must_use]
    pub fn numbered_sets(&self, exercise: &Name) -> Vec<(u32, &SetRecord)> {
        self.sets_in_creation_order()
            .into_iter()
            .filter(|s| s.exercise_name.matches(exercise))
            .zip(1..)
            .map(|(s, n)| (n, s))
            .collect()
    }

    #[must_use]
    pub fn summary(&self, now: DateTime<Utc>) -> SessionSummary {
        let exercises = self
            .exercises()
            .iter()
            .map(ExerciseGroup::summary)
            .collect::<Vec<_>>();
        SessionSummary {
            completed_sets: exercises.iter().map(|e| e.completed_sets).sum(),
            completed_reps: exercises.iter().map(|e| e.completed_reps).sum(),
            volume_kg: exercises.iter().map(|e| e.volume_kg).sum(),
            max_weight_kg: exercises
                .iter()
                .filter_map(|e| e.max_weight_kg)
                .reduce(f32::max),
            duration: self.duration(now),
            exercises,
        }
    }

    fn sets_in_creation_order(&self) -> Vec<&SetRecord> {
        let mut sets = self.sets.iter().collect::<Vec<_>>();
        sets.sort_by_key(|s| s.created_at);
        sets
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SessionError::Finished)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseGroup<'a> {
    pub name: Name,
    pub sets: Vec<&'a SetRecord>,
}

impl ExerciseGroup<'_> {
    #[must_use]
    pub fn summary(&self) -> ExerciseSummary {
        let completed = self
            .sets
            .iter()
            .filter(|s| s.is_completed)
            .collect::<Vec<_>>();
        ExerciseSummary {
            name: self.name.clone(),
            sets: self.sets.len(),
            completed_sets: completed.len(),
            completed_reps: completed.iter().map(|s| u32::from(s.reps)).sum(),
            volume_kg: completed.iter().map(|s| s.volume_kg()).sum(),
            max_weight_kg: completed.iter().map(|s| s.weight.kg()).reduce(f32::max),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSummary {
    pub name: Name,
    pub sets: usize,
    pub completed_sets: usize,
    pub completed_reps: u32,
    pub volume_kg: f32,
    pub max_weight_kg: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub exercises: Vec<ExerciseSummary>,
    pub completed_sets: usize,
    pub completed_reps: u32,
    pub volume_kg: f32,
    pub max_weight_kg: Option<f32>,
    pub duration: Duration,
}

#[derive(Deref, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkoutSessionID(Uuid);

impl WorkoutSessionID {
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

impl From<Uuid> for WorkoutSessionID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutSessionID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("workout session is already finished")]
    Finished,
    #[error("workout session is already paused")]
    AlreadyPaused,
    #[error("workout session is not paused")]
    NotPaused,
    #[error("set not found")]
    SetNotFound(SetID),
}
