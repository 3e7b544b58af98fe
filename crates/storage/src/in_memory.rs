//! In-memory persistence gateway
//!
//! All state is kept in the row layout of `rows` and can be exported to and imported from a JSON
//! snapshot. The store can be switched unavailable, in which case every operation fails with
//! `StorageError::Unavailable`.

use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};

use buddygym_domain as domain;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rows::{PlanRow, SessionRow, SetRow};
use crate::settings;

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Snapshot {
    pub plans: Vec<PlanRow>,
    pub sessions: Vec<SessionRow>,
    pub sets: Vec<SetRow>,
    pub settings: Vec<SettingsRow>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SettingsRow {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub settings: settings::Document,
}

pub struct InMemory {
    rows: Mutex<Snapshot>,
    available: AtomicBool,
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

fn other(err: impl std::error::Error + Send + Sync + 'static) -> domain::StorageError {
    domain::StorageError::Other(Box::new(err))
}

impl InMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::default())
    }

    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            rows: Mutex::new(snapshot),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        debug!(
            "in-memory storage {}",
            if available { "available" } else { "unavailable" }
        );
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Result<Snapshot, domain::StorageError> {
        Ok(self.rows()?.clone())
    }

    pub fn to_json(&self) -> Result<String, domain::StorageError> {
        serde_json::to_string(&*self.rows()?).map_err(other)
    }

    pub fn from_json(json: &str) -> Result<Self, domain::StorageError> {
        Ok(Self::from_snapshot(
            serde_json::from_str(json).map_err(other)?,
        ))
    }

    fn rows(&self) -> Result<MutexGuard<'_, Snapshot>, domain::StorageError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(domain::StorageError::Unavailable);
        }
        self.rows
            .lock()
            .map_err(|err| domain::StorageError::Other(err.to_string().into()))
    }
}

impl Snapshot {
    fn session(&self, row: &SessionRow) -> Result<domain::WorkoutSession, domain::StorageError> {
        let sets = self
            .sets
            .iter()
            .filter(|s| s.session_id == row.id)
            .cloned()
            .map(domain::SetRecord::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(other)?;
        Ok(row.clone().into_session(sets))
    }

    fn session_row_mut(&mut self, id: domain::WorkoutSessionID) -> Option<&mut SessionRow> {
        self.sessions.iter_mut().find(|s| s.id == *id)
    }
}

impl domain::PlanRepository for InMemory {
    async fn read_current_plan(
        &self,
        user_id: domain::UserID,
    ) -> Result<Option<domain::WeeklyPlan>, domain::ReadError> {
        let rows = self.rows()?;
        Ok(rows
            .plans
            .iter()
            .find(|p| p.user_id == *user_id)
            .cloned()
            .map(domain::WeeklyPlan::try_from)
            .transpose()
            .map_err(other)?)
    }

    async fn write_plan(
        &self,
        user_id: domain::UserID,
        plan: domain::WeeklyPlan,
    ) -> Result<domain::WeeklyPlan, domain::UpdateError> {
        let mut rows = self.rows()?;
        let plan = domain::WeeklyPlan { user_id, ..plan };
        rows.plans.retain(|p| p.user_id != *user_id);
        rows.plans.push(PlanRow::from(&plan));
        Ok(plan)
    }
}

impl domain::WorkoutSessionRepository for InMemory {
    async fn read_active_session(
        &self,
        user_id: domain::UserID,
    ) -> Result<Option<domain::WorkoutSession>, domain::ReadError> {
        let rows = self.rows()?;
        Ok(rows
            .sessions
            .iter()
            .filter(|s| s.user_id == *user_id && s.ended_at.is_none())
            .max_by_key(|s| s.started_at)
            .map(|s| rows.session(s))
            .transpose()?)
    }

    async fn create_session(
        &self,
        session: domain::WorkoutSession,
    ) -> Result<domain::WorkoutSession, domain::CreateError> {
        let mut rows = self.rows()?;
        if rows.sessions.iter().any(|s| s.id == *session.id) {
            return Err(domain::CreateError::Conflict);
        }
        rows.sessions.push(SessionRow::from(&session));
        rows.sets
            .extend(session.sets.iter().map(|s| SetRow::new(session.id, s)));
        Ok(session)
    }

    async fn replace_session(
        &self,
        session: domain::WorkoutSession,
    ) -> Result<domain::WorkoutSession, domain::UpdateError> {
        let mut rows = self.rows()?;
        let row = rows
            .session_row_mut(session.id)
            .ok_or(domain::UpdateError::NotFound)?;
        *row = SessionRow::from(&session);
        rows.sets.retain(|s| s.session_id != *session.id);
        rows.sets
            .extend(session.sets.iter().map(|s| SetRow::new(session.id, s)));
        Ok(session)
    }

    async fn append_set(
        &self,
        session_id: domain::WorkoutSessionID,
        set: domain::SetRecord,
    ) -> Result<domain::SetRecord, domain::CreateError> {
        let mut rows = self.rows()?;
        match rows.session_row_mut(session_id) {
            Some(session) if session.ended_at.is_none() => {}
            _ => return Err(domain::CreateError::Conflict),
        }
        if rows.sets.iter().any(|s| s.id == *set.id) {
            return Err(domain::CreateError::Conflict);
        }
        rows.sets.push(SetRow::new(session_id, &set));
        Ok(set)
    }

    async fn replace_set(
        &self,
        session_id: domain::WorkoutSessionID,
        set: domain::SetRecord,
    ) -> Result<domain::SetRecord, domain::UpdateError> {
        let mut rows = self.rows()?;
        let row = rows
            .sets
            .iter_mut()
            .find(|s| s.id == *set.id && s.session_id == *session_id)
            .ok_or(domain::UpdateError::NotFound)?;
        *row = SetRow::new(session_id, &set);
        Ok(set)
    }

    async fn delete_set(
        &self,
        session_id: domain::WorkoutSessionID,
        set_id: domain::SetID,
    ) -> Result<domain::SetID, domain::DeleteError> {
        let mut rows = self.rows()?;
        let len = rows.sets.len();
        rows.sets
            .retain(|s| !(s.id == *set_id && s.session_id == *session_id));
        if rows.sets.len() == len {
            return Err(domain::DeleteError::NotFound);
        }
        Ok(set_id)
    }

    async fn finish_session(
        &self,
        session_id: domain::WorkoutSessionID,
        ended_at: DateTime<Utc>,
    ) -> Result<domain::WorkoutSession, domain::UpdateError> {
        let mut rows = self.rows()?;
        let row = rows
            .session_row_mut(session_id)
            .ok_or(domain::UpdateError::NotFound)?;
        if row.ended_at.is_some() {
            return Err(domain::UpdateError::Conflict);
        }
        if let Some(paused_at) = row.paused_at.take() {
            row.paused_seconds += (ended_at - paused_at).num_seconds().max(0);
        }
        row.ended_at = Some(ended_at);
        let row = row.clone();
        Ok(rows.session(&row)?)
    }

    async fn read_history(
        &self,
        user_id: domain::UserID,
        limit: usize,
    ) -> Result<Vec<domain::WorkoutSession>, domain::ReadError> {
        let rows = self.rows()?;
        let mut sessions = rows
            .sessions
            .iter()
            .filter(|s| s.user_id == *user_id)
            .collect::<Vec<_>>();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(sessions
            .into_iter()
            .take(limit)
            .map(|s| rows.session(s))
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl domain::SettingsRepository for InMemory {
    async fn read_settings(
        &self,
        user_id: domain::UserID,
    ) -> Result<domain::Settings, domain::ReadError> {
        let rows = self.rows()?;
        match rows.settings.iter().find(|s| s.user_id == *user_id) {
            Some(row) => Ok(domain::Settings::try_from(row.settings.clone()).map_err(other)?),
            None => Ok(domain::Settings::default()),
        }
    }

    async fn write_settings(
        &self,
        user_id: domain::UserID,
        settings: domain::Settings,
    ) -> Result<domain::Settings, domain::UpdateError> {
        let mut rows = self.rows()?;
        rows.settings.retain(|s| s.user_id != *user_id);
        rows.settings.push(SettingsRow {
            user_id: *user_id,
            settings: settings::Document::from(&settings),
        });
        Ok(settings)
    }
}
