use chrono::{DateTime, Datelike, Utc};
use log::{debug, error, info};

use crate::{
    ActiveSessionPolicy, CreateError, DayChanges, DeleteError, ExerciseCatalog, ExerciseChanges,
    GenerationError, MergeMode, PlanContext, PlanDay, PlanError, PlanExercise, PlanExerciseID,
    PlanGenerator, PlanRepository, PlanRequest, ReadError, SessionError, SetEdit, SetError, SetID,
    SetRecord, Settings, SettingsRepository, SettingsService, Unit, UpdateError, UserID,
    WeeklyPlan, Weekday, WorkoutSession, WorkoutSessionRepository, enrich_plan,
    is_personal_record, plan_merge,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    /// Start a workout, or handle an active one according to the user's
    /// `ActiveSessionPolicy`.
    async fn start_workout(
        &self,
        user_id: UserID,
        title: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, WorkoutError>;
    /// Log a set into the active session, starting one if necessary.
    async fn log_set(
        &self,
        user_id: UserID,
        input: SetInput,
        now: DateTime<Utc>,
    ) -> Result<LoggedSet, WorkoutError>;
    async fn edit_set(
        &self,
        user_id: UserID,
        set_id: SetID,
        edit: SetEdit,
        now: DateTime<Utc>,
    ) -> Result<SetRecord, WorkoutError>;
    async fn toggle_set_completion(
        &self,
        user_id: UserID,
        set_id: SetID,
        now: DateTime<Utc>,
    ) -> Result<LoggedSet, WorkoutError>;
    async fn delete_set(
        &self,
        user_id: UserID,
        set_id: SetID,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, WorkoutError>;
    async fn pause_workout(
        &self,
        user_id: UserID,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, WorkoutError>;
    async fn resume_workout(
        &self,
        user_id: UserID,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, WorkoutError>;
    async fn finish_workout(
        &self,
        user_id: UserID,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, WorkoutError>;
    async fn get_active_session(
        &self,
        user_id: UserID,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkoutSession>, WorkoutError>;
    async fn get_history(&self, user_id: UserID) -> Result<Vec<WorkoutSession>, WorkoutError>;
}

#[allow(async_fn_in_trait)]
pub trait PlanService {
    async fn get_current_plan(&self, user_id: UserID)
    -> Result<Option<WeeklyPlan>, PlanServiceError>;
    async fn save_plan(
        &self,
        user_id: UserID,
        plan: WeeklyPlan,
    ) -> Result<WeeklyPlan, PlanServiceError>;
    async fn add_plan_day(
        &self,
        user_id: UserID,
        day: PlanDay,
    ) -> Result<WeeklyPlan, PlanServiceError>;
    async fn edit_plan_day(
        &self,
        user_id: UserID,
        weekday: Weekday,
        changes: DayChanges,
    ) -> Result<WeeklyPlan, PlanServiceError>;
    async fn delete_plan_day(
        &self,
        user_id: UserID,
        weekday: Weekday,
    ) -> Result<WeeklyPlan, PlanServiceError>;
    async fn add_plan_exercise(
        &self,
        user_id: UserID,
        weekday: Weekday,
        exercise: PlanExercise,
    ) -> Result<WeeklyPlan, PlanServiceError>;
    /// Edit a plan exercise. A rename is carried over to the sets of the
    /// active workout.
    async fn edit_plan_exercise(
        &self,
        user_id: UserID,
        id: PlanExerciseID,
        changes: ExerciseChanges,
        now: DateTime<Utc>,
    ) -> Result<WeeklyPlan, PlanServiceError>;
    async fn delete_plan_exercise(
        &self,
        user_id: UserID,
        id: PlanExerciseID,
    ) -> Result<WeeklyPlan, PlanServiceError>;
    async fn regenerate_plan(
        &self,
        user_id: UserID,
        text: &str,
        mode: MergeMode,
        generator: &impl PlanGenerator,
        catalog: &impl ExerciseCatalog,
    ) -> Result<WeeklyPlan, PlanServiceError>;
}

/// Raw set entry as received from the user.
#[derive(Debug, Clone, PartialEq)]
pub struct SetInput {
    pub exercise: String,
    pub weight: f32,
    /// Unit of `weight`, the user's display unit if absent.
    pub unit: Option<Unit>,
    pub reps: u32,
    pub rpe: Option<f32>,
    pub is_warmup: bool,
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedSet {
    pub session: WorkoutSession,
    pub set: SetRecord,
    pub is_personal_record: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum WorkoutError {
    #[error("no active workout session")]
    NoActiveSession,
    #[error("a workout session is already active")]
    SessionAlreadyActive,
    #[error("set not found")]
    SetNotFound(SetID),
    #[error(transparent)]
    InvalidSet(#[from] SetError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Create(#[from] CreateError),
    #[error(transparent)]
    Update(#[from] UpdateError),
    #[error(transparent)]
    Delete(#[from] DeleteError),
}

#[derive(thiserror::Error, Debug)]
pub enum PlanServiceError {
    #[error("no current plan")]
    NoCurrentPlan,
    #[error(transparent)]
    InvalidPlan(#[from] PlanError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Workout(#[from] WorkoutError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Update(#[from] UpdateError),
}

pub const QUICK_LOG_TITLE: &str = "Quick Log";

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::Unavailable) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: SettingsRepository> SettingsService for Service<R> {
    async fn get_settings(&self, user_id: UserID) -> Result<Settings, ReadError> {
        log_on_error!(
            self.repository.read_settings(user_id),
            ReadError,
            "get",
            "settings"
        )
    }

    async fn set_settings(
        &self,
        user_id: UserID,
        settings: Settings,
    ) -> Result<Settings, UpdateError> {
        settings
            .validate()
            .map_err(|err| UpdateError::Other(Box::new(err)))?;
        log_on_error!(
            self.repository.write_settings(user_id, settings),
            UpdateError,
            "set",
            "settings"
        )
    }
}

impl<R> Service<R>
where
    R: WorkoutSessionRepository + PlanRepository + SettingsRepository,
{
    /// The user's active session, closing it first if it has been idle for
    /// longer than the configured threshold.
    async fn active_session(
        &self,
        user_id: UserID,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkoutSession>, WorkoutError> {
        let Some(session) = log_on_error!(
            self.repository.read_active_session(user_id),
            ReadError,
            "get",
            "active workout session"
        )?
        else {
            return Ok(None);
        };

        let last_activity = session.last_activity();
        if now - last_activity > settings.active_session_threshold() {
            info!("closing idle workout session {}", *session.id);
            log_on_error!(
                self.repository.finish_session(session.id, last_activity),
                UpdateError,
                "finish",
                "idle workout session"
            )?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    async fn require_active_session(
        &self,
        user_id: UserID,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, WorkoutError> {
        let settings = self.get_settings(user_id).await?;
        self.active_session(user_id, &settings, now)
            .await?
            .ok_or(WorkoutError::NoActiveSession)
    }

    async fn create_session(
        &self,
        user_id: UserID,
        title: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, WorkoutError> {
        let session = log_on_error!(
            self.repository
                .create_session(WorkoutSession::start(user_id, title, now)),
            CreateError,
            "create",
            "workout session"
        )?;
        info!("started workout session {}", *session.id);
        Ok(session)
    }

    /// Whether `set` beats every earlier set of the user.
    async fn check_personal_record(
        &self,
        user_id: UserID,
        set: &SetRecord,
    ) -> Result<bool, WorkoutError> {
        if !set.is_working_set() {
            return Ok(false);
        }
        let history = log_on_error!(
            self.repository.read_history(user_id, usize::MAX),
            ReadError,
            "get",
            "workout history"
        )?;
        Ok(is_personal_record(
            set,
            history
                .iter()
                .flat_map(|s| s.sets.iter())
                .filter(|s| s.created_at <= set.created_at),
        ))
    }

    /// Plan entry the set belongs to, preferring the day the set was logged on
    /// in the user's local time.
    async fn plan_exercise_id(
        &self,
        user_id: UserID,
        settings: &Settings,
        set: &SetRecord,
    ) -> Result<Option<PlanExerciseID>, WorkoutError> {
        let plan = log_on_error!(
            self.repository.read_current_plan(user_id),
            ReadError,
            "get",
            "current plan"
        )?;
        let Some(plan) = plan else {
            return Ok(None);
        };
        let weekday = Weekday::from(match settings.utc_offset() {
            Ok(offset) => set.created_at.with_timezone(&offset).weekday(),
            Err(_) => set.created_at.weekday(),
        });
        Ok(plan
            .day(weekday)
            .and_then(|d| d.find_by_name(&set.exercise_name))
            .or_else(|| {
                plan.days
                    .iter()
                    .find_map(|d| d.find_by_name(&set.exercise_name))
            })
            .map(|e| e.id))
    }

    async fn replace_session(
        &self,
        session: WorkoutSession,
    ) -> Result<WorkoutSession, WorkoutError> {
        Ok(log_on_error!(
            self.repository.replace_session(session),
            UpdateError,
            "replace",
            "workout session"
        )?)
    }

    async fn current_plan(&self, user_id: UserID) -> Result<WeeklyPlan, PlanServiceError> {
        self.get_current_plan(user_id)
            .await?
            .ok_or(PlanServiceError::NoCurrentPlan)
    }

    async fn write_plan(
        &self,
        user_id: UserID,
        plan: WeeklyPlan,
    ) -> Result<WeeklyPlan, PlanServiceError> {
        Ok(log_on_error!(
            self.repository.write_plan(user_id, plan),
            UpdateError,
            "write",
            "plan"
        )?)
    }

    async fn mutate_plan(
        &self,
        user_id: UserID,
        mutation: impl FnOnce(&WeeklyPlan) -> Result<WeeklyPlan, PlanError>,
    ) -> Result<WeeklyPlan, PlanServiceError> {
        let plan = mutation(&self.current_plan(user_id).await?)?;
        self.write_plan(user_id, plan).await
    }
}

impl<R> WorkoutService for Service<R>
where
    R: WorkoutSessionRepository + PlanRepository + SettingsRepository,
{
    async fn start_workout(
        &self,
        user_id: UserID,
        title: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, WorkoutError> {
        let settings = self.get_settings(user_id).await?;
        if let Some(active) = self.active_session(user_id, &settings, now).await? {
            match settings.active_session_policy {
                ActiveSessionPolicy::Resume => {
                    debug!("resuming workout session {}", *active.id);
                    return Ok(active);
                }
                ActiveSessionPolicy::Reject => {
                    return Err(WorkoutError::SessionAlreadyActive);
                }
                ActiveSessionPolicy::FinishAndStartNew => {
                    log_on_error!(
                        self.repository.finish_session(active.id, now),
                        UpdateError,
                        "finish",
                        "workout session"
                    )?;
                    info!("finished workout session {}", *active.id);
                }
            }
        }
        self.create_session(user_id, title, now).await
    }

    async fn log_set(
        &self,
        user_id: UserID,
        input: SetInput,
        now: DateTime<Utc>,
    ) -> Result<LoggedSet, WorkoutError> {
        let settings = self.get_settings(user_id).await?;
        let mut set = SetRecord::new(
            &input.exercise,
            input.weight,
            input.unit.unwrap_or(settings.display_unit),
            input.reps,
            input.rpe,
            now,
        )?
        .with_warmup(input.is_warmup)
        .with_completed(input.is_completed);

        if let Some(plan_exercise_id) = self.plan_exercise_id(user_id, &settings, &set).await? {
            set = set.with_plan_exercise(plan_exercise_id);
        }

        let mut session = match self.active_session(user_id, &settings, now).await? {
            Some(session) => session,
            None => {
                self.create_session(user_id, Some(QUICK_LOG_TITLE), now)
                    .await?
            }
        };

        let set = log_on_error!(
            self.repository.append_set(session.id, set),
            CreateError,
            "append",
            "set"
        )?;
        session.append_set(set.clone())?;
        let is_personal_record = self.check_personal_record(user_id, &set).await?;
        if is_personal_record {
            info!("new personal record for {}", set.exercise_name);
        }

        Ok(LoggedSet {
            session,
            set,
            is_personal_record,
        })
    }

    async fn edit_set(
        &self,
        user_id: UserID,
        set_id: SetID,
        edit: SetEdit,
        now: DateTime<Utc>,
    ) -> Result<SetRecord, WorkoutError> {
        let mut session = self.require_active_session(user_id, now).await?;
        let edited = session
            .find_set(set_id)
            .ok_or(WorkoutError::SetNotFound(set_id))?
            .edit(&edit)?;
        session.replace_set(edited.clone())?;
        Ok(log_on_error!(
            self.repository.replace_set(session.id, edited),
            UpdateError,
            "replace",
            "set"
        )?)
    }

    async fn toggle_set_completion(
        &self,
        user_id: UserID,
        set_id: SetID,
        now: DateTime<Utc>,
    ) -> Result<LoggedSet, WorkoutError> {
        let mut session = self.require_active_session(user_id, now).await?;
        let toggled = session
            .find_set(set_id)
            .ok_or(WorkoutError::SetNotFound(set_id))?
            .toggle_completion();
        session.replace_set(toggled.clone())?;
        let set = log_on_error!(
            self.repository.replace_set(session.id, toggled),
            UpdateError,
            "replace",
            "set"
        )?;
        let is_personal_record = self.check_personal_record(user_id, &set).await?;
        Ok(LoggedSet {
            session,
            set,
            is_personal_record,
        })
    }

    async fn delete_set(
        &self,
        user_id: UserID,
        set_id: SetID,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, WorkoutError> {
        let mut session = self.require_active_session(user_id, now).await?;
        session.remove_set(set_id).map_err(|err| match err {
            SessionError::SetNotFound(id) => WorkoutError::SetNotFound(id),
            err => WorkoutError::Session(err),
        })?;
        log_on_error!(
            self.repository.delete_set(session.id, set_id),
            DeleteError,
            "delete",
            "set"
        )?;
        Ok(session)
    }

    async fn pause_workout(
        &self,
        user_id: UserID,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, WorkoutError> {
        let mut session = self.require_active_session(user_id, now).await?;
        session.pause(now)?;
        self.replace_session(session).await
    }

    async fn resume_workout(
        &self,
        user_id: UserID,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, WorkoutError> {
        let mut session = self.require_active_session(user_id, now).await?;
        session.resume(now)?;
        self.replace_session(session).await
    }

    async fn finish_workout(
        &self,
        user_id: UserID,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, WorkoutError> {
        let mut session = self.require_active_session(user_id, now).await?;
        if session.is_paused() {
            session.resume(now)?;
            session = self.replace_session(session).await?;
        }
        let session = log_on_error!(
            self.repository.finish_session(session.id, now),
            UpdateError,
            "finish",
            "workout session"
        )?;
        info!("finished workout session {}", *session.id);
        Ok(session)
    }

    async fn get_active_session(
        &self,
        user_id: UserID,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkoutSession>, WorkoutError> {
        let settings = self.get_settings(user_id).await?;
        self.active_session(user_id, &settings, now).await
    }

    async fn get_history(&self, user_id: UserID) -> Result<Vec<WorkoutSession>, WorkoutError> {
        let settings = self.get_settings(user_id).await?;
        Ok(log_on_error!(
            self.repository.read_history(user_id, settings.history_limit),
            ReadError,
            "get",
            "workout history"
        )?)
    }
}

impl<R> PlanService for Service<R>
where
    R: WorkoutSessionRepository + PlanRepository + SettingsRepository,
{
    async fn get_current_plan(
        &self,
        user_id: UserID,
    ) -> Result<Option<WeeklyPlan>, PlanServiceError> {
        Ok(log_on_error!(
            self.repository.read_current_plan(user_id),
            ReadError,
            "get",
            "current plan"
        )?)
    }

    async fn save_plan(
        &self,
        user_id: UserID,
        plan: WeeklyPlan,
    ) -> Result<WeeklyPlan, PlanServiceError> {
        plan.validate()?;
        self.write_plan(user_id, WeeklyPlan { user_id, ..plan }).await
    }

    async fn add_plan_day(
        &self,
        user_id: UserID,
        day: PlanDay,
    ) -> Result<WeeklyPlan, PlanServiceError> {
        self.mutate_plan(user_id, |plan| plan_merge::add_day(plan, day))
            .await
    }

    async fn edit_plan_day(
        &self,
        user_id: UserID,
        weekday: Weekday,
        changes: DayChanges,
    ) -> Result<WeeklyPlan, PlanServiceError> {
        self.mutate_plan(user_id, |plan| plan_merge::edit_day(plan, weekday, &changes))
            .await
    }

    async fn delete_plan_day(
        &self,
        user_id: UserID,
        weekday: Weekday,
    ) -> Result<WeeklyPlan, PlanServiceError> {
        self.mutate_plan(user_id, |plan| plan_merge::delete_day(plan, weekday))
            .await
    }

    async fn add_plan_exercise(
        &self,
        user_id: UserID,
        weekday: Weekday,
        exercise: PlanExercise,
    ) -> Result<WeeklyPlan, PlanServiceError> {
        self.mutate_plan(user_id, |plan| {
            plan_merge::add_exercise(plan, weekday, exercise)
        })
        .await
    }

    async fn edit_plan_exercise(
        &self,
        user_id: UserID,
        id: PlanExerciseID,
        changes: ExerciseChanges,
        now: DateTime<Utc>,
    ) -> Result<WeeklyPlan, PlanServiceError> {
        let edit = plan_merge::edit_exercise(&self.current_plan(user_id).await?, id, &changes)?;
        let Some(rename) = edit.rename else {
            return self.write_plan(user_id, edit.plan).await;
        };

        // Session first. A failed plan write restores the previous session.
        let settings = self.get_settings(user_id).await?;
        let mut previous_session = None;
        if let Some(session) = self.active_session(user_id, &settings, now).await? {
            let mut renamed_session = session.clone();
            let renamed = renamed_session.apply_rename(&rename);
            if renamed > 0 {
                self.replace_session(renamed_session).await?;
                debug!("renamed {renamed} sets from {} to {}", rename.from, rename.to);
                previous_session = Some(session);
            }
        }

        match self.write_plan(user_id, edit.plan).await {
            Ok(plan) => Ok(plan),
            Err(err) => {
                if let Some(session) = previous_session {
                    if let Err(restore_err) = self.replace_session(session).await {
                        error!("failed to restore workout session: {restore_err}");
                    }
                }
                Err(err)
            }
        }
    }

    async fn delete_plan_exercise(
        &self,
        user_id: UserID,
        id: PlanExerciseID,
    ) -> Result<WeeklyPlan, PlanServiceError> {
        self.mutate_plan(user_id, |plan| plan_merge::delete_exercise(plan, id))
            .await
    }

    async fn regenerate_plan(
        &self,
        user_id: UserID,
        text: &str,
        mode: MergeMode,
        generator: &impl PlanGenerator,
        catalog: &impl ExerciseCatalog,
    ) -> Result<WeeklyPlan, PlanServiceError> {
        let current = self.get_current_plan(user_id).await?;
        let history = self.get_history(user_id).await?;
        let request = PlanRequest {
            user_id,
            text: text.to_string(),
            context: PlanContext::new(current.as_ref(), &history),
        };

        let candidate = generator.generate(&request).await.inspect_err(|err| {
            error!("failed to generate plan: {err}");
        })?;
        let candidate = enrich_plan(catalog, &candidate).await;

        let plan = match current {
            Some(current) => plan_merge::regenerate(&current, &candidate, mode)?,
            None => {
                candidate.validate()?;
                WeeklyPlan {
                    user_id,
                    ..candidate
                }
            }
        };
        let plan = self.write_plan(user_id, plan).await?;
        info!("regenerated plan {}", plan.program_name);
        Ok(plan)
    }
}
