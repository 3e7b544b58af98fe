use assert_approx_eq::assert_approx_eq;
use buddygym_domain::{
    self as domain, PlanRepository, PlanService, SettingsRepository, SettingsService,
    WorkoutService, WorkoutSessionRepository,
};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use pretty_assertions::assert_eq;

use crate::InMemory;
use crate::tests::data::{NOW, PLAN, USER_ID, USER_ID_2};

fn service() -> domain::Service<InMemory> {
    domain::Service::new(InMemory::new())
}

fn input(
    exercise: &str,
    weight: f32,
    unit: Option<domain::Unit>,
    reps: u32,
) -> domain::SetInput {
    domain::SetInput {
        exercise: exercise.to_string(),
        weight,
        unit,
        reps,
        rpe: None,
        is_warmup: false,
        is_completed: true,
    }
}

async fn set_policy(service: &domain::Service<InMemory>, policy: domain::ActiveSessionPolicy) {
    service
        .set_settings(
            *USER_ID,
            domain::Settings {
                active_session_policy: policy,
                ..domain::Settings::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_log_set_starts_quick_log() {
    let service = service();

    let logged = service
        .log_set(*USER_ID, input("Squat", 100.0, Some(domain::Unit::Lbs), 5), *NOW)
        .await
        .unwrap();

    assert_eq!(logged.session.title.as_deref(), Some(domain::QUICK_LOG_TITLE));
    assert_eq!(logged.session.sets, vec![logged.set.clone()]);
    assert_approx_eq!(logged.set.weight.kg(), 45.36, 0.01);
    assert_eq!(logged.set.weight.input_value(), 100.0);
    assert_eq!(logged.set.weight.display(domain::Unit::Kg), 45.4);
    assert!(!logged.is_personal_record);

    let active = service
        .get_active_session(*USER_ID, *NOW)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, logged.session.id);
}

#[tokio::test]
async fn test_log_set_personal_record() {
    let service = service();
    let sets = [(100.0, 5), (105.0, 5), (100.0, 3), (105.0, 5)];

    let mut records = vec![];
    for (minutes, (weight, reps)) in (0..).step_by(5).zip(sets) {
        records.push(
            service
                .log_set(
                    *USER_ID,
                    input("Squat", weight, None, reps),
                    *NOW + Duration::minutes(minutes),
                )
                .await
                .unwrap()
                .is_personal_record,
        );
    }

    assert_eq!(records, vec![false, true, false, false]);
}

#[tokio::test]
async fn test_log_set_personal_record_same_timestamp() {
    let service = service();

    let first = service
        .log_set(*USER_ID, input("Squat", 100.0, None, 5), *NOW)
        .await
        .unwrap();
    let second = service
        .log_set(*USER_ID, input("Squat", 110.0, None, 5), *NOW)
        .await
        .unwrap();

    assert!(!first.is_personal_record);
    assert!(second.is_personal_record);
}

#[tokio::test]
async fn test_log_set_uses_display_unit() {
    let service = service();
    service
        .set_settings(
            *USER_ID,
            domain::Settings {
                display_unit: domain::Unit::Lbs,
                ..domain::Settings::default()
            },
        )
        .await
        .unwrap();

    let logged = service
        .log_set(*USER_ID, input("Bench Press", 135.0, None, 5), *NOW)
        .await
        .unwrap();

    assert_eq!(logged.set.weight.input_unit(), domain::Unit::Lbs);
}

#[tokio::test]
async fn test_log_set_invalid() {
    let service = service();

    assert!(matches!(
        service
            .log_set(*USER_ID, input("Squat", 100.0, None, 0), *NOW)
            .await,
        Err(domain::WorkoutError::InvalidSet(
            domain::SetError::InvalidReps(_)
        ))
    ));
    assert!(matches!(
        service
            .log_set(*USER_ID, input("Squat", -5.0, None, 5), *NOW)
            .await,
        Err(domain::WorkoutError::InvalidSet(
            domain::SetError::InvalidWeight(_)
        ))
    ));
    assert_eq!(
        service.get_active_session(*USER_ID, *NOW).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_log_set_links_plan_exercise() {
    let service = service();
    let plan = service.save_plan(*USER_ID, PLAN.clone()).await.unwrap();

    let logged = service
        .log_set(*USER_ID, input("squat", 60.0, None, 5), *NOW)
        .await
        .unwrap();

    assert_eq!(
        logged.set.plan_exercise_id,
        Some(plan.days[0].exercises[0].id)
    );
}

#[tokio::test]
async fn test_start_workout_resume() {
    let service = service();

    let session = service
        .start_workout(*USER_ID, Some("Push"), *NOW)
        .await
        .unwrap();
    let resumed = service
        .start_workout(*USER_ID, Some("Pull"), *NOW + Duration::minutes(1))
        .await
        .unwrap();

    assert_eq!(resumed, session);
}

#[tokio::test]
async fn test_start_workout_reject() {
    let service = service();
    set_policy(&service, domain::ActiveSessionPolicy::Reject).await;

    service.start_workout(*USER_ID, None, *NOW).await.unwrap();

    assert!(matches!(
        service
            .start_workout(*USER_ID, None, *NOW + Duration::minutes(1))
            .await,
        Err(domain::WorkoutError::SessionAlreadyActive)
    ));
}

#[tokio::test]
async fn test_start_workout_finish_and_start_new() {
    let service = service();
    set_policy(&service, domain::ActiveSessionPolicy::FinishAndStartNew).await;

    let first = service.start_workout(*USER_ID, None, *NOW).await.unwrap();
    let second = service
        .start_workout(*USER_ID, None, *NOW + Duration::minutes(1))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    let history = service.get_history(*USER_ID).await.unwrap();
    assert_eq!(
        history.iter().map(|s| s.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );
    assert_eq!(history[1].ended_at, Some(*NOW + Duration::minutes(1)));
    assert!(history[0].is_active());
}

#[tokio::test]
async fn test_idle_session_is_closed() {
    let service = service();
    let session = service.start_workout(*USER_ID, None, *NOW).await.unwrap();

    assert!(
        service
            .get_active_session(*USER_ID, *NOW + Duration::hours(1))
            .await
            .unwrap()
            .is_some()
    );
    assert_eq!(
        service
            .get_active_session(*USER_ID, *NOW + Duration::hours(3))
            .await
            .unwrap(),
        None
    );

    let history = service.get_history(*USER_ID).await.unwrap();
    assert_eq!(history[0].id, session.id);
    assert_eq!(history[0].ended_at, Some(*NOW));
}

#[tokio::test]
async fn test_pause_resume_finish() {
    let service = service();
    service.start_workout(*USER_ID, None, *NOW).await.unwrap();

    let paused = service
        .pause_workout(*USER_ID, *NOW + Duration::minutes(10))
        .await
        .unwrap();
    assert!(paused.is_paused());
    assert!(matches!(
        service
            .pause_workout(*USER_ID, *NOW + Duration::minutes(11))
            .await,
        Err(domain::WorkoutError::Session(
            domain::SessionError::AlreadyPaused
        ))
    ));

    let finished = service
        .finish_workout(*USER_ID, *NOW + Duration::minutes(30))
        .await
        .unwrap();
    assert!(!finished.is_active());
    assert_eq!(finished.paused, Duration::minutes(20));
    assert_eq!(
        finished.duration(*NOW + Duration::hours(5)),
        Duration::minutes(10)
    );

    assert!(matches!(
        service
            .resume_workout(*USER_ID, *NOW + Duration::minutes(31))
            .await,
        Err(domain::WorkoutError::NoActiveSession)
    ));
}

#[tokio::test]
async fn test_edit_toggle_delete_set() {
    let service = service();
    let logged = service
        .log_set(
            *USER_ID,
            domain::SetInput {
                is_completed: false,
                ..input("Row", 60.0, None, 8)
            },
            *NOW,
        )
        .await
        .unwrap();
    let set_id = logged.set.id;

    let toggled = service
        .toggle_set_completion(*USER_ID, set_id, *NOW)
        .await
        .unwrap();
    assert!(toggled.set.is_completed);

    let edited = service
        .edit_set(
            *USER_ID,
            set_id,
            domain::SetEdit {
                reps: Some(10),
                ..domain::SetEdit::default()
            },
            *NOW,
        )
        .await
        .unwrap();
    assert_eq!(u32::from(edited.reps), 10);
    assert!(edited.is_completed);

    let session = service.delete_set(*USER_ID, set_id, *NOW).await.unwrap();
    assert_eq!(session.sets, vec![]);
    assert!(matches!(
        service.delete_set(*USER_ID, set_id, *NOW).await,
        Err(domain::WorkoutError::SetNotFound(id)) if id == set_id
    ));
}

#[tokio::test]
async fn test_get_history_limit() {
    let service = service();
    service
        .set_settings(
            *USER_ID,
            domain::Settings {
                history_limit: 1,
                ..domain::Settings::default()
            },
        )
        .await
        .unwrap();

    service.start_workout(*USER_ID, None, *NOW).await.unwrap();
    service.finish_workout(*USER_ID, *NOW).await.unwrap();
    let latest = service
        .start_workout(*USER_ID, None, *NOW + Duration::days(1))
        .await
        .unwrap();

    assert_eq!(service.get_history(*USER_ID).await.unwrap(), vec![latest]);
}

#[tokio::test]
async fn test_settings() {
    let service = service();
    assert_eq!(
        service.get_settings(*USER_ID).await.unwrap(),
        domain::Settings::default()
    );

    assert!(matches!(
        service
            .set_settings(
                *USER_ID,
                domain::Settings {
                    utc_offset_minutes: 24 * 60,
                    ..domain::Settings::default()
                }
            )
            .await,
        Err(domain::UpdateError::Other(_))
    ));
    assert_eq!(
        service.get_settings(*USER_ID).await.unwrap(),
        domain::Settings::default()
    );
}

#[tokio::test]
async fn test_storage_unavailable() {
    let storage = InMemory::new();
    storage.set_available(false);
    let service = domain::Service::new(storage);

    assert!(matches!(
        service
            .log_set(*USER_ID, input("Squat", 100.0, None, 5), *NOW)
            .await,
        Err(domain::WorkoutError::Read(domain::ReadError::Storage(
            domain::StorageError::Unavailable
        )))
    ));
    assert!(matches!(
        service.get_current_plan(*USER_ID).await,
        Err(domain::PlanServiceError::Read(domain::ReadError::Storage(
            domain::StorageError::Unavailable
        )))
    ));
}

#[tokio::test]
async fn test_plan_mutations() {
    let service = service();

    assert!(matches!(
        service
            .delete_plan_day(*USER_ID, domain::Weekday::Mon)
            .await,
        Err(domain::PlanServiceError::NoCurrentPlan)
    ));

    service.save_plan(*USER_ID, PLAN.clone()).await.unwrap();

    let plan = service
        .add_plan_day(
            *USER_ID,
            domain::PlanDay::new(domain::Weekday::Sat, None, "Conditioning"),
        )
        .await
        .unwrap();
    assert_eq!(plan.days.len(), 4);

    assert!(matches!(
        service
            .add_plan_day(
                *USER_ID,
                domain::PlanDay::new(domain::Weekday::Mon, None, "Arms"),
            )
            .await,
        Err(domain::PlanServiceError::InvalidPlan(
            domain::PlanError::DuplicateWeekday(domain::Weekday::Mon)
        ))
    ));
    assert_eq!(
        service.get_current_plan(*USER_ID).await.unwrap(),
        Some(plan)
    );

    let plan = service
        .edit_plan_day(
            *USER_ID,
            domain::Weekday::Wed,
            domain::DayChanges {
                weekday: Some(domain::Weekday::Thu),
                time: Some(NaiveTime::from_hms_opt(7, 0, 0)),
                focus: None,
            },
        )
        .await
        .unwrap();
    let thursday = plan.day(domain::Weekday::Thu).unwrap();
    assert_eq!(thursday.time, NaiveTime::from_hms_opt(7, 0, 0));
    assert_eq!(thursday.exercises.len(), 3);

    let plan = service
        .delete_plan_day(*USER_ID, domain::Weekday::Sat)
        .await
        .unwrap();
    assert_eq!(plan.day(domain::Weekday::Sat), None);

    let plan = service
        .delete_plan_exercise(*USER_ID, PLAN.days[0].exercises[2].id)
        .await
        .unwrap();
    assert_eq!(plan.days[0].exercises.len(), 2);
}

#[tokio::test]
async fn test_edit_plan_exercise_renames_active_sets() {
    let service = service();
    let plan = service.save_plan(*USER_ID, PLAN.clone()).await.unwrap();
    let squat = plan.days[0].exercises[0].id;

    service
        .log_set(*USER_ID, input("Squat", 100.0, None, 5), *NOW)
        .await
        .unwrap();
    service
        .log_set(*USER_ID, input("Row", 60.0, None, 8), *NOW)
        .await
        .unwrap();

    let plan = service
        .edit_plan_exercise(
            *USER_ID,
            squat,
            domain::ExerciseChanges {
                name: Some("Back Squat".to_string()),
                ..domain::ExerciseChanges::default()
            },
            *NOW + Duration::minutes(5),
        )
        .await
        .unwrap();
    let (_, exercise) = plan.find_exercise(squat).unwrap();
    assert_eq!(exercise.name.to_string(), "Back Squat");
    assert_eq!(exercise.origin, domain::EntryOrigin::ManuallyEdited);

    let session = service
        .get_active_session(*USER_ID, *NOW + Duration::minutes(5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        session
            .sets
            .iter()
            .map(|s| s.exercise_name.to_string())
            .collect::<Vec<_>>(),
        vec!["Back Squat", "Row"]
    );
}

async fn add_friday_squat(service: &domain::Service<InMemory>) -> domain::PlanExerciseID {
    service.save_plan(*USER_ID, PLAN.clone()).await.unwrap();
    let plan = service
        .add_plan_exercise(
            *USER_ID,
            domain::Weekday::Fri,
            domain::PlanExercise::new("Squat", 3, "8", domain::EntryOrigin::ManuallyAdded)
                .unwrap(),
        )
        .await
        .unwrap();
    plan.day(domain::Weekday::Fri)
        .unwrap()
        .find_by_name(&domain::Name::new("Squat").unwrap())
        .unwrap()
        .id
}

fn rename_to(name: &str) -> domain::ExerciseChanges {
    domain::ExerciseChanges {
        name: Some(name.to_string()),
        ..domain::ExerciseChanges::default()
    }
}

#[tokio::test]
async fn test_edit_plan_exercise_planned_on_two_days() {
    let service = service();
    let friday_squat = add_friday_squat(&service).await;
    let friday = *NOW + Duration::days(4);

    let logged = service
        .log_set(*USER_ID, input("Squat", 100.0, None, 5), friday)
        .await
        .unwrap();
    assert_eq!(logged.set.plan_exercise_id, Some(friday_squat));

    service
        .edit_plan_exercise(
            *USER_ID,
            friday_squat,
            rename_to("Back Squat"),
            friday + Duration::minutes(5),
        )
        .await
        .unwrap();

    let session = service
        .get_active_session(*USER_ID, friday + Duration::minutes(5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        session
            .sets
            .iter()
            .map(|s| s.exercise_name.to_string())
            .collect::<Vec<_>>(),
        vec!["Back Squat"]
    );
}

#[tokio::test]
async fn test_log_set_links_plan_exercise_of_local_weekday() {
    let service = service();
    let friday_squat = add_friday_squat(&service).await;
    service
        .set_settings(
            *USER_ID,
            domain::Settings {
                utc_offset_minutes: 120,
                ..domain::Settings::default()
            },
        )
        .await
        .unwrap();

    // Thursday 23:00 UTC is Friday 01:00 local time.
    let logged = service
        .log_set(
            *USER_ID,
            input("Squat", 100.0, None, 5),
            *NOW + Duration::days(3) + Duration::hours(5),
        )
        .await
        .unwrap();
    assert_eq!(logged.set.plan_exercise_id, Some(friday_squat));

    let logged = service
        .log_set(
            *USER_ID_2,
            input("Squat", 100.0, None, 5),
            *NOW + Duration::days(3) + Duration::hours(5),
        )
        .await
        .unwrap();
    assert_eq!(logged.set.plan_exercise_id, None);
}

/// Storage whose session writes fail.
struct SessionWriteFailure(InMemory);

impl PlanRepository for SessionWriteFailure {
    async fn read_current_plan(
        &self,
        user_id: domain::UserID,
    ) -> Result<Option<domain::WeeklyPlan>, domain::ReadError> {
        self.0.read_current_plan(user_id).await
    }

    async fn write_plan(
        &self,
        user_id: domain::UserID,
        plan: domain::WeeklyPlan,
    ) -> Result<domain::WeeklyPlan, domain::UpdateError> {
        self.0.write_plan(user_id, plan).await
    }
}

impl WorkoutSessionRepository for SessionWriteFailure {
    async fn read_active_session(
        &self,
        user_id: domain::UserID,
    ) -> Result<Option<domain::WorkoutSession>, domain::ReadError> {
        self.0.read_active_session(user_id).await
    }

    async fn create_session(
        &self,
        session: domain::WorkoutSession,
    ) -> Result<domain::WorkoutSession, domain::CreateError> {
        self.0.create_session(session).await
    }

    async fn replace_session(
        &self,
        _: domain::WorkoutSession,
    ) -> Result<domain::WorkoutSession, domain::UpdateError> {
        Err(domain::UpdateError::Storage(
            domain::StorageError::Unavailable,
        ))
    }

    async fn append_set(
        &self,
        session_id: domain::WorkoutSessionID,
        set: domain::SetRecord,
    ) -> Result<domain::SetRecord, domain::CreateError> {
        self.0.append_set(session_id, set).await
    }

    async fn replace_set(
        &self,
        session_id: domain::WorkoutSessionID,
        set: domain::SetRecord,
    ) -> Result<domain::SetRecord, domain::UpdateError> {
        self.0.replace_set(session_id, set).await
    }

    async fn delete_set(
        &self,
        session_id: domain::WorkoutSessionID,
        set_id: domain::SetID,
    ) -> Result<domain::SetID, domain::DeleteError> {
        self.0.delete_set(session_id, set_id).await
    }

    async fn finish_session(
        &self,
        session_id: domain::WorkoutSessionID,
        ended_at: DateTime<Utc>,
    ) -> Result<domain::WorkoutSession, domain::UpdateError> {
        self.0.finish_session(session_id, ended_at).await
    }

    async fn read_history(
        &self,
        user_id: domain::UserID,
        limit: usize,
    ) -> Result<Vec<domain::WorkoutSession>, domain::ReadError> {
        self.0.read_history(user_id, limit).await
    }
}

impl SettingsRepository for SessionWriteFailure {
    async fn read_settings(
        &self,
        user_id: domain::UserID,
    ) -> Result<domain::Settings, domain::ReadError> {
        self.0.read_settings(user_id).await
    }

    async fn write_settings(
        &self,
        user_id: domain::UserID,
        settings: domain::Settings,
    ) -> Result<domain::Settings, domain::UpdateError> {
        self.0.write_settings(user_id, settings).await
    }
}

#[tokio::test]
async fn test_edit_plan_exercise_session_write_failure_changes_nothing() {
    let service = domain::Service::new(SessionWriteFailure(InMemory::new()));
    let plan = service.save_plan(*USER_ID, PLAN.clone()).await.unwrap();
    let squat = plan.days[0].exercises[0].id;
    let logged = service
        .log_set(*USER_ID, input("Squat", 100.0, None, 5), *NOW)
        .await
        .unwrap();

    assert!(matches!(
        service
            .edit_plan_exercise(
                *USER_ID,
                squat,
                rename_to("Back Squat"),
                *NOW + Duration::minutes(5),
            )
            .await,
        Err(domain::PlanServiceError::Workout(
            domain::WorkoutError::Update(domain::UpdateError::Storage(
                domain::StorageError::Unavailable
            ))
        ))
    ));
    assert_eq!(
        service.get_current_plan(*USER_ID).await.unwrap(),
        Some(plan)
    );
    assert_eq!(
        service
            .get_active_session(*USER_ID, *NOW + Duration::minutes(5))
            .await
            .unwrap()
            .unwrap()
            .sets,
        vec![logged.set]
    );
}

#[tokio::test]
async fn test_regenerate_plan_preserve_edits() {
    let service = service();
    service.save_plan(*USER_ID, PLAN.clone()).await.unwrap();
    service
        .add_plan_exercise(
            *USER_ID,
            domain::Weekday::Mon,
            domain::PlanExercise::new("Face Pull", 3, "15", domain::EntryOrigin::Generated)
                .unwrap(),
        )
        .await
        .unwrap();

    let plan = service
        .regenerate_plan(
            *USER_ID,
            "3 days, barbell",
            domain::MergeMode::PreserveEdits,
            &domain::FallbackPlanGenerator,
            &domain::StaticCatalog,
        )
        .await
        .unwrap();

    assert_eq!(plan.id, PLAN.id);
    let monday = plan.day(domain::Weekday::Mon).unwrap();
    assert_eq!(
        monday
            .exercises
            .iter()
            .map(|e| (e.name.to_string(), e.origin))
            .collect::<Vec<_>>(),
        vec![
            ("Squat".to_string(), domain::EntryOrigin::Generated),
            ("Bench Press".to_string(), domain::EntryOrigin::Generated),
            ("Row".to_string(), domain::EntryOrigin::Generated),
            ("Face Pull".to_string(), domain::EntryOrigin::ManuallyAdded),
        ]
    );
    assert_eq!(
        monday.exercises[0].exercise_db_id,
        Some(domain::CatalogID::from("0001"))
    );
    assert_eq!(
        service.get_current_plan(*USER_ID).await.unwrap(),
        Some(plan)
    );
}

#[tokio::test]
async fn test_regenerate_plan_replace() {
    let service = service();
    service.save_plan(*USER_ID, PLAN.clone()).await.unwrap();
    service
        .add_plan_exercise(
            *USER_ID,
            domain::Weekday::Mon,
            domain::PlanExercise::new("Face Pull", 3, "15", domain::EntryOrigin::Generated)
                .unwrap(),
        )
        .await
        .unwrap();

    let plan = service
        .regenerate_plan(
            *USER_ID,
            "3 days, barbell",
            domain::MergeMode::Replace,
            &domain::FallbackPlanGenerator,
            &domain::StaticCatalog,
        )
        .await
        .unwrap();

    assert_eq!(plan.num_sets(), 25);
}

#[tokio::test]
async fn test_regenerate_plan_without_current_plan() {
    let service = service();

    let plan = service
        .regenerate_plan(
            *USER_ID,
            "anything",
            domain::MergeMode::PreserveEdits,
            &domain::FallbackPlanGenerator,
            &domain::StaticCatalog,
        )
        .await
        .unwrap();

    assert_eq!(plan.user_id, *USER_ID);
    assert_eq!(
        service.get_current_plan(*USER_ID).await.unwrap(),
        Some(plan)
    );
}

struct FailingGenerator;

impl domain::PlanGenerator for FailingGenerator {
    async fn generate(
        &self,
        _: &domain::PlanRequest,
    ) -> Result<domain::WeeklyPlan, domain::GenerationError> {
        Err(domain::GenerationError::ConstraintExtractionFailed(
            "no days given".to_string(),
        ))
    }
}

#[tokio::test]
async fn test_regenerate_plan_generation_failed() {
    let service = service();
    service.save_plan(*USER_ID, PLAN.clone()).await.unwrap();

    assert!(matches!(
        service
            .regenerate_plan(
                *USER_ID,
                "something",
                domain::MergeMode::Replace,
                &FailingGenerator,
                &domain::StaticCatalog,
            )
            .await,
        Err(domain::PlanServiceError::Generation(
            domain::GenerationError::ConstraintExtractionFailed(_)
        ))
    ));
    assert_eq!(
        service.get_current_plan(*USER_ID).await.unwrap(),
        Some(PLAN.clone())
    );
}

#[tokio::test]
async fn test_repository_keeps_finished_session_sets() {
    let storage = InMemory::new();
    let service = domain::Service::new(storage);
    let logged = service
        .log_set(*USER_ID, input("Deadlift", 140.0, None, 3), *NOW)
        .await
        .unwrap();
    service.finish_workout(*USER_ID, *NOW).await.unwrap();

    let history = service.get_history(*USER_ID).await.unwrap();
    assert_eq!(history[0].sets, vec![logged.set]);
    assert_eq!(history[0].summary(*NOW).completed_sets, 1);
}

#[tokio::test]
async fn test_read_active_session_prefers_latest() {
    let storage = InMemory::new();
    let older = domain::WorkoutSession::start(*USER_ID, None, *NOW - Duration::hours(1));
    let newer = domain::WorkoutSession::start(*USER_ID, None, *NOW);
    storage.create_session(older).await.unwrap();
    storage.create_session(newer.clone()).await.unwrap();

    assert_eq!(
        storage.read_active_session(*USER_ID).await.unwrap(),
        Some(newer)
    );
}
