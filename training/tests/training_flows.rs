//! End-to-end flows through the store against in-memory services.
//!
//! These tests exercise the full dispatch → reducer → effect → terminal
//! action loop, including the cross-domain chains (plan-delete cascade,
//! record-to-rating) and the two scheduling policies.

use fitsync_core::entity::EntityUpdate;
use fitsync_core::environment::LogNotifier;
use fitsync_core::error::DataError;
use fitsync_runtime::Store;
use fitsync_testing::test_clock;
use fitsync_training::mocks::InMemoryEntityData;
use fitsync_training::model::{
    ActivityCategory, FragmentId, Level, LevelStats, MuscleGroup, PlanId, PlanSessionFragment,
    RecordId, SessionChanges, SessionFields, SessionId, SessionRating, TrainingPlan,
    TrainingRecord, TrainingSession, UserId, VideoPlatform, VideoRef, Visibility,
};
use fitsync_training::prelude::*;
use fitsync_training::reducers::TrainingReducer;
use std::sync::Arc;
use std::time::Duration;

type Sessions = InMemoryEntityData<TrainingSession>;
type Plans = InMemoryEntityData<TrainingPlan>;
type Fragments = InMemoryEntityData<PlanSessionFragment>;
type Records = InMemoryEntityData<TrainingRecord>;
type Env = TrainingEnvironment<Sessions, Plans, Fragments, Records, LogNotifier>;
type RootReducer = TrainingReducer<Sessions, Plans, Fragments, Records, LogNotifier>;
type TrainingStore = Store<TrainingState, TrainingAction, Env, RootReducer>;

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    store: TrainingStore,
    sessions: Sessions,
    plans: Plans,
    fragments: Fragments,
}

fn harness() -> Harness {
    let sessions = Sessions::new();
    let plans = Plans::new();
    // Fragment queries carry a plan_id equality clause.
    let fragments = Fragments::new().with_query_filter(|query, fragment: &PlanSessionFragment| {
        query.where_clauses.iter().all(|clause| {
            clause.property != "plan_id"
                || clause.value.as_str() == Some(fragment.plan_id.as_str())
        })
    });
    let records = Records::new();

    let env = Env::new(
        sessions.clone(),
        plans.clone(),
        fragments.clone(),
        records,
        LogNotifier,
        Arc::new(test_clock()),
    );
    let store = Store::new(TrainingState::default(), TrainingReducer::new(), env);

    Harness { store, sessions, plans, fragments }
}

fn session(id: &str, title: &str, channel: &str) -> TrainingSession {
    let now = chrono::Utc::now();
    TrainingSession {
        id: SessionId::new(id),
        title: title.to_string(),
        video: VideoRef {
            platform: VideoPlatform::Youtube,
            url: format!("https://youtube.example/watch?v={id}"),
            duration_seconds: 1500,
            channel: channel.to_string(),
        },
        complexity: LevelStats::new(Level::Low),
        intensity: LevelStats::new(Level::Moderate),
        equipment: false,
        muscle_groups: vec![MuscleGroup::Legs],
        activity_categories: vec![ActivityCategory::Strength],
        focus_tags: Vec::new(),
        visibility: Visibility::Public,
        creator_id: UserId::new("u-1"),
        created_at: now,
        updated_at: now,
    }
}

fn plan(id: &str, fragment_ids: Vec<&str>) -> TrainingPlan {
    let now = chrono::Utc::now();
    TrainingPlan {
        id: PlanId::new(id),
        title: format!("Plan {id}"),
        fragment_ids: fragment_ids.into_iter().map(FragmentId::new).collect(),
        visibility: Visibility::Private,
        creator_id: UserId::new("u-1"),
        created_at: now,
        updated_at: now,
    }
}

fn fragment(id: &str, plan_id: &str, session_id: &str) -> PlanSessionFragment {
    let now = chrono::Utc::now();
    PlanSessionFragment {
        id: FragmentId::new(id),
        plan_id: PlanId::new(plan_id),
        session_id: SessionId::new(session_id),
        week: 1,
        weekday: 1,
        order_index: 0,
        created_at: now,
        updated_at: now,
    }
}

fn title_update(id: &str, title: &str) -> EntityUpdate<TrainingSession> {
    EntityUpdate::new(
        SessionId::new(id),
        SessionChanges::Fields(SessionFields {
            title: Some(title.to_string()),
            ..SessionFields::default()
        }),
    )
}

#[tokio::test]
async fn fetch_all_synchronizes_the_catalog() {
    let h = harness();
    h.sessions.seed(vec![session("s-1", "Leg Day", "FitChan"), session("s-2", "Arm Blast", "Other")]);

    let result = h
        .store
        .send_and_wait_for(
            TrainingAction::Session(SessionAction::FetchAllRequested),
            |a| {
                matches!(
                    a,
                    TrainingAction::Session(
                        SessionAction::FetchAllCompleted { .. } | SessionAction::FetchAllFailed { .. }
                    )
                )
            },
            WAIT,
        )
        .await
        .unwrap();
    assert!(matches!(result, TrainingAction::Session(SessionAction::FetchAllCompleted { .. })));

    let (len, fetched, processing) = h
        .store
        .state(|s| (s.sessions.records.len(), s.sessions.fetched, s.sessions.fetch.processing()))
        .await;
    assert_eq!(len, 2);
    assert!(fetched);
    assert!(!processing);
}

#[tokio::test]
async fn rapid_updates_apply_in_submission_order() {
    let h = harness();
    h.sessions.seed(vec![session("s-1", "Original", "FitChan")]);
    h.store
        .send_and_wait_for(
            TrainingAction::Session(SessionAction::FetchAllRequested),
            |a| matches!(a, TrainingAction::Session(SessionAction::FetchAllCompleted { .. })),
            WAIT,
        )
        .await
        .unwrap();

    // The first write is slow, the second immediate; only the serial queue
    // keeps them in submission order.
    h.sessions.push_delay(Duration::from_millis(80));

    let mut first = h
        .store
        .send(TrainingAction::Session(SessionAction::UpdateRequested {
            update: title_update("s-1", "First"),
        }))
        .await
        .unwrap();
    let mut second = h
        .store
        .send(TrainingAction::Session(SessionAction::UpdateRequested {
            update: title_update("s-1", "Second"),
        }))
        .await
        .unwrap();

    first.wait_with_timeout(WAIT).await.unwrap();
    second.wait_with_timeout(WAIT).await.unwrap();

    let title = h
        .store
        .state(|s| s.sessions.records.get(&SessionId::new("s-1")).map(|x| x.title.clone()))
        .await;
    assert_eq!(title.as_deref(), Some("Second"));
    assert_eq!(h.sessions.snapshot()[0].title, "Second");
}

#[tokio::test]
async fn plan_delete_cascades_through_fragment_batch_delete() {
    let h = harness();
    h.plans.seed(vec![plan("p-1", vec!["f-1", "f-2"]), plan("p-2", vec!["f-3"])]);
    h.fragments.seed(vec![
        fragment("f-1", "p-1", "s-1"),
        fragment("f-2", "p-1", "s-2"),
        fragment("f-3", "p-2", "s-1"),
    ]);

    h.store
        .send_and_wait_for(
            TrainingAction::Plan(PlanAction::FetchAllRequested),
            |a| matches!(a, TrainingAction::Plan(PlanAction::FetchAllCompleted { .. })),
            WAIT,
        )
        .await
        .unwrap();
    h.store
        .send_and_wait_for(
            TrainingAction::Fragment(FragmentAction::FetchForPlanRequested {
                plan_id: PlanId::new("p-1"),
            }),
            |a| matches!(a, TrainingAction::Fragment(FragmentAction::FetchForPlanCompleted { .. })),
            WAIT,
        )
        .await
        .unwrap();

    // Deleting the plan must chain an explicit fragment batch delete.
    let result = h
        .store
        .send_and_wait_for(
            TrainingAction::Plan(PlanAction::DeleteRequested { id: PlanId::new("p-1") }),
            |a| matches!(a, TrainingAction::Fragment(FragmentAction::BatchDeleteCompleted { .. })),
            WAIT,
        )
        .await
        .unwrap();

    let TrainingAction::Fragment(FragmentAction::BatchDeleteCompleted { ids }) = result else {
        panic!("expected a batch delete completion");
    };
    assert_eq!(ids.len(), 2);

    // Only p-1's fragments were ever loaded; the cascade drained them all.
    let (plans_len, fragments_len) = h
        .store
        .state(|s| (s.plans.records.len(), s.fragments.records.len()))
        .await;
    assert_eq!(plans_len, 1);
    assert_eq!(fragments_len, 0);

    // The remote service saw the cascade too.
    let remaining: Vec<String> =
        h.fragments.snapshot().iter().map(|f| f.id.as_str().to_string()).collect();
    assert_eq!(remaining, ["f-3".to_string()]);
}

#[tokio::test]
async fn completed_session_record_feeds_the_rolling_average() {
    let h = harness();
    h.sessions.seed(vec![session("s-1", "Leg Day", "FitChan")]);
    h.store
        .send_and_wait_for(
            TrainingAction::Session(SessionAction::FetchAllRequested),
            |a| matches!(a, TrainingAction::Session(SessionAction::FetchAllCompleted { .. })),
            WAIT,
        )
        .await
        .unwrap();

    let record = TrainingRecord {
        id: RecordId::new("r-1"),
        session_id: SessionId::new("s-1"),
        user_id: UserId::new("u-1"),
        completed_at: chrono::Utc::now(),
        rating: Some(SessionRating { complexity: Level::High, intensity: Level::High }),
    };

    // Creating the receipt chains RateRequested -> RateCompleted.
    let result = h
        .store
        .send_and_wait_for(
            TrainingAction::Record(RecordAction::CreateRequested { record }),
            |a| {
                matches!(
                    a,
                    TrainingAction::Session(
                        SessionAction::RateCompleted { .. } | SessionAction::RateFailed { .. }
                    )
                )
            },
            WAIT,
        )
        .await
        .unwrap();
    assert!(matches!(result, TrainingAction::Session(SessionAction::RateCompleted { .. })));

    let (stored, record_count) = h
        .store
        .state(|s| {
            (
                s.sessions.records.get(&SessionId::new("s-1")).cloned(),
                s.records.records.len(),
            )
        })
        .await;
    let stored = stored.unwrap();
    assert_eq!(record_count, 1);
    assert_eq!(stored.complexity.rating_count, 1);
    assert!((stored.complexity.average - 3.0).abs() < f64::EPSILON);
    assert_eq!(stored.intensity.rating_count, 1);
}

#[tokio::test]
async fn failed_fetch_surfaces_error_and_keeps_prior_data() {
    let h = harness();
    h.sessions.seed(vec![session("s-1", "Leg Day", "FitChan")]);
    h.store
        .send_and_wait_for(
            TrainingAction::Session(SessionAction::FetchAllRequested),
            |a| matches!(a, TrainingAction::Session(SessionAction::FetchAllCompleted { .. })),
            WAIT,
        )
        .await
        .unwrap();

    h.sessions.fail_next(DataError::unavailable("offline"));
    let result = h
        .store
        .send_and_wait_for(
            TrainingAction::Session(SessionAction::FetchAllRequested),
            |a| {
                matches!(
                    a,
                    TrainingAction::Session(
                        SessionAction::FetchAllCompleted { .. } | SessionAction::FetchAllFailed { .. }
                    )
                )
            },
            WAIT,
        )
        .await
        .unwrap();
    assert!(matches!(result, TrainingAction::Session(SessionAction::FetchAllFailed { .. })));

    let (len, error, processing) = h
        .store
        .state(|s| {
            (
                s.sessions.records.len(),
                s.sessions.fetch.error().cloned(),
                s.sessions.fetch.processing(),
            )
        })
        .await;
    assert_eq!(len, 1, "prior data survives a failed refresh");
    assert!(error.is_some_and(|e| e.is_transient()));
    assert!(!processing);
}

#[tokio::test]
async fn purge_resets_the_slice_for_logout() {
    let h = harness();
    h.sessions.seed(vec![session("s-1", "Leg Day", "FitChan")]);
    h.store
        .send_and_wait_for(
            TrainingAction::Session(SessionAction::FetchAllRequested),
            |a| matches!(a, TrainingAction::Session(SessionAction::FetchAllCompleted { .. })),
            WAIT,
        )
        .await
        .unwrap();

    let mut handle = h
        .store
        .send(TrainingAction::Session(SessionAction::Purged))
        .await
        .unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    let (len, fetched) = h.store.state(|s| (s.sessions.records.len(), s.sessions.fetched)).await;
    assert_eq!(len, 0);
    assert!(!fetched);
}
