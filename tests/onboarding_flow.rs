//! Integration tests for the onboarding flow.
//!
//! Each test drives an `OnboardingController` against a real in-memory
//! libSQL store, optionally wrapped to inject failures or hold a save open.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Months, NaiveDate, Utc};
use tokio::sync::Notify;
use tokio::time::timeout;

use fit_onboard::error::{CommitError, DatabaseError};
use fit_onboard::onboarding::validation;
use fit_onboard::onboarding::{
    ActivityLevel, AdvanceOutcome, CompletionFlag, FitnessGoal, FlowEvent, LaunchRoute,
    LaunchRouter, OnboardingController, OnboardingStep, PersistedProfile, SummaryView,
};
use fit_onboard::store::{Database, LibSqlBackend, PersistenceGateway};

/// Maximum time any test is allowed to wait before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Store wrapper that can refuse profile writes or hold them open.
struct StubStore {
    inner: LibSqlBackend,
    fail_inserts: AtomicBool,
    insert_attempts: AtomicUsize,
    hold: Option<(Notify, Notify)>,
}

impl StubStore {
    async fn new() -> Self {
        Self {
            inner: LibSqlBackend::new_memory().await.unwrap(),
            fail_inserts: AtomicBool::new(false),
            insert_attempts: AtomicUsize::new(0),
            hold: None,
        }
    }

    async fn holding() -> Self {
        Self {
            hold: Some((Notify::new(), Notify::new())),
            ..Self::new().await
        }
    }

    fn entered(&self) -> &Notify {
        &self.hold.as_ref().unwrap().0
    }

    fn release(&self) -> &Notify {
        &self.hold.as_ref().unwrap().1
    }
}

#[async_trait]
impl Database for StubStore {
    async fn init_schema(&self) -> Result<(), DatabaseError> {
        self.inner.init_schema().await
    }

    async fn insert_profile(&self, profile: &PersistedProfile) -> Result<(), DatabaseError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some((entered, release)) = &self.hold {
            entered.notify_one();
            release.notified().await;
        }
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(DatabaseError::Pool("storage unavailable".to_string()));
        }
        self.inner.insert_profile(profile).await
    }

    async fn get_profile(&self) -> Result<Option<PersistedProfile>, DatabaseError> {
        self.inner.get_profile().await
    }

    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>, DatabaseError> {
        self.inner.get_setting(key).await
    }

    async fn set_setting(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), DatabaseError> {
        self.inner.set_setting(key, value).await
    }
}

fn years_ago(years: u32) -> NaiveDate {
    validation::today()
        .checked_sub_months(Months::new(years * 12))
        .unwrap()
}

async fn memory_db() -> Arc<dyn Database> {
    Arc::new(LibSqlBackend::new_memory().await.unwrap())
}

/// Fill in every field and walk forward to the terms step.
async fn walk_to_terms(ctrl: &OnboardingController) {
    let expected = [
        OnboardingStep::Goal,
        OnboardingStep::DateOfBirth,
        OnboardingStep::Activity,
        OnboardingStep::Terms,
    ];

    ctrl.edit(|d| d.set_name("Ada")).await;
    for to in expected {
        match to {
            OnboardingStep::DateOfBirth => ctrl.edit(|d| d.set_fitness_goal(FitnessGoal::GainMuscle)).await,
            OnboardingStep::Activity => ctrl.edit(|d| d.set_date_of_birth(years_ago(25))).await,
            OnboardingStep::Terms => ctrl.edit(|d| d.set_activity_level(ActivityLevel::Very)).await,
            _ => {}
        }
        match ctrl.advance().await.unwrap() {
            AdvanceOutcome::Moved { to: moved_to, .. } => assert_eq!(moved_to, to),
            other => panic!("expected move to {to}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn happy_path_commits_profile_and_flag() {
    let db = memory_db().await;
    let session_start = Utc::now();
    let ctrl = OnboardingController::new(Arc::clone(&db));

    walk_to_terms(&ctrl).await;
    ctrl.edit(|d| d.set_agreed_to_terms(true)).await;

    let profile = match ctrl.advance().await.unwrap() {
        AdvanceOutcome::Completed(profile) => profile,
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(ctrl.current_step().await, OnboardingStep::Complete);
    assert!(CompletionFlag::new(Arc::clone(&db)).is_set().await.unwrap());

    let stored = PersistenceGateway::new(db)
        .fetch_latest()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, profile.id);
    assert_eq!(stored.name, "Ada");
    assert_eq!(stored.fitness_goal, FitnessGoal::GainMuscle);
    assert_eq!(stored.date_of_birth, years_ago(25));
    assert_eq!(stored.activity_level, ActivityLevel::Very);
    assert!(stored.agreed_to_terms);
    assert!(stored.onboarding_completed_date >= session_start);
}

#[tokio::test]
async fn empty_name_blocks_repeatedly() {
    let ctrl = OnboardingController::new(memory_db().await);
    for _ in 0..10 {
        assert!(matches!(
            ctrl.advance().await.unwrap(),
            AdvanceOutcome::Blocked(OnboardingStep::Name)
        ));
        assert_eq!(ctrl.current_step().await, OnboardingStep::Name);
    }

    ctrl.edit(|d| d.set_name(" \t ")).await;
    assert!(matches!(
        ctrl.advance().await.unwrap(),
        AdvanceOutcome::Blocked(OnboardingStep::Name)
    ));
}

#[tokio::test]
async fn terms_must_be_agreed_before_commit() {
    let db = memory_db().await;
    let ctrl = OnboardingController::new(Arc::clone(&db));
    walk_to_terms(&ctrl).await;

    assert!(matches!(
        ctrl.advance().await.unwrap(),
        AdvanceOutcome::Blocked(OnboardingStep::Terms)
    ));
    assert!(matches!(
        ctrl.commit().await.unwrap_err(),
        CommitError::TermsNotAccepted
    ));
    assert!(db.get_profile().await.unwrap().is_none());
    assert!(!CompletionFlag::new(Arc::clone(&db)).is_set().await.unwrap());

    ctrl.edit(|d| d.set_agreed_to_terms(true)).await;
    ctrl.commit().await.unwrap();
    assert!(db.get_profile().await.unwrap().is_some());
    assert!(CompletionFlag::new(db).is_set().await.unwrap());
}

#[tokio::test]
async fn go_back_never_touches_the_draft() {
    let ctrl = OnboardingController::new(memory_db().await);
    walk_to_terms(&ctrl).await;
    ctrl.edit(|d| d.set_agreed_to_terms(true)).await;
    let before = ctrl.draft().await;

    let mut rx = ctrl.subscribe();
    let back = [
        OnboardingStep::Activity,
        OnboardingStep::DateOfBirth,
        OnboardingStep::Goal,
        OnboardingStep::Name,
    ];
    for expected in back {
        assert_eq!(ctrl.go_back().await, Some(expected));
        assert_eq!(ctrl.draft().await, before);
        assert!(matches!(
            rx.recv().await.unwrap(),
            FlowEvent::StepChanged { to, .. } if to == expected
        ));
    }
    assert_eq!(ctrl.go_back().await, None);
    assert_eq!(ctrl.draft().await, before);
}

#[tokio::test]
async fn second_commit_is_rejected() {
    let db = memory_db().await;
    let ctrl = OnboardingController::new(Arc::clone(&db));
    walk_to_terms(&ctrl).await;
    ctrl.edit(|d| d.set_agreed_to_terms(true)).await;

    let first = ctrl.commit().await.unwrap();
    assert!(matches!(
        ctrl.commit().await.unwrap_err(),
        CommitError::AlreadyCompleted
    ));

    // A fresh session over the same store cannot add a second record either.
    let again = OnboardingController::new(Arc::clone(&db));
    walk_to_terms(&again).await;
    again.edit(|d| d.set_agreed_to_terms(true)).await;
    assert!(matches!(
        again.advance().await.unwrap_err(),
        CommitError::AlreadyCompleted
    ));

    assert_eq!(db.get_profile().await.unwrap().unwrap().id, first.id);
}

#[tokio::test]
async fn failed_commit_keeps_draft_and_allows_retry() {
    let store = Arc::new(StubStore::new().await);
    store.fail_inserts.store(true, Ordering::SeqCst);
    let db: Arc<dyn Database> = store.clone();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let ctrl = OnboardingController::new(Arc::clone(&db)).with_completion(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    walk_to_terms(&ctrl).await;
    ctrl.edit(|d| d.set_agreed_to_terms(true)).await;
    let draft = ctrl.draft().await;
    let mut rx = ctrl.subscribe();

    let err = ctrl.advance().await.unwrap_err();
    assert!(matches!(err, CommitError::Store(DatabaseError::Pool(_))));
    assert!(matches!(
        rx.recv().await.unwrap(),
        FlowEvent::CommitFailed { ref reason } if reason.contains("storage unavailable")
    ));
    assert_eq!(ctrl.current_step().await, OnboardingStep::Terms);
    assert_eq!(ctrl.draft().await, draft);
    assert!(!CompletionFlag::new(Arc::clone(&db)).is_set().await.unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    store.fail_inserts.store(false, Ordering::SeqCst);
    let profile = ctrl.commit().await.unwrap();
    assert_eq!(profile.name, "Ada");
    assert_eq!(store.insert_attempts.load(Ordering::SeqCst), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(CompletionFlag::new(db).is_set().await.unwrap());
}

#[tokio::test]
async fn concurrent_commit_is_rejected_while_first_is_in_flight() {
    let store = Arc::new(StubStore::holding().await);
    let db: Arc<dyn Database> = store.clone();
    let ctrl = Arc::new(OnboardingController::new(Arc::clone(&db)));

    walk_to_terms(&ctrl).await;
    ctrl.edit(|d| d.set_agreed_to_terms(true)).await;

    let first = {
        let ctrl = Arc::clone(&ctrl);
        tokio::spawn(async move { ctrl.commit().await })
    };
    timeout(TEST_TIMEOUT, store.entered().notified())
        .await
        .expect("first commit never reached the store");

    assert!(matches!(
        ctrl.commit().await.unwrap_err(),
        CommitError::InProgress
    ));
    assert_eq!(ctrl.go_back().await, None);
    assert_eq!(ctrl.current_step().await, OnboardingStep::Terms);

    store.release().notify_one();
    let profile = timeout(TEST_TIMEOUT, first)
        .await
        .expect("first commit hung")
        .unwrap()
        .unwrap();

    assert_eq!(store.insert_attempts.load(Ordering::SeqCst), 1);
    assert_eq!(db.get_profile().await.unwrap().unwrap().id, profile.id);
}

#[tokio::test]
async fn relaunch_routes_to_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("onboarding.db");

    {
        let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_local(&path).await.unwrap());
        let router = LaunchRouter::new(Arc::clone(&db));
        assert_eq!(router.route().await.unwrap(), LaunchRoute::Onboarding);

        let ctrl = router.onboarding();
        walk_to_terms(&ctrl).await;
        ctrl.edit(|d| d.set_agreed_to_terms(true)).await;
        ctrl.advance().await.unwrap();

        assert_eq!(router.route().await.unwrap(), LaunchRoute::Summary);
    }

    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_local(&path).await.unwrap());
    let router = LaunchRouter::new(db);
    assert_eq!(router.route().await.unwrap(), LaunchRoute::Summary);

    match router.summary().await.unwrap() {
        SummaryView::Ready(summary) => {
            assert_eq!(summary.title, "Welcome, Ada!");
            assert_eq!(summary.value("Fitness Goal"), Some("Gain Muscle"));
            assert_eq!(summary.value("Activity Level"), Some("Very Active"));
            assert_eq!(summary.value("Agreed to Terms"), Some("Yes"));
        }
        SummaryView::Loading => panic!("profile should be stored"),
    }
}
