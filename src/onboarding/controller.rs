//! OnboardingController: drives the step sequencer over a single profile
//! draft and commits the result once.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::CommitError;
use crate::store::{Database, PersistenceGateway, ProfileField};

use super::flag::CompletionFlag;
use super::model::{PersistedProfile, ProfileDraft};
use super::state::{OnboardingStep, StepAdvance, StepSequencer};
use super::validation;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Invoked once, after the profile and flag are both written.
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/// State changes published to subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEvent {
    DraftChanged {
        draft: ProfileDraft,
    },
    StepChanged {
        from: OnboardingStep,
        to: OnboardingStep,
    },
    CommitFailed {
        reason: String,
    },
    Completed {
        profile_id: Uuid,
    },
}

/// Point-in-time view of the flow, enough to render the current screen.
#[derive(Debug, Clone, Serialize)]
pub struct FlowSnapshot {
    pub step: OnboardingStep,
    pub title: String,
    pub draft: ProfileDraft,
    /// Whether the forward action should be enabled.
    pub can_advance: bool,
}

/// What a call to [`OnboardingController::advance`] did.
#[derive(Debug, Clone)]
pub enum AdvanceOutcome {
    Moved {
        from: OnboardingStep,
        to: OnboardingStep,
    },
    /// Guard failed; nothing changed.
    Blocked(OnboardingStep),
    /// Terms accepted and the profile committed.
    Completed(PersistedProfile),
}

/// Coordinates one onboarding session: draft edits, step transitions and
/// the final commit.
pub struct OnboardingController {
    gateway: PersistenceGateway,
    flag: CompletionFlag,
    draft: RwLock<ProfileDraft>,
    sequencer: RwLock<StepSequencer>,
    commit_lock: Mutex<()>,
    on_complete: Mutex<Option<CompletionCallback>>,
    tx: broadcast::Sender<FlowEvent>,
}

impl OnboardingController {
    pub fn new(db: Arc<dyn Database>) -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self {
            gateway: PersistenceGateway::new(Arc::clone(&db)),
            flag: CompletionFlag::new(db),
            draft: RwLock::new(ProfileDraft::default()),
            sequencer: RwLock::new(StepSequencer::new()),
            commit_lock: Mutex::new(()),
            on_complete: Mutex::new(None),
            tx,
        }
    }

    /// Register the callback fired after a successful commit.
    pub fn with_completion(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Mutex::new(Some(Box::new(callback)));
        self
    }

    /// Subscribe to state-change events.
    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.tx.subscribe()
    }

    pub async fn current_step(&self) -> OnboardingStep {
        self.sequencer.read().await.current()
    }

    /// Copy of the current draft.
    pub async fn draft(&self) -> ProfileDraft {
        self.draft.read().await.clone()
    }

    pub async fn snapshot(&self) -> FlowSnapshot {
        let draft = self.draft.read().await;
        let seq = self.sequencer.read().await;
        FlowSnapshot {
            step: seq.current(),
            title: seq.current().title(),
            draft: draft.clone(),
            can_advance: seq.can_advance(&draft, validation::today()),
        }
    }

    /// Mutate the draft and announce the change. No validation happens here.
    pub async fn edit<R>(&self, f: impl FnOnce(&mut ProfileDraft) -> R) -> R {
        let (result, updated) = {
            let mut draft = self.draft.write().await;
            let result = f(&mut draft);
            (result, draft.clone())
        };
        // Ok if nobody is listening
        let _ = self.tx.send(FlowEvent::DraftChanged { draft: updated });
        result
    }

    /// Move forward if the current step's guard holds. On `Terms` this
    /// commits instead.
    pub async fn advance(&self) -> Result<AdvanceOutcome, CommitError> {
        let step = {
            let draft = self.draft.read().await;
            let mut seq = self.sequencer.write().await;
            seq.advance(&draft, validation::today())
        };

        match step {
            StepAdvance::Moved { from, to } => {
                info!(%from, %to, "Onboarding step advanced");
                let _ = self.tx.send(FlowEvent::StepChanged { from, to });
                Ok(AdvanceOutcome::Moved { from, to })
            }
            StepAdvance::Blocked(step) => {
                debug!(%step, "Advance blocked by guard");
                Ok(AdvanceOutcome::Blocked(step))
            }
            StepAdvance::ReadyToCommit => self.commit().await.map(AdvanceOutcome::Completed),
            StepAdvance::Finished => Err(CommitError::AlreadyCompleted),
        }
    }

    /// Step back one screen. Leaves the draft alone.
    ///
    /// Returns `None` on the first step, once complete, or while a commit
    /// is running.
    pub async fn go_back(&self) -> Option<OnboardingStep> {
        let Ok(_guard) = self.commit_lock.try_lock() else {
            debug!("Back navigation ignored while commit is in progress");
            return None;
        };

        let mut seq = self.sequencer.write().await;
        let from = seq.current();
        let to = seq.go_back()?;
        drop(seq);

        info!(%from, %to, "Onboarding step went back");
        let _ = self.tx.send(FlowEvent::StepChanged { from, to });
        Some(to)
    }

    /// Save the draft as the user's profile and mark onboarding complete.
    ///
    /// On any error the draft is untouched, the flag stays unset and the
    /// flow remains on `Terms`, so the caller may retry.
    pub async fn commit(&self) -> Result<PersistedProfile, CommitError> {
        let Ok(_guard) = self.commit_lock.try_lock() else {
            warn!("Rejected commit while another is in progress");
            return Err(CommitError::InProgress);
        };

        match self.commit_exclusive().await {
            Ok(profile) => Ok(profile),
            Err(CommitError::Store(e)) => {
                warn!(error = %e, "Onboarding commit failed");
                let _ = self.tx.send(FlowEvent::CommitFailed {
                    reason: e.to_string(),
                });
                Err(CommitError::Store(e))
            }
            Err(e) => {
                debug!(error = %e, "Onboarding commit refused");
                Err(e)
            }
        }
    }

    async fn commit_exclusive(&self) -> Result<PersistedProfile, CommitError> {
        if self.flag.is_set().await? {
            return Err(CommitError::AlreadyCompleted);
        }

        let draft = {
            let draft = self.draft.read().await;
            let step = self.sequencer.read().await.current();
            if step != OnboardingStep::Terms {
                return Err(CommitError::NotAtTerms { step });
            }
            check_draft(&draft)?;
            draft.clone()
        };

        let profile = match self.gateway.fetch_latest().await? {
            // A previous commit saved the record but never set the flag.
            Some(existing) => {
                warn!(profile_id = %existing.id, "Profile already stored, completing onboarding with it");
                existing
            }
            None => self.save_draft(&draft).await?,
        };

        self.flag.mark_complete().await?;

        if let Err(e) = self.sequencer.write().await.complete() {
            warn!(error = %e, "Sequencer not on terms after commit");
        }

        if let Some(callback) = self.on_complete.lock().await.take() {
            callback();
        }

        info!(profile_id = %profile.id, "Onboarding complete");
        let _ = self.tx.send(FlowEvent::Completed {
            profile_id: profile.id,
        });
        Ok(profile)
    }

    async fn save_draft(&self, draft: &ProfileDraft) -> Result<PersistedProfile, CommitError> {
        let mut record = self.gateway.create_draft_record()?;
        for field in [
            ProfileField::Name(draft.name.clone()),
            ProfileField::FitnessGoal(draft.fitness_goal),
            ProfileField::DateOfBirth(draft.date_of_birth),
            ProfileField::ActivityLevel(draft.activity_level),
            ProfileField::AgreedToTerms(draft.agreed_to_terms),
            ProfileField::OnboardingCompletedDate(Utc::now()),
        ] {
            self.gateway.assign(&mut record, field);
        }
        Ok(self.gateway.save(record).await?)
    }
}

/// Re-check every guarded field, since the draft may have been edited after
/// its step was passed.
fn check_draft(draft: &ProfileDraft) -> Result<(), CommitError> {
    let today = validation::today();
    for step in [OnboardingStep::Name, OnboardingStep::DateOfBirth] {
        if !step.guard(draft, today) {
            return Err(CommitError::Incomplete { step });
        }
    }
    if !draft.is_agreed() {
        return Err(CommitError::TermsNotAccepted);
    }
    Ok(())
}
