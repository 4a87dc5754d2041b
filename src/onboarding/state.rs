//! Onboarding state machine: which step the user is on and whether they may
//! move forward.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::model::ProfileDraft;

/// The steps of the onboarding flow.
///
/// Progresses linearly: Name → Goal → DateOfBirth → Activity → Terms →
/// Complete. `Complete` is only reachable through a successful commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    #[default]
    Name,
    Goal,
    DateOfBirth,
    Activity,
    Terms,
    Complete,
}

/// Number of data-entry steps (everything except `Complete`).
pub const STEP_COUNT: usize = 5;

impl OnboardingStep {
    /// Check if a forward transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: OnboardingStep) -> bool {
        use OnboardingStep::*;
        matches!(
            (self, target),
            (Name, Goal)
                | (Goal, DateOfBirth)
                | (DateOfBirth, Activity)
                | (Activity, Terms)
                | (Terms, Complete)
        )
    }

    /// Whether this step is terminal (onboarding is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<OnboardingStep> {
        use OnboardingStep::*;
        match self {
            Name => Some(Goal),
            Goal => Some(DateOfBirth),
            DateOfBirth => Some(Activity),
            Activity => Some(Terms),
            Terms => Some(Complete),
            Complete => None,
        }
    }

    /// The step before this one. `None` at the first step and once complete.
    pub fn previous(&self) -> Option<OnboardingStep> {
        use OnboardingStep::*;
        match self {
            Name | Complete => None,
            Goal => Some(Name),
            DateOfBirth => Some(Goal),
            Activity => Some(DateOfBirth),
            Terms => Some(Activity),
        }
    }

    /// 1-based position among the data-entry steps.
    pub fn position(&self) -> Option<usize> {
        use OnboardingStep::*;
        match self {
            Name => Some(1),
            Goal => Some(2),
            DateOfBirth => Some(3),
            Activity => Some(4),
            Terms => Some(5),
            Complete => None,
        }
    }

    /// Screen title, e.g. "Step 2 of 5".
    pub fn title(&self) -> String {
        match self.position() {
            Some(n) => format!("Step {n} of {STEP_COUNT}"),
            None => "Complete".to_string(),
        }
    }

    /// The question shown for this step.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Name => "What's your name?",
            Self::Goal => "What's your primary goal?",
            Self::DateOfBirth => "When were you born?",
            Self::Activity => "How active are you?",
            Self::Terms => "Do you agree to the terms and conditions?",
            Self::Complete => "You're all set!",
        }
    }

    /// Guard for leaving this step forward.
    ///
    /// Goal and Activity always pass since their fields have defaults.
    /// `Complete` never passes.
    pub fn guard(&self, draft: &ProfileDraft, today: NaiveDate) -> bool {
        match self {
            Self::Name => draft.is_name_valid(),
            Self::Goal | Self::Activity => true,
            Self::DateOfBirth => draft.is_old_enough_on(today),
            Self::Terms => draft.is_agreed(),
            Self::Complete => false,
        }
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Goal => "goal",
            Self::DateOfBirth => "date_of_birth",
            Self::Activity => "activity",
            Self::Terms => "terms",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Result of asking the sequencer to move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAdvance {
    /// Moved from one step to the next.
    Moved {
        from: OnboardingStep,
        to: OnboardingStep,
    },
    /// The guard for the current step failed; nothing changed.
    Blocked(OnboardingStep),
    /// On `Terms` with the guard satisfied; the caller must commit.
    ReadyToCommit,
    /// Already complete; nothing to do.
    Finished,
}

/// Tracks the current step and enforces the guards.
///
/// The sequencer never advances past `Terms` on its own; `Complete` is
/// entered through [`StepSequencer::complete`] once the profile is saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSequencer {
    current: OnboardingStep,
}

impl StepSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> OnboardingStep {
        self.current
    }

    /// Whether the guard for the current step holds.
    pub fn can_advance(&self, draft: &ProfileDraft, today: NaiveDate) -> bool {
        self.current.guard(draft, today)
    }

    /// Try to move forward one step.
    pub fn advance(&mut self, draft: &ProfileDraft, today: NaiveDate) -> StepAdvance {
        let from = self.current;
        if from.is_terminal() {
            return StepAdvance::Finished;
        }
        if !from.guard(draft, today) {
            return StepAdvance::Blocked(from);
        }
        match from.next() {
            Some(OnboardingStep::Complete) | None => StepAdvance::ReadyToCommit,
            Some(to) => {
                self.current = to;
                StepAdvance::Moved { from, to }
            }
        }
    }

    /// Move back one step. Unguarded; returns the new step, or `None` when
    /// there is nowhere to go.
    pub fn go_back(&mut self) -> Option<OnboardingStep> {
        let prev = self.current.previous()?;
        self.current = prev;
        Some(prev)
    }

    /// Enter the terminal state. Only legal from `Terms`.
    pub(crate) fn complete(&mut self) -> Result<(), String> {
        if !self.current.can_transition_to(OnboardingStep::Complete) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.current,
                OnboardingStep::Complete
            ));
        }
        self.current = OnboardingStep::Complete;
        Ok(())
    }
}
