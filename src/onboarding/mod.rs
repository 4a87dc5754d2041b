//! Onboarding system: first-launch data-entry flow.
//!
//! The user steps through five screens (name, goal, date of birth, activity
//! level, terms). Each forward move is gated by a guard on the draft. On the
//! terms step the draft is committed once as the user's profile and the
//! completion flag is set, after which launches go straight to the summary.

pub mod controller;
pub mod flag;
pub mod model;
pub mod router;
pub mod state;
pub mod summary;
pub mod validation;

pub use controller::{AdvanceOutcome, FlowEvent, FlowSnapshot, OnboardingController};
pub use flag::CompletionFlag;
pub use model::{ActivityLevel, FitnessGoal, PersistedProfile, ProfileDraft};
pub use router::{LaunchRoute, LaunchRouter};
pub use state::{OnboardingStep, StepAdvance, StepSequencer};
pub use summary::{ProfileSummary, SummaryView};
