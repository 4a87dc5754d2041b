//! Fit Onboard: first-run onboarding flow for a fitness profile.

pub mod config;
pub mod error;
pub mod onboarding;
pub mod store;
