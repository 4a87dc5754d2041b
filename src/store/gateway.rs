//! Record-level access to the profile slot.
//!
//! A save goes through a [`RecordHandle`]: create it, assign every field,
//! then hand it to [`PersistenceGateway::save`]. Only one handle may be
//! outstanding at a time; dropping it releases the slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::onboarding::model::{ActivityLevel, FitnessGoal, PersistedProfile};
use crate::store::Database;

/// A single assignable profile field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileField {
    Name(String),
    FitnessGoal(FitnessGoal),
    DateOfBirth(NaiveDate),
    ActivityLevel(ActivityLevel),
    AgreedToTerms(bool),
    OnboardingCompletedDate(DateTime<Utc>),
}

/// An uncommitted profile record. Holds the id assigned at creation.
#[derive(Debug)]
pub struct RecordHandle {
    id: Uuid,
    name: Option<String>,
    fitness_goal: Option<FitnessGoal>,
    date_of_birth: Option<NaiveDate>,
    activity_level: Option<ActivityLevel>,
    agreed_to_terms: Option<bool>,
    onboarding_completed_date: Option<DateTime<Utc>>,
    outstanding: Arc<AtomicBool>,
}

impl RecordHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    fn build(&self) -> Result<PersistedProfile, DatabaseError> {
        fn required<T: Clone>(value: &Option<T>, field: &str) -> Result<T, DatabaseError> {
            value
                .clone()
                .ok_or_else(|| DatabaseError::Constraint(format!("profile field {field} not assigned")))
        }

        Ok(PersistedProfile {
            id: self.id,
            name: required(&self.name, "name")?,
            fitness_goal: required(&self.fitness_goal, "fitness_goal")?,
            date_of_birth: required(&self.date_of_birth, "date_of_birth")?,
            activity_level: required(&self.activity_level, "activity_level")?,
            agreed_to_terms: required(&self.agreed_to_terms, "agreed_to_terms")?,
            onboarding_completed_date: required(
                &self.onboarding_completed_date,
                "onboarding_completed_date",
            )?,
        })
    }
}

impl Drop for RecordHandle {
    fn drop(&mut self) {
        self.outstanding.store(false, Ordering::Release);
    }
}

/// Gateway over the profile slot of a [`Database`].
pub struct PersistenceGateway {
    db: Arc<dyn Database>,
    outstanding: Arc<AtomicBool>,
}

impl PersistenceGateway {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            outstanding: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a new record with a fresh v4 id.
    ///
    /// Fails if another handle is still alive.
    pub fn create_draft_record(&self) -> Result<RecordHandle, DatabaseError> {
        if self
            .outstanding
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DatabaseError::Constraint(
                "another profile record is already being written".to_string(),
            ));
        }

        let handle = RecordHandle {
            id: Uuid::new_v4(),
            name: None,
            fitness_goal: None,
            date_of_birth: None,
            activity_level: None,
            agreed_to_terms: None,
            onboarding_completed_date: None,
            outstanding: Arc::clone(&self.outstanding),
        };
        debug!(profile_id = %handle.id, "Draft profile record created");
        Ok(handle)
    }

    /// Set one field on an uncommitted record.
    pub fn assign(&self, handle: &mut RecordHandle, field: ProfileField) {
        match field {
            ProfileField::Name(v) => handle.name = Some(v),
            ProfileField::FitnessGoal(v) => handle.fitness_goal = Some(v),
            ProfileField::DateOfBirth(v) => handle.date_of_birth = Some(v),
            ProfileField::ActivityLevel(v) => handle.activity_level = Some(v),
            ProfileField::AgreedToTerms(v) => handle.agreed_to_terms = Some(v),
            ProfileField::OnboardingCompletedDate(v) => handle.onboarding_completed_date = Some(v),
        }
    }

    /// Write the record in one insert. The handle is consumed either way.
    pub async fn save(&self, handle: RecordHandle) -> Result<PersistedProfile, DatabaseError> {
        let profile = handle.build()?;
        self.db.insert_profile(&profile).await?;
        info!(profile_id = %profile.id, "Profile saved");
        Ok(profile)
    }

    /// The one stored profile, if any.
    pub async fn fetch_latest(&self) -> Result<Option<PersistedProfile>, DatabaseError> {
        self.db.get_profile().await
    }
}
