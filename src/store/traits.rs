//! `Database` trait: the async storage interface the onboarding core talks to.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::onboarding::model::PersistedProfile;

/// Backend-agnostic storage for the profile slot and settings.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn init_schema(&self) -> Result<(), DatabaseError>;

    // ── Profile ─────────────────────────────────────────────────────

    /// Write the profile into the single profile slot.
    ///
    /// Fails with [`DatabaseError::Constraint`] if the slot is already taken.
    async fn insert_profile(&self, profile: &PersistedProfile) -> Result<(), DatabaseError>;

    /// Read the profile slot.
    async fn get_profile(&self) -> Result<Option<PersistedProfile>, DatabaseError>;

    // ── Settings ────────────────────────────────────────────────────

    /// Get a setting value by key.
    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>, DatabaseError>;

    /// Insert or replace a setting value.
    async fn set_setting(&self, key: &str, value: &serde_json::Value)
    -> Result<(), DatabaseError>;
}
