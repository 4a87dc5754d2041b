//! The durable "has the user finished onboarding" flag.

use std::sync::Arc;

use tracing::info;

use crate::error::DatabaseError;
use crate::store::Database;

use super::model::settings_keys;

/// One-shot completion flag stored in the settings table.
///
/// Reads default to `false` when the key is absent. The only write is
/// false → true, reachable from the commit path.
#[derive(Clone)]
pub struct CompletionFlag {
    db: Arc<dyn Database>,
}

impl CompletionFlag {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    pub async fn is_set(&self) -> Result<bool, DatabaseError> {
        let value = self
            .db
            .get_setting(settings_keys::HAS_COMPLETED_ONBOARDING)
            .await?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    /// Flip the flag to true.
    pub(crate) async fn mark_complete(&self) -> Result<(), DatabaseError> {
        self.db
            .set_setting(
                settings_keys::HAS_COMPLETED_ONBOARDING,
                &serde_json::Value::Bool(true),
            )
            .await?;
        info!("Onboarding marked complete");
        Ok(())
    }
}
