//! Launch routing: onboarding on first run, summary afterwards.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::DatabaseError;
use crate::store::{Database, PersistenceGateway};

use super::controller::OnboardingController;
use super::flag::CompletionFlag;
use super::summary::{ProfileSummary, SummaryView};

/// Which screen to show at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchRoute {
    Onboarding,
    Summary,
}

/// Reads the completion flag and hands out the matching view.
pub struct LaunchRouter {
    db: Arc<dyn Database>,
    flag: CompletionFlag,
}

impl LaunchRouter {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            flag: CompletionFlag::new(Arc::clone(&db)),
            db,
        }
    }

    pub async fn route(&self) -> Result<LaunchRoute, DatabaseError> {
        let route = if self.flag.is_set().await? {
            LaunchRoute::Summary
        } else {
            LaunchRoute::Onboarding
        };
        info!(?route, "Launch route selected");
        Ok(route)
    }

    /// A fresh onboarding session over the same store.
    pub fn onboarding(&self) -> OnboardingController {
        OnboardingController::new(Arc::clone(&self.db))
    }

    /// Load the summary. A missing profile shows the loading placeholder
    /// rather than failing.
    pub async fn summary(&self) -> Result<SummaryView, DatabaseError> {
        let gateway = PersistenceGateway::new(Arc::clone(&self.db));
        match gateway.fetch_latest().await? {
            Some(profile) => Ok(SummaryView::Ready(ProfileSummary::from_profile(&profile))),
            None => {
                warn!("Onboarding flagged complete but no profile is stored");
                Ok(SummaryView::Loading)
            }
        }
    }
}
