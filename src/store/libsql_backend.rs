//! libSQL backend: async `Database` trait implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::onboarding::model::{ActivityLevel, FitnessGoal, PersistedProfile};
use crate::store::migrations;
use crate::store::traits::Database;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db)?;
        backend.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let backend = Self::from_database(db)?;
        backend.init_schema().await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 timestamp as written by `insert_profile`.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Serialization(format!("bad timestamp {s:?}: {e}")))
}

fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::Serialization(format!("bad date {s:?}: {e}")))
}

const PROFILE_COLUMNS: &str = "id, name, fitness_goal, date_of_birth, activity_level, agreed_to_terms, onboarding_completed_date";

fn row_to_profile(row: &libsql::Row) -> Result<PersistedProfile, DatabaseError> {
    let text = |idx: i32| -> Result<String, DatabaseError> {
        row.get::<String>(idx)
            .map_err(|e| DatabaseError::Query(format!("profile column {idx}: {e}")))
    };

    let id_str = text(0)?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DatabaseError::Serialization(format!("bad profile id {id_str:?}: {e}")))?;
    let fitness_goal = text(2)?
        .parse::<FitnessGoal>()
        .map_err(DatabaseError::Serialization)?;
    let activity_level = text(4)?
        .parse::<ActivityLevel>()
        .map_err(DatabaseError::Serialization)?;
    let agreed: i64 = row
        .get(5)
        .map_err(|e| DatabaseError::Query(format!("profile column 5: {e}")))?;

    Ok(PersistedProfile {
        id,
        name: text(1)?,
        fitness_goal,
        date_of_birth: parse_date(&text(3)?)?,
        activity_level,
        agreed_to_terms: agreed != 0,
        onboarding_completed_date: parse_datetime(&text(6)?)?,
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl Database for LibSqlBackend {
    async fn init_schema(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Profile ─────────────────────────────────────────────────────

    async fn insert_profile(&self, profile: &PersistedProfile) -> Result<(), DatabaseError> {
        if self.get_profile().await?.is_some() {
            return Err(DatabaseError::Constraint(
                "a user profile already exists".to_string(),
            ));
        }

        let conn = self.conn();
        conn.execute(
            &format!("INSERT INTO user_profile (slot, {PROFILE_COLUMNS}) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                profile.id.to_string(),
                profile.name.clone(),
                profile.fitness_goal.as_str(),
                profile.date_of_birth.format("%Y-%m-%d").to_string(),
                profile.activity_level.as_str(),
                profile.agreed_to_terms as i64,
                profile.onboarding_completed_date.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("insert_profile: {e}")))?;

        debug!(profile_id = %profile.id, "Profile inserted into DB");
        Ok(())
    }

    async fn get_profile(&self) -> Result<Option<PersistedProfile>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM user_profile WHERE slot = 1"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_profile: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_profile(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_profile: {e}"))),
        }
    }

    // ── Settings ────────────────────────────────────────────────────

    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query("SELECT value FROM settings WHERE key = ?1", params![key])
            .await
            .map_err(|e| DatabaseError::Query(format!("get_setting: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value_str: String = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("get_setting: {e}")))?;
                let value = serde_json::from_str(&value_str)
                    .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_setting: {e}"))),
        }
    }

    async fn set_setting(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let value_str = serde_json::to_string(value)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value_str, now],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("set_setting: {e}")))?;

        Ok(())
    }
}
