//! Profile data models: the in-memory draft and the persisted record.

use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation;

/// What the user wants to get out of training.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    #[default]
    LoseWeight,
    MaintainWeight,
    GainMuscle,
}

impl FitnessGoal {
    /// All goals in picker order.
    pub const ALL: [FitnessGoal; 3] = [Self::LoseWeight, Self::MaintainWeight, Self::GainMuscle];

    /// Stable identifier, matches the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoseWeight => "lose_weight",
            Self::MaintainWeight => "maintain_weight",
            Self::GainMuscle => "gain_muscle",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LoseWeight => "Lose Weight",
            Self::MaintainWeight => "Maintain Weight",
            Self::GainMuscle => "Gain Muscle",
        }
    }
}

impl std::fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FitnessGoal {
    type Err = String;

    /// Accepts either the identifier (`gain_muscle`) or the label (`Gain Muscle`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s) || g.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown fitness goal: {s}"))
    }
}

/// How active the user is day to day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    Very,
}

impl ActivityLevel {
    /// All levels in picker order.
    pub const ALL: [ActivityLevel; 4] = [Self::Sedentary, Self::Light, Self::Moderate, Self::Very];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Very => "very",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sedentary => "Sedentary",
            Self::Light => "Lightly Active",
            Self::Moderate => "Moderately Active",
            Self::Very => "Very Active",
        }
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s) || a.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown activity level: {s}"))
    }
}

/// Years subtracted from today to seed the date-of-birth picker.
const DEFAULT_AGE_YEARS: u32 = 20;

/// Working copy of the profile while the user steps through onboarding.
///
/// Setters assign without validating; the predicates below are what the
/// step guards consult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub name: String,
    pub fitness_goal: FitnessGoal,
    pub date_of_birth: NaiveDate,
    pub activity_level: ActivityLevel,
    pub agreed_to_terms: bool,
}

impl Default for ProfileDraft {
    fn default() -> Self {
        Self::as_of(validation::today())
    }
}

impl ProfileDraft {
    /// A fresh draft whose date of birth defaults relative to `today`.
    pub fn as_of(today: NaiveDate) -> Self {
        let date_of_birth = today
            .checked_sub_months(Months::new(DEFAULT_AGE_YEARS * 12))
            .unwrap_or(today);
        Self {
            name: String::new(),
            fitness_goal: FitnessGoal::default(),
            date_of_birth,
            activity_level: ActivityLevel::default(),
            agreed_to_terms: false,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_fitness_goal(&mut self, goal: FitnessGoal) {
        self.fitness_goal = goal;
    }

    pub fn set_date_of_birth(&mut self, date_of_birth: NaiveDate) {
        self.date_of_birth = date_of_birth;
    }

    pub fn set_activity_level(&mut self, level: ActivityLevel) {
        self.activity_level = level;
    }

    pub fn set_agreed_to_terms(&mut self, agreed: bool) {
        self.agreed_to_terms = agreed;
    }

    pub fn is_name_valid(&self) -> bool {
        validation::is_name_valid(&self.name)
    }

    /// Age check against the local calendar date.
    pub fn is_old_enough(&self) -> bool {
        self.is_old_enough_on(validation::today())
    }

    pub fn is_old_enough_on(&self, today: NaiveDate) -> bool {
        validation::is_old_enough(self.date_of_birth, today)
    }

    pub fn is_agreed(&self) -> bool {
        self.agreed_to_terms
    }
}

/// The profile written once when onboarding completes.
///
/// Lives in the single-row `user_profile` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedProfile {
    pub id: Uuid,
    pub name: String,
    pub fitness_goal: FitnessGoal,
    pub date_of_birth: NaiveDate,
    pub activity_level: ActivityLevel,
    pub agreed_to_terms: bool,
    pub onboarding_completed_date: DateTime<Utc>,
}

/// Settings keys used for onboarding persistence.
pub mod settings_keys {
    /// Key for the one-shot completion flag in the settings table.
    pub const HAS_COMPLETED_ONBOARDING: &str = "has_completed_onboarding";
}
