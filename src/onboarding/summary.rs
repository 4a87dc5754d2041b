//! Read-only profile summary shown once onboarding is done.

use chrono::Local;
use serde::Serialize;

use super::model::PersistedProfile;

/// One labelled value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummarySection {
    pub header: &'static str,
    pub rows: Vec<SummaryRow>,
}

/// Display-ready view of a persisted profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub title: String,
    pub sections: Vec<SummarySection>,
}

fn row(label: &'static str, value: impl Into<String>) -> SummaryRow {
    SummaryRow {
        label,
        value: value.into(),
    }
}

impl ProfileSummary {
    pub fn from_profile(profile: &PersistedProfile) -> Self {
        let completed = profile
            .onboarding_completed_date
            .with_timezone(&Local)
            .format("%-m/%-d/%Y, %-I:%M %p");

        Self {
            title: format!("Welcome, {}!", profile.name.trim()),
            sections: vec![
                SummarySection {
                    header: "Personal Details",
                    rows: vec![
                        row("Name", profile.name.clone()),
                        row(
                            "Date of Birth",
                            profile.date_of_birth.format("%B %-d, %Y").to_string(),
                        ),
                    ],
                },
                SummarySection {
                    header: "Your Profile",
                    rows: vec![
                        row("Fitness Goal", profile.fitness_goal.label()),
                        row("Activity Level", profile.activity_level.label()),
                    ],
                },
                SummarySection {
                    header: "Account",
                    rows: vec![
                        row(
                            "Agreed to Terms",
                            if profile.agreed_to_terms { "Yes" } else { "No" },
                        ),
                        row("Onboarding Complete", completed.to_string()),
                    ],
                },
            ],
        }
    }

    /// Look up a row value by label.
    pub fn value(&self, label: &str) -> Option<&str> {
        self.sections
            .iter()
            .flat_map(|s| s.rows.iter())
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }

    /// Plain-text rendering for the terminal.
    pub fn render(&self) -> String {
        let width = self
            .sections
            .iter()
            .flat_map(|s| s.rows.iter())
            .map(|r| r.label.len())
            .max()
            .unwrap_or(0);

        let mut out = vec![self.title.clone()];
        for section in &self.sections {
            out.push(String::new());
            out.push(format!("── {} ──", section.header));
            for r in &section.rows {
                out.push(format!("  {:<width$}  {}", r.label, r.value));
            }
        }
        out.join("\n")
    }
}

/// What the summary screen should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SummaryView {
    Ready(ProfileSummary),
    /// The flag says onboarding is done but no profile is stored (yet).
    Loading,
}

impl SummaryView {
    pub fn render(&self) -> String {
        match self {
            Self::Ready(summary) => summary.render(),
            Self::Loading => "Dashboard\n\nLoading Your Profile...".to_string(),
        }
    }
}
