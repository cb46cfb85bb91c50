//! Routines: named duty bundles with a suggested frequency
//!
//! Assigning a routine to a user on a date is the one generative operation
//! in the system: it expands into one project plus one task per resolvable
//! duty (see `crewtask-app::routines`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Suggested execution frequency of a routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutineFrequency {
    Once,
    Daily,
    Weekly,
    Monthly,
    SemiAnnual,
}

impl RoutineFrequency {
    /// Human-readable label used in generated descriptions
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutineFrequency::Once => "ONCE",
            RoutineFrequency::Daily => "DAILY",
            RoutineFrequency::Weekly => "WEEKLY",
            RoutineFrequency::Monthly => "MONTHLY",
            RoutineFrequency::SemiAnnual => "SEMI_ANNUAL",
        }
    }
}

/// Routine template record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    /// Unique routine ID
    pub id: Uuid,

    /// Routine title
    pub title: String,

    /// Optional description, folded into the generated project description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Suggested frequency
    pub frequency: RoutineFrequency,

    /// Ordered duty references; ids may stop resolving after creation
    #[serde(default)]
    pub duty_ids: Vec<Uuid>,

    /// When the routine was created
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_wire_names() {
        assert_eq!(
            serde_json::to_string(&RoutineFrequency::SemiAnnual).unwrap(),
            "\"SEMI_ANNUAL\""
        );
        assert_eq!(RoutineFrequency::SemiAnnual.as_str(), "SEMI_ANNUAL");
    }
}
