//! Technical version snapshots - immutable captures of the technical list

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::selection::SelectionRequirement;

/// Review status of a technical version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum VersionStatus {
    /// Submitted by engineering, awaiting commercial review
    #[default]
    Submitted,
    /// Rejected with modification suggestions
    Rejected,
    /// Confirmed by the commercial reviewer
    Confirmed,
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionStatus::Submitted => write!(f, "submitted"),
            VersionStatus::Rejected => write!(f, "rejected"),
            VersionStatus::Confirmed => write!(f, "confirmed"),
        }
    }
}

impl std::str::FromStr for VersionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "submitted" => Ok(VersionStatus::Submitted),
            "rejected" => Ok(VersionStatus::Rejected),
            "confirmed" => Ok(VersionStatus::Confirmed),
            _ => Err(format!(
                "Invalid version status: {}. Use submitted, rejected, or confirmed",
                s
            )),
        }
    }
}

/// An immutable, numbered capture of the technical list at submission time.
/// The requirement snapshot never mutates after creation; review outcomes
/// only change `status` and `rejection_notes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalVersionSnapshot {
    /// Version identifier, strictly increasing per project
    pub version: u32,

    /// Review status
    #[serde(default)]
    pub status: VersionStatus,

    /// Frozen copy of the selection requirements at submission
    pub requirements: Vec<SelectionRequirement>,

    /// Submission timestamp
    pub created: DateTime<Utc>,

    /// Engineer who submitted
    pub author: String,

    /// Reviewer notes recorded on rejection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_notes: Option<String>,
}

impl TechnicalVersionSnapshot {
    pub fn new(version: u32, requirements: Vec<SelectionRequirement>, author: impl Into<String>) -> Self {
        Self {
            version,
            status: VersionStatus::Submitted,
            requirements,
            created: Utc::now(),
            author: author.into(),
            rejection_notes: None,
        }
    }

    /// Whether this version may back a quotation snapshot
    pub fn is_quotable(&self) -> bool {
        matches!(self.status, VersionStatus::Submitted | VersionStatus::Confirmed)
    }
}
