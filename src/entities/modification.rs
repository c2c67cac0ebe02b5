//! Modification requests - reviewer-proposed changes to a locked version

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Status of a modification request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ModificationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for ModificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModificationStatus::Pending => write!(f, "pending"),
            ModificationStatus::Accepted => write!(f, "accepted"),
            ModificationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// One per-tag change suggestion within a modification request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSuggestion {
    /// Tag the suggestion applies to
    pub tag: String,

    /// Model currently selected at that tag
    pub original_model: String,

    /// Model the reviewer proposes instead
    pub suggested_model: String,

    /// Short reason
    pub reason: String,

    /// Longer detail, optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Reviewer-proposed changes against one rejected technical version, plus
/// the engineer's eventual response. Requests are never deleted; responding
/// flips the status exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationRequest {
    /// Unique identifier
    pub id: EntityId,

    /// Technical version the request refers to
    pub version: u32,

    /// Ordered per-tag suggestions
    pub suggestions: Vec<LineSuggestion>,

    /// Request status
    #[serde(default)]
    pub status: ModificationStatus,

    /// Engineer's response text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Response timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded: Option<DateTime<Utc>>,

    /// Reviewer who raised the request
    pub author: String,
}

impl ModificationRequest {
    pub fn new(version: u32, suggestions: Vec<LineSuggestion>, author: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Modr),
            version,
            suggestions,
            status: ModificationStatus::Pending,
            response: None,
            created: Utc::now(),
            responded: None,
            author: author.into(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ModificationStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_is_pending() {
        let request = ModificationRequest::new(
            2,
            vec![LineSuggestion {
                tag: "V-101".to_string(),
                original_model: "SF10-DA".to_string(),
                suggested_model: "SF08-DA".to_string(),
                reason: "oversized".to_string(),
                detail: None,
            }],
            "bwilson",
        );
        assert!(request.id.to_string().starts_with("MODR-"));
        assert!(request.is_pending());
        assert_eq!(request.version, 2);
        assert!(request.responded.is_none());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let request = ModificationRequest::new(1, vec![], "bwilson");
        let yaml = serde_yml::to_string(&request).unwrap();
        let parsed: ModificationRequest = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.id, request.id);
        assert_eq!(parsed.status, ModificationStatus::Pending);
    }
}
