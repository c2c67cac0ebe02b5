//! Append-only audit log for irreversible business confirmations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::team::{Actor, Role};

/// Kind of audited operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    PaymentConfirmed,
    ProductionOrderCreated,
    ContractSigned,
    ProjectLocked,
    StageAdvanced,
    StageReopened,
    MarkedLost,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationKind::PaymentConfirmed => "payment_confirmed",
            OperationKind::ProductionOrderCreated => "production_order_created",
            OperationKind::ContractSigned => "contract_signed",
            OperationKind::ProjectLocked => "project_locked",
            OperationKind::StageAdvanced => "stage_advanced",
            OperationKind::StageReopened => "stage_reopened",
            OperationKind::MarkedLost => "marked_lost",
        };
        write!(f, "{}", s)
    }
}

/// One append-only audit record. Entries are never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationAuditEntry {
    /// Unique identifier
    pub id: EntityId,

    /// Operation kind
    pub operation: OperationKind,

    /// Human-readable description
    pub description: String,

    /// Actor identity
    pub actor: String,

    /// Role the actor acted under
    pub role: Role,

    /// When the operation happened
    pub timestamp: DateTime<Utc>,

    /// Free-text declaration/confirmation statement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,

    /// Structured details (version numbers, amounts, references)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,

    /// Where the operation originated (user@host of the recording process)
    pub origin: String,
}

impl OperationAuditEntry {
    pub fn new(
        operation: OperationKind,
        description: impl Into<String>,
        actor: &Actor,
        declaration: Option<String>,
        details: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Aud),
            operation,
            description: description.into(),
            actor: actor.name.clone(),
            role: actor.role,
            timestamp: Utc::now(),
            declaration,
            details,
            origin: origin(),
        }
    }
}

/// Append-only log. The only mutation it exposes is `append`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLog {
    entries: Vec<OperationAuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its id
    pub fn append(&mut self, entry: OperationAuditEntry) -> EntityId {
        let id = entry.id.clone();
        self.entries.push(entry);
        id
    }

    pub fn entries(&self) -> &[OperationAuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// user@host of the recording process
pub fn origin() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
    format!("{}@{}", user, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: OperationKind) -> OperationAuditEntry {
        let actor = Actor::new("bwilson", Role::Management);
        OperationAuditEntry::new(kind, "test operation", &actor, None, BTreeMap::new())
    }

    #[test]
    fn test_append_returns_id() {
        let mut log = AuditLog::new();
        assert!(log.is_empty());
        let id = log.append(entry(OperationKind::PaymentConfirmed));
        assert!(id.to_string().starts_with("AUD-"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].role, Role::Management);
    }

    #[test]
    fn test_serializes_as_plain_sequence() {
        let mut log = AuditLog::new();
        log.append(entry(OperationKind::ContractSigned));
        let yaml = serde_yml::to_string(&log).unwrap();
        assert!(yaml.trim_start().starts_with('-'));

        let parsed: AuditLog = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.entries()[0].operation, OperationKind::ContractSigned);
    }

    #[test]
    fn test_origin_has_user_and_host() {
        let origin = origin();
        assert!(origin.contains('@'));
    }
}
