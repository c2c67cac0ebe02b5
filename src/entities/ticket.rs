//! After-sales ticket - service issues raised against delivered projects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::error::DossierError;
use crate::core::identity::{EntityId, EntityPrefix};

/// After-sales ticket stage. Resolution must be confirmed by the reporter;
/// an unsatisfied reporter reopens the ticket, which loops back through
/// resolution as often as needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum TicketStage {
    #[default]
    Open,
    InProgress,
    ResolvedPendingConfirmation,
    Reopened,
    Closed,
}

impl std::fmt::Display for TicketStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStage::Open => write!(f, "open"),
            TicketStage::InProgress => write!(f, "in_progress"),
            TicketStage::ResolvedPendingConfirmation => write!(f, "resolved_pending_confirmation"),
            TicketStage::Reopened => write!(f, "reopened"),
            TicketStage::Closed => write!(f, "closed"),
        }
    }
}

/// One event in a ticket's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketEvent {
    pub action: String,
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// An after-sales service ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier
    pub id: EntityId,

    /// Project this ticket belongs to
    pub project: EntityId,

    /// Short summary
    pub title: String,

    /// Detailed description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Current stage
    #[serde(default)]
    pub stage: TicketStage,

    /// Event history, append-only
    #[serde(default)]
    pub events: Vec<TicketEvent>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Reporter
    pub author: String,
}

impl Ticket {
    pub fn new(project: EntityId, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Tkt),
            project,
            title: title.into(),
            description: None,
            stage: TicketStage::Open,
            events: Vec::new(),
            created: Utc::now(),
            author: author.into(),
        }
    }

    fn transition(
        &mut self,
        to: TicketStage,
        allowed_from: &[TicketStage],
        action: &str,
        actor: &str,
        note: Option<String>,
    ) -> Result<(), DossierError> {
        if !allowed_from.contains(&self.stage) {
            return Err(DossierError::InvalidTicketTransition {
                from: self.stage.to_string(),
                to: to.to_string(),
            });
        }
        self.stage = to;
        self.events.push(TicketEvent {
            action: action.to_string(),
            actor: actor.to_string(),
            note,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Begin working the ticket
    pub fn start(&mut self, actor: &str) -> Result<(), DossierError> {
        self.transition(
            TicketStage::InProgress,
            &[TicketStage::Open],
            "start",
            actor,
            None,
        )
    }

    /// Mark the ticket resolved, pending reporter confirmation
    pub fn resolve(&mut self, actor: &str, note: Option<String>) -> Result<(), DossierError> {
        self.transition(
            TicketStage::ResolvedPendingConfirmation,
            &[TicketStage::Open, TicketStage::InProgress, TicketStage::Reopened],
            "resolve",
            actor,
            note,
        )
    }

    /// Reporter confirms the resolution; ticket closes
    pub fn confirm(&mut self, actor: &str) -> Result<(), DossierError> {
        self.transition(
            TicketStage::Closed,
            &[TicketStage::ResolvedPendingConfirmation],
            "confirm",
            actor,
            None,
        )
    }

    /// Reporter is not satisfied; back to the resolution loop
    pub fn reopen(&mut self, actor: &str, note: Option<String>) -> Result<(), DossierError> {
        self.transition(
            TicketStage::Reopened,
            &[TicketStage::ResolvedPendingConfirmation],
            "reopen",
            actor,
            note,
        )
    }
}

impl Entity for Ticket {
    const PREFIX: &'static str = "TKT";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}
