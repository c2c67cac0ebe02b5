//! Project lifecycle stages and transition guards
//!
//! The commercial lifecycle is an ordered chain from draft to completed, with
//! a terminal `lost` side branch reachable from any pre-signature stage. The
//! only backward movement is an explicit reopen of exactly one stage.

use serde::{Deserialize, Serialize};

/// Commercial lifecycle stage of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ProjectStage {
    #[default]
    Draft,
    TechnicalAssignmentPending,
    TechnicalSelectionInProgress,
    PendingCommercialQuote,
    QuotedAwaitingInquiry,
    ContractDraftPending,
    ContractUnderCommercialReview,
    ContractPendingClientSeal,
    ContractSignedWon,
    PrepaymentPending,
    ProductionPreparing,
    InProduction,
    Completed,
    /// Terminal side branch: inquiry lost before signature
    Lost,
}

/// The forward chain, in order. `Lost` is a side branch and not part of it.
const CHAIN: &[ProjectStage] = &[
    ProjectStage::Draft,
    ProjectStage::TechnicalAssignmentPending,
    ProjectStage::TechnicalSelectionInProgress,
    ProjectStage::PendingCommercialQuote,
    ProjectStage::QuotedAwaitingInquiry,
    ProjectStage::ContractDraftPending,
    ProjectStage::ContractUnderCommercialReview,
    ProjectStage::ContractPendingClientSeal,
    ProjectStage::ContractSignedWon,
    ProjectStage::PrepaymentPending,
    ProjectStage::ProductionPreparing,
    ProjectStage::InProduction,
    ProjectStage::Completed,
];

impl ProjectStage {
    /// Position in the forward chain; `None` for the lost branch
    fn index(&self) -> Option<usize> {
        CHAIN.iter().position(|s| s == self)
    }

    /// The next stage in the forward chain
    pub fn next(&self) -> Option<ProjectStage> {
        self.index().and_then(|i| CHAIN.get(i + 1).copied())
    }

    /// The previous stage in the forward chain (reopen target)
    pub fn prev(&self) -> Option<ProjectStage> {
        match self.index() {
            Some(i) if i > 0 => CHAIN.get(i - 1).copied(),
            _ => None,
        }
    }

    /// Whether the project can still be marked lost
    pub fn is_pre_signature(&self) -> bool {
        match (self.index(), ProjectStage::ContractSignedWon.index()) {
            (Some(i), Some(signed)) => i < signed,
            _ => false,
        }
    }

    /// Whether the stage admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStage::Completed | ProjectStage::Lost)
    }

    /// Stages that may only be entered through a dedicated operation,
    /// never through a plain stage advance
    pub fn entry_operation(&self) -> Option<&'static str> {
        match self {
            ProjectStage::PendingCommercialQuote => Some("tech submit"),
            ProjectStage::QuotedAwaitingInquiry => Some("quote generate"),
            ProjectStage::ContractSignedWon => Some("project sign"),
            ProjectStage::InProduction => Some("production create-order"),
            _ => None,
        }
    }

    pub fn all() -> &'static [ProjectStage] {
        CHAIN
    }
}

impl std::fmt::Display for ProjectStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProjectStage::Draft => "draft",
            ProjectStage::TechnicalAssignmentPending => "technical_assignment_pending",
            ProjectStage::TechnicalSelectionInProgress => "technical_selection_in_progress",
            ProjectStage::PendingCommercialQuote => "pending_commercial_quote",
            ProjectStage::QuotedAwaitingInquiry => "quoted_awaiting_inquiry",
            ProjectStage::ContractDraftPending => "contract_draft_pending",
            ProjectStage::ContractUnderCommercialReview => "contract_under_commercial_review",
            ProjectStage::ContractPendingClientSeal => "contract_pending_client_seal",
            ProjectStage::ContractSignedWon => "contract_signed_won",
            ProjectStage::PrepaymentPending => "prepayment_pending",
            ProjectStage::ProductionPreparing => "production_preparing",
            ProjectStage::InProduction => "in_production",
            ProjectStage::Completed => "completed",
            ProjectStage::Lost => "lost",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ProjectStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ProjectStage::Draft),
            "technical_assignment_pending" => Ok(ProjectStage::TechnicalAssignmentPending),
            "technical_selection_in_progress" => Ok(ProjectStage::TechnicalSelectionInProgress),
            "pending_commercial_quote" => Ok(ProjectStage::PendingCommercialQuote),
            "quoted_awaiting_inquiry" => Ok(ProjectStage::QuotedAwaitingInquiry),
            "contract_draft_pending" => Ok(ProjectStage::ContractDraftPending),
            "contract_under_commercial_review" => Ok(ProjectStage::ContractUnderCommercialReview),
            "contract_pending_client_seal" => Ok(ProjectStage::ContractPendingClientSeal),
            "contract_signed_won" => Ok(ProjectStage::ContractSignedWon),
            "prepayment_pending" => Ok(ProjectStage::PrepaymentPending),
            "production_preparing" => Ok(ProjectStage::ProductionPreparing),
            "in_production" => Ok(ProjectStage::InProduction),
            "completed" => Ok(ProjectStage::Completed),
            "lost" => Ok(ProjectStage::Lost),
            _ => Err(format!("Unknown project stage: {}", s)),
        }
    }
}

/// Check if a stage transition is valid
pub fn is_valid_transition(from: ProjectStage, to: ProjectStage) -> bool {
    if from.next() == Some(to) {
        return true;
    }
    if to == ProjectStage::Lost && from.is_pre_signature() {
        return true;
    }
    // Explicit reopen: exactly one stage back
    from.prev() == Some(to)
}

/// Get allowed transitions from the current stage
pub fn allowed_transitions(current: ProjectStage) -> Vec<ProjectStage> {
    let mut out = Vec::new();
    if let Some(next) = current.next() {
        out.push(next);
    }
    if let Some(prev) = current.prev() {
        out.push(prev);
    }
    if current.is_pre_signature() {
        out.push(ProjectStage::Lost);
    }
    out
}
