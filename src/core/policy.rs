//! Role/action/stage policy evaluation
//!
//! A single `can` function answers every authorization question, instead of
//! role comparisons scattered through command code.

use serde::{Deserialize, Serialize};

use crate::core::lifecycle::ProjectStage;
use crate::core::team::Role;

/// Actions a role may or may not perform on a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectAction {
    EditSelection,
    SubmitTechnicalList,
    RejectTechnicalVersion,
    RespondToModification,
    ConfirmTechnicalVersion,
    GenerateQuotation,
    EditQuotation,
    AdvanceStage,
    MarkContractSigned,
    ConfirmPrepayment,
    CreateProductionOrder,
    MarkLost,
    Reopen,
    ViewCostPrice,
}

impl std::fmt::Display for ProjectAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProjectAction::EditSelection => "edit selection",
            ProjectAction::SubmitTechnicalList => "submit technical list",
            ProjectAction::RejectTechnicalVersion => "reject technical version",
            ProjectAction::RespondToModification => "respond to modification",
            ProjectAction::ConfirmTechnicalVersion => "confirm technical version",
            ProjectAction::GenerateQuotation => "generate quotation",
            ProjectAction::EditQuotation => "edit quotation",
            ProjectAction::AdvanceStage => "advance stage",
            ProjectAction::MarkContractSigned => "mark contract signed",
            ProjectAction::ConfirmPrepayment => "confirm prepayment",
            ProjectAction::CreateProductionOrder => "create production order",
            ProjectAction::MarkLost => "mark lost",
            ProjectAction::Reopen => "reopen",
            ProjectAction::ViewCostPrice => "view cost price",
        };
        write!(f, "{}", s)
    }
}

/// Decide whether `role` may perform `action` while the project is at `stage`.
///
/// Stage preconditions that depend on project *data* (lock flags, version
/// status, payment confirmation) are enforced by the dossier operations; this
/// function covers the role/stage matrix only.
pub fn can(role: Role, action: ProjectAction, stage: ProjectStage) -> bool {
    if role == Role::Admin {
        return true;
    }

    match action {
        ProjectAction::EditSelection | ProjectAction::SubmitTechnicalList => {
            role == Role::Engineering && stage == ProjectStage::TechnicalSelectionInProgress
        }
        ProjectAction::RespondToModification => role == Role::Engineering,
        ProjectAction::RejectTechnicalVersion | ProjectAction::ConfirmTechnicalVersion => {
            role == Role::Commercial
        }
        ProjectAction::GenerateQuotation => {
            role == Role::Commercial
                && matches!(
                    stage,
                    ProjectStage::PendingCommercialQuote | ProjectStage::QuotedAwaitingInquiry
                )
        }
        // Role check only; after signature the project lock rejects the
        // edit with the precise locked error.
        ProjectAction::EditQuotation => matches!(role, Role::Commercial | Role::Management),
        ProjectAction::AdvanceStage => {
            matches!(role, Role::Commercial | Role::Management) && !stage.is_terminal()
        }
        ProjectAction::MarkContractSigned => {
            matches!(role, Role::Commercial | Role::Management)
                && stage == ProjectStage::ContractPendingClientSeal
        }
        ProjectAction::ConfirmPrepayment | ProjectAction::CreateProductionOrder => {
            role == Role::Management
        }
        ProjectAction::MarkLost => {
            matches!(role, Role::Commercial | Role::Management) && stage.is_pre_signature()
        }
        ProjectAction::Reopen => role == Role::Management && !stage.is_terminal(),
        ProjectAction::ViewCostPrice => matches!(role, Role::Commercial | Role::Management),
    }
}
