//! Typed errors for dossier operations
//!
//! Every failure carries enough context (project, version, request) for the
//! caller to render a precise message. The four-kind taxonomy lets transports
//! map errors onto status codes without matching individual variants.

use thiserror::Error;

use crate::core::lifecycle::ProjectStage;
use crate::core::policy::ProjectAction;
use crate::core::team::Role;
use crate::entities::technical::VersionStatus;

/// Coarse classification of a dossier error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or empty input
    Validation,
    /// Operation not legal in the current lifecycle or lock state
    StateConflict,
    /// Referenced version/request/line does not exist
    NotFound,
    /// Business precondition unmet
    Precondition,
}

/// Errors surfaced by dossier operations
#[derive(Debug, Error)]
pub enum DossierError {
    #[error("requirement set is empty; add selections before submitting")]
    EmptyRequirementSet,

    #[error("selection tag '{tag}' already exists in project {project}")]
    DuplicateTag { project: String, tag: String },

    #[error("selection tag '{tag}' not found in project {project}")]
    TagNotFound { project: String, tag: String },

    #[error("invalid quantity {quantity}; quotation lines require a quantity of at least 1")]
    InvalidQuantity { quantity: i64 },

    #[error("required torque must be positive (got {torque})")]
    InvalidTorque { torque: f64 },

    #[error("contract document reference is required to mark a contract signed")]
    MissingContractDocument,

    #[error(
        "technical list of project {project} is locked; wait for commercial review or rejection"
    )]
    TechnicalListLocked { project: String },

    #[error("technical list of project {project} is not locked; nothing to reject")]
    VersionNotLocked { project: String, version: u32 },

    #[error("project {project} is locked ({reason}); commercial content can no longer change")]
    ProjectLocked { project: String, reason: String },

    #[error("invalid stage transition for project {project}: {from} -> {to}")]
    InvalidTransition {
        project: String,
        from: ProjectStage,
        to: ProjectStage,
    },

    #[error("stage {stage} may only be entered via '{operation}'")]
    StageRequiresOperation {
        stage: ProjectStage,
        operation: &'static str,
    },

    #[error("role {role} may not {action} at stage {stage}")]
    NotPermitted {
        role: Role,
        action: ProjectAction,
        stage: ProjectStage,
    },

    #[error("technical version {version} not found in project {project}")]
    VersionNotFound { project: String, version: u32 },

    #[error("technical version {version} is not submitted (current status: {status})")]
    VersionNotSubmitted { version: u32, status: VersionStatus },

    #[error(
        "technical version {version} must be submitted or confirmed to back a quotation (current status: {status})"
    )]
    VersionNotQuotable { version: u32, status: VersionStatus },

    #[error("modification request {request} not found in project {project}")]
    RequestNotFound { project: String, request: String },

    #[error("modification request {request} has already been responded to")]
    AlreadyResponded { request: String },

    #[error("quotation line {line} not found")]
    LineNotFound { line: String },

    #[error("no quotation has been generated for project {project}")]
    QuotationMissing { project: String },

    #[error("quotation of project {project} has no lines; cannot create a production order")]
    QuotationEmpty { project: String },

    #[error("prepayment has not been confirmed for project {project}")]
    PaymentNotConfirmed { project: String },

    #[error("project {project} is already in production")]
    AlreadyInProduction { project: String },

    #[error("ticket transition not allowed: {from} -> {to}")]
    InvalidTicketTransition { from: String, to: String },
}

impl DossierError {
    /// Which of the four taxonomy kinds this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            DossierError::EmptyRequirementSet
            | DossierError::DuplicateTag { .. }
            | DossierError::InvalidQuantity { .. }
            | DossierError::InvalidTorque { .. }
            | DossierError::MissingContractDocument => ErrorKind::Validation,

            DossierError::TechnicalListLocked { .. }
            | DossierError::VersionNotLocked { .. }
            | DossierError::ProjectLocked { .. }
            | DossierError::InvalidTransition { .. }
            | DossierError::StageRequiresOperation { .. }
            | DossierError::NotPermitted { .. }
            | DossierError::VersionNotSubmitted { .. }
            | DossierError::VersionNotQuotable { .. }
            | DossierError::AlreadyResponded { .. }
            | DossierError::InvalidTicketTransition { .. } => ErrorKind::StateConflict,

            DossierError::TagNotFound { .. }
            | DossierError::VersionNotFound { .. }
            | DossierError::RequestNotFound { .. }
            | DossierError::LineNotFound { .. }
            | DossierError::QuotationMissing { .. } => ErrorKind::NotFound,

            DossierError::QuotationEmpty { .. }
            | DossierError::PaymentNotConfirmed { .. }
            | DossierError::AlreadyInProduction { .. } => ErrorKind::Precondition,
        }
    }
}
