//! Project dossier - the aggregate holding one project's commercial lifecycle
//!
//! A dossier owns the selection requirements, technical version history,
//! quotation snapshots, modification requests and the audit log of one
//! project. Every mutation goes through an operation on this type; each
//! operation checks role policy, lifecycle stage and lock state before
//! touching data, so a dossier loaded from disk can never be driven into an
//! inconsistent state through the public API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::audit::{AuditLog, OperationAuditEntry, OperationKind};
use crate::core::entity::Entity;
use crate::core::error::DossierError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::lifecycle::{self, ProjectStage};
use crate::core::policy::{self, ProjectAction};
use crate::core::pricing::PricingRule;
use crate::core::team::Actor;
use crate::entities::modification::{LineSuggestion, ModificationRequest, ModificationStatus};
use crate::entities::quotation::{QuotationLine, QuotationSnapshot};
use crate::entities::selection::SelectionRequirement;
use crate::entities::technical::{TechnicalVersionSnapshot, VersionStatus};

/// One project's full commercial record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDossier {
    /// Unique identifier
    pub id: EntityId,

    /// Project title
    pub title: String,

    /// Customer name
    pub customer: String,

    /// Current lifecycle stage
    #[serde(default)]
    pub stage: ProjectStage,

    /// Whole-project lock; set when the contract is signed
    #[serde(default)]
    pub locked: bool,

    /// Why the project is locked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_reason: Option<String>,

    /// Technical list lock; set on submission, cleared on rejection
    #[serde(default)]
    pub technical_list_locked: bool,

    /// Whether the prepayment has been confirmed
    #[serde(default)]
    pub prepayment_confirmed: bool,

    /// Reference to the signed contract document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_document: Option<String>,

    /// Working technical list, editable while unlocked
    #[serde(default)]
    pub requirements: Vec<SelectionRequirement>,

    /// Immutable technical version history, versions numbered from 1
    #[serde(default)]
    pub technical_versions: Vec<TechnicalVersionSnapshot>,

    /// Quotation snapshots; the last one is the current quotation
    #[serde(default)]
    pub quotations: Vec<QuotationSnapshot>,

    /// Modification requests raised against rejected versions
    #[serde(default)]
    pub modification_requests: Vec<ModificationRequest>,

    /// Append-only audit log of irreversible confirmations
    #[serde(default)]
    pub audit_log: AuditLog,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author who created the project
    pub author: String,
}

impl ProjectDossier {
    pub fn new(
        title: impl Into<String>,
        customer: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Prj),
            title: title.into(),
            customer: customer.into(),
            stage: ProjectStage::Draft,
            locked: false,
            locked_reason: None,
            technical_list_locked: false,
            prepayment_confirmed: false,
            contract_document: None,
            requirements: Vec::new(),
            technical_versions: Vec::new(),
            quotations: Vec::new(),
            modification_requests: Vec::new(),
            audit_log: AuditLog::new(),
            created: Utc::now(),
            author: author.into(),
        }
    }

    // -- guards -------------------------------------------------------------

    fn ensure_permitted(&self, actor: &Actor, action: ProjectAction) -> Result<(), DossierError> {
        if policy::can(actor.role, action, self.stage) {
            Ok(())
        } else {
            Err(DossierError::NotPermitted {
                role: actor.role,
                action,
                stage: self.stage,
            })
        }
    }

    /// Commercial content (requirements, versions, quotation lines) can no
    /// longer change once the contract is signed. Gated lifecycle
    /// confirmations stay available and are audited separately.
    fn ensure_unlocked(&self) -> Result<(), DossierError> {
        if self.locked {
            Err(DossierError::ProjectLocked {
                project: self.id.to_string(),
                reason: self
                    .locked_reason
                    .clone()
                    .unwrap_or_else(|| "locked".to_string()),
            })
        } else {
            Ok(())
        }
    }

    fn ensure_list_unlocked(&self) -> Result<(), DossierError> {
        if self.technical_list_locked {
            Err(DossierError::TechnicalListLocked {
                project: self.id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    // -- selection requirements ---------------------------------------------

    /// Add a selection requirement to the working technical list
    pub fn add_requirement(
        &mut self,
        actor: &Actor,
        requirement: SelectionRequirement,
    ) -> Result<(), DossierError> {
        self.ensure_permitted(actor, ProjectAction::EditSelection)?;
        self.ensure_unlocked()?;
        self.ensure_list_unlocked()?;

        if requirement.required_torque <= 0.0 {
            return Err(DossierError::InvalidTorque {
                torque: requirement.required_torque,
            });
        }
        if self.requirements.iter().any(|r| r.tag == requirement.tag) {
            return Err(DossierError::DuplicateTag {
                project: self.id.to_string(),
                tag: requirement.tag,
            });
        }

        self.requirements.push(requirement);
        Ok(())
    }

    /// Mutate a requirement in place, identified by its tag
    pub fn update_requirement(
        &mut self,
        actor: &Actor,
        tag: &str,
        update: impl FnOnce(&mut SelectionRequirement),
    ) -> Result<(), DossierError> {
        self.ensure_permitted(actor, ProjectAction::EditSelection)?;
        self.ensure_unlocked()?;
        self.ensure_list_unlocked()?;

        let requirement = self
            .requirements
            .iter_mut()
            .find(|r| r.tag == tag)
            .ok_or_else(|| DossierError::TagNotFound {
                project: self.id.to_string(),
                tag: tag.to_string(),
            })?;
        update(requirement);

        if requirement.required_torque <= 0.0 {
            return Err(DossierError::InvalidTorque {
                torque: requirement.required_torque,
            });
        }
        Ok(())
    }

    /// Remove a requirement from the working list
    pub fn remove_requirement(&mut self, actor: &Actor, tag: &str) -> Result<(), DossierError> {
        self.ensure_permitted(actor, ProjectAction::EditSelection)?;
        self.ensure_unlocked()?;
        self.ensure_list_unlocked()?;

        let before = self.requirements.len();
        self.requirements.retain(|r| r.tag != tag);
        if self.requirements.len() == before {
            return Err(DossierError::TagNotFound {
                project: self.id.to_string(),
                tag: tag.to_string(),
            });
        }
        Ok(())
    }

    // -- technical versions -------------------------------------------------

    /// Submit the working list for commercial review. Captures an immutable
    /// numbered snapshot, locks the working list and moves the project to
    /// `pending_commercial_quote`. Returns the new version number.
    pub fn submit_technical_list(&mut self, actor: &Actor) -> Result<u32, DossierError> {
        self.ensure_permitted(actor, ProjectAction::SubmitTechnicalList)?;
        self.ensure_unlocked()?;
        self.ensure_list_unlocked()?;

        if self.requirements.is_empty() {
            return Err(DossierError::EmptyRequirementSet);
        }

        let version = self
            .technical_versions
            .iter()
            .map(|v| v.version)
            .max()
            .unwrap_or(0)
            + 1;
        self.technical_versions.push(TechnicalVersionSnapshot::new(
            version,
            self.requirements.clone(),
            actor.name.clone(),
        ));
        self.technical_list_locked = true;
        self.stage = ProjectStage::PendingCommercialQuote;
        Ok(version)
    }

    pub fn version(&self, number: u32) -> Option<&TechnicalVersionSnapshot> {
        self.technical_versions.iter().find(|v| v.version == number)
    }

    fn version_mut(&mut self, number: u32) -> Result<&mut TechnicalVersionSnapshot, DossierError> {
        let id = self.id.to_string();
        self.technical_versions
            .iter_mut()
            .find(|v| v.version == number)
            .ok_or(DossierError::VersionNotFound {
                project: id,
                version: number,
            })
    }

    pub fn latest_version(&self) -> Option<&TechnicalVersionSnapshot> {
        self.technical_versions.iter().max_by_key(|v| v.version)
    }

    /// Reject a submitted version. Records the reviewer's suggestions as a
    /// modification request, unlocks the working list and sends the project
    /// back to engineering. Returns the request id.
    pub fn reject_technical_version(
        &mut self,
        actor: &Actor,
        version: u32,
        suggestions: Vec<LineSuggestion>,
        notes: Option<String>,
    ) -> Result<EntityId, DossierError> {
        self.ensure_permitted(actor, ProjectAction::RejectTechnicalVersion)?;
        self.ensure_unlocked()?;

        if !self.technical_list_locked {
            return Err(DossierError::VersionNotLocked {
                project: self.id.to_string(),
                version,
            });
        }

        let snapshot = self.version_mut(version)?;
        if snapshot.status != VersionStatus::Submitted {
            return Err(DossierError::VersionNotSubmitted {
                version,
                status: snapshot.status,
            });
        }
        snapshot.status = VersionStatus::Rejected;
        snapshot.rejection_notes = notes;

        let request = ModificationRequest::new(version, suggestions, actor.name.clone());
        let request_id = request.id.clone();
        self.modification_requests.push(request);

        self.technical_list_locked = false;
        self.stage = ProjectStage::TechnicalSelectionInProgress;
        Ok(request_id)
    }

    pub fn modification_request(&self, id: &EntityId) -> Option<&ModificationRequest> {
        self.modification_requests.iter().find(|r| &r.id == id)
    }

    /// Engineer responds to a pending modification request, exactly once
    pub fn respond_to_modification(
        &mut self,
        actor: &Actor,
        request_id: &EntityId,
        accept: bool,
        response: Option<String>,
    ) -> Result<(), DossierError> {
        self.ensure_permitted(actor, ProjectAction::RespondToModification)?;
        self.ensure_unlocked()?;

        let id = self.id.to_string();
        let request = self
            .modification_requests
            .iter_mut()
            .find(|r| &r.id == request_id)
            .ok_or_else(|| DossierError::RequestNotFound {
                project: id,
                request: request_id.to_string(),
            })?;

        if !request.is_pending() {
            return Err(DossierError::AlreadyResponded {
                request: request_id.to_string(),
            });
        }

        request.status = if accept {
            ModificationStatus::Accepted
        } else {
            ModificationStatus::Rejected
        };
        request.response = response;
        request.responded = Some(Utc::now());
        Ok(())
    }

    /// Confirm a submitted version. Confirming an already confirmed version
    /// is a no-op, not an error.
    pub fn confirm_technical_version(
        &mut self,
        actor: &Actor,
        version: u32,
    ) -> Result<(), DossierError> {
        self.ensure_permitted(actor, ProjectAction::ConfirmTechnicalVersion)?;
        self.ensure_unlocked()?;

        let snapshot = self.version_mut(version)?;
        match snapshot.status {
            VersionStatus::Confirmed => Ok(()),
            VersionStatus::Submitted => {
                snapshot.status = VersionStatus::Confirmed;
                Ok(())
            }
            status => Err(DossierError::VersionNotSubmitted { version, status }),
        }
    }

    // -- quotations ---------------------------------------------------------

    /// Generate a fresh quotation snapshot from a quotable technical version
    pub fn generate_quotation(
        &mut self,
        actor: &Actor,
        version: u32,
    ) -> Result<&QuotationSnapshot, DossierError> {
        self.ensure_permitted(actor, ProjectAction::GenerateQuotation)?;
        self.ensure_unlocked()?;

        let id = self.id.to_string();
        let snapshot = self
            .version(version)
            .ok_or(DossierError::VersionNotFound {
                project: id,
                version,
            })?;
        if !snapshot.is_quotable() {
            return Err(DossierError::VersionNotQuotable {
                version,
                status: snapshot.status,
            });
        }

        let quotation = QuotationSnapshot::derive(snapshot, actor.name.clone());
        self.quotations.push(quotation);

        if self.stage == ProjectStage::PendingCommercialQuote {
            self.stage = ProjectStage::QuotedAwaitingInquiry;
        }
        self.quotations
            .last()
            .ok_or(DossierError::QuotationMissing {
                project: self.id.to_string(),
            })
    }

    pub fn current_quotation(&self) -> Option<&QuotationSnapshot> {
        self.quotations.last()
    }

    fn current_quotation_mut(&mut self) -> Result<&mut QuotationSnapshot, DossierError> {
        let id = self.id.to_string();
        self.quotations
            .last_mut()
            .ok_or(DossierError::QuotationMissing { project: id })
    }

    /// Add a manual line to the current quotation
    pub fn add_quotation_line(
        &mut self,
        actor: &Actor,
        model: impl Into<String>,
        quantity: u32,
        base_price: f64,
    ) -> Result<EntityId, DossierError> {
        self.ensure_permitted(actor, ProjectAction::EditQuotation)?;
        self.ensure_unlocked()?;

        if quantity < 1 {
            return Err(DossierError::InvalidQuantity {
                quantity: i64::from(quantity),
            });
        }

        let line = QuotationLine::new(model, quantity, base_price);
        let line_id = line.id.clone();
        self.current_quotation_mut()?.lines.push(line);
        Ok(line_id)
    }

    /// Change quantity and/or pricing rule of a line, then reprice it
    pub fn update_quotation_line(
        &mut self,
        actor: &Actor,
        line_id: &EntityId,
        quantity: Option<u32>,
        pricing: Option<PricingRule>,
    ) -> Result<(), DossierError> {
        self.ensure_permitted(actor, ProjectAction::EditQuotation)?;
        self.ensure_unlocked()?;

        if let Some(qty) = quantity {
            if qty < 1 {
                return Err(DossierError::InvalidQuantity {
                    quantity: i64::from(qty),
                });
            }
        }

        let quotation = self.current_quotation_mut()?;
        let line = quotation
            .lines
            .iter_mut()
            .find(|l| &l.id == line_id)
            .ok_or_else(|| DossierError::LineNotFound {
                line: line_id.to_string(),
            })?;

        if let Some(qty) = quantity {
            line.quantity = qty;
        }
        if let Some(rule) = pricing {
            line.pricing = rule;
        }
        line.reprice();
        Ok(())
    }

    /// Remove a line from the current quotation
    pub fn delete_quotation_line(
        &mut self,
        actor: &Actor,
        line_id: &EntityId,
    ) -> Result<(), DossierError> {
        self.ensure_permitted(actor, ProjectAction::EditQuotation)?;
        self.ensure_unlocked()?;

        let quotation = self.current_quotation_mut()?;
        let before = quotation.lines.len();
        quotation.lines.retain(|l| &l.id != line_id);
        if quotation.lines.len() == before {
            return Err(DossierError::LineNotFound {
                line: line_id.to_string(),
            });
        }
        Ok(())
    }

    // -- lifecycle ----------------------------------------------------------

    /// Advance the project one stage along the forward chain. Stages owned by
    /// a dedicated operation cannot be entered this way.
    pub fn advance_stage(&mut self, actor: &Actor) -> Result<ProjectStage, DossierError> {
        self.ensure_permitted(actor, ProjectAction::AdvanceStage)?;

        let next = self.stage.next().ok_or(DossierError::InvalidTransition {
            project: self.id.to_string(),
            from: self.stage,
            to: self.stage,
        })?;
        if let Some(operation) = next.entry_operation() {
            return Err(DossierError::StageRequiresOperation {
                stage: next,
                operation,
            });
        }

        let from = self.stage;
        self.stage = next;
        self.audit(
            OperationKind::StageAdvanced,
            format!("stage advanced {} -> {}", from, next),
            actor,
            None,
            BTreeMap::from([("from".to_string(), from.to_string())]),
        );
        Ok(next)
    }

    /// Reopen the previous stage, one step back
    pub fn reopen_stage(&mut self, actor: &Actor) -> Result<ProjectStage, DossierError> {
        self.ensure_permitted(actor, ProjectAction::Reopen)?;

        let prev = self.stage.prev().ok_or(DossierError::InvalidTransition {
            project: self.id.to_string(),
            from: self.stage,
            to: self.stage,
        })?;

        let from = self.stage;
        self.stage = prev;
        self.audit(
            OperationKind::StageReopened,
            format!("stage reopened {} -> {}", from, prev),
            actor,
            None,
            BTreeMap::from([("from".to_string(), from.to_string())]),
        );
        Ok(prev)
    }

    /// Mark the inquiry lost. Only possible before contract signature.
    pub fn mark_lost(&mut self, actor: &Actor, reason: impl Into<String>) -> Result<(), DossierError> {
        self.ensure_permitted(actor, ProjectAction::MarkLost)?;

        if !lifecycle::is_valid_transition(self.stage, ProjectStage::Lost) {
            return Err(DossierError::InvalidTransition {
                project: self.id.to_string(),
                from: self.stage,
                to: ProjectStage::Lost,
            });
        }

        let reason = reason.into();
        self.stage = ProjectStage::Lost;
        self.audit(
            OperationKind::MarkedLost,
            "inquiry marked lost",
            actor,
            None,
            BTreeMap::from([("reason".to_string(), reason)]),
        );
        Ok(())
    }

    /// Record contract signature. Requires a contract document reference,
    /// moves the project to `contract_signed_won` and locks commercial
    /// content for good.
    pub fn mark_contract_signed(
        &mut self,
        actor: &Actor,
        document: &str,
        declaration: Option<String>,
    ) -> Result<(), DossierError> {
        self.ensure_permitted(actor, ProjectAction::MarkContractSigned)?;

        if document.trim().is_empty() {
            return Err(DossierError::MissingContractDocument);
        }

        self.contract_document = Some(document.to_string());
        self.stage = ProjectStage::ContractSignedWon;
        self.locked = true;
        self.locked_reason = Some("contract signed".to_string());

        self.audit(
            OperationKind::ContractSigned,
            "contract signed by customer",
            actor,
            declaration,
            BTreeMap::from([("document".to_string(), document.to_string())]),
        );
        self.audit(
            OperationKind::ProjectLocked,
            "commercial content locked",
            actor,
            None,
            BTreeMap::new(),
        );
        Ok(())
    }

    /// Record receipt of the prepayment. The audit trail for payment is
    /// written together with the production order.
    pub fn set_prepayment_confirmed(&mut self, actor: &Actor) -> Result<(), DossierError> {
        self.ensure_permitted(actor, ProjectAction::ConfirmPrepayment)?;
        self.prepayment_confirmed = true;
        if self.stage == ProjectStage::PrepaymentPending {
            self.stage = ProjectStage::ProductionPreparing;
        }
        Ok(())
    }

    /// Confirm payment and create the production order in one irreversible
    /// step. All preconditions are checked before anything is written; on
    /// success exactly two audit entries are appended and the project enters
    /// `in_production`.
    pub fn confirm_payment_and_create_production_order(
        &mut self,
        actor: &Actor,
        declaration: Option<String>,
    ) -> Result<(EntityId, EntityId), DossierError> {
        self.ensure_permitted(actor, ProjectAction::CreateProductionOrder)?;

        let project = self.id.to_string();
        if matches!(self.stage, ProjectStage::InProduction | ProjectStage::Completed) {
            return Err(DossierError::AlreadyInProduction { project });
        }
        let quotation = self
            .quotations
            .last()
            .ok_or(DossierError::QuotationMissing {
                project: project.clone(),
            })?;
        if quotation.is_empty() {
            return Err(DossierError::QuotationEmpty { project });
        }
        if !self.prepayment_confirmed {
            return Err(DossierError::PaymentNotConfirmed { project });
        }
        if !matches!(
            self.stage,
            ProjectStage::PrepaymentPending | ProjectStage::ProductionPreparing
        ) {
            return Err(DossierError::InvalidTransition {
                project,
                from: self.stage,
                to: ProjectStage::InProduction,
            });
        }

        let total = quotation.total();
        let line_count = quotation.lines.len();

        let payment_id = self.audit(
            OperationKind::PaymentConfirmed,
            "prepayment confirmed",
            actor,
            declaration.clone(),
            BTreeMap::from([("total".to_string(), format!("{:.2}", total))]),
        );
        let order_id = self.audit(
            OperationKind::ProductionOrderCreated,
            "production order created",
            actor,
            declaration,
            BTreeMap::from([
                ("lines".to_string(), line_count.to_string()),
                ("total".to_string(), format!("{:.2}", total)),
            ]),
        );

        self.stage = ProjectStage::InProduction;
        Ok((payment_id, order_id))
    }

    fn audit(
        &mut self,
        operation: OperationKind,
        description: impl Into<String>,
        actor: &Actor,
        declaration: Option<String>,
        details: BTreeMap<String, String>,
    ) -> EntityId {
        self.audit_log.append(OperationAuditEntry::new(
            operation,
            description,
            actor,
            declaration,
            details,
        ))
    }
}

impl Entity for ProjectDossier {
    const PREFIX: &'static str = "PRJ";

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::team::Role;

    fn engineer() -> Actor {
        Actor::new("jsmith", Role::Engineering)
    }

    fn reviewer() -> Actor {
        Actor::new("bwilson", Role::Commercial)
    }

    fn manager() -> Actor {
        Actor::new("alee", Role::Management)
    }

    fn requirement(tag: &str) -> SelectionRequirement {
        SelectionRequirement::new(
            tag,
            500.0,
            "SF10-DA",
            "SF",
            "double_acting",
            120.0,
            550.0,
            "jsmith",
        )
    }

    fn dossier_in_selection() -> ProjectDossier {
        let mut d = ProjectDossier::new("Refinery unit 4", "Acme Petrochem", "jsmith");
        d.stage = ProjectStage::TechnicalSelectionInProgress;
        d
    }

    fn dossier_with_quote() -> ProjectDossier {
        let mut d = dossier_in_selection();
        d.add_requirement(&engineer(), requirement("V-101")).unwrap();
        d.submit_technical_list(&engineer()).unwrap();
        d.generate_quotation(&reviewer(), 1).unwrap();
        d
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let mut d = dossier_in_selection();
        d.add_requirement(&engineer(), requirement("V-101")).unwrap();
        let err = d.add_requirement(&engineer(), requirement("V-101")).unwrap_err();
        assert!(matches!(err, DossierError::DuplicateTag { .. }));
    }

    #[test]
    fn test_submit_locks_list_and_numbers_versions() {
        let mut d = dossier_in_selection();
        d.add_requirement(&engineer(), requirement("V-101")).unwrap();

        let v = d.submit_technical_list(&engineer()).unwrap();
        assert_eq!(v, 1);
        assert!(d.technical_list_locked);
        assert_eq!(d.stage, ProjectStage::PendingCommercialQuote);

        // Locked list rejects further edits
        let err = d.add_requirement(&engineer(), requirement("V-102")).unwrap_err();
        assert!(matches!(err, DossierError::NotPermitted { .. }));

        // Rejection unlocks; next submission gets version 2
        d.reject_technical_version(&reviewer(), 1, vec![], None).unwrap();
        d.add_requirement(&engineer(), requirement("V-102")).unwrap();
        let v = d.submit_technical_list(&engineer()).unwrap();
        assert_eq!(v, 2);
    }

    #[test]
    fn test_submit_empty_list_rejected() {
        let mut d = dossier_in_selection();
        let err = d.submit_technical_list(&engineer()).unwrap_err();
        assert!(matches!(err, DossierError::EmptyRequirementSet));
        assert!(d.technical_versions.is_empty());
    }

    #[test]
    fn test_reject_creates_pending_request_and_reopens_selection() {
        let mut d = dossier_in_selection();
        d.add_requirement(&engineer(), requirement("V-101")).unwrap();
        d.submit_technical_list(&engineer()).unwrap();

        let suggestions = vec![LineSuggestion {
            tag: "V-101".to_string(),
            original_model: "SF10-DA".to_string(),
            suggested_model: "SF08-DA".to_string(),
            reason: "oversized".to_string(),
            detail: None,
        }];
        let request_id = d
            .reject_technical_version(&reviewer(), 1, suggestions, Some("too expensive".into()))
            .unwrap();

        assert_eq!(d.stage, ProjectStage::TechnicalSelectionInProgress);
        assert!(!d.technical_list_locked);
        assert_eq!(d.version(1).unwrap().status, VersionStatus::Rejected);
        assert!(d.modification_request(&request_id).unwrap().is_pending());
    }

    #[test]
    fn test_modification_response_is_one_shot() {
        let mut d = dossier_in_selection();
        d.add_requirement(&engineer(), requirement("V-101")).unwrap();
        d.submit_technical_list(&engineer()).unwrap();
        let request_id = d
            .reject_technical_version(&reviewer(), 1, vec![], None)
            .unwrap();

        d.respond_to_modification(&engineer(), &request_id, true, Some("agreed".into()))
            .unwrap();
        let err = d
            .respond_to_modification(&engineer(), &request_id, false, None)
            .unwrap_err();
        assert!(matches!(err, DossierError::AlreadyResponded { .. }));

        let request = d.modification_request(&request_id).unwrap();
        assert_eq!(request.status, ModificationStatus::Accepted);
        assert!(request.responded.is_some());
    }

    #[test]
    fn test_confirm_is_idempotent() {
        let mut d = dossier_in_selection();
        d.add_requirement(&engineer(), requirement("V-101")).unwrap();
        d.submit_technical_list(&engineer()).unwrap();

        d.confirm_technical_version(&reviewer(), 1).unwrap();
        d.confirm_technical_version(&reviewer(), 1).unwrap();
        assert_eq!(d.version(1).unwrap().status, VersionStatus::Confirmed);
    }

    #[test]
    fn test_rejected_version_cannot_back_a_quotation() {
        let mut d = dossier_in_selection();
        d.add_requirement(&engineer(), requirement("V-101")).unwrap();
        d.submit_technical_list(&engineer()).unwrap();
        d.reject_technical_version(&reviewer(), 1, vec![], None).unwrap();
        d.add_requirement(&engineer(), requirement("V-102")).unwrap();
        d.submit_technical_list(&engineer()).unwrap();

        let err = d.generate_quotation(&reviewer(), 1).unwrap_err();
        assert!(matches!(err, DossierError::VersionNotQuotable { .. }));
        assert!(d.generate_quotation(&reviewer(), 2).is_ok());
    }

    #[test]
    fn test_generate_quotation_moves_stage() {
        let d = dossier_with_quote();
        assert_eq!(d.stage, ProjectStage::QuotedAwaitingInquiry);
        let quote = d.current_quotation().unwrap();
        assert_eq!(quote.based_on_version, 1);
        assert_eq!(quote.lines.len(), 1);
    }

    #[test]
    fn test_quotation_line_edits() {
        let mut d = dossier_with_quote();
        let line_id = d
            .add_quotation_line(&reviewer(), "SF05-DA", 4, 60.0)
            .unwrap();

        d.update_quotation_line(&reviewer(), &line_id, Some(10), None)
            .unwrap();
        let line = d
            .current_quotation()
            .unwrap()
            .lines
            .iter()
            .find(|l| l.id == line_id)
            .unwrap();
        assert_eq!(line.quantity, 10);
        assert_eq!(line.total_price, 600.0);

        let err = d
            .update_quotation_line(&reviewer(), &line_id, Some(0), None)
            .unwrap_err();
        assert!(matches!(err, DossierError::InvalidQuantity { .. }));

        d.delete_quotation_line(&reviewer(), &line_id).unwrap();
        assert_eq!(d.current_quotation().unwrap().lines.len(), 1);
    }

    #[test]
    fn test_advance_refuses_operation_gated_stages() {
        let mut d = dossier_in_selection();
        // next stage is pending_commercial_quote, owned by submission
        let err = d.advance_stage(&manager()).unwrap_err();
        assert!(matches!(err, DossierError::StageRequiresOperation { .. }));
    }

    #[test]
    fn test_contract_signing_requires_document_and_locks() {
        let mut d = dossier_with_quote();
        d.advance_stage(&manager()).unwrap(); // contract_draft_pending
        d.advance_stage(&manager()).unwrap(); // contract_under_commercial_review
        d.advance_stage(&manager()).unwrap(); // contract_pending_client_seal

        let err = d.mark_contract_signed(&manager(), "  ", None).unwrap_err();
        assert!(matches!(err, DossierError::MissingContractDocument));

        d.mark_contract_signed(&manager(), "contracts/acme-2026-014.pdf", None)
            .unwrap();
        assert_eq!(d.stage, ProjectStage::ContractSignedWon);
        assert!(d.locked);

        // Commercial content can no longer change
        let line_id = d.current_quotation().unwrap().lines[0].id.clone();
        let err = d
            .update_quotation_line(&manager(), &line_id, Some(5), None)
            .unwrap_err();
        assert!(matches!(err, DossierError::ProjectLocked { .. }));
        let err = d
            .add_quotation_line(&manager(), "SF05-DA", 1, 60.0)
            .unwrap_err();
        assert!(matches!(err, DossierError::ProjectLocked { .. }));
        let err = d.delete_quotation_line(&manager(), &line_id).unwrap_err();
        assert!(matches!(err, DossierError::ProjectLocked { .. }));
    }

    fn dossier_at_production_gate() -> ProjectDossier {
        let mut d = dossier_with_quote();
        d.advance_stage(&manager()).unwrap();
        d.advance_stage(&manager()).unwrap();
        d.advance_stage(&manager()).unwrap();
        d.mark_contract_signed(&manager(), "contracts/acme-2026-014.pdf", None)
            .unwrap();
        d.advance_stage(&manager()).unwrap(); // prepayment_pending
        d
    }

    #[test]
    fn test_production_order_requires_payment() {
        let mut d = dossier_at_production_gate();
        let before = d.audit_log.len();

        let err = d
            .confirm_payment_and_create_production_order(&manager(), None)
            .unwrap_err();
        assert!(matches!(err, DossierError::PaymentNotConfirmed { .. }));
        // failed gate writes nothing
        assert_eq!(d.audit_log.len(), before);
    }

    #[test]
    fn test_production_order_writes_exactly_two_entries() {
        let mut d = dossier_at_production_gate();
        d.set_prepayment_confirmed(&manager()).unwrap();
        let before = d.audit_log.len();

        let (payment_id, order_id) = d
            .confirm_payment_and_create_production_order(&manager(), Some("wire ref 4417".into()))
            .unwrap();

        assert_eq!(d.stage, ProjectStage::InProduction);
        assert_eq!(d.audit_log.len(), before + 2);
        assert_ne!(payment_id, order_id);

        let entries = d.audit_log.entries();
        let kinds: Vec<_> = entries.iter().rev().take(2).map(|e| e.operation).collect();
        assert!(kinds.contains(&OperationKind::PaymentConfirmed));
        assert!(kinds.contains(&OperationKind::ProductionOrderCreated));

        // second attempt is refused
        let err = d
            .confirm_payment_and_create_production_order(&manager(), None)
            .unwrap_err();
        assert!(matches!(err, DossierError::AlreadyInProduction { .. }));
    }

    #[test]
    fn test_mark_lost_pre_signature_only() {
        let mut d = dossier_with_quote();
        d.mark_lost(&manager(), "competitor undercut").unwrap();
        assert_eq!(d.stage, ProjectStage::Lost);
        assert_eq!(d.audit_log.len(), 1);

        let mut signed = dossier_at_production_gate();
        let err = signed.mark_lost(&manager(), "too late").unwrap_err();
        assert!(matches!(err, DossierError::NotPermitted { .. }));
    }

    #[test]
    fn test_reopen_steps_back_once() {
        let mut d = dossier_with_quote();
        d.advance_stage(&manager()).unwrap(); // contract_draft_pending
        let back = d.reopen_stage(&manager()).unwrap();
        assert_eq!(back, ProjectStage::QuotedAwaitingInquiry);
    }
}
