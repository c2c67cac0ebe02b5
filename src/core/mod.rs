//! Core module - identity, lifecycle, policy and the dossier aggregate

pub mod audit;
pub mod config;
pub mod consolidate;
pub mod dossier;
pub mod entity;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod policy;
pub mod pricing;
pub mod store;
pub mod team;
pub mod workspace;

pub use audit::{AuditLog, OperationAuditEntry, OperationKind};
pub use config::Config;
pub use consolidate::{consolidate, ConsolidatedLine, ConsolidationResult, ConsolidationStats};
pub use dossier::ProjectDossier;
pub use entity::Entity;
pub use error::{DossierError, ErrorKind};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use lifecycle::ProjectStage;
pub use policy::ProjectAction;
pub use pricing::{PriceTier, PricingRule};
pub use store::{DossierStore, StoreError};
pub use team::{Actor, Role, TeamMember, TeamRoster};
pub use workspace::{Workspace, WorkspaceError};
