//! Entity type definitions
//!
//! VCT persists the following record types:
//!
//! **Engineering:**
//! - [`SelectionRequirement`] - one engineered valve/actuator need
//! - [`TechnicalVersionSnapshot`] - immutable numbered capture of the technical list
//!
//! **Commercial:**
//! - [`QuotationLine`] / [`QuotationSnapshot`] - priced BOM derived from a version
//! - [`ModificationRequest`] - reviewer-proposed changes to a locked version
//!
//! **After-sales:**
//! - [`Ticket`] - service tickets with a resolve/confirm/reopen loop

pub mod modification;
pub mod quotation;
pub mod selection;
pub mod technical;
pub mod ticket;

pub use modification::{LineSuggestion, ModificationRequest, ModificationStatus};
pub use quotation::{QuotationLine, QuotationSnapshot};
pub use selection::SelectionRequirement;
pub use technical::{TechnicalVersionSnapshot, VersionStatus};
pub use ticket::{Ticket, TicketStage};
