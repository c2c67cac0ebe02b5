//! Quotation snapshots - priced BOM derived from a technical version

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::pricing::{self, PricingRule};
use crate::entities::technical::TechnicalVersionSnapshot;

/// One priced row of a quotation BOM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationLine {
    /// Unique identifier
    pub id: EntityId,

    /// Model identifier
    pub model: String,

    /// Order quantity
    pub quantity: u32,

    /// List price the pricing rule starts from
    pub base_price: f64,

    /// Internal cost price; shown to privileged roles only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<f64>,

    /// How the unit price is determined
    #[serde(default)]
    pub pricing: PricingRule,

    /// Computed unit price
    pub unit_price: f64,

    /// Computed total price (unit_price * quantity)
    pub total_price: f64,

    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl QuotationLine {
    pub fn new(model: impl Into<String>, quantity: u32, base_price: f64) -> Self {
        let mut line = Self {
            id: EntityId::new(EntityPrefix::Line),
            model: model.into(),
            quantity,
            base_price,
            cost_price: None,
            pricing: PricingRule::Standard,
            unit_price: 0.0,
            total_price: 0.0,
            notes: None,
        };
        line.reprice();
        line
    }

    /// Recompute unit and total price from the current rule and quantity.
    /// Called after every quantity or pricing-rule change.
    pub fn reprice(&mut self) {
        self.unit_price = pricing::unit_price(self.base_price, self.quantity, &self.pricing);
        self.total_price = self.unit_price * f64::from(self.quantity);
    }

    /// Display-only discount percentage for manual overrides below base price
    pub fn discount_percent(&self) -> Option<u32> {
        pricing::discount_percent(self.base_price, self.unit_price)
    }
}

/// A frozen, priced BOM derived from one technical version snapshot.
/// Reviewer edits apply to this copy, never back to the technical version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationSnapshot {
    /// Version of the technical snapshot this derives from
    pub based_on_version: u32,

    /// Priced lines
    pub lines: Vec<QuotationLine>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Commercial reviewer who generated it
    pub author: String,
}

impl QuotationSnapshot {
    /// Derive a quotation from a technical version: one standard-priced line
    /// per requirement, quantity 1.
    pub fn derive(snapshot: &TechnicalVersionSnapshot, author: impl Into<String>) -> Self {
        let lines = snapshot
            .requirements
            .iter()
            .map(|req| {
                let mut line = QuotationLine::new(req.model.clone(), 1, req.unit_price);
                line.notes = Some(format!("tag {}", req.tag));
                line
            })
            .collect();

        Self {
            based_on_version: snapshot.version,
            lines,
            created: Utc::now(),
            author: author.into(),
        }
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.total_price).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
