//! Pricing rule evaluation for quotation lines
//!
//! Unit prices come from one of three rule kinds: the line's base price, a
//! quantity-tiered schedule, or an explicit manual override. Evaluation is a
//! pure function of (base price, quantity, rule).

use serde::{Deserialize, Serialize};

/// Quantity breakpoint for tiered pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Minimum quantity for this tier to apply
    pub min_qty: u32,

    /// Unit price at this tier
    pub unit_price: f64,
}

/// How a quotation line's unit price is determined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[derive(Default)]
pub enum PricingRule {
    /// Use the line's base price
    #[default]
    Standard,

    /// Quantity-tiered: the qualifying tier with the largest min_qty wins
    Tiered { tiers: Vec<PriceTier> },

    /// Reviewer-set unit price; falls back to base price when absent
    ManualOverride {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        price: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl std::fmt::Display for PricingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingRule::Standard => write!(f, "standard"),
            PricingRule::Tiered { tiers } => write!(f, "tiered ({} tiers)", tiers.len()),
            PricingRule::ManualOverride { .. } => write!(f, "manual_override"),
        }
    }
}

/// Compute a line's unit price from its base price, quantity, and rule
pub fn unit_price(base_price: f64, quantity: u32, rule: &PricingRule) -> f64 {
    match rule {
        PricingRule::Standard => base_price,
        PricingRule::ManualOverride { price, .. } => price.unwrap_or(base_price),
        PricingRule::Tiered { tiers } => tiers
            .iter()
            .filter(|t| t.min_qty <= quantity)
            .max_by_key(|t| t.min_qty)
            .map(|t| t.unit_price)
            .unwrap_or(base_price),
    }
}

/// Display-only discount percentage when the resulting unit price is below
/// the base price. Never fed back into pricing logic.
pub fn discount_percent(base_price: f64, unit_price: f64) -> Option<u32> {
    if base_price > 0.0 && unit_price < base_price {
        Some(((base_price - unit_price) / base_price * 100.0).round() as u32)
    } else {
        None
    }
}

/// Tier minimums that occur more than once. Duplicate minimums are accepted
/// (the last one in configured order wins) but worth a warning at edit time.
pub fn duplicate_minimums(tiers: &[PriceTier]) -> Vec<u32> {
    let mut seen = Vec::new();
    let mut dupes = Vec::new();
    for tier in tiers {
        if seen.contains(&tier.min_qty) {
            if !dupes.contains(&tier.min_qty) {
                dupes.push(tier.min_qty);
            }
        } else {
            seen.push(tier.min_qty);
        }
    }
    dupes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiers() -> PricingRule {
        PricingRule::Tiered {
            tiers: vec![
                PriceTier {
                    min_qty: 1,
                    unit_price: 100.0,
                },
                PriceTier {
                    min_qty: 10,
                    unit_price: 90.0,
                },
                PriceTier {
                    min_qty: 50,
                    unit_price: 80.0,
                },
            ],
        }
    }

    #[test]
    fn test_standard_uses_base_price() {
        assert_eq!(unit_price(42.5, 7, &PricingRule::Standard), 42.5);
    }

    #[test]
    fn test_tier_selection_picks_most_specific() {
        let rule = tiers();
        assert_eq!(unit_price(120.0, 12, &rule), 90.0);
        assert_eq!(unit_price(120.0, 49, &rule), 90.0);
        assert_eq!(unit_price(120.0, 50, &rule), 80.0);
        assert_eq!(unit_price(120.0, 5, &rule), 100.0);
    }

    #[test]
    fn test_tiered_falls_back_to_base_when_none_qualifies() {
        let rule = PricingRule::Tiered {
            tiers: vec![PriceTier {
                min_qty: 10,
                unit_price: 90.0,
            }],
        };
        assert_eq!(unit_price(120.0, 3, &rule), 120.0);
    }

    #[test]
    fn test_manual_override_with_and_without_price() {
        let with = PricingRule::ManualOverride {
            price: Some(75.0),
            note: Some("key account".to_string()),
        };
        assert_eq!(unit_price(100.0, 1, &with), 75.0);

        let without = PricingRule::ManualOverride {
            price: None,
            note: None,
        };
        assert_eq!(unit_price(100.0, 1, &without), 100.0);
    }

    #[test]
    fn test_pricing_is_idempotent() {
        let rule = tiers();
        let first = unit_price(100.0, 12, &rule);
        let second = unit_price(100.0, 12, &rule);
        assert_eq!(first, second);
    }

    #[test]
    fn test_discount_percent_derivation() {
        assert_eq!(discount_percent(100.0, 75.0), Some(25));
        assert_eq!(discount_percent(100.0, 66.6), Some(33));
        assert_eq!(discount_percent(100.0, 100.0), None);
        assert_eq!(discount_percent(100.0, 110.0), None);
        assert_eq!(discount_percent(0.0, 0.0), None);
    }

    #[test]
    fn test_duplicate_minimums_last_wins() {
        let tiers = vec![
            PriceTier {
                min_qty: 10,
                unit_price: 90.0,
            },
            PriceTier {
                min_qty: 10,
                unit_price: 85.0,
            },
        ];
        assert_eq!(duplicate_minimums(&tiers), vec![10]);
        let rule = PricingRule::Tiered { tiers };
        // max_by_key returns the last maximal element
        assert_eq!(unit_price(100.0, 20, &rule), 85.0);
    }

    #[test]
    fn test_rule_yaml_roundtrip() {
        let rule = tiers();
        let yaml = serde_yml::to_string(&rule).unwrap();
        assert!(yaml.contains("kind: tiered"));
        let parsed: PricingRule = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(rule, parsed);
    }
}
