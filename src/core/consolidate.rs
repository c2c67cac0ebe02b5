//! Selection consolidation: merge compatible line items into a minimal BOM
//!
//! Greedy largest-first heuristic: requirements are visited in descending
//! required-torque order; each unclaimed requirement becomes a group leader
//! and absorbs every later compatible requirement that its selected model can
//! actually drive. The leader's own model and price are kept for the group —
//! no price-optimal search is performed.

use serde::{Deserialize, Serialize};

use crate::entities::selection::SelectionRequirement;

/// One consolidated BOM row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatedLine {
    /// Model identifier shared by the whole group
    pub model: String,

    /// Unit price of the leader's selection
    pub unit_price: f64,

    /// Number of requirements folded into this line
    pub quantity: u32,

    /// unit_price * quantity
    pub total_price: f64,

    /// Tag identifiers covered by this line
    pub covered_tags: Vec<String>,

    /// Free-text note
    #[serde(default)]
    pub note: String,
}

/// Summary statistics of one consolidation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationStats {
    pub original_count: usize,
    pub optimized_count: usize,
    /// (original - optimized) / original, as a percentage
    pub consolidation_rate: f64,
    pub total_quantity: u32,
    pub total_price: f64,
}

/// Result of a consolidation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationResult {
    pub lines: Vec<ConsolidatedLine>,
    pub stats: ConsolidationStats,
}

/// Decide whether two selection requirements may share one physical model.
///
/// Identical model strings are always compatible. Otherwise the pair must
/// agree on series and action type, and on every optional attribute that
/// both sides specify; an absent attribute is "don't care" for that
/// attribute only.
pub fn compatible(a: &SelectionRequirement, b: &SelectionRequirement) -> bool {
    if a.model == b.model {
        return true;
    }

    if a.series != b.series || a.action_type != b.action_type {
        return false;
    }

    fn agrees(x: &Option<String>, y: &Option<String>) -> bool {
        match (x, y) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    agrees(&a.mechanism, &b.mechanism)
        && agrees(&a.temperature_code, &b.temperature_code)
        && agrees(&a.valve_type, &b.valve_type)
        && agrees(&a.yoke_type, &b.yoke_type)
}

/// Consolidate raw selections into a minimal priced BOM.
///
/// Invariant: every input tag appears in exactly one output line's
/// covered-tag list.
pub fn consolidate(requirements: &[SelectionRequirement]) -> ConsolidationResult {
    if requirements.is_empty() {
        return ConsolidationResult {
            lines: Vec::new(),
            stats: ConsolidationStats {
                original_count: 0,
                optimized_count: 0,
                consolidation_rate: 0.0,
                total_quantity: 0,
                total_price: 0.0,
            },
        };
    }

    // Descending required torque; stable, so ties keep input order.
    let mut order: Vec<usize> = (0..requirements.len()).collect();
    order.sort_by(|&a, &b| {
        requirements[b]
            .required_torque
            .partial_cmp(&requirements[a].required_torque)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut claimed = vec![false; requirements.len()];
    let mut lines: Vec<ConsolidatedLine> = Vec::new();

    for (pos, &leader_idx) in order.iter().enumerate() {
        if claimed[leader_idx] {
            continue;
        }
        let leader = &requirements[leader_idx];
        claimed[leader_idx] = true;

        let mut tags = vec![leader.tag.clone()];

        // Only later (smaller or equal torque) requirements may join.
        for &other_idx in &order[pos + 1..] {
            if claimed[other_idx] {
                continue;
            }
            let other = &requirements[other_idx];
            if compatible(leader, other) && leader.actual_torque >= other.required_torque {
                claimed[other_idx] = true;
                tags.push(other.tag.clone());
            }
        }

        let quantity = tags.len() as u32;

        // Merge into an existing line for the same model/price pair.
        if let Some(line) = lines
            .iter_mut()
            .find(|l| l.model == leader.model && l.unit_price == leader.unit_price)
        {
            line.quantity += quantity;
            line.total_price = line.unit_price * f64::from(line.quantity);
            line.covered_tags.extend(tags);
            line.note = merge_note(line.quantity);
        } else {
            lines.push(ConsolidatedLine {
                model: leader.model.clone(),
                unit_price: leader.unit_price,
                total_price: leader.unit_price * f64::from(quantity),
                quantity,
                covered_tags: tags,
                note: merge_note(quantity),
            });
        }
    }

    lines.sort_by(|a, b| {
        b.total_price
            .partial_cmp(&a.total_price)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let original_count = requirements.len();
    let optimized_count = lines.len();
    let stats = ConsolidationStats {
        original_count,
        optimized_count,
        consolidation_rate: (original_count - optimized_count) as f64 / original_count as f64
            * 100.0,
        total_quantity: lines.iter().map(|l| l.quantity).sum(),
        total_price: lines.iter().map(|l| l.total_price).sum(),
    };

    ConsolidationResult { lines, stats }
}

fn merge_note(quantity: u32) -> String {
    if quantity > 1 {
        format!("consolidated from {} selections", quantity)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::selection::SelectionRequirement;

    fn req(tag: &str, torque: f64, model: &str, series: &str, price: f64, actual: f64) -> SelectionRequirement {
        SelectionRequirement::new(tag, torque, model, series, "double_acting", price, actual, "test")
    }

    #[test]
    fn test_empty_input_short_circuits() {
        let result = consolidate(&[]);
        assert!(result.lines.is_empty());
        assert_eq!(result.stats.original_count, 0);
        assert_eq!(result.stats.total_price, 0.0);
    }

    #[test]
    fn test_identical_models_always_compatible() {
        let a = req("V-1", 500.0, "SF10-DA", "SF", 100.0, 550.0);
        let mut b = req("V-2", 300.0, "SF10-DA", "SF", 100.0, 550.0);
        b.valve_type = Some("butterfly".to_string());
        assert!(compatible(&a, &b));
    }

    #[test]
    fn test_specified_attribute_mismatch_blocks() {
        let mut a = req("V-1", 500.0, "SF10-DA", "SF", 100.0, 550.0);
        let mut b = req("V-2", 300.0, "SF08-DA", "SF", 80.0, 350.0);
        a.temperature_code = Some("LT".to_string());
        b.temperature_code = Some("HT".to_string());
        assert!(!compatible(&a, &b));

        // Unspecified on one side is don't-care
        b.temperature_code = None;
        assert!(compatible(&a, &b));
    }

    #[test]
    fn test_series_mismatch_blocks() {
        let a = req("V-1", 500.0, "SF10-DA", "SF", 100.0, 550.0);
        let b = req("V-2", 300.0, "AT08-DA", "AT", 80.0, 350.0);
        assert!(!compatible(&a, &b));
    }

    #[test]
    fn test_mixed_series_bom() {
        // SF10-DA delivers 550 and is compatible with V-102; the SF05 line
        // is a different series.
        let reqs = vec![
            req("V-101", 500.0, "SF10-DA", "SF", 120.0, 550.0),
            req("V-102", 300.0, "SF10-DA", "SF", 120.0, 550.0),
            req("V-103", 150.0, "SF05-DA", "SF05", 60.0, 180.0),
        ];
        let result = consolidate(&reqs);

        assert_eq!(result.lines.len(), 2);
        let big = &result.lines[0];
        assert_eq!(big.model, "SF10-DA");
        assert_eq!(big.quantity, 2);
        assert_eq!(big.covered_tags, vec!["V-101", "V-102"]);
        let small = &result.lines[1];
        assert_eq!(small.model, "SF05-DA");
        assert_eq!(small.covered_tags, vec!["V-103"]);

        assert_eq!(result.stats.original_count, 3);
        assert_eq!(result.stats.optimized_count, 2);
        assert_eq!(result.stats.consolidation_rate.round(), 33.0);
    }

    #[test]
    fn test_partition_property() {
        let reqs = vec![
            req("V-1", 900.0, "SF20-DA", "SF", 300.0, 950.0),
            req("V-2", 500.0, "SF10-DA", "SF", 120.0, 550.0),
            req("V-3", 450.0, "SF10-DA", "SF", 120.0, 550.0),
            req("V-4", 300.0, "SF08-DA", "SF", 90.0, 350.0),
            req("V-5", 120.0, "AT04-SR", "AT", 45.0, 150.0),
        ];
        let result = consolidate(&reqs);

        let mut covered: Vec<String> = result
            .lines
            .iter()
            .flat_map(|l| l.covered_tags.clone())
            .collect();
        covered.sort();
        let mut input: Vec<String> = reqs.iter().map(|r| r.tag.clone()).collect();
        input.sort();
        assert_eq!(covered, input);

        let qty: u32 = result.lines.iter().map(|l| l.quantity).sum();
        assert_eq!(qty as usize, reqs.len());
    }

    #[test]
    fn test_incompatible_never_share_a_line() {
        let a = req("V-1", 500.0, "SF10-DA", "SF", 120.0, 550.0);
        let b = req("V-2", 300.0, "AT06-DA", "AT", 70.0, 350.0);
        assert!(!compatible(&a, &b));

        for ordering in [vec![a.clone(), b.clone()], vec![b.clone(), a.clone()]] {
            let result = consolidate(&ordering);
            for line in &result.lines {
                let has_a = line.covered_tags.contains(&"V-1".to_string());
                let has_b = line.covered_tags.contains(&"V-2".to_string());
                assert!(!(has_a && has_b));
            }
        }
    }

    #[test]
    fn test_leader_torque_must_cover_joiner() {
        // Same series/action, but the leader's delivered torque is too small
        // for V-2 to have joined in reverse, and big enough forward.
        let a = req("V-1", 500.0, "SF10-DA", "SF", 120.0, 510.0);
        let b = req("V-2", 520.0, "SF12-DA", "SF", 150.0, 560.0);
        let result = consolidate(&[a, b]);
        // V-2 leads (larger torque) and its 560 covers V-1's 500.
        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.lines[0].model, "SF12-DA");
        assert_eq!(result.lines[0].covered_tags, vec!["V-2", "V-1"]);
    }

    #[test]
    fn test_insufficient_torque_keeps_lines_apart() {
        // Leader delivers 785, which cannot drive the 790 requirement below it.
        let leader = req("V-9", 800.0, "SF15-DA", "SF", 180.0, 785.0);
        let joiner = req("V-10", 790.0, "SF15-DA2", "SF", 175.0, 795.0);
        let result = consolidate(&[leader, joiner]);
        assert_eq!(result.lines.len(), 2);
    }

    #[test]
    fn test_same_model_price_groups_merge_into_one_line() {
        // Two leaders with the same model and price but mutually unreachable
        // torque still merge into a single BOM row.
        let mut a = req("V-1", 500.0, "SF10-DA", "SF", 120.0, 520.0);
        let mut b = req("V-2", 480.0, "SF10-DA", "SF", 120.0, 520.0);
        a.temperature_code = Some("HT".to_string());
        b.temperature_code = Some("HT".to_string());
        let c = req("V-3", 100.0, "SF10-DA", "SF", 120.0, 520.0);
        let result = consolidate(&[a, b, c]);
        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.lines[0].quantity, 3);
        assert!(result.lines[0].note.contains("3"));
    }

    #[test]
    fn test_lines_sorted_by_total_price_descending() {
        let reqs = vec![
            req("V-1", 100.0, "A1", "A", 10.0, 120.0),
            req("V-2", 900.0, "B9", "B", 500.0, 950.0),
            req("V-3", 400.0, "C4", "C", 90.0, 450.0),
        ];
        let result = consolidate(&reqs);
        let totals: Vec<f64> = result.lines.iter().map(|l| l.total_price).collect();
        assert_eq!(totals, vec![500.0, 90.0, 10.0]);
    }
}
