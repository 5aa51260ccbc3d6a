//! Heuristic Scorer
//!
//! Combines the three attribute evaluators into one weighted score.
//! Weighted combination: color 40% + style 40% + fabric 20%, with each
//! incompatible signal contributing half its weight. The floor is therefore
//! 0.5, not 0.

use crate::analysis::{colors_compatible, fabrics_compatible, styles_compatible, Compatibility};
use crate::models::ClothingItem;

/// Color signal weight (compatible / incompatible)
pub const COLOR_WEIGHT: (f64, f64) = (0.4, 0.2);
/// Style signal weight (compatible / incompatible)
pub const STYLE_WEIGHT: (f64, f64) = (0.4, 0.2);
/// Fabric signal weight (compatible / incompatible)
pub const FABRIC_WEIGHT: (f64, f64) = (0.2, 0.1);

/// Attribute-only assessment of one top/bottom pair
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeScore {
    pub color: Compatibility,
    pub style: Compatibility,
    pub fabric: Compatibility,
    /// Weighted total in [0.5, 1.0], rounded to two decimals
    pub total: f64,
}

fn weight(verdict: &Compatibility, (hit, miss): (f64, f64)) -> f64 {
    if verdict.compatible {
        hit
    } else {
        miss
    }
}

/// Evaluate color, style and fabric for a pair and weight the verdicts
pub fn score_attributes(top: &ClothingItem, bottom: &ClothingItem) -> AttributeScore {
    let color = colors_compatible(&top.color, &bottom.color);
    let style = styles_compatible(&top.style, &bottom.style);
    let fabric = fabrics_compatible(&top.fabric, &bottom.fabric);

    let sum = weight(&color, COLOR_WEIGHT)
        + weight(&style, STYLE_WEIGHT)
        + weight(&fabric, FABRIC_WEIGHT);

    // Rounded so tier thresholds see 0.8 rather than 0.8000000000000002
    let total = ((sum * 100.0).round() / 100.0).clamp(0.0, 1.0);

    AttributeScore {
        color,
        style,
        fabric,
        total,
    }
}

/// Heuristic score only
pub fn heuristic_score(top: &ClothingItem, bottom: &ClothingItem) -> f64 {
    score_attributes(top, bottom).total
}
