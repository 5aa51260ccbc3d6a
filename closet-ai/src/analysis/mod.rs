//! Attribute compatibility evaluators
//!
//! Three independent rule-table evaluators (color, style, fabric). Each one is
//! pure and total: values missing from a reference table fall through to a
//! default verdict instead of failing.

pub mod color;
pub mod style;

pub use color::{color_name, colors_compatible};
pub use style::{fabrics_compatible, styles_compatible};

/// Verdict of one evaluator for a pair of attribute values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compatibility {
    /// Whether the two values combine well
    pub compatible: bool,
    /// Human-readable justification
    pub reason: String,
}

impl Compatibility {
    pub fn compatible(reason: impl Into<String>) -> Self {
        Self {
            compatible: true,
            reason: reason.into(),
        }
    }

    pub fn incompatible(reason: impl Into<String>) -> Self {
        Self {
            compatible: false,
            reason: reason.into(),
        }
    }
}
