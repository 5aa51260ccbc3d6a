//! Style and fabric compatibility
//!
//! Both evaluators consult an undirected table of pairs known to combine
//! well. Identical values always match; anything else (including values
//! outside the vocabulary) falls through to an incompatible verdict.

use super::Compatibility;
use crate::models::{Fabric, Style};

const COMPATIBLE_STYLES: &[(Style, Style)] = &[
    (Style::Casual, Style::Streetwear),
    (Style::Casual, Style::Athletic),
    (Style::Casual, Style::Minimalist),
    (Style::Casual, Style::Vintage),
    (Style::Casual, Style::Bohemian),
    (Style::Casual, Style::Grunge),
    (Style::Minimalist, Style::Formal),
    (Style::Minimalist, Style::Business),
    (Style::Formal, Style::Business),
    (Style::Formal, Style::Classic),
    (Style::Streetwear, Style::Grunge),
    (Style::Streetwear, Style::Vintage),
    (Style::Classic, Style::Preppy),
    (Style::Classic, Style::Business),
    (Style::Bohemian, Style::Vintage),
];

const COMPATIBLE_FABRICS: &[(Fabric, Fabric)] = &[
    (Fabric::Cotton, Fabric::Denim),
    (Fabric::Cotton, Fabric::Linen),
    (Fabric::Cotton, Fabric::Knit),
    (Fabric::Denim, Fabric::Leather),
    (Fabric::Denim, Fabric::Knit),
    (Fabric::Silk, Fabric::Satin),
    (Fabric::Silk, Fabric::Velvet),
    (Fabric::Wool, Fabric::Cotton),
    (Fabric::Wool, Fabric::Tweed),
    (Fabric::Leather, Fabric::Cotton),
    (Fabric::Polyester, Fabric::Cotton),
    (Fabric::Nylon, Fabric::Spandex),
];

fn in_pair_table<T: PartialEq>(table: &[(T, T)], a: &T, b: &T) -> bool {
    table
        .iter()
        .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Evaluate two styles
pub fn styles_compatible(style1: &Style, style2: &Style) -> Compatibility {
    if style1 == style2 {
        return Compatibility::compatible(format!(
            "Both pieces have a {} style, creating a cohesive look",
            style1
        ));
    }

    if in_pair_table(COMPATIBLE_STYLES, style1, style2) {
        return Compatibility::compatible(format!(
            "{} and {} styles complement each other well",
            style1, style2
        ));
    }

    Compatibility::incompatible(format!(
        "{} and {} styles might create a contrasting look",
        style1, style2
    ))
}

/// Evaluate two fabrics
pub fn fabrics_compatible(fabric1: &Fabric, fabric2: &Fabric) -> Compatibility {
    if fabric1 == fabric2 {
        return Compatibility::compatible(format!(
            "Both pieces use {}, creating a consistent texture",
            fabric1
        ));
    }

    if in_pair_table(COMPATIBLE_FABRICS, fabric1, fabric2) {
        return Compatibility::compatible(format!(
            "{} and {} fabrics pair well together",
            fabric1, fabric2
        ));
    }

    Compatibility::incompatible(format!(
        "The textures of {} and {} create an interesting contrast",
        fabric1, fabric2
    ))
}
