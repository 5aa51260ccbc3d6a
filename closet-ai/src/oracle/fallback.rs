//! Rule-based estimate used when the oracle cannot answer
//!
//! Three boolean checks (same style, complementary colors, similar fabrics)
//! on a 0.5 base, capped at 0.9.

use super::{AssessmentSource, OracleAssessment};
use crate::analysis::color_name;
use crate::models::ClothingItem;

const BASE_SCORE: f64 = 0.5;
const SAME_STYLE_BONUS: f64 = 0.2;
const COMPLEMENTARY_BONUS: f64 = 0.2;
const SIMILAR_FABRIC_BONUS: f64 = 0.1;
const SCORE_CAP: f64 = 0.9;
const MAX_REASON_CHARS: usize = 120;

/// Classic pairings keyed by color name
const COMPLEMENTARY_COLORS: &[(&str, &[&str])] = &[
    ("black", &["white", "gray", "beige", "red", "blue"]),
    ("white", &["black", "navy", "red", "blue"]),
    ("blue", &["white", "gray", "khaki", "denim"]),
    ("navy", &["white", "beige", "gray"]),
    ("gray", &["black", "white", "navy", "pink", "blue"]),
    ("beige", &["black", "navy", "brown"]),
    ("brown", &["beige", "blue", "white", "green"]),
    ("red", &["black", "white", "denim", "gray"]),
    ("pink", &["gray", "navy", "white", "denim"]),
    ("green", &["brown", "white", "denim", "beige"]),
    ("denim", &["white", "gray", "red", "pink"]),
    ("khaki", &["navy", "white", "blue"]),
];

const FABRIC_GROUPS: &[&[&str]] = &[
    &["cotton", "linen", "denim"],
    &["silk", "satin", "chiffon"],
    &["wool", "cashmere", "tweed"],
    &["polyester", "nylon", "spandex"],
];

/// Hex values resolve through the palette; names are used as given
fn color_key(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.starts_with('#') {
        color_name(trimmed).to_string()
    } else {
        trimmed.to_lowercase()
    }
}

fn pairs_with(a: &str, b: &str) -> bool {
    COMPLEMENTARY_COLORS
        .iter()
        .any(|(color, partners)| *color == a && partners.contains(&b))
}

fn is_complementary(color1: &str, color2: &str) -> bool {
    let a = color_key(color1);
    let b = color_key(color2);
    pairs_with(&a, &b) || pairs_with(&b, &a)
}

fn is_similar_fabric(fabric1: &str, fabric2: &str) -> bool {
    FABRIC_GROUPS
        .iter()
        .any(|group| group.contains(&fabric1) && group.contains(&fabric2))
}

fn truncate_reason(reason: String) -> String {
    if reason.chars().count() <= MAX_REASON_CHARS {
        return reason;
    }
    let mut short: String = reason.chars().take(MAX_REASON_CHARS - 3).collect();
    short.push_str("...");
    short
}

/// Deterministic estimate for a pair
pub fn rule_based_assessment(top: &ClothingItem, bottom: &ClothingItem) -> OracleAssessment {
    let same_style = top.style == bottom.style;
    let complementary = is_complementary(&top.color, &bottom.color);
    let similar_fabrics = is_similar_fabric(top.fabric.as_str(), bottom.fabric.as_str());

    let mut score = BASE_SCORE;
    if same_style {
        score += SAME_STYLE_BONUS;
    }
    if complementary {
        score += COMPLEMENTARY_BONUS;
    }
    if similar_fabrics {
        score += SIMILAR_FABRIC_BONUS;
    }
    let score = ((score * 100.0).round() / 100.0).min(SCORE_CAP);

    let top_color = color_key(&top.color);
    let bottom_color = color_key(&bottom.color);

    let reason = if score > 0.7 {
        match (complementary, same_style) {
            (true, true) => format!(
                "Great match! The {} top pairs well with the {} bottom, and the {} styles complement each other.",
                top_color, bottom_color, top.style
            ),
            (true, false) => format!(
                "The {} and {} create a pleasing color combination.",
                top_color, bottom_color
            ),
            (false, true) => format!(
                "The matching {} style creates a cohesive look.",
                top.style
            ),
            (false, false) => "These items create a stylish, coordinated outfit.".to_string(),
        }
    } else {
        format!(
            "These items create an interesting contrast between the {} top and {} bottom.",
            top.style, bottom.style
        )
    };

    OracleAssessment {
        match_score: score,
        match_reason: truncate_reason(reason),
        source: AssessmentSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Fabric, Style};

    fn item(category: Category, color: &str, style: &str, fabric: &str) -> ClothingItem {
        ClothingItem {
            id: format!("{}-1", category.as_str()),
            category,
            image_url: String::new(),
            color: color.to_string(),
            style: Style::from(style),
            fabric: Fabric::from(fabric),
            added: chrono::Utc::now(),
            name: None,
        }
    }

    #[test]
    fn test_all_checks_pass_caps_at_point_nine() {
        let top = item(Category::Top, "#000000", "casual", "cotton");
        let bottom = item(Category::Bottom, "#ffffff", "casual", "denim");
        let assessment = rule_based_assessment(&top, &bottom);
        assert_eq!(assessment.match_score, 0.9);
        assert_eq!(assessment.source, AssessmentSource::Fallback);
        assert!(assessment.match_reason.starts_with("Great match!"));
    }

    #[test]
    fn test_base_score_with_no_checks() {
        let top = item(Category::Top, "#ff69b4", "athletic", "silk");
        let bottom = item(Category::Bottom, "#ffd700", "formal", "tweed");
        let assessment = rule_based_assessment(&top, &bottom);
        assert_eq!(assessment.match_score, 0.5);
        assert_eq!(
            assessment.match_reason,
            "These items create an interesting contrast between the athletic top and formal bottom."
        );
    }

    #[test]
    fn test_named_colors_and_unknown_fabrics() {
        let top = item(Category::Top, "Navy", "preppy", "chiffon");
        let bottom = item(Category::Bottom, "beige", "classic", "satin");
        let assessment = rule_based_assessment(&top, &bottom);
        // complementary + similar fabric
        assert_eq!(assessment.match_score, 0.8);
        assert_eq!(
            assessment.match_reason,
            "The navy and beige create a pleasing color combination."
        );
    }

    #[test]
    fn test_reason_truncated_to_limit() {
        let long_style = "x".repeat(200);
        let top = item(Category::Top, "#000000", &long_style, "cotton");
        let bottom = item(Category::Bottom, "#ffffff", &long_style, "denim");
        let assessment = rule_based_assessment(&top, &bottom);
        assert_eq!(assessment.match_reason.chars().count(), 120);
        assert!(assessment.match_reason.ends_with("..."));
    }
}
