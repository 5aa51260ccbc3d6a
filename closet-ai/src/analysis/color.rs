//! Color compatibility
//!
//! Hex colors are snapped to the nearest entry of a fixed named palette
//! (Euclidean distance in RGB space), then compared by name. The evaluator
//! never rejects a pairing; only the justification changes.

use super::Compatibility;

/// Reference palette: (hex, name)
const PALETTE: &[(&str, &str)] = &[
    // Reds
    ("#ff0000", "red"),
    ("#800000", "maroon"),
    ("#8b0000", "dark red"),
    ("#a52a2a", "brown"),
    ("#d2691e", "chocolate"),
    // Oranges
    ("#ffa500", "orange"),
    ("#ff8c00", "dark orange"),
    ("#ff7f50", "coral"),
    // Yellows
    ("#ffff00", "yellow"),
    ("#ffd700", "gold"),
    ("#f0e68c", "khaki"),
    // Greens
    ("#008000", "green"),
    ("#006400", "dark green"),
    ("#32cd32", "lime green"),
    ("#00ff00", "lime"),
    ("#3cb371", "medium sea green"),
    ("#2e8b57", "sea green"),
    ("#556b2f", "dark olive green"),
    ("#808000", "olive"),
    // Blues
    ("#0000ff", "blue"),
    ("#00008b", "dark blue"),
    ("#00bfff", "deep sky blue"),
    ("#87ceeb", "sky blue"),
    ("#4169e1", "royal blue"),
    ("#1e90ff", "dodger blue"),
    ("#000080", "navy"),
    ("#4682b4", "steel blue"),
    // Purples
    ("#800080", "purple"),
    ("#4b0082", "indigo"),
    ("#8a2be2", "blue violet"),
    ("#9932cc", "dark orchid"),
    ("#9400d3", "dark violet"),
    ("#8b008b", "dark magenta"),
    ("#ba55d3", "medium orchid"),
    // Pinks
    ("#ff00ff", "fuchsia"),
    ("#ff69b4", "hot pink"),
    ("#ffc0cb", "pink"),
    ("#ffb6c1", "light pink"),
    ("#c71585", "medium violet red"),
    // Browns
    ("#8b4513", "saddle brown"),
    ("#a0522d", "sienna"),
    ("#cd853f", "peru"),
    ("#deb887", "burlywood"),
    ("#f4a460", "sandy brown"),
    ("#d2b48c", "tan"),
    // Whites
    ("#ffffff", "white"),
    ("#f5f5f5", "white smoke"),
    ("#fffafa", "snow"),
    ("#f0fff0", "honeydew"),
    ("#f8f8ff", "ghost white"),
    ("#f0ffff", "azure"),
    ("#f5fffa", "mint cream"),
    // Grays/Blacks
    ("#808080", "gray"),
    ("#a9a9a9", "dark gray"),
    ("#d3d3d3", "light gray"),
    ("#696969", "dim gray"),
    ("#000000", "black"),
    ("#2f4f4f", "dark slate gray"),
];

/// Names that go with everything
const NEUTRALS: &[&str] = &[
    "white",
    "black",
    "gray",
    "dark gray",
    "light gray",
    "navy",
    "khaki",
    "tan",
    "beige",
];

/// Complementary name pairs, matched by substring in either order
const COMPLEMENTARY: &[(&str, &str)] = &[
    ("red", "green"),
    ("blue", "orange"),
    ("yellow", "purple"),
    ("blue", "brown"),
];

/// Parse `#rrggbb` / `rrggbb` into RGB; anything else reads as black
fn hex_to_rgb(hex: &str) -> [u8; 3] {
    let digits = hex.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);

    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return [0, 0, 0];
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
    [channel(0), channel(2), channel(4)]
}

fn distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Nearest palette name for a hex color
///
/// Ties resolve to the earlier palette entry.
pub fn color_name(hex: &str) -> &'static str {
    let target = hex_to_rgb(hex);
    let mut closest = PALETTE[0].1;
    let mut min_distance = f64::MAX;

    for &(palette_hex, name) in PALETTE {
        let d = distance(target, hex_to_rgb(palette_hex));
        if d < min_distance {
            min_distance = d;
            closest = name;
        }
    }

    closest
}

/// Evaluate two hex colors
pub fn colors_compatible(color1: &str, color2: &str) -> Compatibility {
    let name1 = color_name(color1);
    let name2 = color_name(color2);

    if NEUTRALS.contains(&name1) || NEUTRALS.contains(&name2) {
        return Compatibility::compatible(format!(
            "{} and {} match well because one is a neutral color",
            name1, name2
        ));
    }

    if name1 == name2 || name1.contains(name2) || name2.contains(name1) {
        return Compatibility::compatible(format!(
            "{} and {} create a cohesive monochromatic look",
            name1, name2
        ));
    }

    let complementary = COMPLEMENTARY.iter().any(|&(c1, c2)| {
        (name1.contains(c1) && name2.contains(c2)) || (name1.contains(c2) && name2.contains(c1))
    });
    if complementary {
        return Compatibility::compatible(format!(
            "{} and {} are complementary colors that create a dynamic contrast",
            name1, name2
        ));
    }

    Compatibility::compatible(format!(
        "{} and {} create an interesting combination",
        name1, name2
    ))
}
