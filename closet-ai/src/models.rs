//! Closet data model
//!
//! `ClothingItem` snapshots are owned by the catalog and handed to the engine
//! read-only. `OutfitSuggestion` is created exclusively by the suggestion
//! generator and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Garment slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Top,
    Bottom,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Bottom => "bottom",
        }
    }
}

/// Generates a closed vocabulary enum with an `Other` catch-all.
///
/// Parsing is total and case-insensitive; serde goes through the lowercase
/// string form so catalog JSON keeps plain strings.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// Value outside the known vocabulary (kept lowercase)
            Other(String),
        }

        impl $name {
            /// Every known vocabulary entry, in declaration order
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Other(value) => value.as_str(),
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                let lower = s.trim().to_lowercase();
                match lower.as_str() {
                    $($text => $name::$variant,)+
                    _ => $name::Other(lower),
                }
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($name::from(s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok($name::from(raw.as_str()))
            }
        }
    };
}

vocabulary! {
    /// Clothing style vocabulary
    Style {
        Casual => "casual",
        Formal => "formal",
        Business => "business",
        Athletic => "athletic",
        Bohemian => "bohemian",
        Vintage => "vintage",
        Streetwear => "streetwear",
        Minimalist => "minimalist",
        Preppy => "preppy",
        Grunge => "grunge",
        Classic => "classic",
    }
}

vocabulary! {
    /// Fabric vocabulary
    Fabric {
        Cotton => "cotton",
        Denim => "denim",
        Linen => "linen",
        Silk => "silk",
        Wool => "wool",
        Polyester => "polyester",
        Leather => "leather",
        Knit => "knit",
        Tweed => "tweed",
        Suede => "suede",
        Velvet => "velvet",
        Nylon => "nylon",
        Spandex => "spandex",
        Satin => "satin",
    }
}

/// One cataloged garment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothingItem {
    /// Opaque unique id
    pub id: String,
    /// Top or bottom (serialized as `type` to match the catalog format)
    #[serde(rename = "type")]
    pub category: Category,
    /// Remote URI or `data:` URI
    pub image_url: String,
    /// Hex color, e.g. `#1e90ff`
    pub color: String,
    pub style: Style,
    pub fabric: Fabric,
    /// When the item was added to the catalog
    pub added: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ClothingItem {
    /// Display label, falling back to "{color} {style} {category}"
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("{} {} {}", self.color, self.style, self.category.as_str()),
        }
    }
}

/// A ranked top/bottom pairing
///
/// Fields are private so the score clamp and non-empty reason hold for every
/// instance; read them through the accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitSuggestion {
    id: Uuid,
    top_id: String,
    bottom_id: String,
    score: f64,
    match_reason: String,
}

/// Substituted whenever no reason could be derived for a suggestion
pub const FALLBACK_MATCH_REASON: &str = "These pieces work together as an outfit.";

impl OutfitSuggestion {
    /// Create a suggestion with a fresh id, clamped score and non-empty reason
    pub fn new(
        top_id: impl Into<String>,
        bottom_id: impl Into<String>,
        score: f64,
        match_reason: impl Into<String>,
    ) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        let match_reason = match_reason.into();
        let match_reason = if match_reason.trim().is_empty() {
            FALLBACK_MATCH_REASON.to_string()
        } else {
            match_reason
        };

        Self {
            id: Uuid::new_v4(),
            top_id: top_id.into(),
            bottom_id: bottom_id.into(),
            score,
            match_reason,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn top_id(&self) -> &str {
        &self.top_id
    }

    pub fn bottom_id(&self) -> &str {
        &self.bottom_id
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn match_reason(&self) -> &str {
        &self.match_reason
    }
}

/// Lookup from item id to the catalog's item snapshot
pub trait ClothingCatalog {
    fn find(&self, id: &str) -> Option<&ClothingItem>;
}

impl ClothingCatalog for [ClothingItem] {
    fn find(&self, id: &str) -> Option<&ClothingItem> {
        self.iter().find(|item| item.id == id)
    }
}

impl ClothingCatalog for Vec<ClothingItem> {
    fn find(&self, id: &str) -> Option<&ClothingItem> {
        self.as_slice().find(id)
    }
}

impl ClothingCatalog for HashMap<String, ClothingItem> {
    fn find(&self, id: &str) -> Option<&ClothingItem> {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_parsing_is_total_and_case_insensitive() {
        assert_eq!("Casual".parse::<Style>().unwrap(), Style::Casual);
        assert_eq!(" streetwear ".parse::<Style>().unwrap(), Style::Streetwear);
        assert_eq!(
            "Gothic".parse::<Style>().unwrap(),
            Style::Other("gothic".to_string())
        );
        assert_eq!(Style::NAMES.len(), 11);
        assert_eq!(Fabric::NAMES.len(), 14);
    }

    #[test]
    fn test_suggestion_clamps_score_and_fills_reason() {
        let high = OutfitSuggestion::new("t", "b", 1.7, "great");
        assert_eq!(high.score(), 1.0);

        let low = OutfitSuggestion::new("t", "b", -0.3, "  ");
        assert_eq!(low.score(), 0.0);
        assert_eq!(low.match_reason(), FALLBACK_MATCH_REASON);

        let nan = OutfitSuggestion::new("t", "b", f64::NAN, "x");
        assert_eq!(nan.score(), 0.0);
    }

    #[test]
    fn test_suggestion_ids_are_unique() {
        let a = OutfitSuggestion::new("t", "b", 0.5, "x");
        let b = OutfitSuggestion::new("t", "b", 0.5, "x");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_clothing_item_catalog_json_shape() {
        let json = r##"{
            "id": "top-1",
            "type": "top",
            "imageUrl": "data:image/jpeg;base64,AAAA",
            "color": "#ff0000",
            "style": "Casual",
            "fabric": "chiffon",
            "added": "2024-03-01T10:00:00Z"
        }"##;

        let item: ClothingItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.category, Category::Top);
        assert_eq!(item.style, Style::Casual);
        assert_eq!(item.fabric, Fabric::Other("chiffon".to_string()));
        assert_eq!(item.label(), "#ff0000 casual top");
    }

    #[test]
    fn test_suggestion_serializes_camel_case() {
        let suggestion = OutfitSuggestion::new("t1", "b1", 0.75, "nice");
        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(json["topId"], "t1");
        assert_eq!(json["bottomId"], "b1");
        assert_eq!(json["matchReason"], "nice");
    }
}
