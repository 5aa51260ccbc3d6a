//! Shared fixtures for closet-ai integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::TimeZone;
use closet_ai::oracle::{rule_based_assessment, AssessmentSource, OracleAssessment, OutfitOracle};
use closet_ai::{Category, ClothingItem, Fabric, Style};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn item(id: &str, category: Category, color: &str, style: Style, fabric: Fabric) -> ClothingItem {
    ClothingItem {
        id: id.to_string(),
        category,
        image_url: "data:image/jpeg;base64,/9j/4AAQ".to_string(),
        color: color.to_string(),
        style,
        fabric,
        added: chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        name: None,
    }
}

pub fn tops(n: usize) -> Vec<ClothingItem> {
    (0..n)
        .map(|i| item(&format!("top-{}", i), Category::Top, "#ffffff", Style::Casual, Fabric::Cotton))
        .collect()
}

pub fn bottoms(n: usize) -> Vec<ClothingItem> {
    (0..n)
        .map(|i| item(&format!("bottom-{}", i), Category::Bottom, "#000080", Style::Casual, Fabric::Denim))
        .collect()
}

/// Scripted oracle: answers `Some(score)` from the oracle, `None` with the fallback
pub struct ScriptedOracle {
    script: Box<dyn Fn(usize) -> Option<f64> + Send + Sync>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedOracle {
    pub fn new(script: impl Fn(usize) -> Option<f64> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn always(score: f64) -> Self {
        Self::new(move |_| Some(score))
    }

    pub fn failing() -> Self {
        Self::new(|_| None)
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl OutfitOracle for ScriptedOracle {
    async fn assess(&self, top: &ClothingItem, bottom: &ClothingItem) -> OracleAssessment {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match (self.script)(call) {
            Some(score) => OracleAssessment {
                match_score: score,
                match_reason: format!("oracle verdict #{}", call),
                source: AssessmentSource::Oracle,
            },
            None => rule_based_assessment(top, bottom),
        }
    }

    async fn test_connection(&self) -> bool {
        true
    }
}
