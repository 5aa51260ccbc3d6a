//! Suggestion Generator Service
//!
//! Produces the ranked outfit list for a tops collection and a bottoms
//! collection.
//!
//! # Algorithm
//! 1. Sample each side down to `sample_limit` items (random permutation prefix)
//! 2. Walk pairs top-major, bottom-minor, stopping after `max_pairs`
//! 3. Score each pair heuristically, then ask the oracle unless the run's
//!    circuit breaker is open
//! 4. Oracle answer: blend `oracle_weight * oracle + (1 - oracle_weight) * heuristic`
//!    and keep the oracle's reason. Otherwise: heuristic score with a tiered reason
//! 5. Stable sort by score, highest first
//!
//! Pairs are scored strictly in sequence so the breaker sees failures in order.
//! All run state lives on the stack of one `generate` call.

use crate::models::{Category, ClothingItem, OutfitSuggestion};
use crate::oracle::OutfitOracle;
use crate::scoring::{score_attributes, AttributeScore};
use crate::services::suggestion_sink::{NullSink, SuggestionSink};
use closet_common::config::GenerationConfig;
use closet_common::events::{ClosetEvent, EventBus};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

const PERFECT_MATCH_REASON: &str = "A perfect match! These pieces complement each other beautifully.";
const BOLD_CONTRAST_REASON: &str = "A bold pairing that makes a contrasting statement.";
const CONTRASTING_LOOK_REASON: &str = "Creates an interesting contrasting look.";

/// Caller-visible generation errors
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Neither collection holds a single item usable in its slot
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Why one pair was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairError {
    #[error("{expected} item has an empty id")]
    EmptyId { expected: &'static str },

    #[error("item {id} is a {found}, expected a {expected}")]
    WrongCategory {
        id: String,
        expected: &'static str,
        found: &'static str,
    },
}

fn validate_slot(item: &ClothingItem, expected: Category) -> Result<(), PairError> {
    if item.id.trim().is_empty() {
        return Err(PairError::EmptyId {
            expected: expected.as_str(),
        });
    }
    if item.category != expected {
        return Err(PairError::WrongCategory {
            id: item.id.clone(),
            expected: expected.as_str(),
            found: item.category.as_str(),
        });
    }
    Ok(())
}

/// Per-run oracle circuit breaker
///
/// Opens after `threshold` consecutive failures and stays open for the rest
/// of the run. A success before that resets the count.
#[derive(Debug)]
struct CircuitBreaker {
    threshold: u32,
    consecutive_failures: u32,
    open: bool,
}

impl CircuitBreaker {
    fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive_failures: 0,
            open: false,
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Returns true when this failure opened the breaker
    fn record_failure(&mut self) -> bool {
        self.consecutive_failures += 1;
        if !self.open && self.consecutive_failures >= self.threshold {
            self.open = true;
            return true;
        }
        false
    }
}

/// Reason synthesized from the attribute verdicts when the oracle is not used
pub fn tiered_reason(attributes: &AttributeScore) -> String {
    let AttributeScore {
        color,
        style,
        fabric,
        total,
    } = attributes;

    if *total > 0.8 {
        PERFECT_MATCH_REASON.to_string()
    } else if *total > 0.7 {
        match (color.compatible, style.compatible) {
            (true, true) => format!("{}. {}.", color.reason, style.reason),
            (true, false) => color.reason.clone(),
            (false, true) => style.reason.clone(),
            (false, false) => String::new(),
        }
    } else if *total > 0.5 {
        if color.compatible {
            color.reason.clone()
        } else if style.compatible {
            style.reason.clone()
        } else {
            fabric.reason.clone()
        }
    } else if *total > 0.3 {
        BOLD_CONTRAST_REASON.to_string()
    } else {
        CONTRASTING_LOOK_REASON.to_string()
    }
}

/// Counters for one run
#[derive(Debug, Default)]
struct RunStats {
    attempted: usize,
    oracle_scored: usize,
    skipped: usize,
}

/// Suggestion Generator
pub struct SuggestionGenerator {
    oracle: Arc<dyn OutfitOracle>,
    settings: GenerationConfig,
    rng: Mutex<StdRng>,
    sink: Arc<dyn SuggestionSink>,
    event_bus: Option<EventBus>,
}

impl SuggestionGenerator {
    /// Create new generator with default limits, an entropy-seeded RNG and no sink
    pub fn new(oracle: Arc<dyn OutfitOracle>) -> Self {
        Self {
            oracle,
            settings: GenerationConfig::default(),
            rng: Mutex::new(StdRng::from_entropy()),
            sink: Arc::new(NullSink),
            event_bus: None,
        }
    }

    pub fn with_settings(mut self, settings: GenerationConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Make sampling reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn SuggestionSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn settings(&self) -> &GenerationConfig {
        &self.settings
    }

    /// Generate ranked suggestions for every retained top/bottom pair
    ///
    /// # Arguments
    /// * `tops` - Items for the top slot
    /// * `bottoms` - Items for the bottom slot
    ///
    /// # Returns
    /// Suggestions sorted by score, highest first. Empty when either side is empty.
    ///
    /// # Errors
    /// `GenerationError::InvalidInput` when no item on either side is usable.
    /// Individual bad items only skip their pairs.
    pub async fn generate(
        &self,
        tops: &[ClothingItem],
        bottoms: &[ClothingItem],
    ) -> Result<Vec<OutfitSuggestion>, GenerationError> {
        if tops.is_empty() || bottoms.is_empty() {
            debug!(
                tops = tops.len(),
                bottoms = bottoms.len(),
                "Nothing to pair"
            );
            return Ok(Vec::new());
        }

        let usable_tops = tops
            .iter()
            .any(|t| validate_slot(t, Category::Top).is_ok());
        let usable_bottoms = bottoms
            .iter()
            .any(|b| validate_slot(b, Category::Bottom).is_ok());
        if !usable_tops && !usable_bottoms {
            return Err(GenerationError::InvalidInput(format!(
                "none of {} tops or {} bottoms can be paired",
                tops.len(),
                bottoms.len()
            )));
        }

        let run_id = Uuid::new_v4();
        let tops = self.sample(tops);
        let bottoms = self.sample(bottoms);

        info!(
            run_id = %run_id,
            tops = tops.len(),
            bottoms = bottoms.len(),
            max_pairs = self.settings.max_pairs,
            "Generating outfit suggestions"
        );

        let mut breaker = CircuitBreaker::new(self.settings.breaker_threshold);
        let mut stats = RunStats::default();
        let mut suggestions = Vec::new();

        'pairs: for top in &tops {
            for bottom in &bottoms {
                if stats.attempted >= self.settings.max_pairs {
                    break 'pairs;
                }
                stats.attempted += 1;

                match self
                    .score_pair(run_id, top, bottom, &mut breaker, &mut stats)
                    .await
                {
                    Ok(suggestion) => {
                        self.sink.emit(&suggestion);
                        suggestions.push(suggestion);
                    }
                    Err(e) => {
                        warn!(
                            run_id = %run_id,
                            top_id = %top.id,
                            bottom_id = %bottom.id,
                            error = %e,
                            "Skipping pair"
                        );
                        stats.skipped += 1;
                    }
                }
            }
        }

        // sort_by is stable: ties keep generation order
        suggestions.sort_by(|a, b| b.score().total_cmp(&a.score()));

        info!(
            run_id = %run_id,
            count = suggestions.len(),
            attempted = stats.attempted,
            oracle_scored = stats.oracle_scored,
            skipped = stats.skipped,
            breaker_open = breaker.is_open(),
            "Outfit suggestions generated"
        );

        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(ClosetEvent::SuggestionsGenerated {
                run_id,
                count: suggestions.len(),
                oracle_scored: stats.oracle_scored,
                skipped: stats.skipped,
                timestamp: chrono::Utc::now(),
            });
        }

        Ok(suggestions)
    }

    /// Random permutation prefix when the side exceeds the sample limit
    fn sample<'a>(&self, items: &'a [ClothingItem]) -> Vec<&'a ClothingItem> {
        let mut refs: Vec<&ClothingItem> = items.iter().collect();
        if refs.len() > self.settings.sample_limit {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            refs.shuffle(&mut *rng);
            refs.truncate(self.settings.sample_limit);
        }
        refs
    }

    async fn score_pair(
        &self,
        run_id: Uuid,
        top: &ClothingItem,
        bottom: &ClothingItem,
        breaker: &mut CircuitBreaker,
        stats: &mut RunStats,
    ) -> Result<OutfitSuggestion, PairError> {
        validate_slot(top, Category::Top)?;
        validate_slot(bottom, Category::Bottom)?;

        let attributes = score_attributes(top, bottom);

        if !breaker.is_open() {
            let assessment = self.oracle.assess(top, bottom).await;
            if assessment.is_from_oracle() {
                breaker.record_success();
                stats.oracle_scored += 1;

                let weight = self.settings.oracle_weight.clamp(0.0, 1.0);
                let score = weight * assessment.match_score + (1.0 - weight) * attributes.total;
                debug!(
                    top_id = %top.id,
                    bottom_id = %bottom.id,
                    oracle_score = assessment.match_score,
                    heuristic_score = attributes.total,
                    score,
                    "Pair scored by oracle"
                );
                return Ok(OutfitSuggestion::new(
                    &top.id,
                    &bottom.id,
                    score,
                    assessment.match_reason,
                ));
            }

            if breaker.record_failure() {
                warn!(
                    run_id = %run_id,
                    consecutive_failures = breaker.consecutive_failures,
                    "Oracle disabled for the rest of this run"
                );
                if let Some(bus) = &self.event_bus {
                    bus.emit_lossy(ClosetEvent::OracleCircuitOpened {
                        run_id,
                        consecutive_failures: breaker.consecutive_failures,
                        timestamp: chrono::Utc::now(),
                    });
                }
            }
        }

        debug!(
            top_id = %top.id,
            bottom_id = %bottom.id,
            score = attributes.total,
            "Pair scored heuristically"
        );
        Ok(OutfitSuggestion::new(
            &top.id,
            &bottom.id,
            attributes.total,
            tiered_reason(&attributes),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Compatibility;

    fn attributes(color: bool, style: bool, fabric: bool, total: f64) -> AttributeScore {
        let verdict = |ok: bool, name: &str| {
            if ok {
                Compatibility::compatible(format!("{} ok", name))
            } else {
                Compatibility::incompatible(format!("{} clash", name))
            }
        };
        AttributeScore {
            color: verdict(color, "color"),
            style: verdict(style, "style"),
            fabric: verdict(fabric, "fabric"),
            total,
        }
    }

    #[test]
    fn test_tiered_reasons() {
        assert_eq!(
            tiered_reason(&attributes(true, true, true, 1.0)),
            PERFECT_MATCH_REASON
        );
        assert_eq!(
            tiered_reason(&attributes(true, true, false, 0.9)),
            PERFECT_MATCH_REASON
        );
        assert_eq!(
            tiered_reason(&attributes(true, true, false, 0.8)),
            "color ok. style ok."
        );
        assert_eq!(tiered_reason(&attributes(false, true, true, 0.8)), "style ok");
        assert_eq!(tiered_reason(&attributes(true, false, false, 0.7)), "color ok");
        assert_eq!(
            tiered_reason(&attributes(false, false, false, 0.6)),
            "fabric clash"
        );
        assert_eq!(
            tiered_reason(&attributes(false, false, false, 0.4)),
            BOLD_CONTRAST_REASON
        );
        assert_eq!(
            tiered_reason(&attributes(false, false, false, 0.2)),
            CONTRASTING_LOOK_REASON
        );
    }

    #[test]
    fn test_breaker_opens_once_and_never_resets() {
        let mut breaker = CircuitBreaker::new(3);
        assert!(!breaker.record_failure());
        breaker.record_success();
        assert!(!breaker.record_failure());
        assert!(!breaker.record_failure());
        assert!(breaker.record_failure());
        assert!(breaker.is_open());
        breaker.record_success();
        assert!(breaker.is_open());
        assert!(!breaker.record_failure());
    }

    #[test]
    fn test_validate_slot() {
        let item = ClothingItem {
            id: "b1".to_string(),
            category: Category::Bottom,
            image_url: String::new(),
            color: "#000000".to_string(),
            style: "casual".into(),
            fabric: "denim".into(),
            added: chrono::Utc::now(),
            name: None,
        };
        assert!(validate_slot(&item, Category::Bottom).is_ok());
        assert!(matches!(
            validate_slot(&item, Category::Top),
            Err(PairError::WrongCategory { .. })
        ));

        let blank = ClothingItem {
            id: "  ".to_string(),
            ..item
        };
        assert_eq!(
            validate_slot(&blank, Category::Bottom),
            Err(PairError::EmptyId { expected: "bottom" })
        );
    }
}
