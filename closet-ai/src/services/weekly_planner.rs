//! Weekly Planner
//!
//! Picks seven suggestions, one per day Sunday through Saturday, favoring
//! variety among the highest-scoring outfits.
//!
//! # Selection passes
//! 1. Best-first, only suggestions whose top and bottom are both still unused
//! 2. Best-first, any suggestion not yet picked (reuse allowed)
//! 3. Uniform random picks with replacement from the full input list

use crate::models::{ClothingCatalog, ClothingItem, OutfitSuggestion};
use chrono::Weekday;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::debug;

/// Day order of a planned week
pub const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// One day of the plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedOutfit {
    pub day: Weekday,
    pub suggestion: OutfitSuggestion,
    /// `None` when the catalog no longer holds the item
    pub top: Option<ClothingItem>,
    pub bottom: Option<ClothingItem>,
}

/// Up to seven planned days in `WEEK` order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeeklyPlan {
    pub days: Vec<PlannedOutfit>,
}

impl WeeklyPlan {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, day: Weekday) -> Option<&PlannedOutfit> {
        self.days.iter().find(|d| d.day == day)
    }
}

/// Weekly Planner
pub struct WeeklyPlanner {
    rng: Mutex<StdRng>,
}

impl Default for WeeklyPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl WeeklyPlanner {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Planner whose random fill is reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Choose the week's suggestions
    ///
    /// Returns exactly seven entries for any non-empty input, none for an
    /// empty one. Entry `i` belongs to `WEEK[i]`.
    pub fn select_week(&self, suggestions: &[OutfitSuggestion]) -> Vec<OutfitSuggestion> {
        let days = WEEK.len();
        let mut sorted: Vec<&OutfitSuggestion> = suggestions.iter().collect();
        sorted.sort_by(|a, b| b.score().total_cmp(&a.score()));

        let mut selected: Vec<OutfitSuggestion> = Vec::with_capacity(days);
        let mut picked = HashSet::new();
        let mut used_tops = HashSet::new();
        let mut used_bottoms = HashSet::new();

        for suggestion in &sorted {
            if selected.len() >= days {
                break;
            }
            if used_tops.contains(suggestion.top_id())
                || used_bottoms.contains(suggestion.bottom_id())
            {
                continue;
            }
            used_tops.insert(suggestion.top_id());
            used_bottoms.insert(suggestion.bottom_id());
            picked.insert(suggestion.id());
            selected.push((*suggestion).clone());
        }
        let distinct = selected.len();

        for suggestion in &sorted {
            if selected.len() >= days {
                break;
            }
            if picked.insert(suggestion.id()) {
                selected.push((*suggestion).clone());
            }
        }
        let ranked = selected.len();

        if selected.len() < days && !suggestions.is_empty() {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            while selected.len() < days {
                match suggestions.choose(&mut *rng) {
                    Some(pick) => selected.push(pick.clone()),
                    None => break,
                }
            }
        }

        debug!(
            available = suggestions.len(),
            distinct,
            reused = ranked - distinct,
            random_fill = selected.len() - ranked,
            "Weekly outfits selected"
        );

        selected
    }

    /// Select the week and resolve each day's garments through `catalog`
    pub fn plan<C>(&self, suggestions: &[OutfitSuggestion], catalog: &C) -> WeeklyPlan
    where
        C: ClothingCatalog + ?Sized,
    {
        let days = WEEK
            .iter()
            .zip(self.select_week(suggestions))
            .map(|(&day, suggestion)| PlannedOutfit {
                day,
                top: catalog.find(suggestion.top_id()).cloned(),
                bottom: catalog.find(suggestion.bottom_id()).cloned(),
                suggestion,
            })
            .collect();

        WeeklyPlan { days }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(top: &str, bottom: &str, score: f64) -> OutfitSuggestion {
        OutfitSuggestion::new(top, bottom, score, "fine")
    }

    #[test]
    fn test_empty_input_yields_empty_week() {
        let planner = WeeklyPlanner::with_seed(1);
        assert!(planner.select_week(&[]).is_empty());
        assert!(planner.plan(&[], &Vec::<ClothingItem>::new()).is_empty());
    }

    #[test]
    fn test_first_pass_prefers_unused_items() {
        let suggestions = vec![
            suggestion("t1", "b1", 0.9),
            suggestion("t1", "b2", 0.85),
            suggestion("t2", "b2", 0.8),
            suggestion("t2", "b1", 0.7),
        ];
        let week = WeeklyPlanner::with_seed(1).select_week(&suggestions);

        assert_eq!(week.len(), 7);
        // pass 1: t1/b1 then t2/b2; pass 2: t1/b2, t2/b1 by score
        assert_eq!(week[0].id(), suggestions[0].id());
        assert_eq!(week[1].id(), suggestions[2].id());
        assert_eq!(week[2].id(), suggestions[1].id());
        assert_eq!(week[3].id(), suggestions[3].id());
        // pass 3 draws from the input
        for pick in &week[4..] {
            assert!(suggestions.iter().any(|s| s.id() == pick.id()));
        }
    }

    #[test]
    fn test_single_suggestion_fills_week() {
        let only = suggestion("t1", "b1", 0.5);
        let week = WeeklyPlanner::with_seed(9).select_week(std::slice::from_ref(&only));
        assert_eq!(week.len(), 7);
        assert!(week.iter().all(|s| s.id() == only.id()));
    }

    #[test]
    fn test_random_fill_is_reproducible_with_seed() {
        let suggestions = vec![suggestion("t1", "b1", 0.9), suggestion("t1", "b2", 0.8)];
        let a = WeeklyPlanner::with_seed(42).select_week(&suggestions);
        let b = WeeklyPlanner::with_seed(42).select_week(&suggestions);
        let ids = |week: &[OutfitSuggestion]| week.iter().map(|s| s.id()).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }
}
