//! closet-ai library interface
//!
//! Outfit compatibility scoring and suggestion ranking:
//! - `analysis`: color, style and fabric evaluators
//! - `scoring`: weighted heuristic over the evaluator verdicts
//! - `oracle`: external vision model adapter with rule-based fallback
//! - `services`: suggestion generation, weekly planning, persistence sinks

pub mod analysis;
pub mod models;
pub mod oracle;
pub mod scoring;
pub mod services;

pub use models::{Category, ClothingCatalog, ClothingItem, Fabric, OutfitSuggestion, Style};
pub use oracle::{OracleAdapter, OracleAssessment, OutfitOracle};
pub use services::{GenerationError, SuggestionGenerator, WeeklyPlan, WeeklyPlanner};
