//! Service modules for outfit suggestion workflow
//!
//! - `suggestion_generator`: pairs tops with bottoms and ranks them
//! - `weekly_planner`: picks seven varied outfits from a ranked list
//! - `suggestion_sink`: fire-and-forget persistence of generated suggestions

pub mod suggestion_generator;
pub mod suggestion_sink;
pub mod weekly_planner;

pub use suggestion_generator::{GenerationError, PairError, SuggestionGenerator};
pub use suggestion_sink::{NullSink, StoreSink, SuggestionSink, SuggestionStore};
pub use weekly_planner::{PlannedOutfit, WeeklyPlan, WeeklyPlanner, WEEK};
