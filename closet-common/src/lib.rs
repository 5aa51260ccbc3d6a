//! # Closet Fusion Common Library
//!
//! Shared code for the Closet Fusion crates including:
//! - Error types
//! - Configuration loading (TOML bootstrap + environment overrides)
//! - Event types (ClosetEvent enum) and the EventBus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
