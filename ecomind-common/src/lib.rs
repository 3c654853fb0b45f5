//! # EcoMind Common Library
//!
//! Core logic shared by the EcoMind services:
//! - Waste classification adapter (threshold over a binary model)
//! - Energy advisory rule table
//! - Session eco-score bookkeeping with duplicate suppression
//! - Eco tip loading and selection
//! - Configuration loading and error types

pub mod advisory;
pub mod classifier;
pub mod config;
pub mod error;
pub mod score;
pub mod session;
pub mod tips;

pub use classifier::{Classification, WasteClassifier, WasteLabel, WasteModel};
pub use error::{Error, Result};
pub use score::{EventKind, ScoreTracker, ScoreUpdate};
pub use session::SessionContext;
pub use tips::{TipBook, TipPicker};
