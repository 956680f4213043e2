//! Shared domain types for the Roadwatch project.

pub mod camera;
pub mod config;
pub mod incident;
pub mod settings;
pub mod stats;

mod errors;

pub use errors::{RoadwatchError, Result};
