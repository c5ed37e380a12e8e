//! Flowscope Health
//!
//! Calibrated health metrics for a repaired process graph.
//!
//! # Metrics
//!
//! - **Complexity**: size, edge density and layer diversity
//! - **Fragility**: gap severity and manual steps, scaled by team tier
//! - **Automation potential**: mean step automation score
//! - **Team load balance**: how evenly ownership is spread
//!
//! Every metric is an integer in `0..=100`.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod calibration;
pub mod scoring;

pub use calibration::{calibrate, CalibrationMultipliers, TeamTier};
pub use scoring::HealthScorer;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
