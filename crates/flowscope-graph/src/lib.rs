//! Flowscope Graph
//!
//! Structural algorithms over model-generated process graphs.
//!
//! # Core Operations
//!
//! - **Repair**: turn an untrusted step/gap list into a DAG ([`GraphRepair`])
//! - **Layout**: layered 2-D placement with critical path and hover focus
//!   ([`LayoutEngine`])
//! - **Check**: independent acyclicity and ordering checks ([`dag`])
//!
//! None of these fail: malformed graphs are repaired, degenerate graphs
//! produce empty output.
//!
//! # Example
//!
//! ```rust,ignore
//! use flowscope_graph::{GraphRepair, LayoutEngine};
//!
//! let outcome = GraphRepair::new().repair(steps, gaps);
//! let layout = LayoutEngine::default().layout(&outcome.steps);
//! println!("critical path: {:?}", layout.critical_path);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod chain;
pub mod dag;
pub mod layout;
pub mod repair;

pub use layout::{
    EdgeRoute, GraphLayout, LayoutConfig, LayoutEngine, NodePlacement, Position, Spacing,
};
pub use repair::{Edge, EdgeDefect, GraphRepair, RepairOutcome, RepairReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
