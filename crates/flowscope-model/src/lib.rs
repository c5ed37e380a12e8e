//! Flowscope Model
//!
//! Domain types shared by every Flowscope crate:
//! - [`Step`]: a node of a decomposed process
//! - [`Gap`]: a deficiency annotated over steps
//! - [`Decomposition`]: the immutable, repaired and scored aggregate
//! - [`HealthMetrics`]: calibrated 0-100 scores derived from a decomposition
//! - [`Stage`], [`CostContext`]: optional context supplied with a request
//!
//! JSON field names are camelCase and enum values snake_case, matching what
//! the decomposition model is prompted to emit.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod context;
pub mod decomposition;
pub mod gap;
pub mod step;

pub use context::{CostContext, Stage};
pub use decomposition::{Confidence, Decomposition, DecompositionId, HealthMetrics};
pub use gap::{Effort, Gap, GapType, Severity};
pub use step::{Step, StepId, StepLayer};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Flowscope types
    pub use crate::{
        Confidence, CostContext, Decomposition, DecompositionId, Gap, GapType, HealthMetrics,
        Severity, Stage, Step, StepId, StepLayer,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
