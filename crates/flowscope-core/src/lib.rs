//! Flowscope Core
//!
//! Turns a business process description into a repaired, scored,
//! cacheable decomposition.
//!
//! # Pipeline
//!
//! ```text
//! AnalysisRequest -> fingerprint -> cache? -> ModelClient -> schema gate
//!     -> GraphRepair -> HealthScorer -> DecompositionStore -> cache
//! ```
//!
//! The model and the store are collaborators behind async traits
//! ([`ModelClient`], [`DecompositionStore`]); everything between them is
//! synchronous and infallible.
//!
//! # Example
//!
//! ```rust,ignore
//! use flowscope_core::prelude::*;
//!
//! let config = FlowscopeConfig::load("flowscope.toml")?;
//! let cache = config.cache.open().await;
//! let analyzer = Analyzer::new(config, model, Arc::new(InMemoryDecompositionStore::new()), cache);
//!
//! let analysis = analyzer.analyze(AnalysisRequest::new("Invoices arrive by email...")).await?;
//! let layout = analyzer.layout(&analysis.decomposition);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod analyzer;
pub mod config;
pub mod error;
pub mod model;
pub mod schema;
pub mod store;

pub use analyzer::{Analysis, AnalysisRequest, Analyzer};
pub use config::{CacheConfig, FlowscopeConfig};
pub use error::{AnalysisError, ConfigError, ModelError, SchemaError, StoreError};
pub use model::{ModelClient, ModelRequest, ModelResponse, TokenUsage};
pub use schema::{parse_model_output, ModelDecomposition};
pub use store::{DecompositionStore, InMemoryDecompositionStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving an analysis
    pub use crate::{
        Analysis, AnalysisError, AnalysisRequest, Analyzer, DecompositionStore, FlowscopeConfig,
        InMemoryDecompositionStore, ModelClient, ModelRequest, ModelResponse,
    };
    pub use flowscope_graph::GraphLayout;
    pub use flowscope_model::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
