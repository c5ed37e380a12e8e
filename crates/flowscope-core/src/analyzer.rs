//! Analysis orchestration
//!
//! Drives one decomposition request end to end:
//! - fingerprints the request and consults the analysis cache
//! - calls the model and passes its output through the schema gate
//! - repairs the graph, scores it, persists it and caches it
//!
//! Once the schema gate passes, the caller always receives a structurally
//! valid, scored decomposition.

use crate::config::FlowscopeConfig;
use crate::error::AnalysisError;
use crate::model::{ModelClient, ModelRequest};
use crate::schema;
use crate::store::DecompositionStore;
use flowscope_cache::{AnalysisCache, CacheEntry, Fingerprint, FingerprintInput, GenerationMetadata};
use flowscope_graph::{GraphLayout, GraphRepair, LayoutEngine, RepairReport};
use flowscope_health::HealthScorer;
use flowscope_model::{CostContext, Decomposition, DecompositionId, Stage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Title used when the model supplies none
pub const UNTITLED: &str = "Untitled process";

/// A request to decompose a process description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Free-text process description
    pub description: String,
    /// Structured stages supplied by the user
    #[serde(default)]
    pub stages: Option<Vec<Stage>>,
    /// Team and cost context
    #[serde(default)]
    pub cost: Option<CostContext>,
}

impl AnalysisRequest {
    /// Request for a free-text description
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            stages: None,
            cost: None,
        }
    }

    /// Attach a structured stage list
    #[inline]
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<Stage>) -> Self {
        self.stages = Some(stages);
        self
    }

    /// Attach team and cost context
    #[inline]
    #[must_use]
    pub fn with_cost(mut self, cost: CostContext) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Team size used for calibration, if given
    #[inline]
    #[must_use]
    pub fn team_size(&self) -> Option<u32> {
        self.cost.and_then(|cost| cost.team_size)
    }
}

/// Result of an analysis
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Repaired and scored result
    pub decomposition: Decomposition,
    /// Cache key of the request
    pub fingerprint: Fingerprint,
    /// Served from the analysis cache without a model call
    pub from_cache: bool,
    /// What repair changed; `None` for cached results
    pub repair: Option<RepairReport>,
}

/// Analysis orchestrator
pub struct Analyzer {
    config: FlowscopeConfig,
    model: Arc<dyn ModelClient>,
    store: Arc<dyn DecompositionStore>,
    cache: AnalysisCache,
    repair: GraphRepair,
    scorer: HealthScorer,
    layout: LayoutEngine,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Create new analyzer
    #[must_use]
    pub fn new(
        config: FlowscopeConfig,
        model: Arc<dyn ModelClient>,
        store: Arc<dyn DecompositionStore>,
        cache: AnalysisCache,
    ) -> Self {
        let layout = LayoutEngine::new(config.layout.clone());
        Self {
            config,
            model,
            store,
            cache,
            repair: GraphRepair::new(),
            scorer: HealthScorer::new(),
            layout,
        }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FlowscopeConfig {
        &self.config
    }

    /// Analysis cache in use
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Fingerprint a request under the configured prompt and model
    ///
    /// # Errors
    /// Returns error if the stage list cannot be serialized
    pub fn fingerprint(&self, request: &AnalysisRequest) -> Result<Fingerprint, AnalysisError> {
        let mut input = FingerprintInput::new(
            &request.description,
            &self.config.prompt_version,
            &self.config.model_id,
        );
        if let Some(stages) = &request.stages {
            input = input.with_stages(stages);
        }
        if let Some(cost) = &request.cost {
            input = input.with_cost(cost);
        }
        Ok(Fingerprint::compute(&input)?)
    }

    /// Analyze a process description
    ///
    /// # Workflow
    /// 1. Fingerprint the request; a cache hit returns immediately
    /// 2. Call the model and validate its output
    /// 3. Repair, score, persist and cache
    ///
    /// # Errors
    /// Returns error on a blank description, a failed model call, output
    /// rejected by the schema gate, or a store failure
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<Analysis, AnalysisError> {
        let fingerprint = self.validated_fingerprint(&request)?;
        tracing::info!(%fingerprint, "Analyzing process description");

        if let Some(entry) = self.cache.lookup(&fingerprint).await {
            tracing::info!(
                %fingerprint,
                decomposition = %entry.payload.id,
                hits = entry.hit_count,
                "Served analysis from cache"
            );
            return Ok(Analysis {
                decomposition: entry.payload,
                fingerprint,
                from_cache: true,
                repair: None,
            });
        }

        self.generate(&request, fingerprint, None).await
    }

    /// Re-analyze a stored decomposition
    ///
    /// Always calls the model. The result links back to `parent_id` and
    /// replaces any cached entry for the same request.
    ///
    /// # Errors
    /// Returns [`AnalysisError::ParentNotFound`] if `parent_id` is not
    /// stored, plus every error [`Analyzer::analyze`] can return
    pub async fn reanalyze(
        &self,
        parent_id: DecompositionId,
        request: AnalysisRequest,
    ) -> Result<Analysis, AnalysisError> {
        let fingerprint = self.validated_fingerprint(&request)?;
        let parent = self
            .store
            .get(&parent_id)
            .await?
            .ok_or(AnalysisError::ParentNotFound(parent_id))?;
        tracing::info!(%fingerprint, parent = %parent_id, "Re-analyzing decomposition");

        self.generate(&request, fingerprint, Some(&parent)).await
    }

    /// Lay out a decomposition for display
    #[must_use]
    pub fn layout(&self, decomposition: &Decomposition) -> GraphLayout {
        self.layout.layout(&decomposition.steps)
    }

    /// Lay out a decomposition with a step in hover focus
    #[must_use]
    pub fn layout_with_focus(
        &self,
        decomposition: &Decomposition,
        hovered: Option<&str>,
    ) -> GraphLayout {
        self.layout.layout_with_focus(&decomposition.steps, hovered)
    }

    fn validated_fingerprint(&self, request: &AnalysisRequest) -> Result<Fingerprint, AnalysisError> {
        if request.description.trim().is_empty() {
            return Err(AnalysisError::EmptyDescription);
        }
        self.fingerprint(request)
    }

    async fn generate(
        &self,
        request: &AnalysisRequest,
        fingerprint: Fingerprint,
        parent: Option<&Decomposition>,
    ) -> Result<Analysis, AnalysisError> {
        let model_request = ModelRequest {
            prompt_version: self.config.prompt_version.clone(),
            model_id: self.config.model_id.clone(),
            description: request.description.clone(),
            stages: request.stages.clone().unwrap_or_default(),
            team_size: request.team_size(),
            previous: parent.and_then(|p| serde_json::to_string(p).ok()),
        };

        let response = self.model.complete(&model_request).await?;
        let output = match schema::parse_model_output(&response.text) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(%fingerprint, error = %e, "Model output failed schema validation");
                return Err(e.into());
            }
        };

        let outcome = self.repair.repair(output.steps, output.gaps);
        let health = self
            .scorer
            .score(&outcome.steps, &outcome.gaps, request.team_size());
        let title = match output.title.trim() {
            "" => UNTITLED.to_string(),
            title => title.to_string(),
        };

        let decomposition = match parent {
            Some(parent) => parent.derive_child(title, outcome.steps, outcome.gaps, health),
            None => Decomposition::new(title, outcome.steps, outcome.gaps, health),
        };
        self.store.put(&decomposition).await?;

        let metadata = GenerationMetadata::new(&self.config.prompt_version, &self.config.model_id)
            .with_tokens(response.usage.input_tokens, response.usage.output_tokens);
        self.cache
            .store(
                CacheEntry::new(fingerprint, decomposition.clone(), metadata),
                None,
            )
            .await;

        tracing::info!(
            %fingerprint,
            decomposition = %decomposition.id,
            steps = decomposition.steps.len(),
            gaps = decomposition.gaps.len(),
            repairs = outcome.report.repair_count(),
            "Analysis complete"
        );

        Ok(Analysis {
            decomposition,
            fingerprint,
            from_cache: false,
            repair: Some(outcome.report),
        })
    }
}
