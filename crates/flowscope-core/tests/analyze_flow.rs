use async_trait::async_trait;
use flowscope_cache::{AnalysisCache, InMemoryBackend};
use flowscope_core::prelude::*;
use flowscope_core::{ModelError, SchemaError, TokenUsage};
use flowscope_graph::Edge;
use flowscope_test_utils::sample_model_output;
use mockall::mock;
use pretty_assertions::assert_eq;
use std::sync::Arc;

mock! {
    pub Model {}

    #[async_trait]
    impl ModelClient for Model {
        async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError>;
    }
}

const DESCRIPTION: &str = "Invoices arrive by email, get extracted, then a manager approves them.";

fn sample_response() -> ModelResponse {
    ModelResponse {
        text: format!("```json\n{}\n```", sample_model_output()),
        usage: TokenUsage {
            input_tokens: 412,
            output_tokens: 1290,
        },
    }
}

fn model_answering(times: usize) -> MockModel {
    let mut model = MockModel::new();
    model
        .expect_complete()
        .times(times)
        .returning(|_| Ok(sample_response()));
    model
}

fn analyzer(model: MockModel, store: Arc<InMemoryDecompositionStore>) -> Analyzer {
    let config = FlowscopeConfig::default()
        .with_prompt_version("v3")
        .with_model_id("test-model");
    let cache = AnalysisCache::new(Arc::new(InMemoryBackend::new(64)));
    Analyzer::new(config, Arc::new(model), store, cache)
}

fn ids(decomposition: &Decomposition) -> Vec<&str> {
    decomposition.steps.iter().map(|s| s.id.as_str()).collect()
}

fn dependencies<'a>(decomposition: &'a Decomposition, id: &str) -> Vec<&'a str> {
    decomposition
        .step(id)
        .map(|s| s.dependencies.iter().map(StepId::as_str).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn analyze_repairs_scores_and_persists() {
    let store = Arc::new(InMemoryDecompositionStore::new());
    let analyzer = analyzer(model_answering(1), store.clone());

    let analysis = analyzer.analyze(AnalysisRequest::new(DESCRIPTION)).await.unwrap();
    let decomposition = &analysis.decomposition;

    assert!(!analysis.from_cache);
    assert_eq!(decomposition.title, "Invoice approval");
    assert_eq!(ids(decomposition), vec!["receive", "extract", "approve"]);
    assert_eq!(dependencies(decomposition, "receive"), vec!["approve"]);
    assert!(dependencies(decomposition, "extract").is_empty());
    assert_eq!(dependencies(decomposition, "approve"), vec!["extract"]);

    let scores: Vec<f64> = decomposition.steps.iter().map(|s| s.automation_score).collect();
    assert_eq!(scores, vec![85.0, 100.0, 10.0]);

    let gap_types: Vec<GapType> = decomposition.gaps.iter().map(|g| g.gap_type).collect();
    assert_eq!(gap_types, vec![GapType::SingleDependency, GapType::MissingFeedback]);

    let report = analysis.repair.unwrap();
    assert_eq!(
        report.broken_cycles,
        vec![Edge {
            from: StepId::new("extract"),
            to: StepId::new("receive"),
        }]
    );
    assert_eq!(report.duplicate_steps, vec![StepId::new("extract")]);

    let health = &decomposition.health;
    assert_eq!(health.complexity, 39);
    assert_eq!(health.fragility, 40);
    assert_eq!(health.automation_potential, 65);
    assert_eq!(health.team_load_balance, 83);
    assert_eq!(health.confidence, Confidence::Inferred);

    assert_eq!(
        store.get(&decomposition.id).await.unwrap().as_ref(),
        Some(decomposition)
    );
}

#[tokio::test]
async fn layout_highlights_critical_path() {
    let analyzer = analyzer(model_answering(1), Arc::new(InMemoryDecompositionStore::new()));
    let analysis = analyzer.analyze(AnalysisRequest::new(DESCRIPTION)).await.unwrap();

    let layout = analyzer.layout(&analysis.decomposition);
    let path: Vec<&str> = layout.critical_path.iter().map(StepId::as_str).collect();
    assert_eq!(path, vec!["extract", "approve", "receive"]);
    assert_eq!(layout.nodes.len(), 3);

    let focused = analyzer.layout_with_focus(&analysis.decomposition, Some("extract"));
    assert_eq!(focused.node("receive").map(|n| n.dimmed), Some(true));
    assert_eq!(focused.node("approve").map(|n| n.dimmed), Some(false));
}

#[tokio::test]
async fn repeated_request_is_served_from_cache() {
    let store = Arc::new(InMemoryDecompositionStore::new());
    let analyzer = analyzer(model_answering(1), store.clone());

    let first = analyzer.analyze(AnalysisRequest::new(DESCRIPTION)).await.unwrap();
    let noisy = format!("  {}  ", DESCRIPTION.to_uppercase().replace(' ', "   "));
    let second = analyzer.analyze(AnalysisRequest::new(noisy)).await.unwrap();

    assert!(second.from_cache);
    assert!(second.repair.is_none());
    assert_eq!(second.fingerprint, first.fingerprint);
    assert_eq!(second.decomposition, first.decomposition);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn hourly_rate_does_not_bust_cache() {
    let analyzer = analyzer(model_answering(1), Arc::new(InMemoryDecompositionStore::new()));
    let cost = CostContext {
        team_size: Some(4),
        hourly_rate: Some(50.0),
        hours_per_step: Some(2.0),
    };

    analyzer
        .analyze(AnalysisRequest::new(DESCRIPTION).with_cost(cost))
        .await
        .unwrap();
    let cheaper = CostContext {
        hourly_rate: Some(10.0),
        ..cost
    };
    let again = analyzer
        .analyze(AnalysisRequest::new(DESCRIPTION).with_cost(cheaper))
        .await
        .unwrap();

    assert!(again.from_cache);
    assert_eq!(again.decomposition.health.confidence, Confidence::High);
}

#[tokio::test]
async fn reanalyze_links_parent_and_bypasses_cache() {
    let store = Arc::new(InMemoryDecompositionStore::new());
    let mut model = MockModel::new();
    model
        .expect_complete()
        .withf(|request| request.previous.is_none())
        .times(1)
        .returning(|_| Ok(sample_response()));
    model
        .expect_complete()
        .withf(|request| request.previous.is_some())
        .times(1)
        .returning(|_| Ok(sample_response()));
    let analyzer = analyzer(model, store.clone());

    let parent = analyzer.analyze(AnalysisRequest::new(DESCRIPTION)).await.unwrap();
    let child = analyzer
        .reanalyze(parent.decomposition.id, AnalysisRequest::new(DESCRIPTION))
        .await
        .unwrap();

    assert!(!child.from_cache);
    assert_ne!(child.decomposition.id, parent.decomposition.id);
    assert_eq!(child.decomposition.parent_id, Some(parent.decomposition.id));
    assert_eq!(store.children_of(&parent.decomposition.id).len(), 1);

    // The cache now holds the newer decomposition
    let cached = analyzer.analyze(AnalysisRequest::new(DESCRIPTION)).await.unwrap();
    assert!(cached.from_cache);
    assert_eq!(cached.decomposition.id, child.decomposition.id);
}

#[tokio::test]
async fn reanalyze_unknown_parent_fails_without_model_call() {
    let analyzer = analyzer(model_answering(0), Arc::new(InMemoryDecompositionStore::new()));
    let missing = DecompositionId::new();

    let err = analyzer
        .reanalyze(missing, AnalysisRequest::new(DESCRIPTION))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::ParentNotFound(id) if id == missing));
}

#[tokio::test]
async fn schema_failure_is_fatal_and_not_cached() {
    let store = Arc::new(InMemoryDecompositionStore::new());
    let mut model = MockModel::new();
    model
        .expect_complete()
        .times(2)
        .returning(|_| Ok(ModelResponse::text("I could not decompose that process.")));
    let analyzer = analyzer(model, store.clone());

    for _ in 0..2 {
        let err = analyzer
            .analyze(AnalysisRequest::new(DESCRIPTION))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Schema(SchemaError::Json(_))));
        assert!(!err.is_retryable());
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn model_failure_propagates() {
    let mut model = MockModel::new();
    model.expect_complete().times(1).returning(|_| {
        Err(ModelError::RateLimited {
            retry_after_secs: Some(30),
        })
    });
    let analyzer = analyzer(model, Arc::new(InMemoryDecompositionStore::new()));

    let err = analyzer
        .analyze(AnalysisRequest::new(DESCRIPTION))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Model(ModelError::RateLimited { .. })));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn blank_description_rejected_up_front() {
    let analyzer = analyzer(model_answering(0), Arc::new(InMemoryDecompositionStore::new()));
    let err = analyzer
        .analyze(AnalysisRequest::new(" \n\t"))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyDescription));
}

#[tokio::test]
async fn request_carries_configured_prompt_and_model() {
    let mut model = MockModel::new();
    model
        .expect_complete()
        .withf(|request| {
            request.prompt_version == "v3"
                && request.model_id == "test-model"
                && request.team_size == Some(2)
                && request.stages.len() == 1
        })
        .times(1)
        .returning(|_| Ok(sample_response()));
    let analyzer = analyzer(model, Arc::new(InMemoryDecompositionStore::new()));

    let request = AnalysisRequest::new(DESCRIPTION)
        .with_stages(vec![Stage::new("Intake")])
        .with_cost(CostContext::for_team(2));
    let analysis = analyzer.analyze(request).await.unwrap();

    // Small team: fragility 40 scaled by 1.2
    assert_eq!(analysis.decomposition.health.fragility, 48);
}
