//! Subcommand implementations
//!
//! Each command reads its input, runs the library operation and returns a
//! JSON value for `main` to print.

use anyhow::{bail, Context, Result};
use flowscope_cache::{CacheBackend, Fingerprint, FingerprintInput, JsonFileBackend};
use flowscope_core::{parse_model_output, FlowscopeConfig, ModelDecomposition};
use flowscope_graph::{GraphRepair, LayoutEngine, RepairReport};
use flowscope_health::HealthScorer;
use flowscope_model::{CostContext, Gap, HealthMetrics, Stage, Step};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Output of `flowscope repair`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RepairOutput {
    pub(crate) title: String,
    pub(crate) steps: Vec<Step>,
    pub(crate) gaps: Vec<Gap>,
    pub(crate) health: HealthMetrics,
    pub(crate) report: RepairReport,
}

/// Read a file, or stdin for `-`
pub(crate) fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
}

fn parse(text: &str) -> Result<ModelDecomposition> {
    parse_model_output(text).context("input is not a valid decomposition")
}

/// Repair and score raw model output
pub(crate) fn repair(text: &str, team_size: Option<u32>) -> Result<RepairOutput> {
    let parsed = parse(text)?;
    let outcome = GraphRepair::new().repair(parsed.steps, parsed.gaps);
    let health = HealthScorer::new().score(&outcome.steps, &outcome.gaps, team_size);

    Ok(RepairOutput {
        title: parsed.title,
        steps: outcome.steps,
        gaps: outcome.gaps,
        health,
        report: outcome.report,
    })
}

/// Repair raw model output and lay it out
pub(crate) fn layout(
    text: &str,
    config: &FlowscopeConfig,
    hovered: Option<&str>,
) -> Result<serde_json::Value> {
    let parsed = parse(text)?;
    let steps = GraphRepair::new().repair(parsed.steps, parsed.gaps).steps;
    let layout = LayoutEngine::new(config.layout.clone()).layout_with_focus(&steps, hovered);
    Ok(serde_json::to_value(layout)?)
}

/// Fingerprint a request under the configured prompt and model
pub(crate) fn fingerprint(
    description: &str,
    stages: Option<&[Stage]>,
    team_size: Option<u32>,
    config: &FlowscopeConfig,
) -> Result<Fingerprint> {
    if description.trim().is_empty() {
        bail!("description is empty");
    }
    let cost = team_size.map(CostContext::for_team);
    let mut input =
        FingerprintInput::new(description, &config.prompt_version, &config.model_id);
    if let Some(stages) = stages {
        input = input.with_stages(stages);
    }
    if let Some(cost) = &cost {
        input = input.with_cost(cost);
    }
    Ok(Fingerprint::compute(&input)?)
}

/// Parse a JSON stage list file
pub(crate) fn read_stages(path: &Path) -> Result<Vec<Stage>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).context("stages must be a JSON array of stages")
}

/// Show a cached entry from the configured cache directory
pub(crate) async fn show_cached(
    fingerprint: &str,
    config: &FlowscopeConfig,
) -> Result<Option<serde_json::Value>> {
    let Some(directory) = &config.cache.directory else {
        bail!("no cache directory configured (set cache.directory or FLOWSCOPE_CACHE_DIR)");
    };
    let fingerprint: Fingerprint = fingerprint.parse().context("invalid fingerprint")?;
    let backend = JsonFileBackend::open(directory).await?;
    match backend.get(&fingerprint).await? {
        Some(entry) => Ok(Some(serde_json::to_value(entry)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowscope_cache::{CacheEntry, GenerationMetadata};
    use flowscope_model::{Decomposition, StepId};
    use flowscope_test_utils::sample_model_output;
    use pretty_assertions::assert_eq;

    #[test]
    fn repair_reports_defects() {
        let output = repair(&sample_model_output(), Some(3)).unwrap();

        assert_eq!(output.title, "Invoice approval");
        assert_eq!(output.steps.len(), 3);
        assert_eq!(output.report.duplicate_steps, vec![StepId::new("extract")]);
        assert_eq!(output.health.team_size, Some(3));
    }

    #[test]
    fn repair_rejects_prose() {
        assert!(repair("no json here", None).is_err());
    }

    #[test]
    fn layout_emits_camel_case_json() {
        let value = layout(&sample_model_output(), &FlowscopeConfig::default(), Some("approve"))
            .unwrap();

        assert_eq!(value["nodes"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["criticalPath"][0], "extract");
        assert_eq!(value["hovered"], "approve");
    }

    #[test]
    fn fingerprint_ignores_description_noise() {
        let config = FlowscopeConfig::default();
        let a = fingerprint("Approve invoices", None, Some(4), &config).unwrap();
        let b = fingerprint(" approve   INVOICES ", None, Some(4), &config).unwrap();
        let c = fingerprint("approve invoices", None, Some(5), &config).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(fingerprint("   ", None, None, &config).is_err());
    }

    #[tokio::test]
    async fn show_cached_reads_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = FlowscopeConfig::default().with_cache_directory(dir.path());
        let fp = fingerprint("approve invoices", None, None, &config).unwrap();

        assert_eq!(show_cached(&fp.to_string(), &config).await.unwrap(), None);

        let parsed = repair(&sample_model_output(), None).unwrap();
        let decomposition = Decomposition::new(parsed.title, parsed.steps, parsed.gaps, parsed.health);
        let backend = JsonFileBackend::open(dir.path()).await.unwrap();
        backend
            .set(
                CacheEntry::new(fp, decomposition, GenerationMetadata::new("v1", "default")),
                None,
            )
            .await
            .unwrap();

        let shown = show_cached(&fp.to_string(), &config).await.unwrap().unwrap();
        assert_eq!(shown["fingerprint"], fp.to_string());
        assert!(show_cached("nothex", &config).await.is_err());
    }

    #[tokio::test]
    async fn show_cached_needs_directory() {
        let err = show_cached("00", &FlowscopeConfig::default()).await.unwrap_err();
        assert!(err.to_string().contains("no cache directory"));
    }
}
