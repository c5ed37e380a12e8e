//! Testing utilities for Flowscope workspace
//!
//! Shared fixtures, builders and proptest strategies.

#![allow(missing_docs)]

use flowscope_model::{Gap, GapType, Severity, Step, StepLayer};
use proptest::prelude::*;

pub fn step(id: &str, dependencies: &[&str]) -> Step {
    dependencies.iter().fold(
        Step::new(id, format!("Step {id}"), StepLayer::Orchestration).with_automation_score(50.0),
        |step, dependency| step.depends_on(*dependency),
    )
}

pub fn owned_step(id: &str, owner: &str, automation_score: f64) -> Step {
    step(id, &[])
        .with_owner(owner)
        .with_automation_score(automation_score)
}

pub fn gap(gap_type: GapType, severity: Severity, step_ids: &[&str]) -> Gap {
    step_ids.iter().fold(
        Gap::new(gap_type, severity, format!("{gap_type} gap")),
        |gap, id| gap.on_step(*id),
    )
}

/// A -> B -> C chain plus a spurious C -> A edge closing a cycle, listed
/// terminal step first
///
/// Cycle breaking is one DFS in input order that follows dependencies, so
/// the order decides which edge of a cycle is cut. Starting from C the walk
/// is C, B, A and the first edge closing back onto the path is `A depends on
/// C`, the spurious one. Listed A, B, C the walk is A, C, B and the cut
/// lands on `B depends on A` instead.
pub fn terminal_first_chain_with_back_edge() -> Vec<Step> {
    vec![step("C", &["B"]), step("B", &["A"]), step("A", &["C"])]
}

/// Raw model output for an invoice approval process, with the usual defects:
/// a repeated step, a dangling dependency, a self-loop, a cycle, an
/// out-of-range score and a gap pointing at a missing step.
pub fn sample_model_output() -> String {
    serde_json::json!({
        "title": "Invoice approval",
        "steps": [
            {
                "id": "receive",
                "name": "Receive invoice",
                "description": "Invoice arrives by email",
                "owner": "AP clerk",
                "layer": "integration",
                "inputs": ["email"],
                "outputs": ["pdf"],
                "tools": ["Outlook"],
                "automationScore": 85,
                "dependencies": ["approve"]
            },
            {
                "id": "extract",
                "name": "Extract fields",
                "owner": "AP clerk",
                "layer": "ai_agent",
                "automationScore": 120.4,
                "dependencies": ["receive", "ocr"]
            },
            {
                "id": "approve",
                "name": "Manager approval",
                "owner": "Finance manager",
                "layer": "human",
                "automationScore": 10,
                "dependencies": ["extract", "approve"]
            },
            {
                "id": "extract",
                "name": "Duplicate extract",
                "layer": "ai_agent",
                "automationScore": 50
            }
        ],
        "gaps": [
            {
                "type": "single_dependency",
                "severity": "high",
                "stepIds": ["approve"],
                "description": "Only one manager can approve",
                "suggestion": "Add a delegate approver",
                "effort": "quick_win",
                "impactedRoles": ["Finance manager"]
            },
            {
                "type": "bottleneck",
                "severity": "medium",
                "stepIds": ["ocr"],
                "description": "OCR queue backs up",
                "suggestion": "Batch uploads"
            },
            {
                "type": "missing_feedback",
                "severity": "low",
                "stepIds": [],
                "description": "No review of rejected invoices",
                "suggestion": "Monthly rejection review"
            }
        ]
    })
    .to_string()
}

fn arb_layer() -> impl Strategy<Value = StepLayer> {
    prop::sample::select(StepLayer::ALL.to_vec())
}

fn arb_gap_type() -> impl Strategy<Value = GapType> {
    prop::sample::select(vec![
        GapType::Bottleneck,
        GapType::ContextLoss,
        GapType::SingleDependency,
        GapType::ManualOverhead,
        GapType::MissingFeedback,
        GapType::MissingFallback,
        GapType::ScopeAmbiguity,
    ])
}

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop::sample::select(vec![Severity::Low, Severity::Medium, Severity::High])
}

/// IDs drawn from a small pool so duplicates, self-loops and cycles are
/// common; `x` never names a step
fn arb_id() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e", "f", "g", "x"]).prop_map(String::from)
}

fn arb_owner() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec!["ana", "ben", "cy", " "]).prop_map(String::from))
}

/// Arbitrary, typically malformed, step lists
pub fn arb_steps(max_steps: usize) -> impl Strategy<Value = Vec<Step>> {
    let step = (
        arb_id(),
        arb_layer(),
        arb_owner(),
        -50.0f64..150.0,
        prop::collection::vec(arb_id(), 0..4),
    )
        .prop_map(|(id, layer, owner, score, dependencies)| {
            let mut step = Step::new(id.as_str(), id.to_uppercase(), layer)
                .with_automation_score(score);
            step.owner = owner;
            dependencies
                .iter()
                .fold(step, |step, dependency| step.depends_on(dependency.as_str()))
        });
    prop::collection::vec(step, 0..max_steps)
}

/// Arbitrary gaps referencing IDs from the same pool as [`arb_steps`]
pub fn arb_gaps(max_gaps: usize) -> impl Strategy<Value = Vec<Gap>> {
    let gap = (
        arb_gap_type(),
        arb_severity(),
        prop::collection::vec(arb_id(), 0..3),
    )
        .prop_map(|(gap_type, severity, ids)| {
            ids.iter().fold(
                Gap::new(gap_type, severity, "generated"),
                |gap, id| gap.on_step(id.as_str()),
            )
        });
    prop::collection::vec(gap, 0..max_gaps)
}
