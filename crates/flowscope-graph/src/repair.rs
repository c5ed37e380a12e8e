//! Graph repair pipeline
//!
//! Converts a schema-valid but structurally unsafe step/gap list, as emitted
//! by the decomposition model, into a DAG. Repair never fails: every defect
//! is fixed in place and recorded in a [`RepairReport`].
//!
//! Passes run in a fixed order, each relying on the invariants established
//! by the ones before it:
//!
//! 1. Deduplicate steps by ID (first occurrence wins)
//! 2. Drop dangling, self-referencing and repeated dependency IDs
//! 3. Drop gap references to unknown steps
//! 4. Drop gaps left without steps, unless system-level
//! 5. Remove back-edges found by a single DFS pass
//! 6. Clamp and round automation scores

use flowscope_model::{Gap, GapType, Step, StepId};
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A dependency edge: `from` depends on `to`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    /// Dependent step
    pub from: StepId,
    /// Dependency it named
    pub to: StepId,
}

impl Edge {
    fn new(from: &StepId, to: &StepId) -> Self {
        Self {
            from: from.clone(),
            to: to.clone(),
        }
    }
}

/// Why a dependency edge was dropped before cycle breaking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDefect {
    /// Target step does not exist
    Dangling,
    /// Step depends on itself
    SelfLoop,
    /// Same dependency listed more than once
    Repeated,
}

/// Record of everything the pipeline changed
///
/// Purely diagnostic: the repaired graph is identical whether or not the
/// report is inspected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    /// IDs of discarded duplicate steps, once per discarded copy
    pub duplicate_steps: Vec<StepId>,
    /// Dependency edges dropped by referential repair
    pub dropped_edges: Vec<(Edge, EdgeDefect)>,
    /// Gap step references dropped because the step does not exist
    pub dropped_gap_references: Vec<StepId>,
    /// Types of gaps dropped for having no remaining step
    pub dropped_gaps: Vec<GapType>,
    /// Back-edges removed to break cycles
    pub broken_cycles: Vec<Edge>,
    /// Steps whose automation score was clamped or rounded
    pub adjusted_scores: Vec<StepId>,
}

impl RepairReport {
    /// True when the input was already a valid DAG
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.duplicate_steps.is_empty()
            && self.dropped_edges.is_empty()
            && self.dropped_gap_references.is_empty()
            && self.dropped_gaps.is_empty()
            && self.broken_cycles.is_empty()
            && self.adjusted_scores.is_empty()
    }

    /// Total number of individual repairs
    #[must_use]
    pub fn repair_count(&self) -> usize {
        self.duplicate_steps.len()
            + self.dropped_edges.len()
            + self.dropped_gap_references.len()
            + self.dropped_gaps.len()
            + self.broken_cycles.len()
            + self.adjusted_scores.len()
    }
}

/// Repaired steps and gaps, plus what was changed
#[derive(Debug, Clone, PartialEq)]
pub struct RepairOutcome {
    /// Repaired steps, acyclic and referentially closed
    pub steps: Vec<Step>,
    /// Gaps that still reference known steps
    pub gaps: Vec<Gap>,
    /// Every change repair made
    pub report: RepairReport,
}

/// Graph repair pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphRepair;

impl GraphRepair {
    /// Create new repair pipeline
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Repair steps and gaps into a valid DAG
    ///
    /// Never fails. Running it on its own output changes nothing.
    #[must_use]
    pub fn repair(&self, steps: Vec<Step>, gaps: Vec<Gap>) -> RepairOutcome {
        let mut report = RepairReport::default();

        let mut steps = dedupe_steps(steps, &mut report);
        let known: HashSet<StepId> = steps.iter().map(|step| step.id.clone()).collect();

        repair_dependencies(&mut steps, &known, &mut report);
        let gaps = repair_gaps(gaps, &known, &mut report);
        break_cycles(&mut steps, &mut report);
        clamp_scores(&mut steps, &mut report);

        if report.is_clean() {
            tracing::debug!("Graph repair: {} steps, no defects", steps.len());
        } else {
            tracing::warn!(
                duplicates = report.duplicate_steps.len(),
                dropped_edges = report.dropped_edges.len(),
                dropped_gaps = report.dropped_gaps.len(),
                broken_cycles = report.broken_cycles.len(),
                "Graph repair fixed {} defects",
                report.repair_count()
            );
        }

        RepairOutcome {
            steps,
            gaps,
            report,
        }
    }
}

fn dedupe_steps(steps: Vec<Step>, report: &mut RepairReport) -> Vec<Step> {
    let mut by_id: IndexMap<StepId, Step> = IndexMap::with_capacity(steps.len());
    for step in steps {
        match by_id.entry(step.id.clone()) {
            Entry::Occupied(_) => report.duplicate_steps.push(step.id),
            Entry::Vacant(slot) => {
                slot.insert(step);
            }
        }
    }
    by_id.into_values().collect()
}

fn repair_dependencies(steps: &mut [Step], known: &HashSet<StepId>, report: &mut RepairReport) {
    for step in steps.iter_mut() {
        let dependencies = std::mem::take(&mut step.dependencies);
        let mut seen = HashSet::with_capacity(dependencies.len());

        for dependency in dependencies {
            let defect = if dependency == step.id {
                Some(EdgeDefect::SelfLoop)
            } else if !known.contains(&dependency) {
                Some(EdgeDefect::Dangling)
            } else if !seen.insert(dependency.clone()) {
                Some(EdgeDefect::Repeated)
            } else {
                None
            };

            match defect {
                Some(defect) => report
                    .dropped_edges
                    .push((Edge::new(&step.id, &dependency), defect)),
                None => step.dependencies.push(dependency),
            }
        }
    }
}

fn repair_gaps(gaps: Vec<Gap>, known: &HashSet<StepId>, report: &mut RepairReport) -> Vec<Gap> {
    gaps.into_iter()
        .filter_map(|mut gap| {
            let references = std::mem::take(&mut gap.step_ids);
            let mut seen = HashSet::with_capacity(references.len());

            for id in references {
                if !known.contains(&id) {
                    report.dropped_gap_references.push(id);
                } else if seen.insert(id.clone()) {
                    gap.step_ids.push(id);
                }
            }

            if gap.step_ids.is_empty() && !gap.gap_type.is_system_level() {
                report.dropped_gaps.push(gap.gap_type);
                None
            } else {
                Some(gap)
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    OnStack,
    Done,
}

/// Find back-edges with one DFS pass over all steps in input order
///
/// Uses an explicit work stack; each frame is `(step index, next dependency
/// position)`. Returned pairs are `(source index, dependency index)`.
fn find_back_edges(adjacency: &[Vec<usize>]) -> Vec<(usize, usize)> {
    let mut state = vec![Visit::Unvisited; adjacency.len()];
    let mut back_edges = Vec::new();
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..adjacency.len() {
        if state[root] != Visit::Unvisited {
            continue;
        }
        state[root] = Visit::OnStack;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            if let Some(&dependency) = adjacency[node].get(frame.1) {
                frame.1 += 1;
                match state[dependency] {
                    Visit::OnStack => back_edges.push((node, dependency)),
                    Visit::Unvisited => {
                        state[dependency] = Visit::OnStack;
                        stack.push((dependency, 0));
                    }
                    Visit::Done => {}
                }
            } else {
                state[node] = Visit::Done;
                stack.pop();
            }
        }
    }

    back_edges
}

fn break_cycles(steps: &mut [Step], report: &mut RepairReport) {
    let index: HashMap<&StepId, usize> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| (&step.id, i))
        .collect();
    let adjacency: Vec<Vec<usize>> = steps
        .iter()
        .map(|step| {
            step.dependencies
                .iter()
                .filter_map(|dependency| index.get(dependency).copied())
                .collect()
        })
        .collect();

    let back_edges = find_back_edges(&adjacency);
    if back_edges.is_empty() {
        return;
    }

    let mut removals: HashMap<usize, HashSet<StepId>> = HashMap::new();
    for (source, target) in back_edges {
        let edge = Edge::new(&steps[source].id, &steps[target].id);
        removals.entry(source).or_default().insert(edge.to.clone());
        report.broken_cycles.push(edge);
    }

    for (source, targets) in removals {
        steps[source]
            .dependencies
            .retain(|dependency| !targets.contains(dependency));
    }
}

#[allow(clippy::float_cmp)]
fn clamp_scores(steps: &mut [Step], report: &mut RepairReport) {
    for step in steps.iter_mut() {
        let original = step.automation_score;
        let clamped = if original.is_finite() {
            original.clamp(0.0, 100.0).round()
        } else {
            0.0
        };
        if clamped != original {
            step.automation_score = clamped;
            report.adjusted_scores.push(step.id.clone());
        }
    }
}
