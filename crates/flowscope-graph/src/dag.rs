//! DAG checks over step dependency graphs
//!
//! Independent of the repair pipeline: these build a `petgraph` view of the
//! steps and let it answer ordering questions, so repaired output can be
//! verified against a second implementation.

use flowscope_model::{Step, StepId};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graphmap::DiGraphMap;

/// Build the dependency graph with edges running prerequisite -> dependent
///
/// Dependencies naming unknown steps are ignored.
#[must_use]
pub fn dependency_graph(steps: &[Step]) -> DiGraphMap<&str, ()> {
    let mut graph = DiGraphMap::new();
    for step in steps {
        graph.add_node(step.id.as_str());
    }
    for step in steps {
        for dependency in &step.dependencies {
            if graph.contains_node(dependency.as_str()) {
                graph.add_edge(dependency.as_str(), step.id.as_str(), ());
            }
        }
    }
    graph
}

/// Topological order of step IDs, prerequisites first
///
/// Returns `None` when the dependency relation contains a cycle.
#[must_use]
pub fn topological_order(steps: &[Step]) -> Option<Vec<StepId>> {
    let graph = dependency_graph(steps);
    toposort(&graph, None)
        .ok()
        .map(|order| order.into_iter().map(StepId::from).collect())
}

/// Whether no step can reach itself through dependencies
#[must_use]
pub fn is_acyclic(steps: &[Step]) -> bool {
    !is_cyclic_directed(&dependency_graph(steps))
}
