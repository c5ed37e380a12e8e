use flowscope_graph::{dag, Edge, GraphRepair, LayoutEngine};
use flowscope_model::{GapType, Severity, StepId};
use flowscope_test_utils::{arb_gaps, arb_steps, terminal_first_chain_with_back_edge, gap, step};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

proptest::proptest! {
    #[test]
    fn prop_repaired_graph_is_acyclic(steps in arb_steps(12), gaps in arb_gaps(6)) {
        let outcome = GraphRepair::new().repair(steps, gaps);
        proptest::prop_assert!(dag::is_acyclic(&outcome.steps));
        proptest::prop_assert!(dag::topological_order(&outcome.steps).is_some());
    }

    #[test]
    fn prop_repaired_references_are_closed(steps in arb_steps(12), gaps in arb_gaps(6)) {
        let outcome = GraphRepair::new().repair(steps, gaps);
        let known: HashSet<&StepId> = outcome.steps.iter().map(|s| &s.id).collect();

        proptest::prop_assert_eq!(known.len(), outcome.steps.len());
        for step in &outcome.steps {
            let unique: HashSet<&StepId> = step.dependencies.iter().collect();
            proptest::prop_assert_eq!(unique.len(), step.dependencies.len());
            proptest::prop_assert!(!step.dependencies.contains(&step.id));
            for dependency in &step.dependencies {
                proptest::prop_assert!(known.contains(dependency));
            }
            proptest::prop_assert!((0.0..=100.0).contains(&step.automation_score));
            proptest::prop_assert_eq!(step.automation_score, step.automation_score.round());
        }
        for gap in &outcome.gaps {
            proptest::prop_assert!(!gap.step_ids.is_empty() || gap.gap_type.is_system_level());
            for id in &gap.step_ids {
                proptest::prop_assert!(known.contains(id));
            }
        }
    }

    #[test]
    fn prop_repair_is_idempotent(steps in arb_steps(12), gaps in arb_gaps(6)) {
        let repair = GraphRepair::new();
        let first = repair.repair(steps, gaps);
        let second = repair.repair(first.steps.clone(), first.gaps.clone());

        proptest::prop_assert_eq!(&second.steps, &first.steps);
        proptest::prop_assert_eq!(&second.gaps, &first.gaps);
        proptest::prop_assert!(second.report.is_clean());
    }

    #[test]
    fn prop_layout_is_total(steps in arb_steps(12)) {
        let repaired = GraphRepair::new().repair(steps, vec![]).steps;
        let layout = LayoutEngine::default().layout(&repaired);

        proptest::prop_assert_eq!(layout.nodes.len(), repaired.len());
        proptest::prop_assert_eq!(layout.critical_path.is_empty(), repaired.is_empty());

        // Every edge points strictly downward
        for edge in &layout.edges {
            let source = layout.node(edge.source.as_str()).map(|n| n.depth);
            let target = layout.node(edge.target.as_str()).map(|n| n.depth);
            proptest::prop_assert!(source < target);
        }

        // The critical path is a dependency chain, root first
        for pair in layout.critical_path.windows(2) {
            let dependent = repaired.iter().find(|s| s.id == pair[1]);
            proptest::prop_assert!(dependent.is_some_and(|s| s.dependencies.contains(&pair[0])));
        }
    }
}

#[test]
fn spurious_back_edge_is_removed() {
    let outcome = GraphRepair::new().repair(terminal_first_chain_with_back_edge(), vec![]);

    assert_eq!(
        outcome.report.broken_cycles,
        vec![Edge {
            from: StepId::new("A"),
            to: StepId::new("C"),
        }]
    );

    let layout = LayoutEngine::default().layout(&outcome.steps);
    let path: Vec<&str> = layout.critical_path.iter().map(StepId::as_str).collect();
    assert_eq!(path, vec!["A", "B", "C"]);

    let depths: Vec<(&str, usize)> = ["A", "B", "C"]
        .into_iter()
        .filter_map(|id| layout.node(id).map(|node| (id, node.depth)))
        .collect();
    assert_eq!(depths, vec![("A", 0), ("B", 1), ("C", 2)]);
    assert!(layout.edges.iter().all(|edge| edge.critical));
}

#[test]
fn input_order_decides_which_cycle_edge_is_cut() {
    let mut steps = terminal_first_chain_with_back_edge();
    steps.reverse();
    let outcome = GraphRepair::new().repair(steps, vec![]);

    assert_eq!(
        outcome.report.broken_cycles,
        vec![Edge {
            from: StepId::new("B"),
            to: StepId::new("A"),
        }]
    );
    let layout = LayoutEngine::default().layout(&outcome.steps);
    let path: Vec<&str> = layout.critical_path.iter().map(StepId::as_str).collect();
    assert_eq!(path, vec!["B", "C", "A"]);
}

#[test]
fn orphaned_single_dependency_gap_is_dropped() {
    let gaps = vec![gap(GapType::SingleDependency, Severity::High, &["ghost"])];
    let outcome = GraphRepair::new().repair(vec![step("a", &[])], gaps);

    assert!(outcome.gaps.is_empty());
    assert_eq!(outcome.report.dropped_gaps, vec![GapType::SingleDependency]);
}

#[test]
fn graph_without_edges_lays_out_one_row() {
    let steps = vec![step("a", &[]), step("b", &[]), step("c", &[])];
    let layout = LayoutEngine::default().layout(&steps);

    assert_eq!(layout.nodes.len(), 3);
    assert!(layout.nodes.iter().all(|node| node.depth == 0));
    assert_eq!(layout.critical_path, vec![StepId::new("a")]);
}
