use flowscope_graph::GraphRepair;
use flowscope_health::HealthScorer;
use flowscope_model::{Confidence, Gap, Step};
use flowscope_test_utils::{arb_gaps, arb_steps};
use proptest::prelude::*;

fn repaired(steps: Vec<Step>, gaps: Vec<Gap>) -> (Vec<Step>, Vec<Gap>) {
    let outcome = GraphRepair::new().repair(steps, gaps);
    (outcome.steps, outcome.gaps)
}

proptest! {
    #[test]
    fn prop_scores_within_bounds(
        steps in arb_steps(16),
        gaps in arb_gaps(8),
        team_size in proptest::option::of(0u32..100),
    ) {
        let (steps, gaps) = repaired(steps, gaps);
        let metrics = HealthScorer::new().score(&steps, &gaps, team_size);

        prop_assert!(metrics.complexity <= 100);
        prop_assert!(metrics.fragility <= 100);
        prop_assert!(metrics.automation_potential <= 100);
        prop_assert!(metrics.team_load_balance <= 100);
        prop_assert_eq!(metrics.team_size, team_size);
    }

    #[test]
    fn prop_medium_tier_matches_omitted_size(
        steps in arb_steps(16),
        gaps in arb_gaps(8),
        team_size in 6u32..=20,
    ) {
        let (steps, gaps) = repaired(steps, gaps);
        let scorer = HealthScorer::new();
        let omitted = scorer.score(&steps, &gaps, None);
        let explicit = scorer.score(&steps, &gaps, Some(team_size));

        prop_assert_eq!(omitted.complexity, explicit.complexity);
        prop_assert_eq!(omitted.fragility, explicit.fragility);
        prop_assert_eq!(omitted.automation_potential, explicit.automation_potential);
        prop_assert_eq!(omitted.team_load_balance, explicit.team_load_balance);
        prop_assert_eq!(omitted.confidence, Confidence::Inferred);
        prop_assert_eq!(explicit.confidence, Confidence::High);
    }

    #[test]
    fn prop_smaller_teams_never_less_fragile(steps in arb_steps(16), gaps in arb_gaps(8)) {
        let (steps, gaps) = repaired(steps, gaps);
        let scorer = HealthScorer::new();
        let solo = scorer.score(&steps, &gaps, Some(1)).fragility;
        let medium = scorer.score(&steps, &gaps, Some(10)).fragility;
        let large = scorer.score(&steps, &gaps, Some(50)).fragility;

        prop_assert!(solo >= medium);
        prop_assert!(medium >= large);
    }
}

#[test]
fn zero_steps_score_tier_baseline() {
    let scorer = HealthScorer::new();
    for (team_size, baseline) in [(Some(1), 40), (Some(4), 50), (None, 60), (Some(30), 70)] {
        let metrics = scorer.score(&[], &[], team_size);
        assert_eq!(metrics.complexity, 0);
        assert_eq!(metrics.fragility, 0);
        assert_eq!(metrics.automation_potential, 0);
        assert_eq!(metrics.team_load_balance, baseline);
    }
}
