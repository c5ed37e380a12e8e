//! Health scoring engine
//!
//! Derives four 0-100 scores from a repaired decomposition:
//!
//! | Metric | Formula |
//! |--------|---------|
//! | complexity | `min(100, steps*6 + edges*3 + layers*5)` |
//! | fragility | `min(100, round((high*20 + medium*10 + single_dependency*15 + low_automation*5) * m))` |
//! | automation potential | `round(mean(automation_score))` |
//! | team load balance | ownership spread, see [`team_load_balance`] |
//!
//! Scoring never fails; an empty graph scores 0 everywhere except load
//! balance, which falls back to the tier baseline.

use crate::calibration::TeamTier;
use flowscope_model::{Confidence, Gap, GapType, HealthMetrics, Severity, Step};
use std::collections::{HashMap, HashSet};

/// Reason attached to [`Confidence::High`]
pub const EXPLICIT_TEAM_SIZE_REASON: &str = "team size explicitly provided";
/// Reason attached to [`Confidence::Inferred`]
pub const INFERRED_TEAM_SIZE_REASON: &str = "no team size specified; using medium-team defaults";

/// Steps scoring below this count as low automation for fragility
pub const LOW_AUTOMATION_THRESHOLD: f64 = 30.0;

/// Health scoring engine
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthScorer;

impl HealthScorer {
    /// Create new scorer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score a repaired step/gap list, calibrated for `team_size`
    #[must_use]
    pub fn score(&self, steps: &[Step], gaps: &[Gap], team_size: Option<u32>) -> HealthMetrics {
        let tier = TeamTier::from_team_size(team_size);
        let multipliers = tier.multipliers();

        let (confidence, reason) = match team_size {
            Some(_) => (Confidence::High, EXPLICIT_TEAM_SIZE_REASON),
            None => (Confidence::Inferred, INFERRED_TEAM_SIZE_REASON),
        };

        let metrics = HealthMetrics {
            complexity: complexity(steps),
            fragility: fragility(steps, gaps, multipliers.fragility),
            automation_potential: automation_potential(steps),
            team_load_balance: team_load_balance(steps, multipliers.load_balance_baseline),
            team_size,
            confidence,
            confidence_reason: reason.to_string(),
        };

        tracing::debug!(
            %tier,
            complexity = metrics.complexity,
            fragility = metrics.fragility,
            automation = metrics.automation_potential,
            load_balance = metrics.team_load_balance,
            "Scored decomposition"
        );

        metrics
    }
}

/// Round and clamp into a 0-100 score
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

fn capped(value: usize) -> u8 {
    u8::try_from(value.min(100)).unwrap_or(100)
}

/// Step count dominates, edge density contributes less, layer diversity
/// least
#[must_use]
pub fn complexity(steps: &[Step]) -> u8 {
    let edges: usize = steps.iter().map(|step| step.dependencies.len()).sum();
    let layers: HashSet<_> = steps.iter().map(|step| step.layer).collect();
    capped(steps.len() * 6 + edges * 3 + layers.len() * 5)
}

/// Weighted gap and low-automation count, scaled by the tier multiplier
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fragility(steps: &[Step], gaps: &[Gap], multiplier: f64) -> u8 {
    let high = gaps.iter().filter(|g| g.severity == Severity::High).count();
    let medium = gaps.iter().filter(|g| g.severity == Severity::Medium).count();
    let single_dependency = gaps
        .iter()
        .filter(|g| g.gap_type == GapType::SingleDependency)
        .count();
    let low_automation = steps
        .iter()
        .filter(|s| s.automation_score < LOW_AUTOMATION_THRESHOLD)
        .count();

    let raw = high * 20 + medium * 10 + single_dependency * 15 + low_automation * 5;
    to_score(raw as f64 * multiplier)
}

/// Mean automation score, 0 for no steps
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn automation_potential(steps: &[Step]) -> u8 {
    if steps.is_empty() {
        return 0;
    }
    let total: f64 = steps.iter().map(|step| step.automation_score).sum();
    to_score(total / steps.len() as f64)
}

/// Ownership balance
///
/// - nobody owns anything: `baseline`
/// - one owner for every owned step: `min(baseline, round(100 / owned))`
/// - otherwise: `clamp(round(100 - ((max - min) / mean) * 25), 0, 100)` over
///   per-owner step counts
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn team_load_balance(steps: &[Step], baseline: u8) -> u8 {
    let mut per_owner: HashMap<&str, usize> = HashMap::new();
    for owner in steps.iter().filter_map(Step::effective_owner) {
        *per_owner.entry(owner).or_default() += 1;
    }

    let owned: usize = per_owner.values().sum();
    match per_owner.len() {
        0 => baseline,
        1 => baseline.min(to_score(100.0 / owned as f64)),
        owners => {
            let max = per_owner.values().copied().max().unwrap_or(0) as f64;
            let min = per_owner.values().copied().min().unwrap_or(0) as f64;
            let mean = owned as f64 / owners as f64;
            to_score(100.0 - ((max - min) / mean) * 25.0)
        }
    }
}
