//! Decompositions and their derived health metrics

use crate::gap::Gap;
use crate::step::Step;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique decomposition identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecompositionId(pub Ulid);

impl DecompositionId {
    /// Generate new decomposition ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for DecompositionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DecompositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DecompositionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// How much the health metrics can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Team size was supplied by the caller
    High,
    /// Medium-team defaults were assumed
    Inferred,
}

/// Calibrated 0-100 health scores for a decomposition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    /// Size and branching of the graph
    pub complexity: u8,
    /// Exposure to single points of failure
    pub fragility: u8,
    /// Mean automation score
    pub automation_potential: u8,
    /// Evenness of step ownership
    pub team_load_balance: u8,
    /// Team size used for calibration
    #[serde(default)]
    pub team_size: Option<u32>,
    /// Whether the team size was given
    pub confidence: Confidence,
    /// Why `confidence` has its value
    pub confidence_reason: String,
}

/// A repaired and scored process graph
///
/// Created once per repair and scoring cycle and never mutated afterwards.
/// Re-analysis produces a new value pointing back through `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decomposition {
    /// Unique, sortable ID
    pub id: DecompositionId,
    /// Process title
    pub title: String,
    /// Steps in input order; always an acyclic graph
    pub steps: Vec<Step>,
    /// Gaps referencing known steps or the whole process
    pub gaps: Vec<Gap>,
    /// Scores computed after repair
    pub health: HealthMetrics,
    /// Decomposition this one re-analyzed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<DecompositionId>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Decomposition {
    /// Create a new root decomposition
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        steps: Vec<Step>,
        gaps: Vec<Gap>,
        health: HealthMetrics,
    ) -> Self {
        Self {
            id: DecompositionId::new(),
            title: title.into(),
            steps,
            gaps,
            health,
            parent_id: None,
            created_at: Utc::now(),
        }
    }

    /// New decomposition re-analyzing this one
    ///
    /// The child gets a fresh ID and points back here through `parent_id`;
    /// `self` is left untouched.
    #[must_use]
    pub fn derive_child(
        &self,
        title: impl Into<String>,
        steps: Vec<Step>,
        gaps: Vec<Gap>,
        health: HealthMetrics,
    ) -> Self {
        Self {
            parent_id: Some(self.id),
            ..Self::new(title, steps, gaps, health)
        }
    }

    /// Look up a step by ID
    #[must_use]
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.id.as_str() == id)
    }

    /// Total number of dependency edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.steps.iter().map(|step| step.dependencies.len()).sum()
    }
}
