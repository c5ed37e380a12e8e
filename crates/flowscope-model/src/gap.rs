//! Gaps: deficiencies annotated over one or more steps

use crate::step::StepId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of deficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    /// Work piles up waiting on this step
    Bottleneck,
    /// Information is dropped between steps
    ContextLoss,
    /// Only one person can perform the step
    SingleDependency,
    /// Repetitive manual effort
    ManualOverhead,
    /// No loop back to learn from outcomes
    MissingFeedback,
    /// No fallback when the step fails
    MissingFallback,
    /// Unclear boundaries of the process
    ScopeAmbiguity,
}

impl GapType {
    /// Whether the gap may describe the workflow as a whole, with no step
    /// attached
    #[inline]
    #[must_use]
    pub fn is_system_level(&self) -> bool {
        matches!(self, GapType::MissingFeedback | GapType::ScopeAmbiguity)
    }

    /// Wire name of the gap type
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GapType::Bottleneck => "bottleneck",
            GapType::ContextLoss => "context_loss",
            GapType::SingleDependency => "single_dependency",
            GapType::ManualOverhead => "manual_overhead",
            GapType::MissingFeedback => "missing_feedback",
            GapType::MissingFallback => "missing_fallback",
            GapType::ScopeAmbiguity => "scope_ambiguity",
        }
    }
}

impl fmt::Display for GapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gap severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Minor friction
    Low,
    /// Noticeable delay or rework
    Medium,
    /// Blocks the process or risks errors
    High,
}

/// Rough effort needed to close a gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effort {
    /// Hours to days
    QuickWin,
    /// Weeks
    Moderate,
    /// A project in its own right
    Significant,
}

/// A deficiency annotated over steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    /// Kind of deficiency
    #[serde(rename = "type")]
    pub gap_type: GapType,
    /// Severity
    pub severity: Severity,
    /// Steps this gap concerns (empty only for system-level types)
    #[serde(default)]
    pub step_ids: Vec<StepId>,
    /// What is wrong
    pub description: String,
    /// What to do about it
    #[serde(default)]
    pub suggestion: String,
    /// Estimated time lost, free text (e.g. "3h/week")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_waste: Option<String>,
    /// Effort to fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<Effort>,
    /// Roles affected
    #[serde(default)]
    pub impacted_roles: Vec<String>,
}

impl Gap {
    /// Create a gap with no step references
    #[must_use]
    pub fn new(gap_type: GapType, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            gap_type,
            severity,
            step_ids: Vec::new(),
            description: description.into(),
            suggestion: String::new(),
            time_waste: None,
            effort: None,
            impacted_roles: Vec::new(),
        }
    }

    /// Attach to a step
    #[inline]
    #[must_use]
    pub fn on_step(mut self, id: impl Into<StepId>) -> Self {
        self.step_ids.push(id.into());
        self
    }
}
