//! Process steps
//!
//! A [`Step`] is one node of a decomposed process graph. Its
//! `dependencies` point at prerequisite steps, so edges run from a step to
//! the work it waits on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Step identifier, unique within one decomposition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub String);

impl StepId {
    /// Create step ID from any string-like value
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StepId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for StepId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Kind of work a step represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepLayer {
    /// Automated reasoning (model or rules engine does the thinking)
    AiAgent,
    /// Routing and coordination between other steps
    Orchestration,
    /// Memory and context handling (lookups, notes, knowledge bases)
    Memory,
    /// Human-in-the-loop work
    Human,
    /// Call into an external system
    Integration,
}

impl StepLayer {
    /// All layers, in declaration order
    pub const ALL: [StepLayer; 5] = [
        StepLayer::AiAgent,
        StepLayer::Orchestration,
        StepLayer::Memory,
        StepLayer::Human,
        StepLayer::Integration,
    ];

    /// Wire name of the layer
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StepLayer::AiAgent => "ai_agent",
            StepLayer::Orchestration => "orchestration",
            StepLayer::Memory => "memory",
            StepLayer::Human => "human",
            StepLayer::Integration => "integration",
        }
    }
}

impl fmt::Display for StepLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single step of a decomposed process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Identifier, unique within the decomposition
    pub id: StepId,
    /// Display name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Person or role responsible, if known
    #[serde(default)]
    pub owner: Option<String>,
    /// Kind of work
    pub layer: StepLayer,
    /// Named inputs
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Named outputs
    #[serde(default)]
    pub outputs: Vec<String>,
    /// Tools used
    #[serde(default)]
    pub tools: Vec<String>,
    /// Automation affinity, 0-100 (integral once repaired)
    pub automation_score: f64,
    /// Prerequisite step IDs
    #[serde(default)]
    pub dependencies: Vec<StepId>,
}

impl Step {
    /// Create a step with empty description, no owner and no edges
    #[must_use]
    pub fn new(id: impl Into<StepId>, name: impl Into<String>, layer: StepLayer) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            owner: None,
            layer,
            inputs: Vec::new(),
            outputs: Vec::new(),
            tools: Vec::new(),
            automation_score: 0.0,
            dependencies: Vec::new(),
        }
    }

    /// With owner
    #[inline]
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// With automation score
    #[inline]
    #[must_use]
    pub fn with_automation_score(mut self, score: f64) -> Self {
        self.automation_score = score;
        self
    }

    /// Add a dependency on another step
    #[inline]
    #[must_use]
    pub fn depends_on(mut self, id: impl Into<StepId>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    /// Owner with surrounding whitespace removed; blank owners count as none
    #[must_use]
    pub fn effective_owner(&self) -> Option<&str> {
        self.owner
            .as_deref()
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
    }
}
