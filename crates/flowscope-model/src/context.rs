//! Caller-supplied context accompanying a process description

use serde::{Deserialize, Serialize};

/// A stage of a semi-structured process description
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    /// Stage name
    pub name: String,
    /// Role or person responsible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Tools used in the stage
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
}

impl Stage {
    /// Create a stage with just a name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            tools: Vec::new(),
        }
    }

    /// Set the stage owner
    #[inline]
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// Team and cost figures
///
/// Only `team_size` shapes the analysis; the rate fields feed downstream
/// cost estimates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostContext {
    /// Number of people running the process
    #[serde(default)]
    pub team_size: Option<u32>,
    /// Loaded hourly cost
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    /// Average hours spent per step
    #[serde(default)]
    pub hours_per_step: Option<f64>,
}

impl CostContext {
    /// Context carrying only a team size
    #[inline]
    #[must_use]
    pub fn for_team(team_size: u32) -> Self {
        Self {
            team_size: Some(team_size),
            ..Self::default()
        }
    }
}
