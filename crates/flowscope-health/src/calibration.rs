//! Team calibration
//!
//! Maps a team size to a tier and a tier to the multipliers the scoring
//! engine applies. Omitting the team size selects [`TeamTier::Medium`], whose
//! multipliers leave the uncalibrated formulas unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Team size bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamTier {
    /// One person (or none)
    Solo,
    /// 2-5 people
    Small,
    /// 6-20 people
    Medium,
    /// 21 or more
    Large,
}

/// Multipliers selected by a tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationMultipliers {
    /// Scales the raw fragility sum
    pub fragility: f64,
    /// Reserved for gap-severity weighting of bottlenecks
    pub bottleneck: f64,
    /// Load balance score used when ownership says nothing better
    pub load_balance_baseline: u8,
}

impl TeamTier {
    /// Tier for an optional team size; `None` maps to `Medium`
    #[must_use]
    pub fn from_team_size(team_size: Option<u32>) -> Self {
        match team_size {
            None => TeamTier::Medium,
            Some(0..=1) => TeamTier::Solo,
            Some(2..=5) => TeamTier::Small,
            Some(6..=20) => TeamTier::Medium,
            Some(_) => TeamTier::Large,
        }
    }

    /// Multipliers for this tier
    #[must_use]
    pub fn multipliers(&self) -> CalibrationMultipliers {
        let (fragility, bottleneck, load_balance_baseline) = match self {
            TeamTier::Solo => (1.5, 1.5, 40),
            TeamTier::Small => (1.2, 1.25, 50),
            TeamTier::Medium => (1.0, 1.0, 60),
            TeamTier::Large => (0.9, 0.8, 70),
        };
        CalibrationMultipliers {
            fragility,
            bottleneck,
            load_balance_baseline,
        }
    }
}

impl fmt::Display for TeamTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TeamTier::Solo => "solo",
            TeamTier::Small => "small",
            TeamTier::Medium => "medium",
            TeamTier::Large => "large",
        };
        f.write_str(name)
    }
}

/// Multipliers for an optional team size
#[inline]
#[must_use]
pub fn calibrate(team_size: Option<u32>) -> CalibrationMultipliers {
    TeamTier::from_team_size(team_size).multipliers()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(TeamTier::from_team_size(Some(0)), TeamTier::Solo);
        assert_eq!(TeamTier::from_team_size(Some(1)), TeamTier::Solo);
        assert_eq!(TeamTier::from_team_size(Some(2)), TeamTier::Small);
        assert_eq!(TeamTier::from_team_size(Some(5)), TeamTier::Small);
        assert_eq!(TeamTier::from_team_size(Some(6)), TeamTier::Medium);
        assert_eq!(TeamTier::from_team_size(Some(20)), TeamTier::Medium);
        assert_eq!(TeamTier::from_team_size(Some(21)), TeamTier::Large);
        assert_eq!(TeamTier::from_team_size(Some(5000)), TeamTier::Large);
    }

    #[test]
    fn absent_team_size_is_medium() {
        assert_eq!(TeamTier::from_team_size(None), TeamTier::Medium);
        assert_eq!(calibrate(None), calibrate(Some(12)));
    }

    #[test]
    fn medium_multipliers_are_neutral() {
        let m = TeamTier::Medium.multipliers();
        assert_eq!(m.fragility, 1.0);
        assert_eq!(m.bottleneck, 1.0);
        assert_eq!(m.load_balance_baseline, 60);
    }

    #[test]
    fn smaller_teams_are_more_fragile() {
        let solo = TeamTier::Solo.multipliers();
        let large = TeamTier::Large.multipliers();
        assert!(solo.fragility > large.fragility);
        assert!(solo.load_balance_baseline < large.load_balance_baseline);
    }
}
