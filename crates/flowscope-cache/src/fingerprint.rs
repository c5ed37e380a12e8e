//! Request fingerprints
//!
//! A [`Fingerprint`] is a 128-bit BLAKE3 prefix over the five inputs that
//! determine an analysis result:
//!
//! 1. description, trimmed, whitespace runs collapsed, lowercased
//! 2. stage list as JSON (empty when absent)
//! 3. team size (hourly rate and hours per step are excluded)
//! 4. prompt version
//! 5. model identifier
//!
//! Each field is fed to the hasher behind its little-endian `u64` byte
//! length, so no field value can spill into its neighbour.

use crate::error::FingerprintError;
use flowscope_model::{CostContext, Stage};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Fingerprint length in bytes (32 hex characters)
pub const FINGERPRINT_LEN: usize = 16;

/// Cache key derived from normalized request inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Wrap raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    /// Underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Create fingerprint from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly [`FINGERPRINT_LEN`]
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FingerprintError> {
        let bytes: [u8; FINGERPRINT_LEN] =
            bytes
                .try_into()
                .map_err(|_| FingerprintError::InvalidLength {
                    expected: FINGERPRINT_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(bytes))
    }

    /// Fingerprint a request
    ///
    /// # Errors
    /// Returns error if the stage list cannot be serialized
    pub fn compute(input: &FingerprintInput<'_>) -> Result<Self, FingerprintError> {
        let stages = match input.stages {
            Some(stages) => serde_json::to_string(stages)?,
            None => String::new(),
        };
        let team_size = input
            .cost
            .and_then(|cost| cost.team_size)
            .map(|size| size.to_string())
            .unwrap_or_default();

        let mut hasher = blake3::Hasher::new();
        for field in [
            normalize_description(input.description).as_str(),
            stages.as_str(),
            team_size.as_str(),
            input.prompt_version,
            input.model_id,
        ] {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        Self::from_slice(&hasher.finalize().as_bytes()[..FINGERPRINT_LEN])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl serde::Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

/// Inputs hashed into a [`Fingerprint`]
#[derive(Debug, Clone, Copy)]
pub struct FingerprintInput<'a> {
    /// Raw description; normalized before hashing
    pub description: &'a str,
    /// Structured stages, if the request carried any
    pub stages: Option<&'a [Stage]>,
    /// Only `team_size` is hashed
    pub cost: Option<&'a CostContext>,
    /// Prompt template version
    pub prompt_version: &'a str,
    /// Model identifier
    pub model_id: &'a str,
}

impl<'a> FingerprintInput<'a> {
    /// Input with no stages and no cost context
    #[inline]
    #[must_use]
    pub fn new(description: &'a str, prompt_version: &'a str, model_id: &'a str) -> Self {
        Self {
            description,
            stages: None,
            cost: None,
            prompt_version,
            model_id,
        }
    }

    /// Attach a stage list
    #[inline]
    #[must_use]
    pub fn with_stages(mut self, stages: &'a [Stage]) -> Self {
        self.stages = Some(stages);
        self
    }

    /// Attach cost context
    #[inline]
    #[must_use]
    pub fn with_cost(mut self, cost: &'a CostContext) -> Self {
        self.cost = Some(cost);
        self
    }
}

/// Trim, collapse internal whitespace to single spaces and lowercase
#[must_use]
pub fn normalize_description(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fingerprint(input: FingerprintInput<'_>) -> Fingerprint {
        Fingerprint::compute(&input).unwrap()
    }

    #[test]
    fn normalization() {
        assert_eq!(
            normalize_description("  Invoice\tApproval \n\n FLOW "),
            "invoice approval flow"
        );
        assert_eq!(normalize_description(""), "");
    }

    #[test]
    fn case_and_whitespace_do_not_matter() {
        let a = fingerprint(FingerprintInput::new("Approve  invoices", "v3", "m1"));
        let b = fingerprint(FingerprintInput::new("  approve invoices\n", "v3", "m1"));
        assert_eq!(a, b);
    }

    #[test]
    fn rates_do_not_matter() {
        let cheap = CostContext {
            team_size: Some(4),
            hourly_rate: Some(20.0),
            hours_per_step: Some(1.0),
        };
        let pricey = CostContext {
            team_size: Some(4),
            hourly_rate: Some(200.0),
            hours_per_step: None,
        };
        let base = FingerprintInput::new("approve invoices", "v3", "m1");
        assert_eq!(
            fingerprint(base.with_cost(&cheap)),
            fingerprint(base.with_cost(&pricey))
        );
    }

    #[test]
    fn each_input_changes_fingerprint() {
        let stages = vec![Stage::new("Intake")];
        let other_stages = vec![Stage::new("Intake").with_owner("AP")];
        let team = CostContext::for_team(4);
        let other_team = CostContext::for_team(5);

        let base = FingerprintInput::new("approve invoices", "v3", "m1")
            .with_stages(&stages)
            .with_cost(&team);
        let reference = fingerprint(base);

        let variants = [
            FingerprintInput {
                description: "approve receipts",
                ..base
            },
            base.with_stages(&other_stages),
            FingerprintInput { stages: None, ..base },
            base.with_cost(&other_team),
            FingerprintInput { cost: None, ..base },
            FingerprintInput {
                prompt_version: "v4",
                ..base
            },
            FingerprintInput {
                model_id: "m2",
                ..base
            },
        ];
        for variant in variants {
            assert_ne!(fingerprint(variant), reference, "{variant:?}");
        }
    }

    #[test]
    fn field_boundaries_are_unambiguous() {
        let no_stages: Vec<Stage> = Vec::new();
        let smuggled = fingerprint(FingerprintInput::new("x|[]", "v", "m"));
        let split = fingerprint(FingerprintInput::new("x", "v", "m").with_stages(&no_stages));
        assert_ne!(smuggled, split);

        let shifted = fingerprint(FingerprintInput::new("x", "v|m", ""));
        assert_ne!(shifted, fingerprint(FingerprintInput::new("x", "v", "m")));
    }

    #[test]
    fn hex_round_trip() {
        let fp = fingerprint(FingerprintInput::new("x", "v1", "m1"));
        let text = fp.to_string();
        assert_eq!(text.len(), FINGERPRINT_LEN * 2);
        assert_eq!(text.parse::<Fingerprint>().unwrap(), fp);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(matches!(
            "abcd".parse::<Fingerprint>(),
            Err(FingerprintError::InvalidLength { actual: 2, .. })
        ));
        assert!(matches!(
            "../../etc/passwd".parse::<Fingerprint>(),
            Err(FingerprintError::HexDecode(_))
        ));
    }
}
