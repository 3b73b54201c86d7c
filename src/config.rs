//! Engine configuration
//!
//! Thresholds and skip policy for one evaluation pipeline. Loadable from a
//! YAML file; every field has a default so a partial config file is fine.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name-match acceptance tier. The tier boundaries are the load-bearing
/// contract: Strict ≥ 90, Moderate ≥ 85, Lenient ≥ 80 on a 100-point score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Strict,
    #[default]
    Moderate,
    Lenient,
}

impl MatchTier {
    /// Minimum full-name score accepted at this tier.
    pub fn threshold(&self) -> f64 {
        match self {
            MatchTier::Strict => 90.0,
            MatchTier::Moderate => 85.0,
            MatchTier::Lenient => 80.0,
        }
    }
}

/// Configuration for one evaluation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Name-match acceptance tier.
    #[serde(default)]
    pub match_tier: MatchTier,

    /// Skip the disciplinary evaluation (recorded as skipped, not omitted).
    #[serde(default)]
    pub skip_disciplinary: bool,
    #[serde(default)]
    pub skip_arbitration: bool,
    #[serde(default)]
    pub skip_regulatory: bool,

    /// Employment gaps longer than this many days raise an alert.
    #[serde(default = "default_gap_days")]
    pub employment_gap_days: i64,
}

fn default_gap_days() -> i64 {
    90
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_tier: MatchTier::default(),
            skip_disciplinary: false,
            skip_arbitration: false,
            skip_regulatory: false,
            employment_gap_days: default_gap_days(),
        }
    }
}

/// Load an engine config from a YAML file.
pub fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read engine config {:?}: {}", path, e))?;

    let config: EngineConfig = serde_yaml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse engine config YAML: {}", e))?;

    tracing::info!(?path, "Loaded engine config");

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(MatchTier::Strict.threshold(), 90.0);
        assert_eq!(MatchTier::Moderate.threshold(), 85.0);
        assert_eq!(MatchTier::Lenient.threshold(), 80.0);
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.match_tier, MatchTier::Moderate);
        assert!(!config.skip_disciplinary);
        assert_eq!(config.employment_gap_days, 90);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: EngineConfig = serde_yaml::from_str("match_tier: strict\n").unwrap();
        assert_eq!(config.match_tier, MatchTier::Strict);
        assert_eq!(config.employment_gap_days, 90);
        assert!(!config.skip_arbitration);
    }

    #[test]
    fn test_full_yaml_round_trip() {
        let config = EngineConfig {
            match_tier: MatchTier::Lenient,
            skip_disciplinary: true,
            skip_arbitration: true,
            skip_regulatory: false,
            employment_gap_days: 60,
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: EngineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, back);
    }
}
