//! Asset-processing stages
//!
//! Stages are ordered points in the asset-processing pipeline. Each named stage
//! maps to a fixed numeric constant; handlers run in ascending constant order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EmitFileError;

/// Prefix used by the upper-case constant spelling of a stage name
const CONSTANT_PREFIX: &str = "PROCESS_ASSETS_STAGE_";

/// Named asset-processing stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Add additional assets to the compilation (default)
    #[default]
    Additional,
    /// Basic preprocessing of assets
    PreProcess,
    /// Derive new assets from existing assets
    Derived,
    /// Add additional sections to existing assets
    Additions,
    /// Optimize existing assets in a general way
    Optimize,
    /// Optimize the count of existing assets
    OptimizeCount,
    /// Optimize the compatibility of existing assets
    OptimizeCompatibility,
    /// Optimize the size of existing assets
    OptimizeSize,
    /// Add development tooling to assets (e.g. source maps)
    DevTooling,
    /// Optimize the count of existing assets by inlining them
    OptimizeInline,
    /// Summarize the list of existing assets
    Summarize,
    /// Optimize the hashes of the assets
    OptimizeHash,
    /// Optimize the transfer of existing assets (e.g. compression)
    OptimizeTransfer,
    /// Analyze existing assets
    Analyse,
    /// Create assets for reporting purposes
    Report,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 15] = [
        Stage::Additional,
        Stage::PreProcess,
        Stage::Derived,
        Stage::Additions,
        Stage::Optimize,
        Stage::OptimizeCount,
        Stage::OptimizeCompatibility,
        Stage::OptimizeSize,
        Stage::DevTooling,
        Stage::OptimizeInline,
        Stage::Summarize,
        Stage::OptimizeHash,
        Stage::OptimizeTransfer,
        Stage::Analyse,
        Stage::Report,
    ];

    /// Numeric stage constant used to order handlers
    pub fn value(&self) -> i32 {
        match self {
            Stage::Additional => -2000,
            Stage::PreProcess => -1000,
            Stage::Derived => -200,
            Stage::Additions => -100,
            Stage::Optimize => 100,
            Stage::OptimizeCount => 200,
            Stage::OptimizeCompatibility => 300,
            Stage::OptimizeSize => 400,
            Stage::DevTooling => 500,
            Stage::OptimizeInline => 700,
            Stage::Summarize => 1000,
            Stage::OptimizeHash => 2500,
            Stage::OptimizeTransfer => 3000,
            Stage::Analyse => 4000,
            Stage::Report => 5000,
        }
    }

    /// Snake-case stage name
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Additional => "additional",
            Stage::PreProcess => "pre_process",
            Stage::Derived => "derived",
            Stage::Additions => "additions",
            Stage::Optimize => "optimize",
            Stage::OptimizeCount => "optimize_count",
            Stage::OptimizeCompatibility => "optimize_compatibility",
            Stage::OptimizeSize => "optimize_size",
            Stage::DevTooling => "dev_tooling",
            Stage::OptimizeInline => "optimize_inline",
            Stage::Summarize => "summarize",
            Stage::OptimizeHash => "optimize_hash",
            Stage::OptimizeTransfer => "optimize_transfer",
            Stage::Analyse => "analyse",
            Stage::Report => "report",
        }
    }

    /// Upper-case constant name, e.g. `PROCESS_ASSETS_STAGE_ADDITIONAL`
    pub fn constant_name(&self) -> String {
        format!("{}{}", CONSTANT_PREFIX, self.as_str().to_uppercase())
    }
}

impl FromStr for Stage {
    type Err = EmitFileError;

    /// Accepts both `optimize_size` and `PROCESS_ASSETS_STAGE_OPTIMIZE_SIZE`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix(CONSTANT_PREFIX).unwrap_or(s).to_lowercase();
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == name)
            .ok_or_else(|| EmitFileError::unknown_stage(s))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stage() {
        assert_eq!(Stage::default(), Stage::Additional);
        assert_eq!(Stage::default().value(), -2000);
    }

    #[test]
    fn test_stage_values_are_ordered() {
        let values: Vec<i32> = Stage::ALL.iter().map(Stage::value).collect();
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(values, sorted);
    }

    #[test]
    fn test_stage_from_str() {
        assert_eq!("additional".parse::<Stage>().unwrap(), Stage::Additional);
        assert_eq!("dev_tooling".parse::<Stage>().unwrap(), Stage::DevTooling);
        assert_eq!(
            "PROCESS_ASSETS_STAGE_OPTIMIZE_SIZE".parse::<Stage>().unwrap(),
            Stage::OptimizeSize
        );
        assert_eq!("REPORT".parse::<Stage>().unwrap(), Stage::Report);
        assert!("optimise".parse::<Stage>().is_err());
    }

    #[test]
    fn test_constant_name() {
        assert_eq!(
            Stage::PreProcess.constant_name(),
            "PROCESS_ASSETS_STAGE_PRE_PROCESS"
        );
    }

    #[test]
    fn test_serde_names() {
        let stage: Stage = serde_json::from_str("\"optimize_transfer\"").unwrap();
        assert_eq!(stage, Stage::OptimizeTransfer);
        assert_eq!(serde_json::to_string(&Stage::Analyse).unwrap(), "\"analyse\"");
    }
}
