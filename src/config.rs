use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SafetyError;
use crate::safety::detection::DedupStrategy;

/// Application-level constants
pub const APP_NAME: &str = "rxsafety";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "rxsafety=debug"
    } else {
        "rxsafety=info"
    }
}

/// Tunable limits of the safety engine. Missing fields take their defaults,
/// so a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on items per prescription (lower bound is always 1).
    pub max_items: usize,
    /// Minimum trimmed diagnosis length, in characters.
    pub min_diagnosis_len: usize,
    /// Refill allowance cap for controlled substances.
    pub controlled_max_refills: u32,
    /// Controlled quantities above this produce a warning.
    pub controlled_quantity_warning: u32,
    pub dedup_strategy: DedupStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_items: 10,
            min_diagnosis_len: 10,
            controlled_max_refills: 5,
            controlled_quantity_warning: 90,
            dedup_strategy: DedupStrategy::PairKey,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SafetyError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| SafetyError::ConfigLoad(path.display().to_string(), e.to_string()))?;
        let config: EngineConfig = serde_json::from_str(&json)
            .map_err(|e| SafetyError::ConfigParse(path.display().to_string(), e.to_string()))?;

        tracing::info!(
            path = %path.display(),
            max_items = config.max_items,
            dedup = ?config.dedup_strategy,
            "Engine config loaded"
        );

        Ok(config)
    }
}
