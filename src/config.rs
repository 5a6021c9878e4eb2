//! Comparison configuration

use crate::error::{DbdiffError, Result};
use crate::value::CoercionMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Weights of the three score components; they must sum to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub presence: f64,
    pub structure: f64,
    pub data: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            presence: 0.3,
            structure: 0.3,
            data: 0.4,
        }
    }
}

/// Settings for one comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Tables larger than this are compared on a sample
    pub sample_cap: usize,
    pub sample_seed: u64,
    pub coercion: CoercionMode,
    pub weights: ScoreWeights,
    /// Worker threads for per-table comparison; `None` uses all cores
    pub parallelism: Option<usize>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            sample_cap: crate::DEFAULT_SAMPLE_CAP,
            sample_seed: crate::DEFAULT_SAMPLE_SEED,
            coercion: CoercionMode::default(),
            weights: ScoreWeights::default(),
            parallelism: None,
        }
    }
}

impl ComparisonConfig {
    /// Load a JSON config file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DbdiffError::config(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Table workers of a run, and the connection pool size of each source
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism.unwrap_or_else(crate::source::default_parallelism)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_cap == 0 {
            return Err(DbdiffError::config("sample_cap must be greater than 0"));
        }
        if self.parallelism == Some(0) {
            return Err(DbdiffError::config("parallelism must be greater than 0"));
        }

        let w = &self.weights;
        if [w.presence, w.structure, w.data].iter().any(|x| !(0.0..=1.0).contains(x)) {
            return Err(DbdiffError::config("weights must each be between 0 and 1"));
        }
        let total = w.presence + w.structure + w.data;
        if (total - 1.0).abs() > 1e-9 {
            return Err(DbdiffError::config(format!(
                "weights must sum to 1.0, got {}",
                total
            )));
        }
        Ok(())
    }
}
