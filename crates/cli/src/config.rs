//! Configuration management for the CLI
//!
//! Settings come from `RPO_*` environment variables; command-line flags
//! take precedence over them.

use anyhow::{Context, Result};
use oracle_lib::batch::{DEFAULT_RANDOM_COUNT, DEFAULT_SEED};
use oracle_lib::validation::DEFAULT_MEMORY_DECREASE_THRESHOLD;
use oracle_lib::{CatalogConfig, ValidatorConfig};
use serde::Deserialize;

/// CLI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Seed for randomized generators
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Samples drawn from each randomized generator
    #[serde(default = "default_random_count")]
    pub random_count: usize,

    /// Fraction of a memory request that may be removed without a warning
    #[serde(default = "default_memory_decrease_threshold")]
    pub memory_decrease_threshold: f64,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_random_count() -> usize {
    DEFAULT_RANDOM_COUNT
}

fn default_memory_decrease_threshold() -> f64 {
    DEFAULT_MEMORY_DECREASE_THRESHOLD
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            random_count: default_random_count(),
            memory_decrease_threshold: default_memory_decrease_threshold(),
        }
    }
}

impl CliConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("RPO").try_parsing(true))
            .build()
            .context("Failed to read RPO_* environment")?;

        config
            .try_deserialize()
            .context("Invalid RPO_* configuration value")
    }

    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            memory_decrease_threshold: self.memory_decrease_threshold,
        }
    }

    /// Catalog configuration with flag overrides applied
    pub fn catalog_config(&self, seed: Option<u64>, random_count: Option<usize>) -> CatalogConfig {
        CatalogConfig {
            seed: seed.unwrap_or(self.seed),
            random_count: random_count.unwrap_or(self.random_count),
            validator: self.validator_config(),
        }
    }
}
