//! Comprehensive scenario batches
//!
//! Runs every registered generator, validates each scenario and splits the
//! output into accepted scenarios and dropped ones. A scenario that fails
//! validation is excluded and counted, never returned and never fatal.

use crate::error::{ValidationError, ValidationWarning};
use crate::generator::{
    BasicGenerator, BoundsGenerator, EdgeCaseGenerator, RandomizedGenerator, ScenarioGenerator,
};
use crate::models::TestScenario;
use crate::observability::{OracleMetrics, StructuredLogger};
use crate::validation::{Validator, ValidatorConfig};
use serde::Serialize;

/// Default seed for randomized generators
pub const DEFAULT_SEED: u64 = 42;

/// Default number of samples drawn from each randomized generator
pub const DEFAULT_RANDOM_COUNT: usize = 10;

/// Catalog configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub seed: u64,
    pub random_count: usize,
    pub validator: ValidatorConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            random_count: DEFAULT_RANDOM_COUNT,
            validator: ValidatorConfig::default(),
        }
    }
}

/// A scenario excluded from a batch, with the reason
#[derive(Debug, Clone)]
pub struct DroppedScenario {
    pub scenario: TestScenario,
    pub error: ValidationError,
}

/// A warning raised by an accepted scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioWarning {
    pub scenario: String,
    pub message: String,
}

/// Result of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub accepted: Vec<TestScenario>,
    pub dropped: Vec<DroppedScenario>,
    pub warnings: Vec<ScenarioWarning>,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.dropped.len()
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Set of generators run together as one batch
pub struct ScenarioCatalog {
    config: CatalogConfig,
    generators: Vec<Box<dyn ScenarioGenerator>>,
    validator: Validator,
    metrics: OracleMetrics,
    logger: StructuredLogger,
}

impl ScenarioCatalog {
    /// Catalog with every built-in generator
    ///
    /// Bounds sampling uses `seed` and general random sampling `seed + 1`,
    /// so the two streams never coincide. Generators derive expectations
    /// with the validator's memory-decrease threshold.
    pub fn new(config: CatalogConfig) -> Self {
        let threshold = config.validator.memory_decrease_threshold;
        let generators: Vec<Box<dyn ScenarioGenerator>> = vec![
            Box::new(BasicGenerator::new().with_memory_decrease_threshold(threshold)),
            Box::new(BoundsGenerator::from_seed(config.seed).with_memory_decrease_threshold(threshold)),
            Box::new(EdgeCaseGenerator::new().with_memory_decrease_threshold(threshold)),
            Box::new(
                RandomizedGenerator::from_seed(config.seed.wrapping_add(1))
                    .with_memory_decrease_threshold(threshold),
            ),
        ];
        Self::with_generators(config, generators)
    }

    pub fn with_generators(config: CatalogConfig, generators: Vec<Box<dyn ScenarioGenerator>>) -> Self {
        let validator = Validator::with_config(config.validator.clone());
        Self {
            config,
            generators,
            validator,
            metrics: OracleMetrics::new(),
            logger: StructuredLogger::new("scenario-catalog"),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn generator_names(&self) -> Vec<&'static str> {
        self.generators.iter().map(|g| g.name()).collect()
    }

    /// Every scenario from every generator, validated
    pub fn comprehensive(&mut self) -> BatchOutcome {
        self.logger.log_batch_started(
            self.config.seed,
            self.config.random_count,
            self.generators.len(),
        );

        let random_count = self.config.random_count;
        let mut scenarios = Vec::new();
        for generator in &mut self.generators {
            let mut produced = generator.generate_basic();
            produced.extend(generator.generate_random(random_count));
            produced.extend(generator.generate_edge_cases());

            self.metrics.add_generated(generator.name(), produced.len());
            self.logger.log_generated(generator.name(), produced.len());
            scenarios.extend(produced);
        }

        let outcome = self.validate_batch(scenarios);
        self.logger.log_batch_completed(
            outcome.accepted.len(),
            outcome.dropped.len(),
            outcome.warnings.len(),
        );
        outcome
    }

    /// Split `scenarios` into accepted and dropped
    pub fn validate_batch(&self, scenarios: Vec<TestScenario>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for scenario in scenarios {
            match self.validator.validate(&scenario) {
                Ok(report) => {
                    self.record_warnings(&report.scenario, &report.warnings, &mut outcome);
                    self.metrics.inc_accepted();
                    outcome.accepted.push(scenario);
                }
                Err(error) => {
                    self.logger
                        .log_scenario_dropped(&scenario.name, error.defects.len(), &error.to_string());
                    self.metrics.inc_dropped();
                    outcome.dropped.push(DroppedScenario { scenario, error });
                }
            }
        }

        outcome
    }

    fn record_warnings(&self, scenario: &str, warnings: &[ValidationWarning], outcome: &mut BatchOutcome) {
        self.metrics.add_warnings(warnings.len());
        for warning in warnings {
            let message = warning.to_string();
            self.logger.log_validation_warning(scenario, &message);
            outcome.warnings.push(ScenarioWarning {
                scenario: scenario.to_string(),
                message,
            });
        }
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DefectKind;
    use crate::generator::BasicGenerator;
    use crate::mode::PolicyMode;
    use crate::models::ScenarioTag;

    #[test]
    fn test_comprehensive_accepts_well_formed_and_drops_invalid() {
        let mut catalog = ScenarioCatalog::default();
        let outcome = catalog.comprehensive();

        assert!(!outcome.accepted.is_empty());
        assert_eq!(outcome.dropped_count(), 4);
        assert!(outcome
            .dropped
            .iter()
            .all(|d| d.scenario.has_tag(ScenarioTag::InvalidConfig)));
        assert!(outcome
            .dropped
            .iter()
            .all(|d| d.error.has_kind(DefectKind::Structural)));
        assert!(outcome
            .accepted
            .iter()
            .all(|s| !s.has_tag(ScenarioTag::InvalidConfig)));
    }

    #[test]
    fn test_counts_follow_random_count() {
        let config = CatalogConfig {
            random_count: 3,
            ..Default::default()
        };
        let outcome = ScenarioCatalog::new(config).comprehensive();
        // basic 4, bounds 3 + 3 + 2, edge cases 10, randomized 3
        assert_eq!(outcome.total(), 25);
    }

    #[test]
    fn test_same_seed_same_batch() {
        let a = ScenarioCatalog::default().comprehensive();
        let b = ScenarioCatalog::default().comprehensive();
        assert_eq!(a.accepted, b.accepted);
    }

    #[test]
    fn test_tampered_scenario_is_dropped_not_fatal() {
        let catalog = ScenarioCatalog::default();
        let mut bad = BasicGenerator::new().for_mode(PolicyMode::Disabled);
        bad.expectation.should_generate_recommendations = true;
        let good = BasicGenerator::new().for_mode(PolicyMode::Auto);

        let outcome = catalog.validate_batch(vec![bad, good]);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.dropped.len(), 1);
        assert!(outcome.dropped[0].error.has_kind(DefectKind::Consistency));
    }

    #[test]
    fn test_missing_memory_warning_is_recorded() {
        let catalog = ScenarioCatalog::default();
        let mut s = crate::generator::EdgeCaseGenerator::new().large_memory_decrease();
        s.expectation
            .expected_annotations
            .remove(crate::annotations::MEMORY_DECREASE_WARNING);

        let outcome = catalog.validate_batch(vec![s]);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_generators_follow_configured_threshold() {
        for threshold in [0.3, 0.5, 0.7] {
            let config = CatalogConfig {
                random_count: 50,
                validator: ValidatorConfig {
                    memory_decrease_threshold: threshold,
                },
                ..Default::default()
            };
            let outcome = ScenarioCatalog::new(config).comprehensive();
            assert!(outcome.warnings.is_empty(), "threshold {threshold}: {:?}", outcome.warnings);
            assert_eq!(outcome.dropped_count(), 4, "threshold {threshold}");
        }
    }

    #[test]
    fn test_lower_threshold_marks_more_scenarios() {
        let marked = |threshold: f64| {
            let config = CatalogConfig {
                random_count: 50,
                validator: ValidatorConfig {
                    memory_decrease_threshold: threshold,
                },
                ..Default::default()
            };
            ScenarioCatalog::new(config)
                .comprehensive()
                .accepted
                .iter()
                .filter(|s| {
                    s.expectation
                        .expected_annotations
                        .contains_key(crate::annotations::MEMORY_DECREASE_WARNING)
                })
                .count()
        };
        assert!(marked(0.3) >= marked(0.5));
    }

    #[test]
    fn test_custom_generators() {
        let generators: Vec<Box<dyn ScenarioGenerator>> = vec![Box::new(BasicGenerator::new())];
        let mut catalog = ScenarioCatalog::with_generators(CatalogConfig::default(), generators);
        assert_eq!(catalog.generator_names(), vec!["basic"]);
        assert_eq!(catalog.comprehensive().accepted.len(), 4);
    }
}
