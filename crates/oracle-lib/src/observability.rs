//! Observability infrastructure for the oracle
//!
//! Provides:
//! - Prometheus counters for scenario generation and validation outcomes
//! - Structured logging with tracing

use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<OracleMetricsInner> = OnceLock::new();

struct OracleMetricsInner {
    scenarios_generated: IntCounterVec,
    scenarios_accepted: IntCounter,
    scenarios_dropped: IntCounter,
    validation_warnings: IntCounter,
}

impl OracleMetricsInner {
    fn new() -> Self {
        Self {
            scenarios_generated: register_int_counter_vec!(
                "policy_oracle_scenarios_generated_total",
                "Scenarios produced by each generator",
                &["generator"]
            )
            .expect("Failed to register scenarios_generated"),

            scenarios_accepted: register_int_counter!(
                "policy_oracle_scenarios_accepted_total",
                "Scenarios that passed validation in a batch"
            )
            .expect("Failed to register scenarios_accepted"),

            scenarios_dropped: register_int_counter!(
                "policy_oracle_scenarios_dropped_total",
                "Scenarios excluded from a batch after failing validation"
            )
            .expect("Failed to register scenarios_dropped"),

            validation_warnings: register_int_counter!(
                "policy_oracle_validation_warnings_total",
                "Warning-class validation findings"
            )
            .expect("Failed to register validation_warnings"),
        }
    }
}

/// Handle to the process-global oracle metrics
///
/// Clones share the same underlying counters.
#[derive(Clone)]
pub struct OracleMetrics {
    _private: (),
}

impl Default for OracleMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl OracleMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(OracleMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &OracleMetricsInner {
        GLOBAL_METRICS.get_or_init(OracleMetricsInner::new)
    }

    pub fn add_generated(&self, generator: &str, count: usize) {
        self.inner()
            .scenarios_generated
            .with_label_values(&[generator])
            .inc_by(count as u64);
    }

    pub fn inc_accepted(&self) {
        self.inner().scenarios_accepted.inc();
    }

    pub fn inc_dropped(&self) {
        self.inner().scenarios_dropped.inc();
    }

    pub fn add_warnings(&self, count: usize) {
        self.inner().validation_warnings.inc_by(count as u64);
    }

    /// Render the default registry in the Prometheus text format
    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Structured logger for oracle events
#[derive(Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn log_batch_started(&self, seed: u64, random_count: usize, generators: usize) {
        info!(
            event = "batch_started",
            component = %self.component,
            seed = seed,
            random_count = random_count,
            generators = generators,
            "Scenario batch started"
        );
    }

    pub fn log_generated(&self, generator: &str, count: usize) {
        debug!(
            event = "scenarios_generated",
            component = %self.component,
            generator = %generator,
            count = count,
            "Generator produced scenarios"
        );
    }

    /// Log a scenario excluded from a batch
    pub fn log_scenario_dropped(&self, scenario: &str, defects: usize, reason: &str) {
        warn!(
            event = "scenario_dropped",
            component = %self.component,
            scenario = %scenario,
            defects = defects,
            reason = %reason,
            "Scenario failed validation and was dropped"
        );
    }

    pub fn log_validation_warning(&self, scenario: &str, warning: &str) {
        warn!(
            event = "validation_warning",
            component = %self.component,
            scenario = %scenario,
            warning = %warning,
            "Scenario passed validation with a warning"
        );
    }

    pub fn log_batch_completed(&self, accepted: usize, dropped: usize, warnings: usize) {
        if dropped == 0 {
            info!(
                event = "batch_completed",
                component = %self.component,
                accepted = accepted,
                dropped = dropped,
                warnings = warnings,
                "Scenario batch completed"
            );
        } else {
            warn!(
                event = "batch_completed",
                component = %self.component,
                accepted = accepted,
                dropped = dropped,
                warnings = warnings,
                "Scenario batch completed with dropped scenarios"
            );
        }
    }
}
