//! Scenario generators
//!
//! Generators produce [`TestScenario`]s for property-based verification:
//! - Basic: one canonical scenario per mode plus a multi-container workload
//! - Bounds: deterministic and randomized Within / ClampedToMin / ClampedToMax cases
//! - Edge cases: invalid configurations, zero requests, memory safety, delegated errors
//! - Randomized: self-consistent samples from fixed discrete pools
//!
//! Random sources are injected and owned by the generator instance, so a
//! generator must not be shared across threads without external locking.
//! Use one instance per worker instead.

mod basic;
mod bounds;
mod builder;
mod edge_case;
pub mod fixtures;
mod randomized;


pub use basic::BasicGenerator;
pub use bounds::BoundsGenerator;
pub use builder::{derive_expectation, ScenarioBuilder};
pub use edge_case::EdgeCaseGenerator;
pub use randomized::RandomizedGenerator;

use crate::bounds::{ResourceBounds, ResourceRequest};
use crate::mode::PolicyMode;
use crate::models::{ResourceRequirements, ScenarioTag, TestScenario, WorkloadKind};
use crate::quantity::{CpuQuantity, MemoryQuantity};
use crate::validation::DEFAULT_MEMORY_DECREASE_THRESHOLD;

/// CPU magnitudes (millicores) sampled by randomized generators, strictly increasing
pub const CPU_POOL_MILLICORES: &[u64] = &[50, 100, 200, 250, 500, 750, 1000, 2000, 4000];

/// Memory magnitudes (MiB) sampled by randomized generators, strictly increasing
pub const MEMORY_POOL_MIB: &[u64] = &[64, 128, 256, 512, 768, 1024, 2048, 4096];

/// Replica counts for replica-controlled kinds
pub const REPLICA_POOL: &[u32] = &[1, 2, 3, 5];

pub const NAMESPACE_POOL: &[&str] = &["default", "apps", "batch"];

pub const IMAGE_POOL: &[&str] = &["nginx:1.25", "redis:7.2", "busybox:1.36"];

pub(crate) fn cpu_at(index: usize) -> CpuQuantity {
    CpuQuantity::from_millicores(CPU_POOL_MILLICORES[index])
}

pub(crate) fn memory_at(index: usize) -> MemoryQuantity {
    MemoryQuantity::from_mebibytes(MEMORY_POOL_MIB[index])
}

/// Producer of test scenarios
///
/// Each capability defaults to producing nothing; generators implement the
/// ones they support.
pub trait ScenarioGenerator {
    fn name(&self) -> &'static str;

    /// Decrease ratio above which derived expectations carry the memory warning
    fn memory_decrease_threshold(&self) -> f64 {
        DEFAULT_MEMORY_DECREASE_THRESHOLD
    }

    /// Fixed baseline scenarios
    fn generate_basic(&mut self) -> Vec<TestScenario> {
        Vec::new()
    }

    /// Baseline scenarios with `overrides` applied and expectations re-derived
    fn generate_with_overrides(&mut self, overrides: &ScenarioOverrides) -> Vec<TestScenario> {
        self.generate_basic()
            .iter()
            .map(|scenario| overrides.apply_with_threshold(scenario, self.memory_decrease_threshold()))
            .collect()
    }

    /// `count` sampled scenarios
    fn generate_random(&mut self, _count: usize) -> Vec<TestScenario> {
        Vec::new()
    }

    /// Boundary and failure scenarios
    fn generate_edge_cases(&mut self) -> Vec<TestScenario> {
        Vec::new()
    }
}

/// Field overrides applied on top of generated scenarios
#[derive(Debug, Clone, Default)]
pub struct ScenarioOverrides {
    pub mode: Option<PolicyMode>,
    pub kind: Option<WorkloadKind>,
    pub namespace: Option<String>,
    pub bounds: Option<ResourceBounds>,
    pub requests: Option<ResourceRequest>,
    pub tags: Vec<ScenarioTag>,
}

impl ScenarioOverrides {
    /// Copy of `scenario` with the overrides applied
    ///
    /// Oracle-owned expectations are re-derived; delegated ones are kept as is.
    pub fn apply(&self, scenario: &TestScenario) -> TestScenario {
        self.apply_with_threshold(scenario, DEFAULT_MEMORY_DECREASE_THRESHOLD)
    }

    /// [`apply`](Self::apply) with a non-default memory-decrease threshold
    pub fn apply_with_threshold(&self, scenario: &TestScenario, memory_decrease_threshold: f64) -> TestScenario {
        let mut policy = scenario.policy.clone();
        let mut workload = scenario.workload.clone();

        if let Some(mode) = self.mode {
            policy.mode = mode;
        }
        if let Some(bounds) = self.bounds {
            policy.resource_bounds = bounds;
        }
        if let Some(kind) = self.kind {
            workload.kind = kind;
            if !kind.accepts_replicas(workload.replicas) {
                workload.replicas = fixtures::replicas_for(kind);
            }
        }
        if let Some(namespace) = &self.namespace {
            workload.namespace = namespace.clone();
        }
        if let Some(requests) = self.requests {
            let limits = if requests.fits_within(&workload.resources.limits) {
                workload.resources.limits
            } else {
                ResourceRequirements::with_limit_factor(requests, fixtures::LIMIT_FACTOR).limits
            };
            workload.resources = ResourceRequirements::new(requests, limits);
        }

        let mut builder = ScenarioBuilder::new(format!("{}-override", scenario.name), policy, workload)
            .memory_decrease_threshold(memory_decrease_threshold)
            .tags(scenario.tags.iter().copied())
            .tag(ScenarioTag::Override)
            .tags(self.tags.iter().copied());
        if scenario.edge_case {
            builder = builder.edge_case();
        }

        if scenario.expectation.is_delegated() {
            builder.build_with(scenario.expectation.clone())
        } else {
            builder.build()
        }
    }
}
