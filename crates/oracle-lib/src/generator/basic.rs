//! Smoke-test baseline: one canonical scenario per mode and a
//! multi-container workload.

use super::fixtures::{self, LIMIT_FACTOR};
use super::{ScenarioBuilder, ScenarioGenerator};
use crate::bounds::ResourceRequest;
use crate::mode::PolicyMode;
use crate::models::{ContainerOverride, ResourceRequirements, ScenarioTag, TestScenario, WorkloadKind};
use crate::models::{PolicyConfig, WorkloadConfig};
use crate::quantity::{CpuQuantity, MemoryQuantity};
use crate::validation::DEFAULT_MEMORY_DECREASE_THRESHOLD;

/// Fixed, seed-independent scenarios
#[derive(Debug, Clone)]
pub struct BasicGenerator {
    memory_decrease_threshold: f64,
}

impl Default for BasicGenerator {
    fn default() -> Self {
        Self {
            memory_decrease_threshold: DEFAULT_MEMORY_DECREASE_THRESHOLD,
        }
    }
}

impl BasicGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory_decrease_threshold(mut self, threshold: f64) -> Self {
        self.memory_decrease_threshold = threshold;
        self
    }

    fn builder(&self, name: &str, policy: PolicyConfig, workload: WorkloadConfig) -> ScenarioBuilder {
        ScenarioBuilder::new(name, policy, workload)
            .memory_decrease_threshold(self.memory_decrease_threshold)
            .tag(ScenarioTag::Basic)
    }

    /// Canonical Deployment scenario for `mode`
    pub fn for_mode(&self, mode: PolicyMode) -> TestScenario {
        let app = format!("basic-{}", mode.as_str().to_ascii_lowercase());
        self.builder(
            &app,
            fixtures::policy(&app, mode),
            fixtures::workload(&app, WorkloadKind::Deployment),
        )
        .build()
    }

    /// Deployment with an app container and a sidecar
    pub fn multi_container(&self) -> TestScenario {
        let app = "basic-multi-container";
        let mut workload = fixtures::workload(app, WorkloadKind::Deployment);

        let sidecar_requests = ResourceRequest::new(
            CpuQuantity::from_millicores(100),
            MemoryQuantity::from_mebibytes(128),
        );
        workload.containers = vec![
            ContainerOverride {
                name: "app".to_string(),
                resources: workload.resources,
            },
            ContainerOverride {
                name: "sidecar".to_string(),
                resources: ResourceRequirements::with_limit_factor(sidecar_requests, LIMIT_FACTOR),
            },
        ];

        self.builder(app, fixtures::policy(app, PolicyMode::Auto), workload)
            .tag(ScenarioTag::MultiContainer)
            .build()
    }
}

impl ScenarioGenerator for BasicGenerator {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn memory_decrease_threshold(&self) -> f64 {
        self.memory_decrease_threshold
    }

    fn generate_basic(&mut self) -> Vec<TestScenario> {
        PolicyMode::ALL
            .into_iter()
            .map(|mode| self.for_mode(mode))
            .chain(std::iter::once(self.multi_container()))
            .collect()
    }
}
