//! Edge-case scenarios
//!
//! Fixed, seed-independent scenarios covering rejected configurations,
//! zero requests, large memory decreases, and reconciler-side failures whose
//! outcome is delegated to the reconciler contract.

use super::fixtures;
use super::{ScenarioBuilder, ScenarioGenerator};
use crate::bounds::{ResourceBound, ResourceRequest};
use crate::mode::PolicyMode;
use crate::models::{
    ErrorKind, ResourceRequirements, ScenarioExpectation, ScenarioTag, TestScenario, WorkloadKind,
};
use crate::models::{PolicyConfig, WorkloadConfig};
use crate::quantity::{CpuQuantity, MemoryQuantity};
use crate::validation::DEFAULT_MEMORY_DECREASE_THRESHOLD;

#[derive(Debug, Clone)]
pub struct EdgeCaseGenerator {
    memory_decrease_threshold: f64,
}

impl Default for EdgeCaseGenerator {
    fn default() -> Self {
        Self {
            memory_decrease_threshold: DEFAULT_MEMORY_DECREASE_THRESHOLD,
        }
    }
}

impl EdgeCaseGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory_decrease_threshold(mut self, threshold: f64) -> Self {
        self.memory_decrease_threshold = threshold;
        self
    }

    fn builder(&self, app: &str, policy: PolicyConfig, workload: WorkloadConfig) -> ScenarioBuilder {
        ScenarioBuilder::new(app, policy, workload)
            .memory_decrease_threshold(self.memory_decrease_threshold)
            .edge_case()
    }

    /// CPU bound with `min > max`; expected to be rejected
    pub fn inverted_cpu_bound(&self) -> TestScenario {
        let app = "edge-inverted-cpu-bound";
        let mut policy = fixtures::policy(app, PolicyMode::Auto);
        policy.resource_bounds.cpu =
            ResourceBound::new(CpuQuantity::from_millicores(2000), CpuQuantity::from_millicores(1000));
        self.builder(app, policy, fixtures::workload(app, WorkloadKind::Deployment))
            .tag(ScenarioTag::InvalidConfig)
            .build_with(ScenarioExpectation::failure(ErrorKind::InvalidBounds))
    }

    /// Memory bound with `min > max`; expected to be rejected
    pub fn inverted_memory_bound(&self) -> TestScenario {
        let app = "edge-inverted-memory-bound";
        let mut policy = fixtures::policy(app, PolicyMode::Recommend);
        policy.resource_bounds.memory =
            ResourceBound::new(MemoryQuantity::from_gibibytes(4), MemoryQuantity::from_gibibytes(1));
        self.builder(app, policy, fixtures::workload(app, WorkloadKind::StatefulSet))
            .tag(ScenarioTag::InvalidConfig)
            .build_with(ScenarioExpectation::failure(ErrorKind::InvalidBounds))
    }

    /// DaemonSet carrying a replica count; expected to be rejected
    pub fn daemonset_with_replicas(&self) -> TestScenario {
        let app = "edge-daemonset-replicas";
        let mut workload = fixtures::workload(app, WorkloadKind::DaemonSet);
        workload.replicas = 3;
        self.builder(app, fixtures::policy(app, PolicyMode::Auto), workload)
            .tag(ScenarioTag::InvalidConfig)
            .build_with(ScenarioExpectation::failure(ErrorKind::InvalidConfiguration))
    }

    /// Policy without a name; expected to be rejected
    pub fn unnamed_policy(&self) -> TestScenario {
        let app = "edge-unnamed-policy";
        let mut policy = fixtures::policy(app, PolicyMode::Recommend);
        policy.name = String::new();
        self.builder(app, policy, fixtures::workload(app, WorkloadKind::Deployment))
            .tag(ScenarioTag::InvalidConfig)
            .build_with(ScenarioExpectation::failure(ErrorKind::InvalidConfiguration))
    }

    /// All-zero requests and limits; legal and classified normally
    pub fn zero_requests(&self) -> TestScenario {
        let app = "edge-zero-requests";
        let mut workload = fixtures::workload(app, WorkloadKind::Deployment);
        workload.resources = ResourceRequirements::new(ResourceRequest::zero(), ResourceRequest::zero());
        self.builder(app, fixtures::policy(app, PolicyMode::Auto), workload)
            .tag(ScenarioTag::ZeroRequest)
            .build()
    }

    /// 4Gi request against a 1Gi maximum (75% decrease)
    pub fn large_memory_decrease(&self) -> TestScenario {
        let app = "edge-large-memory-decrease";
        let mut policy = fixtures::policy(app, PolicyMode::Auto);
        policy.resource_bounds.memory =
            ResourceBound::new(MemoryQuantity::from_mebibytes(128), MemoryQuantity::from_gibibytes(1));
        let mut workload = fixtures::workload(app, WorkloadKind::StatefulSet);
        workload.resources = ResourceRequirements::new(
            ResourceRequest::new(CpuQuantity::from_millicores(500), MemoryQuantity::from_gibibytes(4)),
            ResourceRequest::new(CpuQuantity::from_cores(1), MemoryQuantity::from_gibibytes(8)),
        );
        self.builder(app, policy, workload)
            .tag(ScenarioTag::MemorySafety)
            .build()
    }

    /// Outcome defined by the reconciler contract, not computed locally
    fn delegated(&self, app: &str, kind: ErrorKind, tag: ScenarioTag) -> TestScenario {
        self.builder(
            app,
            fixtures::policy(app, PolicyMode::Auto),
            fixtures::workload(app, WorkloadKind::Deployment),
        )
            .tag(tag)
            .build_with(ScenarioExpectation::delegated(kind))
    }

    pub fn concurrent_modification(&self) -> TestScenario {
        self.delegated(
            "edge-concurrent-modification",
            ErrorKind::ConcurrentModification,
            ScenarioTag::ConcurrentConflict,
        )
    }

    pub fn permission_denied(&self) -> TestScenario {
        self.delegated(
            "edge-permission-denied",
            ErrorKind::PermissionDenied,
            ScenarioTag::RbacDenial,
        )
    }

    pub fn recoverable_error(&self) -> TestScenario {
        self.delegated(
            "edge-recoverable-error",
            ErrorKind::Recoverable,
            ScenarioTag::ReconcilerError,
        )
    }

    pub fn transient_error(&self) -> TestScenario {
        self.delegated(
            "edge-transient-error",
            ErrorKind::Transient,
            ScenarioTag::ReconcilerError,
        )
    }
}

impl ScenarioGenerator for EdgeCaseGenerator {
    fn name(&self) -> &'static str {
        "edge-case"
    }

    fn memory_decrease_threshold(&self) -> f64 {
        self.memory_decrease_threshold
    }

    fn generate_edge_cases(&mut self) -> Vec<TestScenario> {
        vec![
            self.inverted_cpu_bound(),
            self.inverted_memory_bound(),
            self.daemonset_with_replicas(),
            self.unnamed_policy(),
            self.zero_requests(),
            self.large_memory_decrease(),
            self.concurrent_modification(),
            self.permission_denied(),
            self.recoverable_error(),
            self.transient_error(),
        ]
    }
}
