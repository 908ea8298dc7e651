//! Scenario data model
//!
//! Plain value objects describing a policy, the workload it targets, and the
//! outcome a test expects to observe. Generators build them; the validator
//! only reads them.

use crate::bounds::{BoundsExpectation, ResourceBounds, ResourceRequest};
use crate::mode::{expected_behavior, PolicyMode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Default metrics provider id
pub const DEFAULT_METRICS_PROVIDER: &str = "prometheus";

/// Default rolling window for usage percentiles (24 hours)
pub const DEFAULT_ROLLING_WINDOW_SECS: u64 = 24 * 60 * 60;

/// Default reconciliation interval (5 minutes)
pub const DEFAULT_RECONCILIATION_INTERVAL_SECS: u64 = 300;

/// Default headroom multiplier applied on top of the percentile
pub const DEFAULT_SAFETY_FACTOR: f64 = 1.15;

/// Usage percentile a recommender targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Percentile {
    P50,
    P90,
    #[default]
    P95,
    P99,
}

/// Metrics parameters of a policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub provider: String,
    pub rolling_window_secs: u64,
    pub percentile: Percentile,
    /// Must be at least 1.0
    pub safety_factor: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_METRICS_PROVIDER.to_string(),
            rolling_window_secs: DEFAULT_ROLLING_WINDOW_SECS,
            percentile: Percentile::default(),
            safety_factor: DEFAULT_SAFETY_FACTOR,
        }
    }
}

/// How the reconciler may roll out an applied recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStrategy {
    pub allow_in_place_resize: bool,
    pub allow_pod_eviction: bool,
    pub respect_disruption_budget: bool,
}

impl Default for UpdateStrategy {
    fn default() -> Self {
        Self {
            allow_in_place_resize: true,
            allow_pod_eviction: false,
            respect_disruption_budget: true,
        }
    }
}

/// Optimization policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub name: String,
    pub mode: PolicyMode,
    /// Opaque to the oracle
    #[serde(default)]
    pub target_selector: BTreeMap<String, String>,
    /// Opaque to the oracle
    #[serde(default)]
    pub namespace_selector: BTreeMap<String, String>,
    pub resource_bounds: ResourceBounds,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub update_strategy: UpdateStrategy,
    pub reconciliation_interval_secs: u64,
}

/// Kind of workload a policy targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
}

impl WorkloadKind {
    pub const ALL: [WorkloadKind; 3] = [
        WorkloadKind::Deployment,
        WorkloadKind::StatefulSet,
        WorkloadKind::DaemonSet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::DaemonSet => "DaemonSet",
        }
    }

    /// DaemonSets run one pod per node and carry no replica count
    pub fn is_replica_controlled(&self) -> bool {
        !matches!(self, Self::DaemonSet)
    }

    pub fn default_replicas(&self) -> u32 {
        if self.is_replica_controlled() {
            1
        } else {
            0
        }
    }

    pub fn accepts_replicas(&self, replicas: u32) -> bool {
        if self.is_replica_controlled() {
            replicas >= 1
        } else {
            replicas == 0
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requests and limits of a workload or container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub requests: ResourceRequest,
    pub limits: ResourceRequest,
}

impl ResourceRequirements {
    pub fn new(requests: ResourceRequest, limits: ResourceRequest) -> Self {
        Self { requests, limits }
    }

    /// Limits set to `factor` times the requests
    pub fn with_limit_factor(requests: ResourceRequest, factor: u64) -> Self {
        Self {
            requests,
            limits: ResourceRequest::new(
                requests.cpu.saturating_mul(factor),
                requests.memory.saturating_mul(factor),
            ),
        }
    }
}

/// Per-container resource override inside a workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerOverride {
    pub name: String,
    pub resources: ResourceRequirements,
}

/// Workload configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    pub name: String,
    pub namespace: String,
    pub kind: WorkloadKind,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub resources: ResourceRequirements,
    /// Zero for DaemonSets, at least one otherwise
    pub replicas: u32,
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<ContainerOverride>,
}

/// Error category a scenario expects the reconciler to surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidBounds,
    InvalidConfiguration,
    ConcurrentModification,
    PermissionDenied,
    /// Retried by the reconciler until it succeeds
    Recoverable,
    /// Expected to clear without intervention; kept distinct from `Recoverable`
    Transient,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidBounds => "invalid_bounds",
            Self::InvalidConfiguration => "invalid_configuration",
            Self::ConcurrentModification => "concurrent_modification",
            Self::PermissionDenied => "permission_denied",
            Self::Recoverable => "recoverable",
            Self::Transient => "transient",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who defines the expected outcome of a scenario
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectationOwner {
    /// Computed locally from the mode contract and bounds
    #[default]
    Oracle,
    /// Error handling is delegated to the external reconciler contract
    Collaborator,
}

/// Outcome a test must observe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioExpectation {
    pub should_apply_updates: bool,
    pub should_generate_recommendations: bool,
    pub should_respect_bounds: bool,
    pub should_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default)]
    pub expected_annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundsExpectation>,
    #[serde(default)]
    pub owner: ExpectationOwner,
}

impl ScenarioExpectation {
    /// Expectation whose flags follow the mode contract
    pub fn for_mode(mode: PolicyMode) -> Self {
        let behavior = expected_behavior(mode);
        Self {
            should_apply_updates: behavior.should_apply,
            should_generate_recommendations: behavior.should_recommend,
            should_respect_bounds: true,
            should_error: false,
            error_kind: None,
            expected_annotations: BTreeMap::new(),
            bounds: None,
            owner: ExpectationOwner::Oracle,
        }
    }

    /// Expectation of a rejected configuration
    pub fn failure(kind: ErrorKind) -> Self {
        Self {
            should_apply_updates: false,
            should_generate_recommendations: false,
            should_respect_bounds: true,
            should_error: true,
            error_kind: Some(kind),
            expected_annotations: BTreeMap::new(),
            bounds: None,
            owner: ExpectationOwner::Oracle,
        }
    }

    /// Expectation whose outcome is defined by the reconciler, not the oracle
    pub fn delegated(kind: ErrorKind) -> Self {
        Self {
            owner: ExpectationOwner::Collaborator,
            ..Self::failure(kind)
        }
    }

    pub fn is_delegated(&self) -> bool {
        self.owner == ExpectationOwner::Collaborator
    }
}

/// Category labels attached to generated scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioTag {
    Basic,
    Bounds,
    MultiContainer,
    EdgeCase,
    InvalidConfig,
    ZeroRequest,
    BoundaryEdge,
    MemorySafety,
    ConcurrentConflict,
    RbacDenial,
    ReconcilerError,
    Randomized,
    Override,
}

impl ScenarioTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Bounds => "bounds",
            Self::MultiContainer => "multi-container",
            Self::EdgeCase => "edge-case",
            Self::InvalidConfig => "invalid-config",
            Self::ZeroRequest => "zero-request",
            Self::BoundaryEdge => "boundary-edge",
            Self::MemorySafety => "memory-safety",
            Self::ConcurrentConflict => "concurrent-conflict",
            Self::RbacDenial => "rbac-denial",
            Self::ReconcilerError => "reconciler-error",
            Self::Randomized => "randomized",
            Self::Override => "override",
        }
    }
}

impl fmt::Display for ScenarioTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A policy/workload pair with its predicted outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScenario {
    pub name: String,
    pub policy: PolicyConfig,
    pub workload: WorkloadConfig,
    pub expectation: ScenarioExpectation,
    #[serde(default)]
    pub edge_case: bool,
    #[serde(default)]
    pub tags: BTreeSet<ScenarioTag>,
}

impl TestScenario {
    pub fn has_tag(&self, tag: ScenarioTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn tag_list(&self) -> String {
        self.tags
            .iter()
            .map(ScenarioTag::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}
