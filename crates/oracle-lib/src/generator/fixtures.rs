//! Canonical policy and workload fixtures
//!
//! Generators start from these and change only what their scenario is about.

use super::builder::ScenarioBuilder;
use crate::bounds::{ResourceBound, ResourceBounds, ResourceRequest};
use crate::mode::PolicyMode;
use crate::models::{
    MetricsConfig, PolicyConfig, ResourceRequirements, TestScenario, UpdateStrategy,
    WorkloadConfig, WorkloadKind, DEFAULT_RECONCILIATION_INTERVAL_SECS,
};
use crate::quantity::{CpuQuantity, MemoryQuantity};
use std::collections::BTreeMap;

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_IMAGE: &str = "nginx:1.25";

/// Limits are this multiple of requests unless a scenario says otherwise
pub const LIMIT_FACTOR: u64 = 2;

/// 100m..2000m CPU, 128Mi..2Gi memory
pub fn canonical_bounds() -> ResourceBounds {
    ResourceBounds::new(
        ResourceBound::new(CpuQuantity::from_millicores(100), CpuQuantity::from_cores(2)),
        ResourceBound::new(MemoryQuantity::from_mebibytes(128), MemoryQuantity::from_gibibytes(2)),
    )
}

/// 250m CPU, 256Mi memory
pub fn canonical_requests() -> ResourceRequest {
    ResourceRequest::new(
        CpuQuantity::from_millicores(250),
        MemoryQuantity::from_mebibytes(256),
    )
}

/// Replica count that satisfies the kind's replica rule
pub fn replicas_for(kind: WorkloadKind) -> u32 {
    if kind.is_replica_controlled() {
        2
    } else {
        0
    }
}

fn app_labels(app: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("app".to_string(), app.to_string())])
}

/// Policy named `<app>-policy` selecting `app=<app>`
pub fn policy(app: &str, mode: PolicyMode) -> PolicyConfig {
    PolicyConfig {
        name: format!("{app}-policy"),
        mode,
        target_selector: app_labels(app),
        namespace_selector: BTreeMap::new(),
        resource_bounds: canonical_bounds(),
        metrics: MetricsConfig::default(),
        update_strategy: UpdateStrategy::default(),
        reconciliation_interval_secs: DEFAULT_RECONCILIATION_INTERVAL_SECS,
    }
}

pub fn workload(app: &str, kind: WorkloadKind) -> WorkloadConfig {
    WorkloadConfig {
        name: app.to_string(),
        namespace: DEFAULT_NAMESPACE.to_string(),
        kind,
        labels: app_labels(app),
        resources: ResourceRequirements::with_limit_factor(canonical_requests(), LIMIT_FACTOR),
        replicas: replicas_for(kind),
        image: DEFAULT_IMAGE.to_string(),
        containers: Vec::new(),
    }
}

/// Canonical scenario with an oracle-derived expectation
pub fn scenario(app: &str, mode: PolicyMode, kind: WorkloadKind) -> TestScenario {
    ScenarioBuilder::new(app, policy(app, mode), workload(app, kind)).build()
}
