//! Memory-decrease safety rule
//!
//! A recommendation that cuts a memory request by more than the threshold
//! risks OOM kills, so the scenario must announce it with a
//! `memory-decrease-warning` annotation.

use crate::bounds::ResourceBound;
use crate::models::{PolicyConfig, WorkloadConfig};
use crate::quantity::{Memory, MemoryQuantity};

/// Default fraction above which a memory decrease needs a warning (50%)
pub const DEFAULT_MEMORY_DECREASE_THRESHOLD: f64 = 0.5;

/// A memory request that clamping would cut by more than the threshold
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDecrease {
    /// `"workload"` or `"container <name>"`
    pub scope: String,
    pub current: MemoryQuantity,
    pub clamped: MemoryQuantity,
    pub ratio: f64,
}

fn decrease(
    bound: &ResourceBound<Memory>,
    scope: String,
    current: MemoryQuantity,
    threshold: f64,
) -> Option<MemoryDecrease> {
    let clamped = bound.clamp(&current).ok()?;
    let ratio = current.decrease_ratio(&clamped);
    (ratio > threshold).then_some(MemoryDecrease {
        scope,
        current,
        clamped,
        ratio,
    })
}

/// Requests in the workload (and its container overrides) that clamping would
/// decrease by more than `threshold`. Invalid memory bounds yield nothing;
/// they are reported as structural defects instead.
pub fn large_memory_decreases(
    policy: &PolicyConfig,
    workload: &WorkloadConfig,
    threshold: f64,
) -> Vec<MemoryDecrease> {
    let bound = &policy.resource_bounds.memory;
    let workload_scope = std::iter::once((
        "workload".to_string(),
        workload.resources.requests.memory,
    ));
    let container_scopes = workload.containers.iter().map(|c| {
        (
            format!("container {}", c.name),
            c.resources.requests.memory,
        )
    });

    workload_scope
        .chain(container_scopes)
        .filter_map(|(scope, current)| decrease(bound, scope, current, threshold))
        .collect()
}
