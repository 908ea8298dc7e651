//! Scenario construction with oracle-derived expectations
//!
//! The builder predicts what a conforming reconciler does with a policy and
//! workload, so every generator gets a self-consistent expectation without
//! restating the mode contract or the bounds rules.

use crate::annotations::{
    CPU_RECOMMENDATION, ENABLED, MANAGED, MEMORY_DECREASE_WARNING, MEMORY_RECOMMENDATION,
};
use crate::bounds::BoundsExpectation;
use crate::error::StructuralError;
use crate::mode::PolicyMode;
use crate::models::{ErrorKind, PolicyConfig, ScenarioExpectation, ScenarioTag, TestScenario, WorkloadConfig};
use crate::validation::{check_policy, check_workload, large_memory_decreases, DEFAULT_MEMORY_DECREASE_THRESHOLD};
use std::collections::BTreeSet;

/// Expectation a conforming reconciler satisfies for this policy and workload
///
/// Malformed configurations are predicted to be rejected: invalid bounds with
/// [`ErrorKind::InvalidBounds`], anything else with
/// [`ErrorKind::InvalidConfiguration`].
pub fn derive_expectation(
    policy: &PolicyConfig,
    workload: &WorkloadConfig,
    memory_decrease_threshold: f64,
) -> ScenarioExpectation {
    let structural: Vec<StructuralError> = check_policy(policy)
        .into_iter()
        .chain(check_workload(workload))
        .collect();
    if !structural.is_empty() {
        let kind = if structural
            .iter()
            .any(|e| matches!(e, StructuralError::InvalidBound(_)))
        {
            ErrorKind::InvalidBounds
        } else {
            ErrorKind::InvalidConfiguration
        };
        return ScenarioExpectation::failure(kind);
    }

    let mut expectation = ScenarioExpectation::for_mode(policy.mode);
    let annotations = &mut expectation.expected_annotations;
    annotations.insert(MANAGED.to_string(), "true".to_string());
    annotations.insert(
        ENABLED.to_string(),
        (policy.mode != PolicyMode::Disabled).to_string(),
    );

    let bounds = &policy.resource_bounds;
    let requests = &workload.resources.requests;
    // bounds were validated above
    if let (Ok(classification), Ok(clamped)) = (bounds.classify(requests), bounds.clamp(requests)) {
        expectation.bounds = Some(classification);

        if expectation.should_generate_recommendations {
            let annotations = &mut expectation.expected_annotations;
            annotations.insert(CPU_RECOMMENDATION.to_string(), clamped.cpu.format());
            annotations.insert(MEMORY_RECOMMENDATION.to_string(), clamped.memory.format());

            if !large_memory_decreases(policy, workload, memory_decrease_threshold).is_empty() {
                annotations.insert(MEMORY_DECREASE_WARNING.to_string(), "true".to_string());
            }
        }
    }

    expectation
}

/// Assembles a [`TestScenario`]
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    name: String,
    policy: PolicyConfig,
    workload: WorkloadConfig,
    edge_case: bool,
    tags: BTreeSet<ScenarioTag>,
    memory_decrease_threshold: f64,
    expected_bounds: Option<BoundsExpectation>,
}

impl ScenarioBuilder {
    pub fn new(name: impl Into<String>, policy: PolicyConfig, workload: WorkloadConfig) -> Self {
        Self {
            name: name.into(),
            policy,
            workload,
            edge_case: false,
            tags: BTreeSet::new(),
            memory_decrease_threshold: DEFAULT_MEMORY_DECREASE_THRESHOLD,
            expected_bounds: None,
        }
    }

    pub fn tag(mut self, tag: ScenarioTag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = ScenarioTag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Mark as an edge case (also adds [`ScenarioTag::EdgeCase`])
    pub fn edge_case(mut self) -> Self {
        self.edge_case = true;
        self.tags.insert(ScenarioTag::EdgeCase);
        self
    }

    pub fn memory_decrease_threshold(mut self, threshold: f64) -> Self {
        self.memory_decrease_threshold = threshold;
        self
    }

    /// Record the classification the scenario was constructed to produce
    ///
    /// Replaces the classifier's answer in [`build`](Self::build), so a
    /// construction that misses its target fails validation instead of
    /// agreeing with itself.
    pub fn expect_bounds(mut self, bounds: BoundsExpectation) -> Self {
        self.expected_bounds = Some(bounds);
        self
    }

    /// Build with the oracle-derived expectation
    pub fn build(self) -> TestScenario {
        let mut expectation =
            derive_expectation(&self.policy, &self.workload, self.memory_decrease_threshold);
        if let Some(bounds) = self.expected_bounds {
            if !expectation.should_error {
                expectation.bounds = Some(bounds);
            }
        }
        self.build_with(expectation)
    }

    /// Build with an explicit expectation
    pub fn build_with(self, expectation: ScenarioExpectation) -> TestScenario {
        TestScenario {
            name: self.name,
            policy: self.policy,
            workload: self.workload,
            expectation,
            edge_case: self.edge_case,
            tags: self.tags,
        }
    }
}
