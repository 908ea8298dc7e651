//! Scenario validation
//!
//! Cross-checks a scenario's policy, workload and expectation. Every check
//! runs even after an earlier one fails, so one report lists every defect.
//! Warning-class findings (memory safety) are reported separately and do not
//! fail validation on their own.

mod memory_safety;

pub use memory_safety::{large_memory_decreases, MemoryDecrease, DEFAULT_MEMORY_DECREASE_THRESHOLD};

use crate::annotations::{has_memory_decrease_warning, validate_annotations};
use crate::bounds::ResourceRequest;
use crate::error::{Defect, ExpectationError, StructuralError, ValidationError, ValidationWarning};
use crate::mode::consistency_mismatches;
use crate::models::{PolicyConfig, ResourceRequirements, TestScenario, WorkloadConfig};
use std::collections::HashSet;
use tracing::debug;

/// Validator configuration
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Fraction of a memory request that may be removed without a warning
    pub memory_decrease_threshold: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            memory_decrease_threshold: DEFAULT_MEMORY_DECREASE_THRESHOLD,
        }
    }
}

/// Outcome of a scenario that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub scenario: String,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Validates scenarios against the mode contract and bounds classifier
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn validate(&self, scenario: &TestScenario) -> Result<ValidationReport, ValidationError> {
        let mut defects = Vec::new();

        let structural = check_policy(&scenario.policy)
            .into_iter()
            .chain(check_workload(&scenario.workload))
            .collect::<Vec<_>>();
        let well_formed = structural.is_empty();
        defects.extend(structural.into_iter().map(Defect::from));

        defects.extend(check_expectation(scenario, well_formed));
        defects.extend(
            validate_annotations(&scenario.expectation.expected_annotations)
                .into_iter()
                .map(Defect::from),
        );

        let warnings = self.check_memory_safety(scenario);

        if defects.is_empty() {
            Ok(ValidationReport {
                scenario: scenario.name.clone(),
                warnings,
            })
        } else {
            debug!(
                scenario = %scenario.name,
                defects = defects.len(),
                warnings = warnings.len(),
                "Scenario failed validation"
            );
            Err(ValidationError {
                scenario: scenario.name.clone(),
                defects,
                warnings,
            })
        }
    }

    fn check_memory_safety(&self, scenario: &TestScenario) -> Vec<ValidationWarning> {
        let expectation = &scenario.expectation;
        if !expectation.should_generate_recommendations
            || has_memory_decrease_warning(&expectation.expected_annotations)
        {
            return Vec::new();
        }

        large_memory_decreases(
            &scenario.policy,
            &scenario.workload,
            self.config.memory_decrease_threshold,
        )
        .into_iter()
        .map(|d| ValidationWarning::MissingMemoryDecreaseWarning {
            scope: d.scope,
            current: d.current.format(),
            clamped: d.clamped.format(),
            percent: d.ratio * 100.0,
        })
        .collect()
    }
}

/// Validate with the default configuration
pub fn validate_scenario(scenario: &TestScenario) -> Result<ValidationReport, ValidationError> {
    Validator::default().validate(scenario)
}

/// Policy well-formedness: name, bounds, metrics parameters, intervals
pub fn check_policy(policy: &PolicyConfig) -> Vec<StructuralError> {
    let mut errors = Vec::new();

    if policy.name.trim().is_empty() {
        errors.push(StructuralError::EmptyPolicyName);
    }
    errors.extend(
        policy
            .resource_bounds
            .validate()
            .into_iter()
            .map(StructuralError::from),
    );

    let metrics = &policy.metrics;
    // NaN fails this comparison too
    if !(metrics.safety_factor >= 1.0) {
        errors.push(StructuralError::SafetyFactorBelowOne(metrics.safety_factor));
    }
    if metrics.provider.trim().is_empty() {
        errors.push(StructuralError::EmptyMetricsProvider);
    }
    if metrics.rolling_window_secs == 0 {
        errors.push(StructuralError::ZeroInterval("rolling window"));
    }
    if policy.reconciliation_interval_secs == 0 {
        errors.push(StructuralError::ZeroInterval("reconciliation interval"));
    }

    errors
}

fn check_requirements(scope: &str, resources: &ResourceRequirements) -> Vec<StructuralError> {
    let ResourceRequirements { requests, limits } = resources;
    let ResourceRequest { cpu, memory } = requests;
    let mut errors = Vec::new();

    if *cpu > limits.cpu {
        errors.push(StructuralError::RequestExceedsLimit {
            scope: scope.to_string(),
            dimension: "cpu",
            request: cpu.format(),
            limit: limits.cpu.format(),
        });
    }
    if *memory > limits.memory {
        errors.push(StructuralError::RequestExceedsLimit {
            scope: scope.to_string(),
            dimension: "memory",
            request: memory.format(),
            limit: limits.memory.format(),
        });
    }

    errors
}

/// Workload well-formedness: identity, replica rule, requests vs limits
pub fn check_workload(workload: &WorkloadConfig) -> Vec<StructuralError> {
    let mut errors = Vec::new();

    if workload.name.trim().is_empty() {
        errors.push(StructuralError::EmptyWorkloadName);
    }
    if workload.namespace.trim().is_empty() {
        errors.push(StructuralError::EmptyNamespace);
    }
    if workload.image.trim().is_empty() {
        errors.push(StructuralError::EmptyImage);
    }
    if !workload.kind.accepts_replicas(workload.replicas) {
        errors.push(StructuralError::ReplicaCount {
            kind: workload.kind,
            replicas: workload.replicas,
            expected: if workload.kind.is_replica_controlled() {
                "at least 1"
            } else {
                "exactly 0"
            },
        });
    }
    errors.extend(check_requirements("workload", &workload.resources));

    let mut seen = HashSet::new();
    for (index, container) in workload.containers.iter().enumerate() {
        if container.name.trim().is_empty() {
            errors.push(StructuralError::EmptyContainerName(index));
            continue;
        }
        if !seen.insert(container.name.as_str()) {
            errors.push(StructuralError::DuplicateContainerName(container.name.clone()));
        }
        errors.extend(check_requirements(
            &format!("container {}", container.name),
            &container.resources,
        ));
    }

    errors
}

/// Expectation consistency with the mode contract and the classifier
///
/// Delegated expectations skip both checks. An oracle-owned `should_error`
/// expectation also skips them: only the predicted rejection is checked.
fn check_expectation(scenario: &TestScenario, well_formed: bool) -> Vec<Defect> {
    let expectation = &scenario.expectation;
    let mut defects = Vec::new();

    if expectation.should_error && expectation.error_kind.is_none() {
        defects.push(ExpectationError::MissingErrorKind.into());
    }

    // Reconciler-owned outcomes are not locally computable
    if expectation.is_delegated() {
        return defects;
    }

    if expectation.should_error {
        // A rejected configuration yields neither recommendations nor updates,
        // so only the rejection itself is checked.
        if well_formed {
            if let Some(kind) = expectation.error_kind {
                defects.push(ExpectationError::ErrorNotPredicted(kind).into());
            }
        }
        return defects;
    }

    defects.extend(
        consistency_mismatches(scenario.policy.mode, expectation)
            .into_iter()
            .map(Defect::from),
    );

    if let Some(predicted) = expectation.bounds {
        let bounds = &scenario.policy.resource_bounds;
        let requests = &scenario.workload.resources.requests;
        if let Ok(actual) = bounds.classify(requests) {
            if predicted.cpu != actual.cpu {
                defects.push(
                    ExpectationError::BoundsMismatch {
                        dimension: "cpu",
                        predicted: predicted.cpu,
                        actual: actual.cpu,
                    }
                    .into(),
                );
            }
            if predicted.memory != actual.memory {
                defects.push(
                    ExpectationError::BoundsMismatch {
                        dimension: "memory",
                        predicted: predicted.memory,
                        actual: actual.memory,
                    }
                    .into(),
                );
            }
        }
    }

    defects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::MEMORY_DECREASE_WARNING;
    use crate::bounds::{BoundsClassification, BoundsExpectation, ResourceBound};
    use crate::error::DefectKind;
    use crate::generator::fixtures;
    use crate::mode::PolicyMode;
    use crate::models::{ContainerOverride, ErrorKind, ScenarioExpectation, WorkloadKind};
    use crate::quantity::{CpuQuantity, MemoryQuantity};

    fn scenario(mode: PolicyMode, kind: WorkloadKind) -> TestScenario {
        fixtures::scenario("validation", mode, kind)
    }

    #[test]
    fn test_canonical_scenario_passes() {
        for mode in PolicyMode::ALL {
            for kind in WorkloadKind::ALL {
                let report = validate_scenario(&scenario(mode, kind)).unwrap();
                assert!(report.is_clean(), "{mode} {kind}");
            }
        }
    }

    #[test]
    fn test_invalid_bound_is_structural_defect() {
        let mut s = scenario(PolicyMode::Auto, WorkloadKind::Deployment);
        s.policy.resource_bounds.cpu = ResourceBound::new(
            CpuQuantity::from_millicores(2000),
            CpuQuantity::from_millicores(1000),
        );
        let err = validate_scenario(&s).unwrap_err();
        assert!(err.defects.iter().any(|d| matches!(
            d,
            Defect::Structural(StructuralError::InvalidBound(b)) if b.dimension == "cpu"
        )));
    }

    #[test]
    fn test_all_defects_reported_together() {
        let mut s = scenario(PolicyMode::Recommend, WorkloadKind::DaemonSet);
        s.policy.name = String::new();
        s.workload.image = "  ".to_string();
        s.workload.replicas = 3;
        s.expectation.should_apply_updates = true;

        let err = validate_scenario(&s).unwrap_err();
        assert_eq!(err.count_kind(DefectKind::Structural), 3);
        assert_eq!(err.count_kind(DefectKind::Consistency), 1);
    }

    #[test]
    fn test_daemonset_replica_rule() {
        let mut s = scenario(PolicyMode::Auto, WorkloadKind::DaemonSet);
        s.workload.replicas = 1;
        let err = validate_scenario(&s).unwrap_err();
        assert!(err.defects.iter().any(|d| matches!(
            d,
            Defect::Structural(StructuralError::ReplicaCount { replicas: 1, .. })
        )));

        let mut s = scenario(PolicyMode::Auto, WorkloadKind::StatefulSet);
        s.workload.replicas = 0;
        assert!(validate_scenario(&s).is_err());
    }

    #[test]
    fn test_policy_parameter_checks() {
        let mut policy = scenario(PolicyMode::Auto, WorkloadKind::Deployment).policy;
        policy.metrics.safety_factor = 0.9;
        policy.metrics.rolling_window_secs = 0;
        policy.reconciliation_interval_secs = 0;
        let errors = check_policy(&policy);
        assert_eq!(errors.len(), 3);

        policy.metrics.safety_factor = f64::NAN;
        assert!(check_policy(&policy)
            .iter()
            .any(|e| matches!(e, StructuralError::SafetyFactorBelowOne(_))));
    }

    #[test]
    fn test_request_above_limit_and_container_rules() {
        let mut workload = scenario(PolicyMode::Auto, WorkloadKind::Deployment).workload;
        workload.resources.limits.memory = MemoryQuantity::from_mebibytes(1);
        let base = workload.resources;
        workload.containers = vec![
            ContainerOverride {
                name: "app".to_string(),
                resources: base,
            },
            ContainerOverride {
                name: "app".to_string(),
                resources: workload.resources,
            },
            ContainerOverride {
                name: String::new(),
                resources: workload.resources,
            },
        ];
        let errors = check_workload(&workload);
        assert!(errors.contains(&StructuralError::DuplicateContainerName("app".to_string())));
        assert!(errors.contains(&StructuralError::EmptyContainerName(2)));
        // workload plus both named containers exceed the memory limit
        let over_limit = errors
            .iter()
            .filter(|e| matches!(e, StructuralError::RequestExceedsLimit { .. }))
            .count();
        assert_eq!(over_limit, 3);
    }

    #[test]
    fn test_mode_mismatch_reported() {
        let mut s = scenario(PolicyMode::Disabled, WorkloadKind::Deployment);
        s.expectation.should_generate_recommendations = true;
        let err = validate_scenario(&s).unwrap_err();
        assert_eq!(err.count_kind(DefectKind::Consistency), 1);
    }

    #[test]
    fn test_bounds_prediction_checked() {
        let mut s = scenario(PolicyMode::Auto, WorkloadKind::Deployment);
        s.expectation.bounds = Some(BoundsExpectation::uniform(BoundsClassification::ClampedToMax));
        let err = validate_scenario(&s).unwrap_err();
        assert!(err.has_kind(DefectKind::Expectation));
    }

    #[test]
    fn test_should_error_requires_kind_and_a_reason() {
        let mut s = scenario(PolicyMode::Auto, WorkloadKind::Deployment);
        s.expectation = ScenarioExpectation::failure(ErrorKind::InvalidBounds);
        s.expectation.error_kind = None;
        let err = validate_scenario(&s).unwrap_err();
        assert!(err
            .defects
            .contains(&Defect::Expectation(ExpectationError::MissingErrorKind)));

        s.expectation.error_kind = Some(ErrorKind::InvalidBounds);
        let err = validate_scenario(&s).unwrap_err();
        assert!(err.defects.contains(&Defect::Expectation(
            ExpectationError::ErrorNotPredicted(ErrorKind::InvalidBounds)
        )));
    }

    #[test]
    fn test_predicted_rejection_skips_mode_contract() {
        let mut s = scenario(PolicyMode::Auto, WorkloadKind::Deployment);
        s.policy.resource_bounds.cpu =
            ResourceBound::new(CpuQuantity::from_millicores(2000), CpuQuantity::from_millicores(1000));
        s.expectation = ScenarioExpectation::failure(ErrorKind::InvalidBounds);
        s.expectation.bounds = Some(BoundsExpectation::uniform(BoundsClassification::Within));
        assert!(!s.expectation.should_apply_updates);

        let err = validate_scenario(&s).unwrap_err();
        assert!(err.has_kind(DefectKind::Structural));
        assert!(!err.has_kind(DefectKind::Consistency));
        assert!(!err.has_kind(DefectKind::Expectation));
    }

    #[test]
    fn test_delegated_expectation_skips_mode_contract() {
        let mut s = scenario(PolicyMode::Auto, WorkloadKind::Deployment);
        s.expectation = ScenarioExpectation::delegated(ErrorKind::PermissionDenied);
        assert!(validate_scenario(&s).is_ok());
    }

    #[test]
    fn test_memory_decrease_without_annotation_warns() {
        let mut s = scenario(PolicyMode::Auto, WorkloadKind::Deployment);
        s.policy.resource_bounds.memory =
            ResourceBound::new(MemoryQuantity::from_mebibytes(128), MemoryQuantity::from_gibibytes(1));
        s.workload.resources.requests.memory = MemoryQuantity::from_gibibytes(4);
        s.workload.resources.limits.memory = MemoryQuantity::from_gibibytes(4);
        s.expectation.bounds = None;
        s.expectation.expected_annotations.clear();

        let report = validate_scenario(&s).unwrap();
        assert_eq!(report.warnings.len(), 1);
        let ValidationWarning::MissingMemoryDecreaseWarning { current, clamped, percent, .. } =
            &report.warnings[0];
        assert_eq!(current, "4Gi");
        assert_eq!(clamped, "1Gi");
        assert_eq!(*percent, 75.0);

        s.expectation
            .expected_annotations
            .insert(MEMORY_DECREASE_WARNING.to_string(), "true".to_string());
        assert!(validate_scenario(&s).unwrap().is_clean());
    }

    #[test]
    fn test_memory_rule_only_when_recommending() {
        let mut s = scenario(PolicyMode::Disabled, WorkloadKind::Deployment);
        s.policy.resource_bounds.memory =
            ResourceBound::new(MemoryQuantity::from_mebibytes(128), MemoryQuantity::from_gibibytes(1));
        s.workload.resources.requests.memory = MemoryQuantity::from_gibibytes(4);
        s.workload.resources.limits.memory = MemoryQuantity::from_gibibytes(4);
        s.expectation.bounds = None;
        assert!(validate_scenario(&s).unwrap().is_clean());
    }

    #[test]
    fn test_threshold_is_configurable() {
        let mut s = scenario(PolicyMode::Auto, WorkloadKind::Deployment);
        s.policy.resource_bounds.memory =
            ResourceBound::new(MemoryQuantity::from_mebibytes(128), MemoryQuantity::from_gibibytes(1));
        s.workload.resources.requests.memory = MemoryQuantity::from_gibibytes(4);
        s.workload.resources.limits.memory = MemoryQuantity::from_gibibytes(4);
        s.expectation.bounds = None;
        s.expectation.expected_annotations.clear();

        let lenient = Validator::with_config(ValidatorConfig {
            memory_decrease_threshold: 0.8,
        });
        assert!(lenient.validate(&s).unwrap().is_clean());
    }

    #[test]
    fn test_malformed_annotation_is_defect() {
        let mut s = scenario(PolicyMode::Auto, WorkloadKind::Deployment);
        s.expectation
            .expected_annotations
            .insert(crate::annotations::ENABLED.to_string(), "yes".to_string());
        let err = validate_scenario(&s).unwrap_err();
        assert!(err.has_kind(DefectKind::Annotation));
    }
}
