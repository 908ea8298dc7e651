//! Error taxonomy for scenario validation
//!
//! Parse and bound errors live next to the code that raises them
//! ([`crate::quantity`], [`crate::bounds`]); this module defines the
//! structural and expectation errors and the aggregate report returned when
//! a scenario fails validation.

use crate::annotations::AnnotationError;
use crate::bounds::{BoundsClassification, InvalidBoundError};
use crate::mode::ConsistencyError;
use crate::models::{ErrorKind, WorkloadKind};
use thiserror::Error;

/// Malformed policy or workload configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("policy name is empty")]
    EmptyPolicyName,

    #[error(transparent)]
    InvalidBound(#[from] InvalidBoundError),

    #[error("safety factor {0} is below 1.0")]
    SafetyFactorBelowOne(f64),

    #[error("metrics provider is empty")]
    EmptyMetricsProvider,

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("workload name is empty")]
    EmptyWorkloadName,

    #[error("workload namespace is empty")]
    EmptyNamespace,

    #[error("workload image is empty")]
    EmptyImage,

    #[error("{kind} workload has {replicas} replicas (expected {expected})")]
    ReplicaCount {
        kind: WorkloadKind,
        replicas: u32,
        expected: &'static str,
    },

    #[error("{scope}: {dimension} request {request} exceeds limit {limit}")]
    RequestExceedsLimit {
        scope: String,
        dimension: &'static str,
        request: String,
        limit: String,
    },

    #[error("container override #{0} has an empty name")]
    EmptyContainerName(usize),

    #[error("container override '{0}' is defined more than once")]
    DuplicateContainerName(String),
}

/// Expectation that contradicts what the oracle predicts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpectationError {
    #[error("should_error is set without an error kind")]
    MissingErrorKind,

    #[error("expects a {0} error but the configuration is well-formed")]
    ErrorNotPredicted(ErrorKind),

    #[error("{dimension} predicted {predicted}, classifier says {actual}")]
    BoundsMismatch {
        dimension: &'static str,
        predicted: BoundsClassification,
        actual: BoundsClassification,
    },
}

/// Category of a validation defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectKind {
    Structural,
    Consistency,
    Expectation,
    Annotation,
}

/// One finding that makes a scenario invalid
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Defect {
    #[error("structural: {0}")]
    Structural(#[from] StructuralError),

    #[error("consistency: {0}")]
    Consistency(#[from] ConsistencyError),

    #[error("expectation: {0}")]
    Expectation(#[from] ExpectationError),

    #[error("annotation: {0}")]
    Annotation(#[from] AnnotationError),
}

impl Defect {
    pub fn kind(&self) -> DefectKind {
        match self {
            Self::Structural(_) => DefectKind::Structural,
            Self::Consistency(_) => DefectKind::Consistency,
            Self::Expectation(_) => DefectKind::Expectation,
            Self::Annotation(_) => DefectKind::Annotation,
        }
    }
}

/// Warning-class finding; does not fail validation on its own
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationWarning {
    #[error(
        "{scope}: memory request {current} drops to {clamped} ({percent:.0}% decrease) without a memory-decrease-warning annotation"
    )]
    MissingMemoryDecreaseWarning {
        scope: String,
        current: String,
        clamped: String,
        percent: f64,
    },
}

/// Every defect and warning found in one scenario
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "scenario '{}' failed validation with {} defect(s): {}",
    .scenario,
    .defects.len(),
    summarize(.defects)
)]
pub struct ValidationError {
    pub scenario: String,
    pub defects: Vec<Defect>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationError {
    pub fn has_kind(&self, kind: DefectKind) -> bool {
        self.defects.iter().any(|d| d.kind() == kind)
    }

    pub fn count_kind(&self, kind: DefectKind) -> usize {
        self.defects.iter().filter(|d| d.kind() == kind).count()
    }
}

fn summarize(defects: &[Defect]) -> String {
    defects
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{ExpectationField, PolicyMode};

    #[test]
    fn test_defect_kinds() {
        let structural: Defect = StructuralError::EmptyImage.into();
        assert_eq!(structural.kind(), DefectKind::Structural);

        let consistency: Defect = ConsistencyError {
            mode: PolicyMode::Disabled,
            field: ExpectationField::ShouldApplyUpdates,
            expected: false,
            observed: true,
        }
        .into();
        assert_eq!(consistency.kind(), DefectKind::Consistency);
    }

    #[test]
    fn test_invalid_bound_is_structural() {
        let bound_err = InvalidBoundError {
            dimension: "cpu",
            min: "2000m".to_string(),
            max: "1000m".to_string(),
        };
        let defect: Defect = StructuralError::from(bound_err).into();
        assert_eq!(defect.kind(), DefectKind::Structural);
        assert_eq!(
            defect.to_string(),
            "structural: invalid cpu bound: min 2000m exceeds max 1000m"
        );
    }

    #[test]
    fn test_validation_error_lists_every_defect() {
        let err = ValidationError {
            scenario: "broken".to_string(),
            defects: vec![
                StructuralError::EmptyPolicyName.into(),
                StructuralError::EmptyImage.into(),
                ExpectationError::MissingErrorKind.into(),
            ],
            warnings: Vec::new(),
        };
        let message = err.to_string();
        assert!(message.contains("3 defect(s)"));
        assert!(message.contains("policy name is empty"));
        assert!(message.contains("workload image is empty"));
        assert_eq!(err.count_kind(DefectKind::Structural), 2);
        assert!(err.has_kind(DefectKind::Expectation));
        assert!(!err.has_kind(DefectKind::Annotation));
    }
}
