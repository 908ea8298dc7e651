//! Bounds classification
//!
//! Decides where a requested quantity falls relative to a policy's
//! `[min, max]` bound and predicts the value a conforming recommender emits
//! after enforcing it. Bounds are inclusive at both edges.

use crate::quantity::{Cpu, CpuQuantity, Dimension, Memory, MemoryQuantity, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Bound whose minimum exceeds its maximum
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {dimension} bound: min {min} exceeds max {max}")]
pub struct InvalidBoundError {
    pub dimension: &'static str,
    pub min: String,
    pub max: String,
}

/// Where a request falls relative to a bound, ordered by position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsClassification {
    /// Below the minimum; enforcement raises it to `min`
    ClampedToMin,
    /// Inside `[min, max]`; left unchanged
    Within,
    /// Above the maximum; enforcement lowers it to `max`
    ClampedToMax,
}

impl BoundsClassification {
    pub const ALL: [BoundsClassification; 3] = [
        BoundsClassification::ClampedToMin,
        BoundsClassification::Within,
        BoundsClassification::ClampedToMax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClampedToMin => "clamped_to_min",
            Self::Within => "within",
            Self::ClampedToMax => "clamped_to_max",
        }
    }

    /// Returns true if enforcement changes the requested value
    pub fn is_clamped(&self) -> bool {
        !matches!(self, Self::Within)
    }
}

impl fmt::Display for BoundsClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Min/max bound for one resource dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ResourceBound<D: Dimension> {
    pub min: Quantity<D>,
    pub max: Quantity<D>,
}

impl<D: Dimension> ResourceBound<D> {
    /// Build a bound without checking it; use [`ResourceBound::validate`]
    /// or [`ResourceBound::checked`] to enforce `min <= max`
    pub fn new(min: Quantity<D>, max: Quantity<D>) -> Self {
        Self { min, max }
    }

    /// Build a bound, rejecting `min > max`
    pub fn checked(min: Quantity<D>, max: Quantity<D>) -> Result<Self, InvalidBoundError> {
        let bound = Self::new(min, max);
        bound.validate()?;
        Ok(bound)
    }

    pub fn validate(&self) -> Result<(), InvalidBoundError> {
        if self.min > self.max {
            return Err(InvalidBoundError {
                dimension: D::NAME,
                min: self.min.format(),
                max: self.max.format(),
            });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Classify a requested value against this bound
    pub fn classify(&self, requested: &Quantity<D>) -> Result<BoundsClassification, InvalidBoundError> {
        self.validate()?;
        Ok(if *requested < self.min {
            BoundsClassification::ClampedToMin
        } else if *requested > self.max {
            BoundsClassification::ClampedToMax
        } else {
            BoundsClassification::Within
        })
    }

    /// Value a conforming recommender emits after enforcing this bound
    pub fn clamp(&self, requested: &Quantity<D>) -> Result<Quantity<D>, InvalidBoundError> {
        Ok(match self.classify(requested)? {
            BoundsClassification::ClampedToMin => self.min,
            BoundsClassification::ClampedToMax => self.max,
            BoundsClassification::Within => *requested,
        })
    }
}

/// Free-function form of [`ResourceBound::classify`]
pub fn classify<D: Dimension>(
    bound: &ResourceBound<D>,
    requested: &Quantity<D>,
) -> Result<BoundsClassification, InvalidBoundError> {
    bound.classify(requested)
}

/// Free-function form of [`ResourceBound::clamp`]
pub fn clamp_to_bounds<D: Dimension>(
    bound: &ResourceBound<D>,
    requested: &Quantity<D>,
) -> Result<Quantity<D>, InvalidBoundError> {
    bound.clamp(requested)
}

/// Per-dimension bounds of a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBounds {
    pub cpu: ResourceBound<Cpu>,
    pub memory: ResourceBound<Memory>,
}

/// Requested amount per dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub cpu: CpuQuantity,
    pub memory: MemoryQuantity,
}

impl ResourceRequest {
    pub fn new(cpu: CpuQuantity, memory: MemoryQuantity) -> Self {
        Self { cpu, memory }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.cpu.is_zero() && self.memory.is_zero()
    }

    /// Returns true if both dimensions are at most `other`'s
    pub fn fits_within(&self, other: &ResourceRequest) -> bool {
        self.cpu <= other.cpu && self.memory <= other.memory
    }
}

/// Predicted classification for each dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundsExpectation {
    pub cpu: BoundsClassification,
    pub memory: BoundsClassification,
}

impl BoundsExpectation {
    pub fn uniform(classification: BoundsClassification) -> Self {
        Self {
            cpu: classification,
            memory: classification,
        }
    }
}

impl ResourceBounds {
    pub fn new(cpu: ResourceBound<Cpu>, memory: ResourceBound<Memory>) -> Self {
        Self { cpu, memory }
    }

    /// All bound defects, one per invalid dimension
    pub fn validate(&self) -> Vec<InvalidBoundError> {
        [self.cpu.validate().err(), self.memory.validate().err()]
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn classify(&self, request: &ResourceRequest) -> Result<BoundsExpectation, InvalidBoundError> {
        Ok(BoundsExpectation {
            cpu: self.cpu.classify(&request.cpu)?,
            memory: self.memory.classify(&request.memory)?,
        })
    }

    pub fn clamp(&self, request: &ResourceRequest) -> Result<ResourceRequest, InvalidBoundError> {
        Ok(ResourceRequest {
            cpu: self.cpu.clamp(&request.cpu)?,
            memory: self.memory.clamp(&request.memory)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu(s: &str) -> CpuQuantity {
        s.parse().unwrap()
    }

    fn cpu_bound(min: &str, max: &str) -> ResourceBound<Cpu> {
        ResourceBound::new(cpu(min), cpu(max))
    }

    #[test]
    fn test_within_bounds() {
        let bound = cpu_bound("200m", "1000m");
        assert_eq!(bound.classify(&cpu("500m")), Ok(BoundsClassification::Within));
        assert_eq!(bound.clamp(&cpu("500m")).unwrap(), cpu("500m"));
    }

    #[test]
    fn test_clamped_to_min() {
        let bound = cpu_bound("200m", "1000m");
        assert_eq!(bound.classify(&cpu("100m")), Ok(BoundsClassification::ClampedToMin));
        assert_eq!(bound.clamp(&cpu("100m")).unwrap().format(), "200m");
    }

    #[test]
    fn test_clamped_to_max() {
        let bound = cpu_bound("200m", "1000m");
        assert_eq!(bound.classify(&cpu("2000m")), Ok(BoundsClassification::ClampedToMax));
        assert_eq!(clamp_to_bounds(&bound, &cpu("2000m")).unwrap().format(), "1000m");
    }

    #[test]
    fn test_edges_are_inclusive() {
        let bound = cpu_bound("200m", "1000m");
        assert_eq!(classify(&bound, &cpu("200m")), Ok(BoundsClassification::Within));
        assert_eq!(classify(&bound, &cpu("1")), Ok(BoundsClassification::Within));
    }

    #[test]
    fn test_zero_request_classifies() {
        let bound = cpu_bound("200m", "1000m");
        assert_eq!(bound.classify(&CpuQuantity::zero()), Ok(BoundsClassification::ClampedToMin));
        let open = cpu_bound("0m", "1000m");
        assert_eq!(open.classify(&CpuQuantity::zero()), Ok(BoundsClassification::Within));
    }

    #[test]
    fn test_invalid_bound_rejected() {
        let bound = cpu_bound("2000m", "1000m");
        let err = bound.classify(&cpu("1500m")).unwrap_err();
        assert_eq!(err.dimension, "cpu");
        assert_eq!(err.min, "2000m");
        assert!(bound.clamp(&cpu("1500m")).is_err());
        assert!(ResourceBound::checked(cpu("2000m"), cpu("1000m")).is_err());
        assert!(!bound.is_valid());
    }

    #[test]
    fn test_bounds_validate_reports_each_dimension() {
        let bounds = ResourceBounds::new(
            cpu_bound("2000m", "1000m"),
            ResourceBound::new(MemoryQuantity::from_gibibytes(2), MemoryQuantity::from_gibibytes(1)),
        );
        let errors = bounds.validate();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].dimension, "memory");
    }

    #[test]
    fn test_bounds_classify_and_clamp_request() {
        let bounds = ResourceBounds::new(
            cpu_bound("200m", "1000m"),
            ResourceBound::new(MemoryQuantity::from_mebibytes(128), MemoryQuantity::from_gibibytes(1)),
        );
        let request = ResourceRequest::new(cpu("100m"), MemoryQuantity::from_gibibytes(4));
        let expectation = bounds.classify(&request).unwrap();
        assert_eq!(expectation.cpu, BoundsClassification::ClampedToMin);
        assert_eq!(expectation.memory, BoundsClassification::ClampedToMax);

        let clamped = bounds.clamp(&request).unwrap();
        assert_eq!(clamped.cpu.format(), "200m");
        assert_eq!(clamped.memory.format(), "1Gi");
        // inputs untouched
        assert_eq!(request.cpu.format(), "100m");
    }

    #[test]
    fn test_classification_order_follows_position() {
        assert!(BoundsClassification::ClampedToMin < BoundsClassification::Within);
        assert!(BoundsClassification::Within < BoundsClassification::ClampedToMax);
        assert!(!BoundsClassification::Within.is_clamped());
    }
}
