//! Resource policy consistency oracle
//!
//! This crate provides the core functionality for:
//! - Typed CPU and memory quantities with exact parsing and canonical formatting
//! - Bounds classification and clamping
//! - The policy mode contract (Auto / Recommend / Disabled)
//! - Scenario generation (basic, bounds, edge-case, randomized)
//! - Scenario validation with multi-defect reports
//! - Observability (Prometheus counters, structured logging)
//!
//! The oracle predicts what a conforming resource-optimizer reconciler does
//! for a policy and workload. It never talks to a cluster.

pub mod annotations;
pub mod batch;
pub mod bounds;
pub mod error;
pub mod generator;
pub mod mode;
pub mod models;
pub mod observability;
pub mod quantity;
pub mod validation;

pub use batch::{BatchOutcome, CatalogConfig, DroppedScenario, ScenarioCatalog};
pub use bounds::{
    clamp_to_bounds, classify, BoundsClassification, BoundsExpectation, InvalidBoundError,
    ResourceBound, ResourceBounds, ResourceRequest,
};
pub use error::{Defect, DefectKind, ValidationError, ValidationWarning};
pub use generator::{
    BasicGenerator, BoundsGenerator, EdgeCaseGenerator, RandomizedGenerator, ScenarioBuilder,
    ScenarioGenerator, ScenarioOverrides,
};
pub use mode::{expected_behavior, ExpectedBehavior, PolicyMode};
pub use models::*;
pub use observability::{OracleMetrics, StructuredLogger};
pub use quantity::{Cpu, CpuQuantity, Memory, MemoryQuantity, Quantity, QuantityParseError};
pub use validation::{validate_scenario, ValidationReport, Validator, ValidatorConfig};
