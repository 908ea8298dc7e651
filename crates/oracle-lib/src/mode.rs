//! Policy mode contract
//!
//! Each policy is pinned to one mode for its lifetime; changing modes means
//! creating a new policy. The contract is a pure lookup from mode to the
//! behavior a test must observe.

use crate::models::ScenarioExpectation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Operating stance of an optimization policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyMode {
    /// Recommend and apply
    Auto,
    /// Recommend only
    Recommend,
    /// Do nothing
    #[serde(alias = "Off")]
    Disabled,
}

impl PolicyMode {
    pub const ALL: [PolicyMode; 3] = [PolicyMode::Auto, PolicyMode::Recommend, PolicyMode::Disabled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Recommend => "Recommend",
            Self::Disabled => "Disabled",
        }
    }

    pub fn expected_behavior(&self) -> ExpectedBehavior {
        expected_behavior(*self)
    }
}

impl fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown policy mode string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown policy mode '{0}' (expected Auto, Recommend or Disabled)")]
pub struct UnknownModeError(pub String);

impl FromStr for PolicyMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "recommend" => Ok(Self::Recommend),
            "disabled" | "off" => Ok(Self::Disabled),
            _ => Err(UnknownModeError(s.to_string())),
        }
    }
}

/// Behavior a conforming reconciler shows for a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedBehavior {
    pub should_recommend: bool,
    /// Implies `should_recommend`
    pub should_apply: bool,
}

pub fn expected_behavior(mode: PolicyMode) -> ExpectedBehavior {
    match mode {
        PolicyMode::Auto => ExpectedBehavior {
            should_recommend: true,
            should_apply: true,
        },
        PolicyMode::Recommend => ExpectedBehavior {
            should_recommend: true,
            should_apply: false,
        },
        PolicyMode::Disabled => ExpectedBehavior {
            should_recommend: false,
            should_apply: false,
        },
    }
}

/// Expectation flag checked against the mode contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectationField {
    ShouldApplyUpdates,
    ShouldGenerateRecommendations,
}

impl fmt::Display for ExpectationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShouldApplyUpdates => f.write_str("should_apply_updates"),
            Self::ShouldGenerateRecommendations => f.write_str("should_generate_recommendations"),
        }
    }
}

/// Expectation disagrees with the mode contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mode {mode}: {field} expected {expected}, found {observed}")]
pub struct ConsistencyError {
    pub mode: PolicyMode,
    pub field: ExpectationField,
    pub expected: bool,
    pub observed: bool,
}

/// Every field on which `expectation` disagrees with the contract for `mode`
pub fn consistency_mismatches(mode: PolicyMode, expectation: &ScenarioExpectation) -> Vec<ConsistencyError> {
    let behavior = expected_behavior(mode);
    let checks = [
        (
            ExpectationField::ShouldApplyUpdates,
            behavior.should_apply,
            expectation.should_apply_updates,
        ),
        (
            ExpectationField::ShouldGenerateRecommendations,
            behavior.should_recommend,
            expectation.should_generate_recommendations,
        ),
    ];

    checks
        .into_iter()
        .filter(|(_, expected, observed)| expected != observed)
        .map(|(field, expected, observed)| ConsistencyError {
            mode,
            field,
            expected,
            observed,
        })
        .collect()
}

pub fn is_consistent(mode: PolicyMode, expectation: &ScenarioExpectation) -> bool {
    consistency_mismatches(mode, expectation).is_empty()
}
