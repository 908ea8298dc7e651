//! Bounds-classification scenarios
//!
//! Every scenario is built so its classification is known by construction:
//! the target class is chosen first and the bound/request pair is then drawn
//! from pool positions that can only produce that class.

use super::fixtures::{self, LIMIT_FACTOR};
use super::{cpu_at, memory_at, ScenarioBuilder, ScenarioGenerator, CPU_POOL_MILLICORES, MEMORY_POOL_MIB};
use crate::bounds::{BoundsClassification, BoundsExpectation, ResourceBound, ResourceBounds, ResourceRequest};
use crate::mode::PolicyMode;
use crate::models::{ResourceRequirements, ScenarioTag, TestScenario, WorkloadKind};
use crate::quantity::{CpuQuantity, MemoryQuantity};
use crate::validation::DEFAULT_MEMORY_DECREASE_THRESHOLD;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Distance below `min` used by the deterministic ClampedToMin case
const CPU_BELOW_MIN_MARGIN_MILLICORES: u64 = 100;
const MEMORY_BELOW_MIN_MARGIN_MIB: u64 = 128;

/// Pool positions `(min, max, request)` whose classification is `target`
///
/// Pools are strictly increasing, so comparing positions is comparing values.
fn sample_positions<R: Rng>(rng: &mut R, len: usize, target: BoundsClassification) -> (usize, usize, usize) {
    match target {
        BoundsClassification::Within => {
            let a = rng.gen_range(0..len);
            let b = rng.gen_range(0..len);
            let (min, max) = (a.min(b), a.max(b));
            (min, max, rng.gen_range(min..=max))
        }
        BoundsClassification::ClampedToMin => {
            let min = rng.gen_range(1..len);
            let max = rng.gen_range(min..len);
            (min, max, rng.gen_range(0..min))
        }
        BoundsClassification::ClampedToMax => {
            let max = rng.gen_range(0..len - 1);
            let min = rng.gen_range(0..=max);
            (min, max, rng.gen_range(max + 1..len))
        }
    }
}

/// Deterministic and randomized bounds-classification scenarios
pub struct BoundsGenerator<R: Rng = StdRng> {
    rng: R,
    generated: usize,
    memory_decrease_threshold: f64,
}

impl BoundsGenerator<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> BoundsGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            generated: 0,
            memory_decrease_threshold: DEFAULT_MEMORY_DECREASE_THRESHOLD,
        }
    }

    pub fn with_memory_decrease_threshold(mut self, threshold: f64) -> Self {
        self.memory_decrease_threshold = threshold;
        self
    }

    /// 200m..1000m CPU and 256Mi..1Gi memory
    pub fn reference_bounds() -> ResourceBounds {
        ResourceBounds::new(
            ResourceBound::new(CpuQuantity::from_millicores(200), CpuQuantity::from_millicores(1000)),
            ResourceBound::new(MemoryQuantity::from_mebibytes(256), MemoryQuantity::from_gibibytes(1)),
        )
    }

    /// Request for the reference bounds with the given classification
    pub fn reference_request(target: BoundsClassification) -> ResourceRequest {
        match target {
            // midpoints
            BoundsClassification::Within => ResourceRequest::new(
                CpuQuantity::from_millicores(600),
                MemoryQuantity::from_mebibytes(640),
            ),
            BoundsClassification::ClampedToMin => ResourceRequest::new(
                CpuQuantity::from_millicores(200 - CPU_BELOW_MIN_MARGIN_MILLICORES),
                MemoryQuantity::from_mebibytes(256 - MEMORY_BELOW_MIN_MARGIN_MIB),
            ),
            BoundsClassification::ClampedToMax => ResourceRequest::new(
                CpuQuantity::from_millicores(2000),
                MemoryQuantity::from_gibibytes(2),
            ),
        }
    }

    fn scenario(
        &self,
        name: String,
        mode: PolicyMode,
        kind: WorkloadKind,
        bounds: ResourceBounds,
        requests: ResourceRequest,
    ) -> ScenarioBuilder {
        let mut policy = fixtures::policy(&name, mode);
        policy.resource_bounds = bounds;
        let mut workload = fixtures::workload(&name, kind);
        workload.resources = ResourceRequirements::with_limit_factor(requests, LIMIT_FACTOR);
        ScenarioBuilder::new(name, policy, workload)
            .memory_decrease_threshold(self.memory_decrease_threshold)
            .tag(ScenarioTag::Bounds)
    }

    /// Deterministic scenario for `target` against the reference bounds
    pub fn deterministic(&self, target: BoundsClassification) -> TestScenario {
        self.scenario(
            format!("bounds-{}", target.as_str().replace('_', "-")),
            PolicyMode::Auto,
            WorkloadKind::Deployment,
            Self::reference_bounds(),
            Self::reference_request(target),
        )
        .expect_bounds(BoundsExpectation::uniform(target))
        .build()
    }

    /// One randomized scenario whose classification is `target` in both dimensions
    pub fn sample(&mut self, target: BoundsClassification) -> TestScenario {
        let (cpu_min, cpu_max, cpu_req) = sample_positions(&mut self.rng, CPU_POOL_MILLICORES.len(), target);
        let (mem_min, mem_max, mem_req) = sample_positions(&mut self.rng, MEMORY_POOL_MIB.len(), target);
        let mode = *PolicyMode::ALL.choose(&mut self.rng).unwrap_or(&PolicyMode::Auto);
        let kind = *WorkloadKind::ALL.choose(&mut self.rng).unwrap_or(&WorkloadKind::Deployment);

        let bounds = ResourceBounds::new(
            ResourceBound::new(cpu_at(cpu_min), cpu_at(cpu_max)),
            ResourceBound::new(memory_at(mem_min), memory_at(mem_max)),
        );
        let requests = ResourceRequest::new(cpu_at(cpu_req), memory_at(mem_req));

        self.generated += 1;
        self.scenario(
            format!("bounds-random-{}-{}", self.generated, target.as_str().replace('_', "-")),
            mode,
            kind,
            bounds,
            requests,
        )
        .tag(ScenarioTag::Randomized)
        .expect_bounds(BoundsExpectation::uniform(target))
        .build()
    }
}

impl<R: Rng> ScenarioGenerator for BoundsGenerator<R> {
    fn name(&self) -> &'static str {
        "bounds"
    }

    fn memory_decrease_threshold(&self) -> f64 {
        self.memory_decrease_threshold
    }

    fn generate_basic(&mut self) -> Vec<TestScenario> {
        BoundsClassification::ALL
            .into_iter()
            .map(|target| self.deterministic(target))
            .collect()
    }

    fn generate_random(&mut self, count: usize) -> Vec<TestScenario> {
        (0..count)
            .map(|_| {
                let target = *BoundsClassification::ALL
                    .choose(&mut self.rng)
                    .unwrap_or(&BoundsClassification::Within);
                self.sample(target)
            })
            .collect()
    }

    /// Requests exactly at each edge of the reference bounds
    fn generate_edge_cases(&mut self) -> Vec<TestScenario> {
        let bounds = Self::reference_bounds();
        let at_min = ResourceRequest::new(bounds.cpu.min, bounds.memory.min);
        let at_max = ResourceRequest::new(bounds.cpu.max, bounds.memory.max);

        [("bounds-at-min", at_min), ("bounds-at-max", at_max)]
            .into_iter()
            .map(|(name, requests)| {
                self.scenario(
                    name.to_string(),
                    PolicyMode::Auto,
                    WorkloadKind::Deployment,
                    bounds,
                    requests,
                )
                .tag(ScenarioTag::BoundaryEdge)
                .edge_case()
                .expect_bounds(BoundsExpectation::uniform(BoundsClassification::Within))
                .build()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Defect, DefectKind, ExpectationError};
    use crate::validation::validate_scenario;

    #[test]
    fn test_deterministic_cases_classify_as_named() {
        let generator = BoundsGenerator::from_seed(7);
        for target in BoundsClassification::ALL {
            let s = generator.deterministic(target);
            let actual = s
                .policy
                .resource_bounds
                .classify(&s.workload.resources.requests)
                .unwrap();
            assert_eq!(actual.cpu, target);
            assert_eq!(actual.memory, target);
            assert_eq!(s.expectation.bounds.map(|b| b.cpu), Some(target));
        }
    }

    #[test]
    fn test_missed_target_fails_validation() {
        let mut s = BoundsGenerator::from_seed(7).deterministic(BoundsClassification::ClampedToMin);
        s.workload.resources = ResourceRequirements::with_limit_factor(
            BoundsGenerator::<StdRng>::reference_request(BoundsClassification::Within),
            LIMIT_FACTOR,
        );
        assert_eq!(
            s.expectation.bounds,
            Some(BoundsExpectation::uniform(BoundsClassification::ClampedToMin))
        );

        let err = validate_scenario(&s).unwrap_err();
        assert!(err.has_kind(DefectKind::Expectation));
        assert!(err.defects.iter().any(|d| matches!(
            d,
            Defect::Expectation(ExpectationError::BoundsMismatch {
                predicted: BoundsClassification::ClampedToMin,
                actual: BoundsClassification::Within,
                ..
            })
        )));
    }

    #[test]
    fn test_below_min_uses_fixed_margin() {
        let request = BoundsGenerator::<StdRng>::reference_request(BoundsClassification::ClampedToMin);
        assert_eq!(request.cpu.format(), "100m");
        assert_eq!(request.memory.format(), "128Mi");
    }

    #[test]
    fn test_random_samples_hit_their_target() {
        let mut generator = BoundsGenerator::from_seed(99);
        for target in BoundsClassification::ALL {
            for _ in 0..50 {
                let s = generator.sample(target);
                let actual = s
                    .policy
                    .resource_bounds
                    .classify(&s.workload.resources.requests)
                    .unwrap();
                assert_eq!(actual.cpu, target, "{}", s.name);
                assert_eq!(actual.memory, target, "{}", s.name);
            }
        }
    }

    #[test]
    fn test_edges_are_within() {
        let mut generator = BoundsGenerator::from_seed(1);
        let edges = generator.generate_edge_cases();
        assert_eq!(edges.len(), 2);
        for s in edges {
            assert!(s.edge_case);
            let b = s.expectation.bounds.unwrap();
            assert_eq!(b.cpu, BoundsClassification::Within);
            assert_eq!(b.memory, BoundsClassification::Within);
        }
    }

    #[test]
    fn test_same_seed_same_samples() {
        let a = BoundsGenerator::from_seed(5).generate_random(10);
        let b = BoundsGenerator::from_seed(5).generate_random(10);
        assert_eq!(a, b);
    }
}
