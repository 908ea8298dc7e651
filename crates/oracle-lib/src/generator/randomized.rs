//! Randomized scenarios sampled from fixed discrete pools
//!
//! Only the sampled values depend on the random source; every draw is
//! self-consistent (sorted bounds, kind-appropriate replicas, limits above
//! requests).

use super::fixtures::{self, LIMIT_FACTOR};
use super::{
    cpu_at, memory_at, ScenarioBuilder, ScenarioGenerator, CPU_POOL_MILLICORES, IMAGE_POOL,
    MEMORY_POOL_MIB, NAMESPACE_POOL, REPLICA_POOL,
};
use crate::bounds::{ResourceBound, ResourceBounds, ResourceRequest};
use crate::mode::PolicyMode;
use crate::models::{ResourceRequirements, ScenarioTag, TestScenario, WorkloadKind};
use crate::validation::DEFAULT_MEMORY_DECREASE_THRESHOLD;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub struct RandomizedGenerator<R: Rng = StdRng> {
    rng: R,
    generated: usize,
    memory_decrease_threshold: f64,
}

impl RandomizedGenerator<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomizedGenerator<R> {
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

    /// Two pool positions, sorted
    fn sorted_pair(&mut self, len: usize) -> (usize, usize) {
        let a = self.rng.gen_range(0..len);
        let b = self.rng.gen_range(0..len);
        (a.min(b), a.max(b))
    }

    fn pick<T: Copy>(&mut self, pool: &[T], fallback: T) -> T {
        pool.choose(&mut self.rng).copied().unwrap_or(fallback)
    }

    pub fn sample(&mut self) -> TestScenario {
        let mode = self.pick(&PolicyMode::ALL, PolicyMode::Auto);
        let kind = self.pick(&WorkloadKind::ALL, WorkloadKind::Deployment);

        let (cpu_min, cpu_max) = self.sorted_pair(CPU_POOL_MILLICORES.len());
        let (mem_min, mem_max) = self.sorted_pair(MEMORY_POOL_MIB.len());
        let bounds = ResourceBounds::new(
            ResourceBound::new(cpu_at(cpu_min), cpu_at(cpu_max)),
            ResourceBound::new(memory_at(mem_min), memory_at(mem_max)),
        );

        let cpu_req = self.rng.gen_range(0..CPU_POOL_MILLICORES.len());
        let mem_req = self.rng.gen_range(0..MEMORY_POOL_MIB.len());
        let requests = ResourceRequest::new(cpu_at(cpu_req), memory_at(mem_req));

        let replicas = if kind.is_replica_controlled() {
            self.pick(REPLICA_POOL, 1)
        } else {
            0
        };
        let namespace = self.pick(NAMESPACE_POOL, fixtures::DEFAULT_NAMESPACE);
        let image = self.pick(IMAGE_POOL, fixtures::DEFAULT_IMAGE);

        self.generated += 1;
        let name = format!(
            "random-{}-{}-{}",
            self.generated,
            mode.as_str().to_ascii_lowercase(),
            kind.as_str().to_ascii_lowercase()
        );

        let mut policy = fixtures::policy(&name, mode);
        policy.resource_bounds = bounds;
        let mut workload = fixtures::workload(&name, kind);
        workload.namespace = namespace.to_string();
        workload.image = image.to_string();
        workload.replicas = replicas;
        workload.resources = ResourceRequirements::with_limit_factor(requests, LIMIT_FACTOR);

        ScenarioBuilder::new(name, policy, workload)
            .memory_decrease_threshold(self.memory_decrease_threshold)
            .tag(ScenarioTag::Randomized)
            .build()
    }
}

impl<R: Rng> ScenarioGenerator for RandomizedGenerator<R> {
    fn name(&self) -> &'static str {
        "randomized"
    }

    fn memory_decrease_threshold(&self) -> f64 {
        self.memory_decrease_threshold
    }

    fn generate_random(&mut self, count: usize) -> Vec<TestScenario> {
        (0..count).map(|_| self.sample()).collect()
    }
}
