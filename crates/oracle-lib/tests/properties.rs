//! Property tests for quantities, bounds, the mode contract and generators

use oracle_lib::generator::{BoundsGenerator, RandomizedGenerator, ScenarioGenerator};
use oracle_lib::{
    clamp_to_bounds, classify, validate_scenario, BoundsClassification, CpuQuantity,
    MemoryQuantity, PolicyMode, ResourceBound, WorkloadKind,
};
use proptest::prelude::*;

fn mode_strategy() -> impl Strategy<Value = PolicyMode> {
    prop_oneof![
        Just(PolicyMode::Auto),
        Just(PolicyMode::Recommend),
        Just(PolicyMode::Disabled),
    ]
}

fn cpu_bound() -> impl Strategy<Value = ResourceBound<oracle_lib::Cpu>> {
    (0u64..100_000, 0u64..100_000).prop_map(|(a, b)| {
        ResourceBound::new(
            CpuQuantity::from_millicores(a.min(b)),
            CpuQuantity::from_millicores(a.max(b)),
        )
    })
}

fn memory_bound() -> impl Strategy<Value = ResourceBound<oracle_lib::Memory>> {
    (0u64..1 << 40, 0u64..1 << 40).prop_map(|(a, b)| {
        ResourceBound::new(
            MemoryQuantity::from_bytes(a.min(b)),
            MemoryQuantity::from_bytes(a.max(b)),
        )
    })
}

/// Decimal magnitude with up to six fractional digits
const MAGNITUDE: &str = "[0-9]{1,6}(\\.[0-9]{1,6})?";

fn cpu_literal() -> impl Strategy<Value = String> {
    (MAGNITUDE, prop::sample::select(vec!["", "m"]))
        .prop_map(|(magnitude, suffix)| format!("{magnitude}{suffix}"))
}

fn memory_literal() -> impl Strategy<Value = String> {
    (
        MAGNITUDE,
        prop::sample::select(vec!["", "K", "M", "G", "T", "Ki", "Mi", "Gi", "Ti"]),
    )
        .prop_map(|(magnitude, suffix)| format!("{magnitude}{suffix}"))
}

proptest! {
    #[test]
    fn cpu_literal_reparses_to_same_value(literal in cpu_literal()) {
        let parsed = CpuQuantity::parse(&literal).unwrap();
        prop_assert_eq!(CpuQuantity::parse(&parsed.format()).unwrap(), parsed, "{}", literal);
    }

    #[test]
    fn memory_literal_reparses_to_same_value(literal in memory_literal()) {
        let parsed = MemoryQuantity::parse(&literal).unwrap();
        prop_assert_eq!(MemoryQuantity::parse(&parsed.format()).unwrap(), parsed, "{}", literal);
    }

    #[test]
    fn cpu_format_round_trips(millicores in 0u64..10_000_000) {
        let q = CpuQuantity::from_millicores(millicores);
        prop_assert_eq!(CpuQuantity::parse(&q.format()).unwrap(), q);
    }

    #[test]
    fn memory_format_round_trips(bytes in 0u64..1 << 50) {
        let q = MemoryQuantity::from_bytes(bytes);
        prop_assert_eq!(MemoryQuantity::parse(&q.format()).unwrap(), q);
    }

    #[test]
    fn memory_mebibytes_format_with_binary_suffix(mib in 1u64..1024) {
        let formatted = MemoryQuantity::from_mebibytes(mib).format();
        prop_assert!(formatted.ends_with("Mi") || formatted.ends_with("Gi"));
    }

    #[test]
    fn classification_is_monotonic(bound in cpu_bound(), a in 0u64..200_000, b in 0u64..200_000) {
        let (lo, hi) = (a.min(b), a.max(b));
        let c_lo = classify(&bound, &CpuQuantity::from_millicores(lo)).unwrap();
        let c_hi = classify(&bound, &CpuQuantity::from_millicores(hi)).unwrap();
        prop_assert!(c_lo <= c_hi);
    }

    #[test]
    fn clamp_is_idempotent_and_within(bound in memory_bound(), request in 0u64..1 << 41) {
        let request = MemoryQuantity::from_bytes(request);
        let once = clamp_to_bounds(&bound, &request).unwrap();
        let twice = clamp_to_bounds(&bound, &once).unwrap();
        prop_assert_eq!(once, twice);
        prop_assert_eq!(
            classify(&bound, &once).unwrap(),
            BoundsClassification::Within
        );
    }

    #[test]
    fn clamp_leaves_within_requests_unchanged(bound in cpu_bound(), request in 0u64..200_000) {
        let request = CpuQuantity::from_millicores(request);
        if classify(&bound, &request).unwrap() == BoundsClassification::Within {
            prop_assert_eq!(clamp_to_bounds(&bound, &request).unwrap(), request);
        }
    }

    #[test]
    fn inverted_bounds_are_rejected(a in 0u64..100_000, b in 0u64..100_000) {
        prop_assume!(a != b);
        let bound = ResourceBound::new(
            CpuQuantity::from_millicores(a.max(b)),
            CpuQuantity::from_millicores(a.min(b)),
        );
        prop_assert!(classify(&bound, &CpuQuantity::from_millicores(a)).is_err());
        prop_assert!(clamp_to_bounds(&bound, &CpuQuantity::from_millicores(a)).is_err());
    }

    #[test]
    fn apply_implies_recommend(mode in mode_strategy()) {
        let behavior = mode.expected_behavior();
        prop_assert!(!behavior.should_apply || behavior.should_recommend);
    }

    #[test]
    fn random_scenarios_respect_replica_rule(seed in any::<u64>()) {
        let mut generator = RandomizedGenerator::from_seed(seed);
        for s in generator.generate_random(10) {
            if s.workload.kind == WorkloadKind::DaemonSet {
                prop_assert_eq!(s.workload.replicas, 0);
            } else {
                prop_assert!(s.workload.replicas >= 1);
            }
            prop_assert!(validate_scenario(&s).is_ok());
        }
    }

    #[test]
    fn bounds_samples_classify_as_targeted(seed in any::<u64>()) {
        let mut generator = BoundsGenerator::from_seed(seed);
        for target in BoundsClassification::ALL {
            let s = generator.sample(target);
            let actual = s
                .policy
                .resource_bounds
                .classify(&s.workload.resources.requests)
                .unwrap();
            prop_assert_eq!(actual.cpu, target);
            prop_assert_eq!(actual.memory, target);
        }
    }
}

#[test]
fn boundary_literals() {
    let bound = ResourceBound::new(
        CpuQuantity::parse("200m").unwrap(),
        CpuQuantity::parse("1000m").unwrap(),
    );
    let cases = [
        ("500m", BoundsClassification::Within),
        ("100m", BoundsClassification::ClampedToMin),
        ("2000m", BoundsClassification::ClampedToMax),
        ("200m", BoundsClassification::Within),
        ("1", BoundsClassification::Within),
    ];
    for (request, expected) in cases {
        let q = CpuQuantity::parse(request).unwrap();
        assert_eq!(classify(&bound, &q).unwrap(), expected, "{request}");
    }
}

#[test]
fn memory_decrease_literal() {
    let bound = ResourceBound::new(
        MemoryQuantity::parse("128Mi").unwrap(),
        MemoryQuantity::parse("1Gi").unwrap(),
    );
    let current = MemoryQuantity::parse("4Gi").unwrap();
    let clamped = clamp_to_bounds(&bound, &current).unwrap();
    assert_eq!(clamped.format(), "1Gi");
    assert!(current.decrease_ratio(&clamped) > 0.5);
}
