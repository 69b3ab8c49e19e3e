use std::collections::HashSet;

use proptest::prelude::*;
use rayon::prelude::*;

use mimic_runtime::{
    ArgMatcher, ArgMatchersComposer, CallArg, MockMode, MockRegistry, StackComposer, TypeToken,
    Value,
};

mod common;
use common::GreeterMock;

proptest! {
    #[test]
    fn single_plain_matcher_survives_composition(recorded in any::<i64>(), bound in any::<i64>()) {
        let arg = CallArg::new("x", TypeToken::INT, recorded);
        let matcher = ArgMatcher::gt(bound);
        let composed = StackComposer.compose(&arg, vec![matcher.clone()]).unwrap();
        prop_assert_eq!(composed, matcher);
    }

    #[test]
    fn no_matchers_compose_to_equality(recorded in any::<i64>(), other in any::<i64>()) {
        let arg = CallArg::new("x", TypeToken::INT, recorded);
        let composed = StackComposer.compose(&arg, Vec::new()).unwrap();
        prop_assert!(composed.matches(&Value::Int(recorded)));
        prop_assert_eq!(composed.matches(&Value::Int(other)), recorded == other);
    }

    #[test]
    fn recorded_stamps_strictly_increase(names in prop::collection::vec("[a-z]{0,6}", 1..20)) {
        let registry = MockRegistry::new();
        let m = GreeterMock::with_mode(&registry, "M", MockMode::Autofill);
        for name in &names {
            m.greet(name).unwrap();
        }
        let stamps: Vec<u64> = m.scope.traces().snapshot().iter().map(|t| t.order_stamp).collect();
        prop_assert_eq!(stamps.len(), names.len());
        prop_assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn concurrent_stamps_are_unique() {
    let registry = MockRegistry::new();
    let stamps: Vec<u64> = (0..10_000).into_par_iter().map(|_| registry.next_stamp()).collect();
    let unique: HashSet<u64> = stamps.iter().copied().collect();
    assert_eq!(unique.len(), stamps.len());
}

#[test]
fn stamps_increase_across_registries() {
    let first = MockRegistry::new();
    let second = MockRegistry::new();
    let a = GreeterMock::with_mode(&first, "A", MockMode::Autofill);
    let b = GreeterMock::with_mode(&second, "B", MockMode::Autofill);
    a.greet("x").unwrap();
    b.greet("x").unwrap();

    let sa = a.scope.traces().snapshot()[0].order_stamp;
    let sb = b.scope.traces().snapshot()[0].order_stamp;
    assert!(sa < sb);
}

#[test]
fn concurrent_calls_on_one_mock_are_all_recorded() {
    let registry = MockRegistry::new();
    let m = GreeterMock::with_mode(&registry, "M", MockMode::Autofill);
    (0..500).into_par_iter().for_each(|i| {
        m.greet(&i.to_string()).unwrap();
    });

    let stamps: Vec<u64> = m.scope.traces().snapshot().iter().map(|t| t.order_stamp).collect();
    assert_eq!(stamps.len(), 500);
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
}
