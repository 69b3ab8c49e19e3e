use mimic_runtime::{ArgMatcher, MimicConfig, MockMode, MockRegistry, Value, Verifier, VerifyMode};

mod common;
use common::GreeterMock;

// Runs as its own test binary, so nothing else touches the process-wide registry.
#[test]
fn test_global_registry_intercepts_and_verifies() {
    let config = MimicConfig {
        default_mock_mode: MockMode::Autofill,
        default_verify_mode: VerifyMode::Order,
        ..MimicConfig::default()
    };
    assert!(MockRegistry::init_global(config.clone()));
    assert!(!MockRegistry::init_global(config));

    let registry = MockRegistry::global();
    assert_eq!(registry.config().default_mock_mode, MockMode::Autofill);

    let m = GreeterMock {
        scope: registry.register("G", Vec::new()),
        supers: Default::default(),
    };
    assert_eq!(m.scope.mode(), MockMode::Autofill);
    assert_eq!(m.greet("a").unwrap(), Value::from(""));
    m.greet("b").unwrap();

    let isolated = MockRegistry::new();
    let other = GreeterMock::with_mode(&isolated, "Other", MockMode::Autofill);
    other.greet("c").unwrap();
    let last_global = m.scope.traces().snapshot()[1].order_stamp;
    assert!(other.scope.traces().snapshot()[0].order_stamp > last_global);

    let verifier = Verifier::new(registry);
    assert_eq!(verifier.mode(), VerifyMode::Order);
    verifier
        .verify(&[m.greet_template(ArgMatcher::eq("a")), m.greet_template(ArgMatcher::eq("b"))])
        .unwrap();

    registry.reset();
    assert!(!registry.is_mock(&m.receiver()));
}
