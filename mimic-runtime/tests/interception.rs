use mimic_runtime::{
    Answer, ArgMatcher, CallTemplate, Capture, FunctionScope, MimicError, MockMode, MockRegistry,
    StackComposer, TypeToken, Value, Verifier,
};

mod common;
use common::GreeterMock;

#[test]
fn test_stubbed_call_returns_answer_and_unmatched_verify_lists_calls() {
    let registry = MockRegistry::new();
    let m = GreeterMock::new(&registry, "M");
    m.scope.answer(m.greet_template(ArgMatcher::eq("a")), Answer::returns("hi a"));

    assert_eq!(m.greet("a").unwrap(), Value::from("hi a"));

    let err = Verifier::new(&registry)
        .verify(&[m.greet_template(ArgMatcher::eq("b"))])
        .unwrap_err();
    let failure = err.as_verification().expect("verification failure");
    assert_eq!(failure.recorded, vec!["M.greet(a)".to_string()]);
    assert_eq!(failure.template.as_deref(), Some("M.greet(eq(b))"));

    let message = err.to_string();
    assert!(message.contains("Expected call M.greet(eq(b)) not found!"));
    assert!(message.contains("Recorded calls:\n  M.greet(a)"));
}

#[test]
fn test_strict_mock_rejects_unstubbed_call() {
    let registry = MockRegistry::new();
    let m = GreeterMock::new(&registry, "M");
    m.scope.answer(m.greet_template(ArgMatcher::eq("a")), Answer::returns("hi a"));

    let err = m.greet("z").unwrap_err();
    assert!(matches!(err, MimicError::CallNotMocked { ref call, .. } if call == "M.greet(z)"));
    assert!(err.to_string().contains("M.greet(eq(a)) -> returns(hi a)"));
    // Rejected calls are still recorded.
    assert_eq!(m.scope.traces().len(), 1);
}

#[test]
fn test_autofill_returns_type_default() {
    let registry = MockRegistry::new();
    let m = GreeterMock::with_mode(&registry, "M", MockMode::Autofill);
    assert_eq!(m.greet("a").unwrap(), Value::from(""));
    assert_eq!(m.sum(&[1, 2]).unwrap(), Value::Int(0));
}

#[test]
fn test_auto_unit_only_covers_unit_calls() {
    let registry = MockRegistry::new();
    let m = GreeterMock::with_mode(&registry, "M", MockMode::AutoUnit);
    assert_eq!(m.reset().unwrap(), Value::Unit);
    assert!(matches!(m.greet("a"), Err(MimicError::CallNotMocked { .. })));
}

#[test]
fn test_latest_answer_wins() {
    let registry = MockRegistry::new();
    let m = GreeterMock::new(&registry, "M");
    m.scope.answer(m.greet_template(ArgMatcher::any(TypeToken::STRING)), Answer::returns("generic"));
    m.scope.answer(m.greet_template(ArgMatcher::eq("a")), Answer::returns("specific"));

    assert_eq!(m.greet("a").unwrap(), Value::from("specific"));
    assert_eq!(m.greet("b").unwrap(), Value::from("generic"));
}

#[test]
fn test_throws_answer_surfaces_message() {
    let registry = MockRegistry::new();
    let m = GreeterMock::new(&registry, "M");
    m.scope.answer(m.greet_template(ArgMatcher::eq("boom")), Answer::throws("greeting failed"));

    let err = m.greet("boom").unwrap_err();
    assert!(matches!(err, MimicError::Thrown { .. }));
    assert_eq!(err.to_string(), "greeting failed");
}

#[test]
fn test_calls_answer_reads_typed_args() {
    let registry = MockRegistry::new();
    let m = GreeterMock::new(&registry, "M");
    m.scope.answer(
        m.greet_template(ArgMatcher::any(TypeToken::STRING)),
        Answer::calls(|scope| {
            let name: String = scope.arg(0)?;
            Ok(Value::from(format!("hello {name}")))
        }),
    );
    assert_eq!(m.greet("bob").unwrap(), Value::from("hello bob"));

    m.scope.reset_answers();
    m.scope.answer(
        m.greet_template(ArgMatcher::any(TypeToken::STRING)),
        Answer::calls(|scope| scope.arg::<i64>(0).map(Value::from)),
    );
    let err = m.greet("bob").unwrap_err();
    assert!(matches!(
        err,
        MimicError::ArgTypeMismatch { index: 0, ref expected, ref actual }
            if *expected == TypeToken::INT && *actual == TypeToken::STRING
    ));
}

#[test]
fn test_capture_in_stub_records_each_match() {
    let registry = MockRegistry::new();
    let m = GreeterMock::new(&registry, "M");
    let names = Capture::new();

    let template = CallTemplate::from_call(
        &m.greet_ctx("ignored"),
        vec![vec![ArgMatcher::any(TypeToken::STRING), ArgMatcher::capture(&names)]],
        &StackComposer,
    )
    .unwrap();
    m.scope.answer(template, Answer::returns("ok"));

    m.greet("a").unwrap();
    m.greet("b").unwrap();
    assert_eq!(names.values(), vec![Value::from("a"), Value::from("b")]);
    assert_eq!(names.last(), Some(Value::from("b")));
}

#[test]
fn test_reset_calls_clears_history() {
    let registry = MockRegistry::new();
    let m = GreeterMock::with_mode(&registry, "M", MockMode::Autofill);
    m.greet("a").unwrap();
    m.scope.reset_calls();
    assert!(m.scope.traces().is_empty());
}

#[tokio::test]
async fn test_suspend_answer_runs_in_suspend_call() {
    let registry = MockRegistry::new();
    let m = GreeterMock::new(&registry, "M");
    m.scope.answer(
        m.greet_template(ArgMatcher::any(TypeToken::STRING)),
        Answer::calls_suspend(|scope: FunctionScope| async move {
            tokio::task::yield_now().await;
            let name: String = scope.arg(0)?;
            Ok::<_, MimicError>(Value::from(name.to_uppercase()))
        }),
    );

    let value = m.scope.intercept_suspend_call(m.greet_ctx("ann")).await.unwrap();
    assert_eq!(value, Value::from("ANN"));

    let err = m.greet("ann").unwrap_err();
    assert!(matches!(err, MimicError::CallNotMocked { .. }));
}

#[test]
fn test_context_for_another_mock_is_rejected_unrecorded() {
    let registry = MockRegistry::new();
    let a = GreeterMock::with_mode(&registry, "A", MockMode::Autofill);
    let b = GreeterMock::with_mode(&registry, "B", MockMode::Autofill);

    let err = a.scope.intercept_call(b.greet_ctx("x")).unwrap_err();
    assert!(matches!(err, MimicError::ObjectNotMocked { ref receiver } if receiver == "B"));
    assert!(a.scope.traces().is_empty());
    assert!(b.scope.traces().is_empty());
}
