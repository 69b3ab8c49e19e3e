#![allow(dead_code)]

use std::sync::Arc;

use mimic_runtime::{
    ArgMatcher, CallArg, CallContext, CallTemplate, MockMode, MockRef, MockRegistry, MockScope,
    Result, Supers, TypeToken, Value,
};

pub const GREET: &str = "greet/String";
pub const SUM: &str = "sum/IntArray";
pub const RESET: &str = "reset";

/// Stand-in for what the code generator emits for a `Greeter` mock.
pub struct GreeterMock {
    pub scope: Arc<MockScope>,
    pub supers: Supers,
}

impl GreeterMock {
    pub fn new(registry: &MockRegistry, name: &str) -> Self {
        Self::with_mode(registry, name, MockMode::Strict)
    }

    pub fn with_mode(registry: &MockRegistry, name: &str, mode: MockMode) -> Self {
        GreeterMock {
            scope: registry.register_with_mode(name, vec![TypeToken::new("Greeter")], mode),
            supers: Supers::new(),
        }
    }

    pub fn receiver(&self) -> MockRef {
        self.scope.receiver().clone()
    }

    pub fn greet_ctx(&self, name: &str) -> CallContext {
        CallContext::new(
            self.receiver(),
            GREET,
            TypeToken::STRING,
            vec![CallArg::new("name", TypeToken::STRING, name)],
        )
        .with_supers(self.supers.clone())
    }

    pub fn greet(&self, name: &str) -> Result<Value> {
        self.scope.intercept_call(self.greet_ctx(name))
    }

    pub fn sum_ctx(&self, xs: &[i64]) -> CallContext {
        CallContext::new(
            self.receiver(),
            SUM,
            TypeToken::INT,
            vec![CallArg::vararg("xs", TypeToken::INT, xs.iter().copied())],
        )
    }

    pub fn sum(&self, xs: &[i64]) -> Result<Value> {
        self.scope.intercept_call(self.sum_ctx(xs))
    }

    pub fn reset(&self) -> Result<Value> {
        let ctx = CallContext::new(self.receiver(), RESET, TypeToken::UNIT, Vec::new());
        self.scope.intercept_call(ctx)
    }

    pub fn greet_template(&self, matcher: ArgMatcher) -> CallTemplate {
        CallTemplate::new(self.receiver(), GREET, vec![matcher])
    }
}
