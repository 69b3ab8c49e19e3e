#![forbid(unsafe_code)]

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use mimic_core::MockMode;
use parking_lot::RwLock;

use crate::call::{CallContext, MockRef};
use crate::error::{MimicError, Result};
use crate::registry::MockRegistry;
use crate::scope::FunctionScope;
use crate::template::CallTemplate;
use crate::trace::{CallTrace, TraceStore};
use crate::value::{TypeToken, Value};

pub type BlockingAnswer = Arc<dyn Fn(&FunctionScope) -> Result<Value> + Send + Sync>;

/// Answer body for suspendable mocked functions.
#[async_trait]
pub trait SuspendAnswer: Send + Sync {
    async fn call(&self, scope: FunctionScope) -> Result<Value>;
}

#[async_trait]
impl<F, Fut> SuspendAnswer for F
where
    F: Fn(FunctionScope) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    async fn call(&self, scope: FunctionScope) -> Result<Value> {
        (self)(scope).await
    }
}

/// What a stubbed call does.
#[derive(Clone)]
pub enum Answer {
    Const(Value),
    Throws(String),
    Calls(BlockingAnswer),
    CallsSuspend(Arc<dyn SuspendAnswer>),
    CallsOriginal,
    CallsSuper(TypeToken),
}

impl Answer {
    pub fn returns(value: impl Into<Value>) -> Self {
        Answer::Const(value.into())
    }

    pub fn throws(message: impl Into<String>) -> Self {
        Answer::Throws(message.into())
    }

    pub fn calls<F>(f: F) -> Self
    where
        F: Fn(&FunctionScope) -> Result<Value> + Send + Sync + 'static,
    {
        Answer::Calls(Arc::new(f))
    }

    pub fn calls_suspend<S>(s: S) -> Self
    where
        S: SuspendAnswer + 'static,
    {
        Answer::CallsSuspend(Arc::new(s))
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Const(v) => write!(f, "returns({v})"),
            Answer::Throws(message) => write!(f, "throws({message})"),
            Answer::Calls(_) => f.write_str("calls {...}"),
            Answer::CallsSuspend(_) => f.write_str("callsSuspend {...}"),
            Answer::CallsOriginal => f.write_str("callsOriginal"),
            Answer::CallsSuper(ty) => write!(f, "callsSuper({ty})"),
        }
    }
}

impl fmt::Debug for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Interceptor state of one mock: its call history and stubbed answers.
pub struct MockScope {
    receiver: MockRef,
    intercepted_types: Vec<TypeToken>,
    mode: MockMode,
    traces: TraceStore,
    answers: RwLock<Vec<(CallTemplate, Answer)>>,
    registry: MockRegistry,
}

impl MockScope {
    pub(crate) fn new(
        receiver: MockRef,
        intercepted_types: Vec<TypeToken>,
        mode: MockMode,
        registry: MockRegistry,
    ) -> Self {
        MockScope {
            receiver,
            intercepted_types,
            mode,
            traces: TraceStore::new(),
            answers: RwLock::new(Vec::new()),
            registry,
        }
    }

    pub fn receiver(&self) -> &MockRef {
        &self.receiver
    }

    pub fn intercepted_types(&self) -> &[TypeToken] {
        &self.intercepted_types
    }

    pub fn mode(&self) -> MockMode {
        self.mode
    }

    pub fn traces(&self) -> &TraceStore {
        &self.traces
    }

    /// Stubs calls matching `template`. Later stubs take precedence.
    pub fn answer(&self, template: CallTemplate, answer: Answer) {
        tracing::trace!(template = %template, answer = %answer, "registered answer");
        self.answers.write().push((template, answer));
    }

    pub fn reset_answers(&self) {
        self.answers.write().clear();
    }

    pub fn reset_calls(&self) {
        self.traces.clear();
    }

    pub fn intercept_call(&self, ctx: CallContext) -> Result<Value> {
        let trace = self.record(&ctx)?;
        let Some(answer) = self.find_answer(&trace) else {
            return self.fallback(&trace, &ctx.return_type);
        };
        let scope = self.function_scope(ctx);
        match answer {
            Answer::Const(v) => Ok(v),
            Answer::Throws(message) => Err(MimicError::Thrown { message }),
            Answer::Calls(f) => f(&scope),
            Answer::CallsSuspend(_) => Err(MimicError::CallNotMocked {
                call: trace.to_string(),
                detail: "A suspend answer cannot run in a blocking call.".to_string(),
            }),
            Answer::CallsOriginal => {
                let args = scope.args().to_vec();
                scope.call_original(args)
            }
            Answer::CallsSuper(ty) => {
                let args = scope.args().to_vec();
                scope.call_super(&ty, args)
            }
        }
    }

    pub async fn intercept_suspend_call(&self, ctx: CallContext) -> Result<Value> {
        let trace = self.record(&ctx)?;
        let Some(answer) = self.find_answer(&trace) else {
            return self.fallback(&trace, &ctx.return_type);
        };
        let scope = self.function_scope(ctx);
        match answer {
            Answer::Const(v) => Ok(v),
            Answer::Throws(message) => Err(MimicError::Thrown { message }),
            Answer::Calls(f) => f(&scope),
            Answer::CallsSuspend(f) => f.call(scope).await,
            Answer::CallsOriginal => {
                let args = scope.args().to_vec();
                scope.call_suspend_original(args).await
            }
            Answer::CallsSuper(ty) => {
                let args = scope.args().to_vec();
                scope.call_suspend_super(&ty, args).await
            }
        }
    }

    /// Stamps and stores the call. A context built for another mock is rejected unrecorded.
    fn record(&self, ctx: &CallContext) -> Result<CallTrace> {
        if ctx.receiver != self.receiver {
            return Err(MimicError::ObjectNotMocked {
                receiver: ctx.receiver.to_string(),
            });
        }
        let trace = CallTrace {
            receiver: ctx.receiver.clone(),
            signature: ctx.signature.clone(),
            args: ctx.arg_values(),
            order_stamp: self.registry.next_stamp(),
        };
        if self.registry.config().trace_calls {
            tracing::trace!(
                receiver = %trace.receiver,
                signature = %trace.signature,
                stamp = trace.order_stamp,
                "intercepted call"
            );
        }
        self.traces.append(trace.clone());
        Ok(trace)
    }

    fn find_answer(&self, trace: &CallTrace) -> Option<Answer> {
        // Cloned out so the answer runs without holding the lock.
        self.answers
            .read()
            .iter()
            .rev()
            .find(|(template, _)| trace.matches(template))
            .map(|(_, answer)| answer.clone())
    }

    fn fallback(&self, trace: &CallTrace, return_type: &TypeToken) -> Result<Value> {
        match self.mode {
            MockMode::Autofill => Ok(Value::default_for(return_type)),
            MockMode::AutoUnit if *return_type == TypeToken::UNIT => Ok(Value::Unit),
            MockMode::Strict | MockMode::AutoUnit => Err(MimicError::CallNotMocked {
                call: trace.to_string(),
                detail: self.describe_answers(),
            }),
        }
    }

    fn describe_answers(&self) -> String {
        let answers = self.answers.read();
        if answers.is_empty() {
            return "No answers registered.".to_string();
        }
        let mut out = String::from("Registered answers:");
        for (template, answer) in answers.iter() {
            out.push_str(&format!("\n  {template} -> {answer}"));
        }
        out
    }

    fn function_scope(&self, ctx: CallContext) -> FunctionScope {
        let args = ctx.arg_values();
        FunctionScope::new(ctx.return_type, args, ctx.receiver, ctx.supers, self.registry.clone())
    }
}

impl fmt::Debug for MockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockScope")
            .field("receiver", &self.receiver)
            .field("intercepted_types", &self.intercepted_types)
            .field("mode", &self.mode)
            .field("calls", &self.traces.len())
            .finish()
    }
}
