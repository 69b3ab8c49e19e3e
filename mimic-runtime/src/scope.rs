#![forbid(unsafe_code)]

use std::fmt;
use std::sync::Arc;

use crate::call::{MockRef, SuperInvoker, Supers};
use crate::error::{MimicError, Result};
use crate::registry::MockRegistry;
use crate::value::{FromValue, TypeToken, Value};

/// Per-invocation answering context: the call's arguments, receiver and the
/// super implementations that can be deferred to.
///
/// Original-call resolution goes through the registry this scope was built
/// with; nothing is looked up from ambient state.
#[derive(Clone)]
pub struct FunctionScope {
    return_type: TypeToken,
    args: Vec<Value>,
    self_ref: MockRef,
    supers: Arc<Supers>,
    registry: MockRegistry,
}

impl FunctionScope {
    pub fn new(
        return_type: TypeToken,
        args: Vec<Value>,
        self_ref: MockRef,
        supers: Arc<Supers>,
        registry: MockRegistry,
    ) -> Self {
        FunctionScope {
            return_type,
            args,
            self_ref,
            supers,
            registry,
        }
    }

    /// Erased return type of the mocked method.
    pub fn return_type(&self) -> &TypeToken {
        &self.return_type
    }

    /// Arguments passed to the mocked method.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The mock this call was made on.
    pub fn self_ref(&self) -> &MockRef {
        &self.self_ref
    }

    pub fn supers(&self) -> &Supers {
        &self.supers
    }

    /// Argument `index` as `T`, failing with a descriptive error instead of panicking.
    pub fn arg<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self.args.get(index).ok_or(MimicError::ArgIndexOutOfBounds {
            index,
            len: self.args.len(),
        })?;
        T::from_value(value).ok_or_else(|| MimicError::ArgTypeMismatch {
            index,
            expected: T::expected_type(),
            actual: value.type_token(),
        })
    }

    /// Calls the implementation of `super_type` with `args`.
    pub fn call_super(&self, super_type: &TypeToken, args: Vec<Value>) -> Result<Value> {
        self.check_args(&args)?;
        match self.supers.get(super_type) {
            Some(SuperInvoker::Blocking(call)) => call(args),
            Some(SuperInvoker::Suspend(_)) => Err(MimicError::SuspendSuperInBlockingCall {
                super_type: super_type.clone(),
            }),
            None => Err(MimicError::MissingSuperMethod {
                types: vec![super_type.clone()],
            }),
        }
    }

    /// Like [`call_super`](Self::call_super) for suspendable calls.
    pub async fn call_suspend_super(&self, super_type: &TypeToken, args: Vec<Value>) -> Result<Value> {
        self.check_args(&args)?;
        let invoker = self
            .supers
            .get(super_type)
            .cloned()
            .ok_or_else(|| MimicError::MissingSuperMethod {
                types: vec![super_type.clone()],
            })?;
        invoke_suspend(invoker, args).await
    }

    /// Calls the single super implementation the receiver actually inherits.
    pub fn call_original(&self, args: Vec<Value>) -> Result<Value> {
        self.call_original_in(&self.registry, args)
    }

    pub fn call_original_in(&self, registry: &MockRegistry, args: Vec<Value>) -> Result<Value> {
        self.check_args(&args)?;
        let super_type = self.resolve_original_supertype(registry)?;
        self.call_super(&super_type, args)
    }

    /// Like [`call_original`](Self::call_original) for suspendable calls.
    pub async fn call_suspend_original(&self, args: Vec<Value>) -> Result<Value> {
        self.check_args(&args)?;
        let super_type = self.resolve_original_supertype(&self.registry)?;
        self.call_suspend_super(&super_type, args).await
    }

    fn resolve_original_supertype(&self, registry: &MockRegistry) -> Result<TypeToken> {
        let scope = registry
            .resolve(&self.self_ref)
            .ok_or_else(|| MimicError::ObjectNotMocked {
                receiver: self.self_ref.to_string(),
            })?;
        let mut candidates: Vec<TypeToken> = scope
            .intercepted_types()
            .iter()
            .filter(|ty| self.supers.contains_key(*ty))
            .cloned()
            .collect();
        if candidates.len() > 1 {
            return Err(MimicError::AmbiguousSuperType { candidates });
        }
        candidates.pop().ok_or_else(|| MimicError::MissingSuperMethod {
            types: scope.intercepted_types().to_vec(),
        })
    }

    fn check_args(&self, args: &[Value]) -> Result<()> {
        if self.args.len() != args.len() {
            return Err(MimicError::ArgCountMismatch {
                expected: self.args.len(),
                actual: args.len(),
            });
        }
        Ok(())
    }
}

async fn invoke_suspend(invoker: SuperInvoker, args: Vec<Value>) -> Result<Value> {
    match invoker {
        SuperInvoker::Blocking(call) => call(args),
        SuperInvoker::Suspend(call) => call.call(args).await,
    }
}

impl fmt::Debug for FunctionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionScope")
            .field("return_type", &self.return_type)
            .field("args", &self.args)
            .field("self_ref", &self.self_ref)
            .field("supers", &self.supers.keys().collect::<Vec<_>>())
            .finish()
    }
}
