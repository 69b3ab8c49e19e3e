#![forbid(unsafe_code)]

mod call;
mod capture;
mod composer;
mod error;
mod interceptor;
mod matcher;
mod registry;
mod scope;
mod template;
mod trace;
mod value;
mod verify;

pub use call::{
    display_name, BlockingSuperCall, CallArg, CallContext, MockId, MockRef, SuperInvoker, Supers,
    SuspendSuperCall,
};
pub use capture::Capture;
pub use composer::{ArgMatchersComposer, StackComposer};
pub use error::{MimicError, Result};
pub use interceptor::{Answer, BlockingAnswer, MockScope, SuspendAnswer};
pub use matcher::{vararg_name, ArgMatcher, CompareOp, CompositeMatcher, Predicate};
pub use registry::MockRegistry;
pub use scope::FunctionScope;
pub use template::CallTemplate;
pub use trace::{CallTrace, TraceStore};
pub use value::{FromValue, TypeToken, Value};
pub use verify::{FailureKind, VerificationFailure, Verifier};

pub use mimic_core::{MimicConfig, MockMode, VerifyMode};
