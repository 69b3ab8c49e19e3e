#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use std::fmt::Display;

use miette::Diagnostic;
use thiserror::Error;

use crate::value::TypeToken;
use crate::verify::VerificationFailure;

pub type Result<T> = std::result::Result<T, MimicError>;

fn bracketed<T: Display>(items: &[T]) -> String {
    let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

#[derive(Debug, Error, Diagnostic)]
pub enum MimicError {
    #[error("super call expects {expected} argument(s) but {actual} were passed")]
    #[diagnostic(code(mimic::arg_count_mismatch))]
    ArgCountMismatch { expected: usize, actual: usize },

    #[error("no super method available for {}", bracketed(.types))]
    #[diagnostic(
        code(mimic::missing_super_method),
        help("the call description carried no super implementation for these types")
    )]
    MissingSuperMethod { types: Vec<TypeToken> },

    #[error("super method of {super_type} is suspendable and cannot run in a blocking call")]
    #[diagnostic(
        code(mimic::suspend_super_in_blocking_call),
        help("use `call_suspend_super` or `call_suspend_original` from a suspend answer")
    )]
    SuspendSuperInBlockingCall { super_type: TypeToken },

    #[error("multiple original super calls available {}!", bracketed(.candidates))]
    #[diagnostic(
        code(mimic::ambiguous_super_type),
        help("call `call_super` with one of the candidate supertypes instead")
    )]
    AmbiguousSuperType { candidates: Vec<TypeToken> },

    #[error("{receiver} is not a registered mock")]
    #[diagnostic(code(mimic::object_not_mocked))]
    ObjectNotMocked { receiver: String },

    #[error("multiple matchers for single argument `{arg}`: {}", bracketed(.matchers))]
    #[diagnostic(
        code(mimic::ambiguous_matcher_composition),
        help("wrap the extra matchers in a composite matcher or drop all but one")
    )]
    AmbiguousMatcherComposition { arg: String, matchers: Vec<String> },

    #[error("`{composite}` expects {expected} inner matcher(s) but received {}", bracketed(.received))]
    #[diagnostic(code(mimic::unfilled_composite))]
    UnfilledComposite {
        composite: &'static str,
        expected: usize,
        received: Vec<String>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Verification(#[from] VerificationFailure),

    #[error("call {call} not mocked! {detail}")]
    #[diagnostic(code(mimic::call_not_mocked))]
    CallNotMocked { call: String, detail: String },

    #[error("argument {index} is `{actual}` but `{expected}` was requested")]
    #[diagnostic(code(mimic::arg_type_mismatch))]
    ArgTypeMismatch {
        index: usize,
        expected: TypeToken,
        actual: TypeToken,
    },

    #[error("argument index {index} out of bounds for {len} argument(s)")]
    #[diagnostic(code(mimic::arg_index_out_of_bounds))]
    ArgIndexOutOfBounds { index: usize, len: usize },

    #[error("{message}")]
    #[diagnostic(code(mimic::thrown))]
    Thrown { message: String },
}

impl MimicError {
    pub fn thrown(message: impl Into<String>) -> Self {
        MimicError::Thrown {
            message: message.into(),
        }
    }

    pub fn as_verification(&self) -> Option<&VerificationFailure> {
        match self {
            MimicError::Verification(failure) => Some(failure),
            _ => None,
        }
    }
}
