#![forbid(unsafe_code)]

use std::fmt;

use crate::call::{display_name, CallContext, MockRef};
use crate::composer::ArgMatchersComposer;
use crate::error::Result;
use crate::matcher::ArgMatcher;

/// Expected-call pattern: one composed matcher per argument position.
#[derive(Clone, Debug, PartialEq)]
pub struct CallTemplate {
    pub receiver: MockRef,
    pub signature: String,
    pub matchers: Vec<ArgMatcher>,
}

impl CallTemplate {
    pub fn new(receiver: MockRef, signature: impl Into<String>, matchers: Vec<ArgMatcher>) -> Self {
        CallTemplate {
            receiver,
            signature: signature.into(),
            matchers,
        }
    }

    /// Builds a template from a call recorded inside a stub/verify block.
    ///
    /// `supplied[i]` holds the matchers the block used for argument `i`; missing
    /// entries count as "no matchers".
    pub fn from_call(
        ctx: &CallContext,
        supplied: Vec<Vec<ArgMatcher>>,
        composer: &dyn ArgMatchersComposer,
    ) -> Result<Self> {
        let mut supplied = supplied.into_iter();
        let mut matchers = Vec::with_capacity(ctx.args.len());
        for arg in &ctx.args {
            let for_arg = supplied.next().unwrap_or_default();
            matchers.push(composer.compose(arg, for_arg)?);
        }
        Ok(CallTemplate {
            receiver: ctx.receiver.clone(),
            signature: ctx.signature.clone(),
            matchers,
        })
    }
}

impl fmt::Display for CallTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.receiver, display_name(&self.signature))?;
        for (i, m) in self.matchers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{m}")?;
        }
        f.write_str(")")
    }
}
