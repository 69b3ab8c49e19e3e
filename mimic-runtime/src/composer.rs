#![forbid(unsafe_code)]

use crate::call::CallArg;
use crate::error::{MimicError, Result};
use crate::matcher::{ArgMatcher, CompositeMatcher};

/// Turns the matchers supplied for one argument into exactly one matcher.
pub trait ArgMatchersComposer {
    fn compose(&self, arg: &CallArg, matchers: Vec<ArgMatcher>) -> Result<ArgMatcher>;
}

/// Stack-based composer: plain matchers are pushed, composites pop until filled.
#[derive(Clone, Copy, Debug, Default)]
pub struct StackComposer;

impl ArgMatchersComposer for StackComposer {
    fn compose(&self, arg: &CallArg, mut matchers: Vec<ArgMatcher>) -> Result<ArgMatcher> {
        if arg.is_vararg {
            matchers.push(ArgMatcher::Composite(CompositeMatcher::VarArgs {
                element: arg.ty.clone(),
                recorded: arg.value.clone(),
                elements: Vec::new(),
            }));
            return compose_stack(&arg.name, matchers);
        }
        if matchers.is_empty() {
            return Ok(ArgMatcher::Equals(arg.value.clone()));
        }
        compose_stack(&arg.name, matchers)
    }
}

fn compose_stack(name: &str, matchers: Vec<ArgMatcher>) -> Result<ArgMatcher> {
    let mut stack: Vec<ArgMatcher> = Vec::with_capacity(matchers.len());
    for matcher in matchers {
        let ArgMatcher::Composite(mut composite) = matcher else {
            stack.push(matcher);
            continue;
        };
        while !composite.is_filled() {
            let Some(top) = stack.pop() else {
                break;
            };
            composite = composite.compose(top);
        }
        composite.validate(name)?;
        stack.push(ArgMatcher::Composite(composite));
    }
    if stack.len() != 1 {
        return Err(MimicError::AmbiguousMatcherComposition {
            arg: name.to_string(),
            matchers: stack.iter().map(|m| m.to_string()).collect(),
        });
    }
    stack.pop().ok_or_else(|| MimicError::AmbiguousMatcherComposition {
        arg: name.to_string(),
        matchers: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Capture;
    use crate::value::{TypeToken, Value};

    fn arg(value: impl Into<Value>) -> CallArg {
        CallArg::new("x", TypeToken::INT, value)
    }

    #[test]
    fn single_plain_matcher_is_returned_unchanged() {
        let m = ArgMatcher::gt(3);
        let composed = StackComposer.compose(&arg(5), vec![m.clone()]).unwrap();
        assert_eq!(composed, m);
    }

    #[test]
    fn no_matchers_means_equality_with_recorded() {
        let composed = StackComposer.compose(&arg(5), Vec::new()).unwrap();
        assert_eq!(composed, ArgMatcher::eq(5));
    }

    #[test]
    fn two_plain_matchers_are_ambiguous() {
        let err = StackComposer
            .compose(&arg(5), vec![ArgMatcher::eq(5), ArgMatcher::gt(1)])
            .unwrap_err();
        assert!(matches!(err, MimicError::AmbiguousMatcherComposition { ref arg, .. } if arg == "x"));
        assert!(err.to_string().contains("[eq(5), gt(1)]"));
    }

    #[test]
    fn capture_pops_preceding_matcher() {
        let sink = Capture::new();
        let composed = StackComposer
            .compose(&arg(5), vec![ArgMatcher::eq(5), ArgMatcher::capture(&sink)])
            .unwrap();
        assert_eq!(composed, ArgMatcher::capture_with(&sink, ArgMatcher::eq(5)));
        assert!(composed.matches(&Value::Int(5)));
        assert_eq!(sink.values(), vec![Value::Int(5)]);
    }

    #[test]
    fn capture_without_inner_is_unfilled() {
        let sink = Capture::new();
        let err = StackComposer
            .compose(&arg(5), vec![ArgMatcher::capture(&sink)])
            .unwrap_err();
        assert!(matches!(err, MimicError::UnfilledComposite { composite: "capture", .. }));
    }

    #[test]
    fn nested_captures_fill_inside_out() {
        let outer = Capture::new();
        let inner = Capture::new();
        let composed = StackComposer
            .compose(
                &arg(5),
                vec![ArgMatcher::gt(1), ArgMatcher::capture(&inner), ArgMatcher::capture(&outer)],
            )
            .unwrap();
        assert!(composed.matches(&Value::Int(5)));
        assert_eq!(inner.len(), 1);
        assert_eq!(outer.len(), 1);
    }

    #[test]
    fn vararg_absorbs_all_supplied_matchers() {
        let xs = CallArg::vararg("xs", TypeToken::INT, [1, 2, 3]);
        let composed = StackComposer
            .compose(&xs, vec![ArgMatcher::vararg_all_of(TypeToken::INT, ArgMatcher::gt(0))])
            .unwrap();
        assert!(composed.matches(&Value::array([1, 2, 3])));
        assert!(!composed.matches(&Value::array([0, 2, 3])));
    }

    #[test]
    fn vararg_without_matchers_equals_recorded() {
        let xs = CallArg::vararg("xs", TypeToken::STRING, ["a", "b"]);
        let composed = StackComposer.compose(&xs, Vec::new()).unwrap();
        assert!(composed.matches(&Value::array(["a", "b"])));
        assert!(!composed.matches(&Value::array(["a"])));
        assert_eq!(composed.to_string(), "strings(eq([a, b]))");
    }

    #[test]
    fn empty_vararg_keeps_declared_element_type() {
        let xs = CallArg::vararg("xs", TypeToken::INT, Vec::<i64>::new());
        let composed = StackComposer.compose(&xs, Vec::new()).unwrap();
        assert_eq!(composed.to_string(), "ints(eq([]))");
        assert!(composed.matches(&Value::array(Vec::<i64>::new())));
        assert!(!composed.matches(&Value::array([1])));
    }
}
