#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::capture::Capture;
use crate::error::{MimicError, Result};
use crate::value::{TypeToken, Value};

pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Relational operator of a `Comparing` matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    /// Whether `arg.cmp(value)` yielding `ord` satisfies the operator.
    pub fn accepts(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Lte => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Gte => ord != Ordering::Less,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
        }
    }
}

/// Argument matcher. Plain variants are pushed by the composer as-is;
/// `Composite` variants consume previously supplied matchers.
#[derive(Clone)]
pub enum ArgMatcher {
    Equals(Value),
    AnyOf(TypeToken),
    Matching { ty: TypeToken, predicate: Predicate },
    Comparing { value: Value, op: CompareOp },
    /// Vararg wildcard: every element of the absorbed run satisfies `predicate`.
    VarArgAll { element: TypeToken, predicate: Predicate },
    /// Vararg wildcard accepting any run of elements.
    VarArgAny(TypeToken),
    Composite(CompositeMatcher),
}

/// Matchers that must be filled with inner matchers before use.
#[derive(Clone)]
pub enum CompositeMatcher {
    Capture {
        sink: Capture,
        inner: Option<Box<ArgMatcher>>,
    },
    /// Implicit matcher bound to every vararg position. With no absorbed
    /// matchers it compares the whole vararg against `recorded`.
    VarArgs {
        element: TypeToken,
        recorded: Value,
        elements: Vec<ArgMatcher>,
    },
}

impl ArgMatcher {
    pub fn eq(value: impl Into<Value>) -> Self {
        ArgMatcher::Equals(value.into())
    }

    pub fn any(ty: TypeToken) -> Self {
        ArgMatcher::AnyOf(ty)
    }

    pub fn matching<F>(ty: TypeToken, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        ArgMatcher::Matching {
            ty,
            predicate: Arc::new(predicate),
        }
    }

    pub fn comparing(value: impl Into<Value>, op: CompareOp) -> Self {
        ArgMatcher::Comparing {
            value: value.into(),
            op,
        }
    }

    pub fn lt(value: impl Into<Value>) -> Self {
        Self::comparing(value, CompareOp::Lt)
    }

    pub fn lte(value: impl Into<Value>) -> Self {
        Self::comparing(value, CompareOp::Lte)
    }

    pub fn gt(value: impl Into<Value>) -> Self {
        Self::comparing(value, CompareOp::Gt)
    }

    pub fn gte(value: impl Into<Value>) -> Self {
        Self::comparing(value, CompareOp::Gte)
    }

    pub fn vararg_all<F>(element: TypeToken, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        ArgMatcher::VarArgAll {
            element,
            predicate: Arc::new(predicate),
        }
    }

    /// `vararg_all` whose element predicate is another matcher.
    pub fn vararg_all_of(element: TypeToken, matcher: ArgMatcher) -> Self {
        Self::vararg_all(element, move |v| matcher.matches(v))
    }

    pub fn vararg_any(element: TypeToken) -> Self {
        ArgMatcher::VarArgAny(element)
    }

    /// Unfilled capture; the composer fills it with the preceding matcher.
    pub fn capture(sink: &Capture) -> Self {
        ArgMatcher::Composite(CompositeMatcher::Capture {
            sink: sink.clone(),
            inner: None,
        })
    }

    pub fn capture_with(sink: &Capture, inner: ArgMatcher) -> Self {
        ArgMatcher::Composite(CompositeMatcher::Capture {
            sink: sink.clone(),
            inner: Some(Box::new(inner)),
        })
    }

    pub fn matches(&self, arg: &Value) -> bool {
        match self {
            ArgMatcher::Equals(v) => arg == v,
            ArgMatcher::AnyOf(_) => true,
            ArgMatcher::Matching { predicate, .. } => predicate(arg),
            ArgMatcher::Comparing { value, op } => arg
                .compare_numeric(value)
                .is_some_and(|ord| op.accepts(ord)),
            ArgMatcher::VarArgAll { predicate, .. } => match arg.as_list() {
                Some(items) => items.iter().all(|item| predicate(item)),
                None => false,
            },
            ArgMatcher::VarArgAny(_) => true,
            ArgMatcher::Composite(c) => c.matches(arg),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, ArgMatcher::Composite(_))
    }

    pub fn is_vararg_wildcard(&self) -> bool {
        matches!(self, ArgMatcher::VarArgAll { .. } | ArgMatcher::VarArgAny(_))
    }
}

impl CompositeMatcher {
    pub fn kind(&self) -> &'static str {
        match self {
            CompositeMatcher::Capture { .. } => "capture",
            CompositeMatcher::VarArgs { .. } => "varargs",
        }
    }

    /// Absorbs one matcher popped from the composer stack.
    pub fn compose(self, matcher: ArgMatcher) -> Self {
        match self {
            CompositeMatcher::Capture { sink, .. } => CompositeMatcher::Capture {
                sink,
                inner: Some(Box::new(matcher)),
            },
            CompositeMatcher::VarArgs {
                element,
                recorded,
                mut elements,
            } => {
                // Popped in reverse supply order.
                elements.insert(0, matcher);
                CompositeMatcher::VarArgs {
                    element,
                    recorded,
                    elements,
                }
            }
        }
    }

    pub fn is_filled(&self) -> bool {
        match self {
            CompositeMatcher::Capture { inner, .. } => inner.is_some(),
            CompositeMatcher::VarArgs { .. } => false,
        }
    }

    pub fn validate(&self, arg: &str) -> Result<()> {
        match self {
            CompositeMatcher::Capture { inner: None, .. } => Err(MimicError::UnfilledComposite {
                composite: self.kind(),
                expected: 1,
                received: Vec::new(),
            }),
            CompositeMatcher::Capture { .. } => Ok(()),
            CompositeMatcher::VarArgs { elements, .. } => {
                let wildcards = elements.iter().filter(|m| m.is_vararg_wildcard()).count();
                if wildcards > 1 {
                    return Err(MimicError::AmbiguousMatcherComposition {
                        arg: arg.to_string(),
                        matchers: elements.iter().map(|m| m.to_string()).collect(),
                    });
                }
                Ok(())
            }
        }
    }

    pub fn matches(&self, arg: &Value) -> bool {
        match self {
            CompositeMatcher::Capture { sink, inner } => {
                let Some(inner) = inner else {
                    return false;
                };
                if inner.matches(arg) {
                    sink.capture(arg.clone());
                    return true;
                }
                false
            }
            CompositeMatcher::VarArgs {
                recorded, elements, ..
            } => {
                let Some(items) = arg.as_list() else {
                    return false;
                };
                if elements.is_empty() {
                    return recorded.as_list() == Some(items);
                }
                match elements.iter().position(ArgMatcher::is_vararg_wildcard) {
                    None => {
                        items.len() == elements.len()
                            && elements.iter().zip(items).all(|(m, v)| m.matches(v))
                    }
                    Some(wildcard) => {
                        let before = &elements[..wildcard];
                        let after = &elements[wildcard + 1..];
                        if items.len() < before.len() + after.len() {
                            return false;
                        }
                        let rest_end = items.len() - after.len();
                        before.iter().zip(&items[..before.len()]).all(|(m, v)| m.matches(v))
                            && after.iter().zip(&items[rest_end..]).all(|(m, v)| m.matches(v))
                            && elements[wildcard]
                                .matches(&Value::Array(items[before.len()..rest_end].to_vec()))
                    }
                }
            }
        }
    }
}

/// `Int` -> `ints`; the untyped element type reads as `varargs`.
pub fn vararg_name(element: &TypeToken) -> String {
    if *element == TypeToken::ANY {
        return "varargs".to_string();
    }
    let mut chars = element.name().chars();
    match chars.next() {
        Some(first) => format!("{}{}s", first.to_lowercase(), chars.as_str()),
        None => "varargs".to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

impl fmt::Display for ArgMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgMatcher::Equals(v) => write!(f, "eq({v})"),
            ArgMatcher::AnyOf(ty) => write!(f, "any({ty})"),
            ArgMatcher::Matching { ty, .. } => write!(f, "matching({ty})"),
            ArgMatcher::Comparing { value, op } => write!(f, "{}({value})", op.name()),
            ArgMatcher::VarArgAll { element, .. } => write!(f, "{}Of {{...}}", vararg_name(element)),
            ArgMatcher::VarArgAny(element) => write!(f, "any{}()", capitalize(&vararg_name(element))),
            ArgMatcher::Composite(c) => write!(f, "{c}"),
        }
    }
}

impl fmt::Display for CompositeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeMatcher::Capture { sink, inner } => match inner {
                Some(inner) => write!(f, "capture({sink}, {inner})"),
                None => write!(f, "capture({sink}, null)"),
            },
            CompositeMatcher::VarArgs {
                element,
                recorded,
                elements,
            } => {
                write!(f, "{}(", vararg_name(element))?;
                if elements.is_empty() {
                    write!(f, "eq({recorded})")?;
                }
                for (i, m) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{m}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Debug for ArgMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Debug for CompositeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl PartialEq for ArgMatcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ArgMatcher::Equals(a), ArgMatcher::Equals(b)) => a == b,
            (ArgMatcher::AnyOf(a), ArgMatcher::AnyOf(b)) => a == b,
            (
                ArgMatcher::Matching { ty: ta, predicate: pa },
                ArgMatcher::Matching { ty: tb, predicate: pb },
            ) => ta == tb && Arc::ptr_eq(pa, pb),
            (
                ArgMatcher::Comparing { value: va, op: oa },
                ArgMatcher::Comparing { value: vb, op: ob },
            ) => va == vb && oa == ob,
            (
                ArgMatcher::VarArgAll { element: ea, predicate: pa },
                ArgMatcher::VarArgAll { element: eb, predicate: pb },
            ) => ea == eb && Arc::ptr_eq(pa, pb),
            (ArgMatcher::VarArgAny(a), ArgMatcher::VarArgAny(b)) => a == b,
            (ArgMatcher::Composite(a), ArgMatcher::Composite(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for CompositeMatcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                CompositeMatcher::Capture { sink: sa, inner: ia },
                CompositeMatcher::Capture { sink: sb, inner: ib },
            ) => sa.same_sink(sb) && ia == ib,
            (
                CompositeMatcher::VarArgs {
                    element: ea,
                    recorded: ra,
                    elements: xa,
                },
                CompositeMatcher::VarArgs {
                    element: eb,
                    recorded: rb,
                    elements: xb,
                },
            ) => ea == eb && ra == rb && xa == xb,
            _ => false,
        }
    }
}
