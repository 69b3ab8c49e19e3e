#![forbid(unsafe_code)]

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use crate::call::MockRef;

/// Erased type of a parameter, return value or supertype.
///
/// Compared by simple name, so `TypeToken::of::<String>()` equals `TypeToken::STRING`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeToken(Cow<'static, str>);

impl TypeToken {
    pub const ANY: TypeToken = TypeToken::named("Any");
    pub const UNIT: TypeToken = TypeToken::named("Unit");
    pub const NULL: TypeToken = TypeToken::named("Null");
    pub const BOOL: TypeToken = TypeToken::named("Bool");
    pub const INT: TypeToken = TypeToken::named("Int");
    pub const FLOAT: TypeToken = TypeToken::named("Float");
    pub const CHAR: TypeToken = TypeToken::named("Char");
    pub const STRING: TypeToken = TypeToken::named("String");
    pub const ARRAY: TypeToken = TypeToken::named("Array");
    pub const LIST: TypeToken = TypeToken::named("List");
    pub const MOCK: TypeToken = TypeToken::named("Mock");

    pub const fn named(name: &'static str) -> Self {
        TypeToken(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        TypeToken(Cow::Owned(name.into()))
    }

    /// Token for a Rust type, with module paths stripped (`alloc::vec::Vec<u8>` -> `Vec<u8>`).
    pub fn of<T: ?Sized>() -> Self {
        TypeToken::new(simple_type_name(std::any::type_name::<T>()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn simple_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
            continue;
        }
        out.push_str(segment.rsplit("::").next().unwrap_or(""));
        segment.clear();
        out.push(ch);
    }
    out.push_str(segment.rsplit("::").next().unwrap_or(""));
    out
}

/// A single argument or return value crossing the interception boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Unit,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
    /// Array-like values, including the packed form of a vararg parameter.
    Array(Vec<Value>),
    List(Vec<Value>),
    Mock(MockRef),
}

impl Value {
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    pub fn type_token(&self) -> TypeToken {
        match self {
            Value::Unit => TypeToken::UNIT,
            Value::Null => TypeToken::NULL,
            Value::Bool(_) => TypeToken::BOOL,
            Value::Int(_) => TypeToken::INT,
            Value::Float(_) => TypeToken::FLOAT,
            Value::Char(_) => TypeToken::CHAR,
            Value::Str(_) => TypeToken::STRING,
            Value::Array(_) => TypeToken::ARRAY,
            Value::List(_) => TypeToken::LIST,
            Value::Mock(_) => TypeToken::MOCK,
        }
    }

    /// List view of array-like values; `None` for everything else.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) | Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Common element type of an array-like value, `Any` when mixed or empty.
    pub fn element_type(&self) -> TypeToken {
        let Some(items) = self.as_list() else {
            return TypeToken::ANY;
        };
        let mut tokens = items.iter().map(Value::type_token);
        match tokens.next() {
            Some(first) if tokens.all(|t| t == first) => first,
            _ => TypeToken::ANY,
        }
    }

    /// Value an autofilled mock returns for an erased return type.
    pub fn default_for(ty: &TypeToken) -> Value {
        match ty.name() {
            "Unit" => Value::Unit,
            "Bool" => Value::Bool(false),
            "Int" => Value::Int(0),
            "Float" => Value::Float(0.0),
            "Char" => Value::Char('\0'),
            "String" => Value::Str(String::new()),
            "Array" => Value::Array(Vec::new()),
            "List" => Value::List(Vec::new()),
            _ => Value::Null,
        }
    }

    /// Ordering between numeric values; mixed int/float compares as `f64`.
    pub fn compare_numeric(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "Unit"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Str(s) => f.write_str(s),
            Value::Array(items) | Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Mock(m) => write!(f, "{m}"),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),+ $(,)?) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })+
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<MockRef> for Value {
    fn from(v: MockRef) -> Self {
        Value::Mock(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Typed extraction used by `FunctionScope::arg`.
pub trait FromValue: Sized {
    fn expected_type() -> TypeToken;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn expected_type() -> TypeToken {
        TypeToken::ANY
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    fn expected_type() -> TypeToken {
        TypeToken::BOOL
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn expected_type() -> TypeToken {
        TypeToken::INT
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn expected_type() -> TypeToken {
        TypeToken::INT
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn expected_type() -> TypeToken {
        TypeToken::FLOAT
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl FromValue for char {
    fn expected_type() -> TypeToken {
        TypeToken::CHAR
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn expected_type() -> TypeToken {
        TypeToken::STRING
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for Vec<Value> {
    fn expected_type() -> TypeToken {
        TypeToken::LIST
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list().map(<[Value]>::to_vec)
    }
}

impl FromValue for MockRef {
    fn expected_type() -> TypeToken {
        TypeToken::MOCK
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Mock(m) => Some(m.clone()),
            _ => None,
        }
    }
}
