#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::value::{TypeToken, Value};

/// Registry-assigned identity of a mock instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MockId(pub(crate) u64);

impl MockId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Lookup-only handle to a mock: its identity plus display name.
///
/// Holding a `MockRef` never keeps the mock's interceptor state alive.
#[derive(Clone, Debug)]
pub struct MockRef {
    id: MockId,
    name: Arc<str>,
}

impl MockRef {
    pub(crate) fn new(id: MockId, name: &str) -> Self {
        MockRef {
            id,
            name: Arc::from(name),
        }
    }

    pub fn id(&self) -> MockId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for MockRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MockRef {}

impl Hash for MockRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for MockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One declared parameter of an intercepted call.
#[derive(Clone, Debug, PartialEq)]
pub struct CallArg {
    pub name: String,
    /// Parameter type; the element type for a vararg.
    pub ty: TypeToken,
    pub value: Value,
    pub is_vararg: bool,
}

impl CallArg {
    pub fn new(name: impl Into<String>, ty: TypeToken, value: impl Into<Value>) -> Self {
        CallArg {
            name: name.into(),
            ty,
            value: value.into(),
            is_vararg: false,
        }
    }

    /// Vararg parameter; `items` are packed into `Value::Array` and `ty` holds
    /// the declared element type, which stays known even for an empty vararg.
    pub fn vararg<I, V>(name: impl Into<String>, element: TypeToken, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        CallArg {
            name: name.into(),
            ty: element,
            value: Value::array(items),
            is_vararg: true,
        }
    }
}

pub type BlockingSuperCall = Arc<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;

/// Super implementation of a suspendable mocked function.
#[async_trait]
pub trait SuspendSuperCall: Send + Sync {
    async fn call(&self, args: Vec<Value>) -> Result<Value>;
}

#[async_trait]
impl<F, Fut> SuspendSuperCall for F
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    async fn call(&self, args: Vec<Value>) -> Result<Value> {
        (self)(args).await
    }
}

/// Invoker for one supertype's implementation of the intercepted method.
#[derive(Clone)]
pub enum SuperInvoker {
    Blocking(BlockingSuperCall),
    Suspend(Arc<dyn SuspendSuperCall>),
}

impl SuperInvoker {
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        SuperInvoker::Blocking(Arc::new(f))
    }

    pub fn suspend<S>(s: S) -> Self
    where
        S: SuspendSuperCall + 'static,
    {
        SuperInvoker::Suspend(Arc::new(s))
    }
}

impl fmt::Debug for SuperInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuperInvoker::Blocking(_) => f.write_str("SuperInvoker::Blocking"),
            SuperInvoker::Suspend(_) => f.write_str("SuperInvoker::Suspend"),
        }
    }
}

pub type Supers = BTreeMap<TypeToken, SuperInvoker>;

/// Everything the generated call site knows about one intercepted call.
#[derive(Clone, Debug)]
pub struct CallContext {
    pub receiver: MockRef,
    /// Binary-safe signature, e.g. `greet/String`; the part before `/` is the display name.
    pub signature: String,
    pub return_type: TypeToken,
    pub args: Vec<CallArg>,
    pub supers: Arc<Supers>,
}

impl CallContext {
    pub fn new(
        receiver: MockRef,
        signature: impl Into<String>,
        return_type: TypeToken,
        args: Vec<CallArg>,
    ) -> Self {
        CallContext {
            receiver,
            signature: signature.into(),
            return_type,
            args,
            supers: Arc::new(Supers::new()),
        }
    }

    pub fn with_supers(mut self, supers: Supers) -> Self {
        self.supers = Arc::new(supers);
        self
    }

    pub fn name(&self) -> &str {
        display_name(&self.signature)
    }

    pub fn arg_values(&self) -> Vec<Value> {
        self.args.iter().map(|a| a.value.clone()).collect()
    }
}

/// Signature truncated before the binary-disambiguation marker.
pub fn display_name(signature: &str) -> &str {
    signature.split('/').next().unwrap_or(signature)
}
