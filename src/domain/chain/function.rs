//! Function links: plain callables inside a chain

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Future returned by a function link
pub type FunctionFuture = BoxFuture<'static, anyhow::Result<Value>>;

type FunctionHandler = Arc<dyn Fn(FunctionArgs) -> FunctionFuture + Send + Sync>;

/// Arguments handed to a function link.
///
/// Holds either the previous link's structured result or the whole set of
/// link results keyed by name, depending on what came before.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionArgs(Map<String, Value>);

impl FunctionArgs {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deserialize the arguments into a typed struct
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for FunctionArgs {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A named callable step
#[derive(Clone)]
pub struct FunctionLink {
    name: String,
    handler: FunctionHandler,
}

impl FunctionLink {
    /// Create a function link from a synchronous callable
    pub fn new<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(FunctionArgs) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(move |args| future::ready(function(args)).boxed()),
        }
    }

    /// Create a function link from an asynchronous callable
    pub fn from_async<F, Fut>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(FunctionArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(move |args| function(args).boxed()),
        }
    }

    /// A function link that always yields the given value
    pub fn constant(name: impl Into<String>, value: Value) -> Self {
        Self::new(name, move |_| Ok(value.clone()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn call(&self, args: FunctionArgs) -> anyhow::Result<Value> {
        (self.handler)(args).await
    }
}

impl fmt::Debug for FunctionLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionLink")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
