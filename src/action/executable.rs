//! # Executables
//!
//! An [`Executable`] is a named, shareable handler. Business actions receive
//! unstructured arguments ([`ActionParams`]: positional plus keyword JSON
//! values) and return a JSON outcome the runner compares against the
//! declared expectation.
//!
//! Executables compare by handle, not by name: two executables built from
//! different closures are different even if they share a name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Error type an executable may fail with.
pub type ExecutionFailure = Box<dyn std::error::Error + Send + Sync>;

type Handler = dyn Fn(&ActionParams) -> Result<Value, ExecutionFailure> + Send + Sync;

/// A named business operation.
#[derive(Clone)]
pub struct Executable {
    name: Arc<str>,
    handler: Arc<Handler>,
}

impl Executable {
    /// Wraps a fallible handler.
    pub fn new<F>(name: impl Into<Arc<str>>, handler: F) -> Self
    where
        F: Fn(&ActionParams) -> Result<Value, ExecutionFailure> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
        }
    }

    /// Wraps a handler that cannot fail.
    pub fn infallible<F>(name: impl Into<Arc<str>>, handler: F) -> Self
    where
        F: Fn(&ActionParams) -> Value + Send + Sync + 'static,
    {
        Self::new(name, move |params| Ok(handler(params)))
    }

    /// The executable's own name. Used as its identity when none is given.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, params: &ActionParams) -> Result<Value, ExecutionFailure> {
        (self.handler)(params)
    }

    /// Whether both are the same handler.
    pub fn same_as(&self, other: &Executable) -> bool {
        Arc::ptr_eq(&self.handler, &other.handler)
    }
}

impl PartialEq for Executable {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executable")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Positional and keyword arguments passed to an executable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionParams {
    #[serde(default)]
    pub positional: Vec<Value>,
    #[serde(default)]
    pub keyword: Map<String, Value>,
}

impl ActionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword argument.
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(key.into(), value.into());
        self
    }

    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn keyword(&self, key: &str) -> Option<&Value> {
        self.keyword.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_executables_compare_by_handle() {
        let a = Executable::infallible("approve", |_| json!(true));
        let b = Executable::infallible("approve", |_| json!(true));

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.name(), b.name());
    }

    #[test]
    fn test_params_reach_the_handler() {
        let sum = Executable::infallible("sum", |params| {
            let total: i64 = params.positional.iter().filter_map(Value::as_i64).sum();
            let scale = params.keyword("scale").and_then(Value::as_i64).unwrap_or(1);
            json!(total * scale)
        });

        let params = ActionParams::new().arg(2).arg(3).kwarg("scale", 10);
        assert_eq!(sum.call(&params).unwrap(), json!(50));
    }

    #[test]
    fn test_failing_handler_reports_error() {
        let broken = Executable::new("broken", |_| Err("ledger offline".into()));
        let err = broken.call(&ActionParams::new()).unwrap_err();
        assert_eq!(err.to_string(), "ledger offline");
    }
}
