//! Deferred values.
//!
//! Rule parameters and apply conditions may be given either as concrete
//! values or as zero-argument closures evaluated each time a binding is
//! evaluated. [`Deferred`] makes that choice explicit and resolves it in one
//! place instead of every call site probing for "is this a function".

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::{Object, Value};

/// A value that is either known now or computed on demand.
pub enum Deferred<T> {
    /// Concrete value.
    Ready(T),
    /// Computed on every [`Deferred::resolve`] call.
    Lazy(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T> Deferred<T> {
    /// Wraps a closure evaluated at resolution time.
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::Lazy(Arc::new(f))
    }

    /// Returns `true` when the value is computed on demand.
    pub fn is_lazy(&self) -> bool {
        matches!(self, Self::Lazy(_))
    }
}

impl<T: Clone> Deferred<T> {
    /// Produces the current value.
    pub fn resolve(&self) -> T {
        match self {
            Self::Ready(value) => value.clone(),
            Self::Lazy(f) => f(),
        }
    }
}

impl<T: Clone> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Ready(value) => Self::Ready(value.clone()),
            Self::Lazy(f) => Self::Lazy(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl From<bool> for Deferred<bool> {
    fn from(value: bool) -> Self {
        Self::Ready(value)
    }
}

macro_rules! impl_ready_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Deferred<Value> {
                fn from(value: $t) -> Self {
                    Self::Ready(Value::from(value))
                }
            }
        )*
    };
}

impl_ready_value!(Value, bool, i32, i64, u32, u64, usize, f64, &str, String);

// ============================================================================
// PARAMETERS
// ============================================================================

/// Parameters handed to a rule, in any shape.
///
/// Each element of a list or map is resolved individually, so a map can mix
/// concrete entries with entries read from elsewhere at validation time.
#[derive(Debug, Clone, Default)]
pub enum Parameters {
    /// No parameters; resolves to [`Value::Undefined`].
    #[default]
    None,
    /// A single value.
    Scalar(Deferred<Value>),
    /// Positional parameters; resolves to [`Value::Array`].
    List(Vec<Deferred<Value>>),
    /// Named parameters; resolves to [`Value::Object`].
    Map(IndexMap<String, Deferred<Value>>),
}

impl Parameters {
    /// Single concrete or deferred parameter.
    pub fn scalar(value: impl Into<Deferred<Value>>) -> Self {
        Self::Scalar(value.into())
    }

    /// Positional parameters.
    pub fn list<I, D>(items: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Deferred<Value>>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Named parameters.
    ///
    /// ```rust,ignore
    /// let params = Parameters::map([
    ///     ("reference", Deferred::from(10)),
    ///     ("orEqual", Deferred::lazy(|| Value::from(inclusive()))),
    /// ]);
    /// ```
    pub fn map<I, K, D>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<Deferred<Value>>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Resolves every deferred element, keeping the shape.
    pub fn resolve(&self) -> Value {
        match self {
            Self::None => Value::Undefined,
            Self::Scalar(value) => value.resolve(),
            Self::List(items) => Value::Array(items.iter().map(Deferred::resolve).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(name, value)| (name.clone(), value.resolve()))
                    .collect::<Object>(),
            ),
        }
    }
}

impl From<Value> for Parameters {
    fn from(value: Value) -> Self {
        match value {
            Value::Undefined => Self::None,
            other => Self::Scalar(Deferred::Ready(other)),
        }
    }
}

impl From<serde_json::Value> for Parameters {
    fn from(json: serde_json::Value) -> Self {
        Self::from(Value::from(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn ready_values_pass_through() {
        assert_eq!(Deferred::from(5).resolve(), Value::from(5));
        assert!(Deferred::<bool>::from(true).resolve());
        assert!(!Deferred::<bool>::from(true).is_lazy());
    }

    #[test]
    fn lazy_values_are_computed_on_every_resolve() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let deferred = Deferred::lazy(move || Value::from(counter.fetch_add(1, Ordering::SeqCst)));

        assert!(deferred.is_lazy());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(deferred.resolve(), Value::from(0));
        assert_eq!(deferred.resolve(), Value::from(1));
    }

    #[test]
    fn map_keeps_shape_and_resolves_entries() {
        let params = Parameters::map([
            ("reference", Deferred::from(3)),
            ("orEqual", Deferred::lazy(|| Value::from(true))),
        ]);

        let resolved = params.resolve();
        assert_eq!(resolved.get("reference"), &Value::from(3));
        assert_eq!(resolved.get("orEqual"), &Value::from(true));
    }

    #[test]
    fn list_resolves_to_array() {
        let params = Parameters::list([Deferred::from("a"), Deferred::lazy(|| Value::from(2))]);
        assert_eq!(
            params.resolve(),
            Value::from(vec![Value::from("a"), Value::from(2)])
        );
    }

    #[test]
    fn no_parameters_resolve_to_undefined() {
        assert!(Parameters::None.resolve().is_undefined());
        assert!(matches!(Parameters::from(Value::Undefined), Parameters::None));
    }
}
