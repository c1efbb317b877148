// ============================================================================
// lumen-ui - Value
// The dynamic value tree flowing through state, props, and render output
// ============================================================================

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::reactive::store::{Aggregate, Obs, Store};

/// A handler value stored in props (event handlers, component callbacks).
pub type FuncValue = Rc<dyn Fn(&[Value]) -> Value>;

/// A dynamic value.
///
/// Scalars are stored inline; aggregates are observable containers held by
/// handle, so cloning a `Value` is always shallow. This is what makes the
/// watcher's old-value snapshot a shallow copy, and what makes passing state
/// between components cheap.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(Rc<str>),
    Func(FuncValue),
    Obs(Obs),
}

impl Value {
    /// Build an observable map container from entries.
    pub fn map<I, K>(entries: I) -> Value
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let data: IndexMap<String, Value> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect();
        Value::Obs(Obs::from_store(Store::new(Aggregate::Map(data), false)))
    }

    /// Build an observable list container from items.
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        let data: Vec<Value> = items.into_iter().collect();
        Value::Obs(Obs::from_store(Store::new(Aggregate::List(data), false)))
    }

    pub fn str(s: impl AsRef<str>) -> Value {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn num(n: f64) -> Value {
        Value::Num(n)
    }

    pub fn func(f: impl Fn(&[Value]) -> Value + 'static) -> Value {
        Value::Func(Rc::new(f))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_obs(&self) -> Option<&Obs> {
        match self {
            Value::Obs(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The write-suppression comparison: like `==`, but NaN compares equal to
    /// NaN so a NaN-to-NaN write counts as unchanged and never triggers.
    pub fn same(&self, other: &Value) -> bool {
        if let (Value::Num(a), Value::Num(b)) = (self, other) {
            if a.is_nan() && b.is_nan() {
                return true;
            }
        }
        self == other
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            // Handlers compare by identity
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            // Containers compare by handle identity (store + variant)
            (Value::Obs(a), Value::Obs(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Num(n) => write!(f, "Num({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Func(_) => write!(f, "Func(..)"),
            Value::Obs(o) => write!(f, "Obs({:p})", o.store_ptr()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Num(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s.as_str()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
