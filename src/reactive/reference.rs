// ============================================================================
// lumen-ui - References
// Single-value containers, live field links, and the auto-unwrapping view
// ============================================================================

use crate::core::types::Key;
use crate::reactive::store::{Aggregate, Obs, Store};
use crate::reactive::value::Value;

use indexmap::IndexMap;

/// Wrap a value in a single-field container exposing it as `value`.
///
/// This is how scalars become observable: the container tracks and triggers
/// on its `value` field like any other map field.
pub fn ref_value(initial: Value) -> Value {
    let mut data = IndexMap::new();
    data.insert("value".to_string(), initial);
    Value::Obs(Obs::from_store(Store::new(Aggregate::Map(data), true)))
}

/// Whether a value is a reference container.
pub fn is_ref(value: &Value) -> bool {
    matches!(value, Value::Obs(o) if o.is_ref())
}

/// A reference whose `value` field is a live link to `container[key]`.
///
/// Reads and writes go straight through to the source field, so the link
/// stays reactive even after the field is destructured away from its
/// container.
pub fn to_ref(container: &Obs, key: impl Into<String>) -> Value {
    Value::Obs(Obs::from_store(Store::new(
        Aggregate::Link {
            target: container.clone(),
            key: key.into(),
        },
        true,
    )))
}

/// Convert every field of a map container into a live link reference.
pub fn to_refs(container: &Obs) -> Value {
    let entries: Vec<(String, Value)> = container
        .keys()
        .into_iter()
        .filter_map(|k| match k {
            Key::Prop(name) => {
                let link = to_ref(container, name.as_str());
                Some((name, link))
            }
            Key::Index(_) => None,
        })
        .collect();
    Value::map(entries)
}

/// A view over a container that unwraps reference fields on read and writes
/// through them on assignment. This is what a component's render scope sees,
/// so templates never spell `.value`.
pub struct RefView {
    target: Obs,
}

impl RefView {
    pub fn new(target: Obs) -> RefView {
        RefView { target }
    }

    pub fn get(&self, key: impl Into<Key>) -> Value {
        let raw = self.target.get(key);
        match &raw {
            Value::Obs(o) if o.is_ref() => o.get("value"),
            _ => raw,
        }
    }

    pub fn set(&self, key: impl Into<Key>, value: Value) {
        let key = key.into();
        let existing = self.target.get(key.clone());
        match &existing {
            // Assigning a plain value over a ref writes into the ref,
            // unless the new value is itself a ref
            Value::Obs(o) if o.is_ref() && !is_ref(&value) => {
                o.set("value", value);
            }
            _ => self.target.set(key, value),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
