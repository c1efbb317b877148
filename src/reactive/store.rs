// ============================================================================
// lumen-ui - Observable Store
// Aggregate containers with per-field dependency buckets and an explicit
// get/set/delete/has/keys interface
// ============================================================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::warn;

use crate::core::types::{Dep, DepKey, Key, TriggerKind};
use crate::reactive::value::Value;
use crate::reactivity::tracking::{track, trigger};

// =============================================================================
// AGGREGATE DATA
// =============================================================================

/// The backing data of a store.
///
/// `Link` stores no data of its own: it forwards its single `value` field to
/// a field of another container, so reads and writes through it stay live.
pub enum Aggregate {
    Map(IndexMap<String, Value>),
    List(Vec<Value>),
    Link { target: Obs, key: String },
}

// =============================================================================
// STORE
// =============================================================================

/// One observable container: its data plus the dependency bucket for each
/// field that has ever been tracked.
///
/// A store is shared by every handle that observes it. The buckets live here
/// (not on the handle) so a readonly view and a mutable view of the same data
/// notify the same subscribers.
pub struct Store {
    pub(crate) data: RefCell<Aggregate>,
    pub(crate) deps: RefCell<HashMap<DepKey, Dep>>,
    pub(crate) is_ref: bool,
}

impl Store {
    pub fn new(data: Aggregate, is_ref: bool) -> Rc<Store> {
        Rc::new(Store {
            data: RefCell::new(data),
            deps: RefCell::new(HashMap::new()),
            is_ref,
        })
    }

    /// The bucket for `key`, created on first use.
    pub(crate) fn dep(&self, key: &DepKey) -> Dep {
        self.deps
            .borrow_mut()
            .entry(key.clone())
            .or_default()
            .clone()
    }
}

// =============================================================================
// OBSERVABLE HANDLE
// =============================================================================

/// How a handle observes its store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Variant {
    /// Shallow handles return nested containers raw instead of rewrapping.
    pub shallow: bool,
    /// Readonly handles absorb writes and do not track reads.
    pub readonly: bool,
}

/// A handle to an observable container.
///
/// Cloning is cheap and shallow. Two handles are equal when they share a
/// store and observe it the same way, which is what makes conversions like
/// `readonly(readonly(x))` idempotent without a separate identity cache.
#[derive(Clone)]
pub struct Obs {
    pub(crate) store: Rc<Store>,
    pub(crate) variant: Variant,
}

impl PartialEq for Obs {
    fn eq(&self, other: &Obs) -> bool {
        Rc::ptr_eq(&self.store, &other.store) && self.variant == other.variant
    }
}

impl Obs {
    pub(crate) fn from_store(store: Rc<Store>) -> Obs {
        Obs {
            store,
            variant: Variant::default(),
        }
    }

    pub(crate) fn with_variant(&self, variant: Variant) -> Obs {
        Obs {
            store: self.store.clone(),
            variant,
        }
    }

    pub fn is_readonly(&self) -> bool {
        self.variant.readonly
    }

    pub fn is_shallow(&self) -> bool {
        self.variant.shallow
    }

    pub fn is_ref(&self) -> bool {
        self.store.is_ref
    }

    pub fn is_list(&self) -> bool {
        matches!(&*self.store.data.borrow(), Aggregate::List(_))
    }

    pub(crate) fn store_ptr(&self) -> *const Store {
        Rc::as_ptr(&self.store)
    }

    /// The forwarding target, if this handle is a field link.
    fn link_target(&self) -> Option<(Obs, String)> {
        match &*self.store.data.borrow() {
            Aggregate::Link { target, key } => Some((target.clone(), key.clone())),
            _ => None,
        }
    }

    // ===== READS =====

    /// Read a field, tracking it for the active effect.
    ///
    /// Missing fields read as `Null` but are still tracked, so an effect that
    /// saw a hole re-runs when the field is later added. Deep handles rewrap
    /// nested containers with their own readonly-ness.
    pub fn get(&self, key: impl Into<Key>) -> Value {
        let key = key.into();
        if let Some((target, field)) = self.link_target() {
            return match &key {
                Key::Prop(p) if p == "value" => target.get(field.as_str()),
                _ => Value::Null,
            };
        }

        if !self.variant.readonly {
            track(&self.store, &DepKey::from(&key));
        }

        let value = {
            let data = self.store.data.borrow();
            match (&*data, &key) {
                (Aggregate::Map(m), Key::Prop(p)) => m.get(p).cloned().unwrap_or(Value::Null),
                (Aggregate::List(l), Key::Index(i)) => l.get(*i).cloned().unwrap_or(Value::Null),
                _ => Value::Null,
            }
        };

        if !self.variant.shallow {
            if let Value::Obs(child) = &value {
                return Value::Obs(child.with_variant(Variant {
                    shallow: false,
                    readonly: self.variant.readonly,
                }));
            }
        }
        value
    }

    /// Whether the container currently holds `key`, tracking it.
    pub fn has(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        if self.link_target().is_some() {
            return matches!(&key, Key::Prop(p) if p == "value");
        }
        if !self.variant.readonly {
            track(&self.store, &DepKey::from(&key));
        }
        let data = self.store.data.borrow();
        match (&*data, &key) {
            (Aggregate::Map(m), Key::Prop(p)) => m.contains_key(p),
            (Aggregate::List(l), Key::Index(i)) => *i < l.len(),
            _ => false,
        }
    }

    /// Enumerate the container's keys in insertion order.
    ///
    /// Tracks the enumeration dependency (maps) or the length (lists), so an
    /// effect that iterated re-runs when entries come or go.
    pub fn keys(&self) -> Vec<Key> {
        if self.link_target().is_some() {
            return vec![Key::Prop("value".to_string())];
        }
        let dep_key = match &*self.store.data.borrow() {
            Aggregate::List(_) => DepKey::Length,
            _ => DepKey::Iterate,
        };
        if !self.variant.readonly {
            track(&self.store, &dep_key);
        }
        let data = self.store.data.borrow();
        match &*data {
            Aggregate::Map(m) => m.keys().map(|k| Key::Prop(k.clone())).collect(),
            Aggregate::List(l) => (0..l.len()).map(Key::Index).collect(),
            Aggregate::Link { .. } => Vec::new(),
        }
    }

    /// The number of entries, tracked like `keys`.
    pub fn len(&self) -> usize {
        if self.link_target().is_some() {
            return 1;
        }
        let dep_key = match &*self.store.data.borrow() {
            Aggregate::List(_) => DepKey::Length,
            _ => DepKey::Iterate,
        };
        if !self.variant.readonly {
            track(&self.store, &dep_key);
        }
        let data = self.store.data.borrow();
        match &*data {
            Aggregate::Map(m) => m.len(),
            Aggregate::List(l) => l.len(),
            Aggregate::Link { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tracked linear search. Falls back to raw store identity so a deep
    /// wrapper of an item still finds the item it wraps.
    pub fn index_of(&self, needle: &Value) -> Option<usize> {
        let n = self.len();
        for i in 0..n {
            if self.get(i).same(needle) {
                return Some(i);
            }
        }
        if let Value::Obs(target) = needle {
            for i in 0..n {
                if let Value::Obs(item) = self.get(i) {
                    if Rc::ptr_eq(&item.store, &target.store) {
                        return Some(i);
                    }
                }
            }
        }
        None
    }

    pub fn contains(&self, needle: &Value) -> bool {
        self.index_of(needle).is_some()
    }

    // ===== WRITES =====

    /// Write a field.
    ///
    /// Triggers only when the value actually changed (NaN-to-NaN counts as
    /// unchanged) or when the field is new. Writing past the end of a list
    /// pads the gap with `Null` and counts as an add.
    pub fn set(&self, key: impl Into<Key>, value: Value) {
        let key = key.into();
        if self.variant.readonly {
            warn!(?key, "set ignored on readonly container");
            return;
        }
        if let Some((target, field)) = self.link_target() {
            if matches!(&key, Key::Prop(p) if p == "value") {
                target.set(field.as_str(), value);
            }
            return;
        }

        let dep_key = DepKey::from(&key);
        let outcome = {
            let mut data = self.store.data.borrow_mut();
            match (&mut *data, &key) {
                (Aggregate::Map(m), Key::Prop(p)) => {
                    let old = m.insert(p.clone(), value.clone());
                    Some(match old {
                        Some(old) => (TriggerKind::Set, Some(old)),
                        None => (TriggerKind::Add, None),
                    })
                }
                (Aggregate::List(l), Key::Index(i)) => {
                    if *i < l.len() {
                        let old = std::mem::replace(&mut l[*i], value.clone());
                        Some((TriggerKind::Set, Some(old)))
                    } else {
                        l.resize(*i, Value::Null);
                        l.push(value.clone());
                        Some((TriggerKind::Add, None))
                    }
                }
                _ => None,
            }
        };

        if let Some((kind, old)) = outcome {
            let changed = match &old {
                Some(old) => !old.same(&value),
                None => true,
            };
            if kind == TriggerKind::Add || changed {
                trigger(&self.store, &dep_key, kind, None);
            }
        }
    }

    /// Remove a named field. No trigger when the field was absent.
    pub fn delete(&self, key: &str) {
        if self.variant.readonly {
            warn!(key, "delete ignored on readonly container");
            return;
        }
        if self.link_target().is_some() {
            return;
        }
        let had = {
            let mut data = self.store.data.borrow_mut();
            match &mut *data {
                Aggregate::Map(m) => m.shift_remove(key).is_some(),
                _ => false,
            }
        };
        if had {
            trigger(
                &self.store,
                &DepKey::Prop(key.to_string()),
                TriggerKind::Delete,
                None,
            );
        }
    }

    // ===== LIST MUTATORS =====

    pub fn push(&self, value: Value) {
        if self.variant.readonly {
            warn!("push ignored on readonly container");
            return;
        }
        let idx = {
            let mut data = self.store.data.borrow_mut();
            match &mut *data {
                Aggregate::List(l) => {
                    l.push(value);
                    l.len() - 1
                }
                _ => return,
            }
        };
        trigger(&self.store, &DepKey::Index(idx), TriggerKind::Add, None);
    }

    pub fn pop(&self) -> Value {
        if self.variant.readonly {
            warn!("pop ignored on readonly container");
            return Value::Null;
        }
        let popped = {
            let mut data = self.store.data.borrow_mut();
            match &mut *data {
                Aggregate::List(l) => l.pop().map(|v| (v, l.len())),
                _ => None,
            }
        };
        match popped {
            Some((value, new_len)) => {
                trigger(
                    &self.store,
                    &DepKey::Length,
                    TriggerKind::Delete,
                    Some(new_len),
                );
                value
            }
            None => Value::Null,
        }
    }

    /// Insert at `index` (clamped to the end), shifting later items.
    pub fn insert(&self, index: usize, value: Value) {
        if self.variant.readonly {
            warn!(index, "insert ignored on readonly container");
            return;
        }
        let at = {
            let mut data = self.store.data.borrow_mut();
            match &mut *data {
                Aggregate::List(l) => {
                    let at = index.min(l.len());
                    l.insert(at, value);
                    at
                }
                _ => return,
            }
        };
        // Everything from the insertion point shifted, so sweep those indices
        trigger(&self.store, &DepKey::Length, TriggerKind::Add, Some(at));
    }

    /// Remove at `index`, shifting later items. Out of range reads as `Null`.
    pub fn remove(&self, index: usize) -> Value {
        if self.variant.readonly {
            warn!(index, "remove ignored on readonly container");
            return Value::Null;
        }
        let removed = {
            let mut data = self.store.data.borrow_mut();
            match &mut *data {
                Aggregate::List(l) if index < l.len() => Some(l.remove(index)),
                _ => None,
            }
        };
        match removed {
            Some(value) => {
                trigger(
                    &self.store,
                    &DepKey::Length,
                    TriggerKind::Delete,
                    Some(index),
                );
                value
            }
            None => Value::Null,
        }
    }

    /// Resize a list, truncating or padding with `Null`.
    pub fn set_len(&self, new_len: usize) {
        if self.variant.readonly {
            warn!(new_len, "set_len ignored on readonly container");
            return;
        }
        let changed = {
            let mut data = self.store.data.borrow_mut();
            match &mut *data {
                Aggregate::List(l) => {
                    if l.len() == new_len {
                        false
                    } else {
                        l.resize(new_len, Value::Null);
                        true
                    }
                }
                _ => false,
            }
        };
        if changed {
            trigger(
                &self.store,
                &DepKey::Length,
                TriggerKind::Set,
                Some(new_len),
            );
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
