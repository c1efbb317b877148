// ============================================================================
// lumen-ui - Core Types
// Field keys, trigger kinds, and dependency buckets for the reactive graph
// ============================================================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::reactivity::effect::EffectInner;

// =============================================================================
// FIELD KEYS
// =============================================================================

/// A public field key into an observable container.
///
/// Maps address fields by name, lists by position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Prop(String),
    Index(usize),
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Prop(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Prop(s)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

/// An internal dependency key.
///
/// Extends `Key` with the two synthetic keys the tracking rules need:
/// `Length` for list-length reads, and `Iterate` for enumeration-style reads
/// (only triggered by add/delete, never by plain writes).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DepKey {
    Prop(String),
    Index(usize),
    Length,
    Iterate,
}

impl From<&Key> for DepKey {
    fn from(key: &Key) -> Self {
        match key {
            Key::Prop(s) => DepKey::Prop(s.clone()),
            Key::Index(i) => DepKey::Index(*i),
        }
    }
}

// =============================================================================
// TRIGGER KINDS
// =============================================================================

/// The kind of mutation behind a trigger.
///
/// `Add` and `Delete` additionally notify enumeration dependents; `Add` on a
/// list also notifies length dependents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerKind {
    Set,
    Add,
    Delete,
}

// =============================================================================
// DEPENDENCY BUCKET
// =============================================================================

/// The set of effects subscribed to one specific (container, field) pair.
///
/// Weak references keep dropped effects from being retained by the graph;
/// insertion order is preserved so synchronous effects run in subscription
/// order. Cloning a `Dep` clones the handle, not the set.
#[derive(Clone, Default)]
pub struct Dep {
    effects: Rc<RefCell<Vec<Weak<EffectInner>>>>,
}

impl Dep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an effect to this bucket. Returns false if it was already present.
    pub fn add(&self, effect: &Rc<EffectInner>) -> bool {
        let ptr = Rc::as_ptr(effect);
        let mut effects = self.effects.borrow_mut();
        let present = effects
            .iter()
            .any(|w| w.upgrade().is_some_and(|e| Rc::as_ptr(&e) == ptr));
        if present {
            return false;
        }
        effects.push(Rc::downgrade(effect));
        true
    }

    /// Remove an effect from this bucket by identity, pruning dead entries.
    pub fn remove(&self, effect: *const EffectInner) {
        self.effects.borrow_mut().retain(|w| match w.upgrade() {
            Some(e) => Rc::as_ptr(&e) != effect,
            None => false,
        });
    }

    /// Snapshot the live subscribers in insertion order.
    ///
    /// Collect-then-mutate: callers run effects only after the borrow on the
    /// underlying list has been released.
    pub fn collect_live(&self) -> Vec<Rc<EffectInner>> {
        self.effects
            .borrow()
            .iter()
            .filter_map(|w| w.upgrade())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.borrow().iter().all(|w| w.strong_count() == 0)
    }

    /// Identity of the underlying set, for back-reference deduplication.
    pub(crate) fn id(&self) -> *const () {
        Rc::as_ptr(&self.effects) as *const ()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::value::Value;
    use crate::reactivity::effect::{EffectOptions, effect};

    fn lazy_effect() -> crate::reactivity::effect::Effect {
        effect(
            || Value::Null,
            EffectOptions {
                lazy: true,
                ..Default::default()
            },
        )
    }

    #[test]
    fn key_conversions() {
        assert_eq!(Key::from("name"), Key::Prop("name".to_string()));
        assert_eq!(Key::from(3usize), Key::Index(3));
        assert_eq!(DepKey::from(&Key::Index(2)), DepKey::Index(2));
    }

    #[test]
    fn dep_add_is_idempotent() {
        let dep = Dep::new();
        let e = lazy_effect();

        assert!(dep.add(e.inner()));
        assert!(!dep.add(e.inner()));
        assert_eq!(dep.collect_live().len(), 1);
    }

    #[test]
    fn dep_remove_by_identity() {
        let dep = Dep::new();
        let e1 = lazy_effect();
        let e2 = lazy_effect();

        dep.add(e1.inner());
        dep.add(e2.inner());
        dep.remove(Rc::as_ptr(e1.inner()));

        let live = dep.collect_live();
        assert_eq!(live.len(), 1);
        assert_eq!(Rc::as_ptr(&live[0]), Rc::as_ptr(e2.inner()));
    }

    #[test]
    fn dep_prunes_dropped_effects() {
        let dep = Dep::new();
        {
            let e = lazy_effect();
            dep.add(e.inner());
            assert!(!dep.is_empty());
        }
        // Effect dropped: the weak entry no longer upgrades
        assert!(dep.is_empty());
        assert!(dep.collect_live().is_empty());
    }
}
