// ============================================================================
// lumen-ui - Computed
// Lazily cached derived values with their own dependency bucket
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::types::Dep;
use crate::reactive::value::Value;
use crate::reactivity::effect::{Effect, EffectOptions, effect};
use crate::reactivity::tracking::{track_dep, trigger_dep};

struct ComputedInner {
    value: RefCell<Value>,
    dirty: Cell<bool>,
    /// Bucket of effects that read this derived value.
    dep: Dep,
    runner: RefCell<Option<Effect>>,
}

/// A derived value.
///
/// The getter runs lazily: only on the first read and after an upstream
/// change marked it stale. Readers subscribe to the derived value's own
/// bucket, not to the getter's sources, so they re-run only when this value
/// goes stale.
#[derive(Clone)]
pub struct Computed {
    inner: Rc<ComputedInner>,
}

/// Create a derived value from `getter`.
pub fn computed(getter: impl Fn() -> Value + 'static) -> Computed {
    let inner = Rc::new(ComputedInner {
        value: RefCell::new(Value::Null),
        dirty: Cell::new(true),
        dep: Dep::new(),
        runner: RefCell::new(None),
    });

    // The scheduler marks stale and notifies dependents, but only on the
    // clean-to-stale edge. Further upstream writes while already stale are
    // silent until the next read.
    let weak = Rc::downgrade(&inner);
    let runner = effect(
        getter,
        EffectOptions {
            lazy: true,
            scheduler: Some(Rc::new(move |_e: &Effect| {
                if let Some(inner) = weak.upgrade() {
                    if !inner.dirty.get() {
                        inner.dirty.set(true);
                        trigger_dep(&inner.dep);
                    }
                }
            })),
        },
    );
    *inner.runner.borrow_mut() = Some(runner);

    Computed { inner }
}

impl Computed {
    /// Read the derived value, recomputing if stale, and subscribe the
    /// active effect.
    pub fn get(&self) -> Value {
        if self.inner.dirty.get() {
            let runner = self.inner.runner.borrow().clone();
            let fresh = match runner {
                Some(r) => r.run(),
                None => Value::Null,
            };
            *self.inner.value.borrow_mut() = fresh;
            self.inner.dirty.set(false);
        }
        track_dep(&self.inner.dep);
        self.inner.value.borrow().clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================
