// ============================================================================
// lumen-ui - Tracking
// Wiring reads to dependency buckets and writes to the effects behind them
// ============================================================================

use std::rc::Rc;

use crate::core::context::with_context;
use crate::core::types::{Dep, DepKey, TriggerKind};
use crate::reactive::store::Store;
use crate::reactivity::effect::{Effect, EffectInner, Invocation, run_effect};

// =============================================================================
// TRACK
// =============================================================================

/// Register the active effect in `dep`, with a back-reference for cleanup.
pub(crate) fn track_dep(dep: &Dep) {
    with_context(|ctx| {
        if !ctx.is_tracking() {
            return;
        }
        if let Some(active) = ctx.active_effect() {
            if dep.add(&active) {
                active.push_dep(dep.clone());
            }
        }
    });
}

/// Track a read of `key` on `store`.
pub(crate) fn track(store: &Rc<Store>, key: &DepKey) {
    if !with_context(|ctx| ctx.is_tracking()) {
        return;
    }
    let dep = store.dep(key);
    track_dep(&dep);
}

// =============================================================================
// TRIGGER
// =============================================================================

/// Notify the effects affected by a mutation of `key` on `store`.
///
/// One composite call per mutation: the key's own bucket, plus the
/// enumeration bucket on add/delete, the length bucket on add, and, for
/// length mutations, every index bucket at or past `new_len`. Each effect
/// runs at most once, and the active effect is never re-entered.
pub(crate) fn trigger(
    store: &Rc<Store>,
    key: &DepKey,
    kind: TriggerKind,
    new_len: Option<usize>,
) {
    let mut buckets: Vec<Dep> = Vec::new();
    {
        let deps = store.deps.borrow();
        if *key == DepKey::Length {
            if let Some(d) = deps.get(&DepKey::Length) {
                buckets.push(d.clone());
            }
            if let Some(n) = new_len {
                for (k, d) in deps.iter() {
                    if let DepKey::Index(i) = k {
                        if *i >= n {
                            buckets.push(d.clone());
                        }
                    }
                }
            }
        } else if let Some(d) = deps.get(key) {
            buckets.push(d.clone());
        }

        match kind {
            TriggerKind::Add => {
                if let Some(d) = deps.get(&DepKey::Iterate) {
                    buckets.push(d.clone());
                }
                if let Some(d) = deps.get(&DepKey::Length) {
                    buckets.push(d.clone());
                }
            }
            TriggerKind::Delete => {
                if let Some(d) = deps.get(&DepKey::Iterate) {
                    buckets.push(d.clone());
                }
            }
            TriggerKind::Set => {}
        }
    }
    // The deps borrow is released before any effect runs
    notify(&buckets);
}

/// Notify the subscribers of one bucket directly. Used by derived values,
/// whose bucket is not keyed by any container field.
pub(crate) fn trigger_dep(dep: &Dep) {
    notify(std::slice::from_ref(dep));
}

fn notify(buckets: &[Dep]) {
    let active_ptr = with_context(|ctx| ctx.active_effect().map(|e| Rc::as_ptr(&e)));

    let mut seen_buckets: Vec<*const ()> = Vec::new();
    let mut seen_effects: Vec<*const EffectInner> = Vec::new();
    let mut to_run: Vec<Rc<EffectInner>> = Vec::new();

    for dep in buckets {
        if seen_buckets.contains(&dep.id()) {
            continue;
        }
        seen_buckets.push(dep.id());
        for e in dep.collect_live() {
            let ptr = Rc::as_ptr(&e);
            if Some(ptr) == active_ptr || seen_effects.contains(&ptr) {
                continue;
            }
            seen_effects.push(ptr);
            to_run.push(e);
        }
    }

    for e in to_run {
        match &e.invocation {
            Invocation::Immediate => {
                run_effect(&e);
            }
            Invocation::Deferred(scheduler) => {
                let handle = Effect::from_inner(e.clone());
                scheduler(&handle);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
