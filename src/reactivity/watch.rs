// ============================================================================
// lumen-ui - Watch
// Source observation with old/new callback, deferred flush, and invalidation
// ============================================================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::core::context::Job;
use crate::reactive::store::Store;
use crate::reactive::value::Value;
use crate::reactivity::effect::{Effect, EffectInner, EffectOptions, effect, run_effect};
use crate::reactivity::scheduling::queue_job;

/// What a watcher observes.
///
/// A `Getter` is run as the watcher's tracked read. A plain `Value` source is
/// deep-traversed on every run, so any nested change fires the callback.
pub enum WatchSource {
    Getter(Rc<dyn Fn() -> Value>),
    Value(Value),
}

impl WatchSource {
    pub fn getter(f: impl Fn() -> Value + 'static) -> WatchSource {
        WatchSource::Getter(Rc::new(f))
    }
}

impl From<Value> for WatchSource {
    fn from(value: Value) -> Self {
        WatchSource::Value(value)
    }
}

/// When the reaction runs relative to the write that triggered it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flush {
    /// Synchronously, inside the trigger.
    #[default]
    Sync,
    /// Deferred to the job queue, collapsed across a burst of writes.
    Post,
}

#[derive(Default)]
pub struct WatchOptions {
    /// Fire the callback once at setup, with `Null` as the old value.
    pub immediate: bool,
    pub flush: Flush,
}

type Cleanup = Rc<RefCell<Option<Box<dyn FnOnce()>>>>;

/// Registrar handed to the callback for logical cancellation: the registered
/// closure runs before the next reaction (or when the watcher stops), letting
/// the callback invalidate in-flight async work.
#[derive(Clone)]
pub struct OnInvalidate {
    slot: Cleanup,
}

impl OnInvalidate {
    pub fn on_invalidate(&self, f: impl FnOnce() + 'static) {
        *self.slot.borrow_mut() = Some(Box::new(f));
    }
}

/// A running watcher. Dropping it (or calling [`Watcher::stop`]) runs any
/// pending invalidation callback and detaches the underlying effect.
pub struct Watcher {
    runner: Effect,
    cleanup: Cleanup,
}

impl Watcher {
    pub fn stop(&self) {
        if let Some(cl) = self.cleanup.borrow_mut().take() {
            cl();
        }
        self.runner.stop();
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Observe `source` and call `callback(new, old, on_invalidate)` when it
/// changes.
pub fn watch(
    source: impl Into<WatchSource>,
    callback: impl Fn(&Value, &Value, &OnInvalidate) + 'static,
    options: WatchOptions,
) -> Watcher {
    let getter: Rc<dyn Fn() -> Value> = match source.into() {
        WatchSource::Getter(g) => g,
        WatchSource::Value(v) => Rc::new(move || {
            let mut seen = Vec::new();
            traverse(&v, &mut seen);
            v.clone()
        }),
    };

    let cleanup: Cleanup = Rc::new(RefCell::new(None));
    let invalidate = OnInvalidate {
        slot: cleanup.clone(),
    };
    let old: Rc<RefCell<Value>> = Rc::new(RefCell::new(Value::Null));

    // The job holds the runner weakly; once the watcher handle is gone the
    // job degrades to a no-op even if it is still sitting in the queue.
    let runner_slot: Rc<RefCell<Weak<EffectInner>>> = Rc::new(RefCell::new(Weak::new()));
    let job: Job = {
        let runner_slot = runner_slot.clone();
        let cleanup = cleanup.clone();
        let invalidate = invalidate.clone();
        let old = old.clone();
        Rc::new(move || {
            let runner = runner_slot.borrow().upgrade();
            let Some(runner) = runner else {
                return;
            };
            let new_val = run_effect(&runner);
            if let Some(cl) = cleanup.borrow_mut().take() {
                cl();
            }
            let old_val = old.replace(new_val.clone());
            callback(&new_val, &old_val, &invalidate);
        })
    };

    let scheduler: Rc<dyn Fn(&Effect)> = {
        let job = job.clone();
        match options.flush {
            Flush::Sync => Rc::new(move |_e: &Effect| job()),
            Flush::Post => Rc::new(move |_e: &Effect| queue_job(&job)),
        }
    };

    let runner = effect(
        move || getter(),
        EffectOptions {
            lazy: true,
            scheduler: Some(scheduler),
        },
    );
    *runner_slot.borrow_mut() = Rc::downgrade(runner.inner());

    if options.immediate {
        job();
    } else {
        let initial = runner.run();
        *old.borrow_mut() = initial;
    }

    Watcher { runner, cleanup }
}

/// Visit every field of a value tree with tracked reads, cycle-safe.
fn traverse(value: &Value, seen: &mut Vec<*const Store>) {
    if let Value::Obs(obs) = value {
        let ptr = obs.store_ptr();
        if seen.contains(&ptr) {
            return;
        }
        seen.push(ptr);
        for key in obs.keys() {
            let child = obs.get(key);
            traverse(&child, seen);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
