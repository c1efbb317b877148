// ============================================================================
// lumen-ui - Effect
// The reactive side effect: runs, records what it read, re-runs on change
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::core::context::with_context;
use crate::core::types::Dep;
use crate::reactive::value::Value;

/// The body of an effect.
pub type EffectFn = Box<dyn Fn() -> Value>;

/// How a trigger invokes this effect.
///
/// `Immediate` re-runs synchronously inside the trigger. `Deferred` hands the
/// effect to a scheduler instead, which is how render effects get batched
/// into the job queue.
pub enum Invocation {
    Immediate,
    Deferred(Rc<dyn Fn(&Effect)>),
}

/// Shared state of one effect.
///
/// `deps` is the back-reference list: every bucket this effect currently sits
/// in. Cleanup walks it before each run, so dependencies from a branch the
/// last run did not take are dropped.
pub struct EffectInner {
    func: RefCell<Option<EffectFn>>,
    deps: RefCell<SmallVec<[Dep; 4]>>,
    pub(crate) invocation: Invocation,
}

impl EffectInner {
    pub(crate) fn push_dep(&self, dep: Dep) {
        self.deps.borrow_mut().push(dep);
    }

    pub(crate) fn cleanup(self: &Rc<Self>) {
        let ptr = Rc::as_ptr(self);
        let deps = self.deps.take();
        for dep in deps {
            dep.remove(ptr);
        }
    }

    fn is_stopped(&self) -> bool {
        self.func.borrow().is_none()
    }
}

/// Handle to an effect. Dropping every handle unsubscribes it, because
/// dependency buckets hold it weakly.
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    /// Re-run the effect body, re-collecting dependencies.
    pub fn run(&self) -> Value {
        run_effect(&self.inner)
    }

    /// Permanently detach the effect and drop its body.
    pub fn stop(&self) {
        self.inner.cleanup();
        self.inner.func.borrow_mut().take();
    }

    pub(crate) fn inner(&self) -> &Rc<EffectInner> {
        &self.inner
    }

    pub(crate) fn from_inner(inner: Rc<EffectInner>) -> Effect {
        Effect { inner }
    }
}

/// Options for [`effect`].
#[derive(Default)]
pub struct EffectOptions {
    /// Skip the initial run; the caller runs it when it wants the value.
    pub lazy: bool,
    /// Route triggers through a scheduler instead of re-running inline.
    pub scheduler: Option<Rc<dyn Fn(&Effect)>>,
}

/// Create an effect around `f` and, unless lazy, run it once to collect its
/// initial dependencies.
pub fn effect(f: impl Fn() -> Value + 'static, options: EffectOptions) -> Effect {
    let invocation = match options.scheduler {
        Some(s) => Invocation::Deferred(s),
        None => Invocation::Immediate,
    };
    let inner = Rc::new(EffectInner {
        func: RefCell::new(Some(Box::new(f))),
        deps: RefCell::new(SmallVec::new()),
        invocation,
    });
    let handle = Effect { inner };
    if !options.lazy {
        handle.run();
    }
    handle
}

/// Run one effect: clean stale subscriptions, push it as the active effect,
/// evaluate with tracking enabled, then restore the previous state.
pub(crate) fn run_effect(inner: &Rc<EffectInner>) -> Value {
    if inner.is_stopped() {
        return Value::Null;
    }
    // Re-entrant run of an effect already on the stack is a no-op
    let on_stack = with_context(|ctx| {
        ctx.effect_stack
            .borrow()
            .iter()
            .any(|e| Rc::ptr_eq(e, inner))
    });
    if on_stack {
        return Value::Null;
    }

    inner.cleanup();
    let prev_track = with_context(|ctx| {
        ctx.push_effect(inner.clone());
        ctx.set_should_track(true)
    });

    let result = {
        let func = inner.func.borrow();
        match func.as_ref() {
            Some(f) => f(),
            None => Value::Null,
        }
    };

    with_context(|ctx| {
        ctx.pop_effect();
        ctx.should_track.set(prev_track);
    });
    result
}

// =============================================================================
// TESTS
// =============================================================================
