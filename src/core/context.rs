// ============================================================================
// lumen-ui - Runtime Context
// Thread-local state for the running effect stack, tracking suppression,
// and the job queue
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::reactivity::effect::EffectInner;

/// A queued job: a stable closure deduplicated by pointer identity.
pub type Job = Rc<dyn Fn()>;

/// Thread-local runtime context holding all global state for reactivity.
///
/// One struct behind `thread_local!` with explicit accessors, so an effect
/// run has documented init/reset points instead of loose globals.
pub struct RuntimeContext {
    /// Stack of running effects; the active effect is the last entry.
    /// A stack (not a single slot) so nested effects restore their parent.
    pub effect_stack: RefCell<Vec<Rc<EffectInner>>>,

    /// Whether reads should register dependencies. Suppressed for the
    /// duration of list-mutating operations whose internal reads must not
    /// create spurious dependencies.
    pub should_track: Cell<bool>,

    /// Pending jobs for the next flush, in insertion order, deduplicated.
    pub jobs: RefCell<Vec<Job>>,

    /// Whether a flush is currently in flight.
    pub is_flushing: Cell<bool>,
}

impl RuntimeContext {
    pub fn new() -> Self {
        Self {
            effect_stack: RefCell::new(Vec::new()),
            should_track: Cell::new(true),
            jobs: RefCell::new(Vec::new()),
            is_flushing: Cell::new(false),
        }
    }

    /// The currently running effect, if any.
    pub fn active_effect(&self) -> Option<Rc<EffectInner>> {
        self.effect_stack.borrow().last().cloned()
    }

    pub fn has_active_effect(&self) -> bool {
        !self.effect_stack.borrow().is_empty()
    }

    /// Push an effect onto the nesting stack, marking it active.
    pub fn push_effect(&self, effect: Rc<EffectInner>) {
        self.effect_stack.borrow_mut().push(effect);
    }

    /// Pop the active effect, restoring the previous one.
    pub fn pop_effect(&self) {
        self.effect_stack.borrow_mut().pop();
    }

    /// Set tracking suppression, returning the previous state.
    pub fn set_should_track(&self, value: bool) -> bool {
        self.should_track.replace(value)
    }

    /// Whether a read right now would register a dependency.
    pub fn is_tracking(&self) -> bool {
        self.should_track.get() && self.has_active_effect()
    }

    /// Queue a job unless an identical one (by pointer) is already pending.
    pub fn add_job(&self, job: &Job) {
        let mut jobs = self.jobs.borrow_mut();
        if !jobs.iter().any(|j| Rc::ptr_eq(j, job)) {
            jobs.push(job.clone());
        }
    }

    /// Take all pending jobs, leaving the queue empty.
    pub fn take_jobs(&self) -> Vec<Job> {
        self.jobs.replace(Vec::new())
    }

    pub fn has_pending_jobs(&self) -> bool {
        !self.jobs.borrow().is_empty()
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// THREAD-LOCAL ACCESS
// =============================================================================

thread_local! {
    static CONTEXT: RuntimeContext = RuntimeContext::new();
}

/// Access the thread-local runtime context.
pub fn with_context<R>(f: impl FnOnce(&RuntimeContext) -> R) -> R {
    CONTEXT.with(f)
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Check if reads are currently being tracked (inside an effect, not suppressed).
pub fn is_tracking() -> bool {
    with_context(|ctx| ctx.is_tracking())
}

/// Run `f` with dependency tracking suppressed, restoring the prior state.
///
/// Used by list mutators whose internal length reads must not subscribe the
/// mutating effect to its own write.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let prev = with_context(|ctx| ctx.set_should_track(false));
    let result = f();
    with_context(|ctx| ctx.should_track.set(prev));
    result
}

// =============================================================================
// TESTS
// =============================================================================
