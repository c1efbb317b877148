// ============================================================================
// lumen-ui - Scheduling
// The deduplicated job queue behind deferred effects
// ============================================================================

use crate::core::context::{Job, with_context};

/// Hard cap on drain iterations, to catch jobs that endlessly requeue
/// each other.
const MAX_FLUSH_COUNT: usize = 1000;

/// Queue a job for the next flush. A job already pending (same closure, by
/// pointer) is not queued twice, so a burst of writes costs one run.
pub fn queue_job(job: &Job) {
    with_context(|ctx| ctx.add_job(job));
}

/// Whether any jobs are waiting for a flush.
pub fn has_pending_jobs() -> bool {
    with_context(|ctx| ctx.has_pending_jobs())
}

/// Drain the job queue.
///
/// This is the explicit flush boundary: deferred work queued by writes runs
/// here, in queue order. Jobs queued during the flush are drained in the same
/// call. A flush started while one is in flight is a no-op; the outer flush
/// picks up whatever was queued.
pub fn flush_jobs() {
    let already_flushing = with_context(|ctx| ctx.is_flushing.replace(true));
    if already_flushing {
        return;
    }

    let mut passes = 0;
    loop {
        let jobs = with_context(|ctx| ctx.take_jobs());
        if jobs.is_empty() {
            break;
        }
        passes += 1;
        if passes > MAX_FLUSH_COUNT {
            with_context(|ctx| ctx.is_flushing.set(false));
            panic!("job queue failed to settle after {MAX_FLUSH_COUNT} passes");
        }
        for job in jobs {
            job();
        }
    }

    with_context(|ctx| ctx.is_flushing.set(false));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn flush_runs_jobs_in_queue_order() {
        let log = Rc::new(std::cell::RefCell::new(Vec::new()));

        let l1 = log.clone();
        let a: Job = Rc::new(move || l1.borrow_mut().push("a"));
        let l2 = log.clone();
        let b: Job = Rc::new(move || l2.borrow_mut().push("b"));

        queue_job(&b);
        queue_job(&a);
        queue_job(&b); // duplicate, collapsed
        assert!(has_pending_jobs());

        flush_jobs();
        assert_eq!(*log.borrow(), vec!["b", "a"]);
        assert!(!has_pending_jobs());
    }

    #[test]
    fn jobs_queued_during_flush_run_in_same_flush() {
        let runs = Rc::new(Cell::new(0));

        let r = runs.clone();
        let follow_up: Job = Rc::new(move || r.set(r.get() + 10));
        let r = runs.clone();
        let first: Job = {
            let follow_up = follow_up.clone();
            Rc::new(move || {
                r.set(r.get() + 1);
                queue_job(&follow_up);
            })
        };

        queue_job(&first);
        flush_jobs();
        assert_eq!(runs.get(), 11);
    }
}
