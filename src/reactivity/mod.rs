// ============================================================================
// lumen-ui - Reactivity Module
// Effects, tracking, derived values, watchers, and the job queue
// ============================================================================

pub mod computed;
pub mod effect;
pub mod scheduling;
pub mod tracking;
pub mod watch;
