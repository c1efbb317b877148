// ============================================================================
// lumen-ui
// A fine-grained reactive UI runtime: dependency-tracked observable state,
// derived values and watchers, and a keyed virtual-tree reconciler over a
// pluggable host
// ============================================================================

//! # lumen-ui
//!
//! Two halves, one crate:
//!
//! - **Reactivity**: observable containers ([`reactive`], [`ref_value`],
//!   [`readonly`]) whose reads are tracked per field, [`effect`]s that re-run
//!   when what they read changes, lazily cached [`computed`] values, and
//!   [`watch`]ers with old/new callbacks and deferred flushing.
//! - **Rendering**: a virtual node tree ([`element`], [`text`], [`fragment`],
//!   [`component`]) patched onto any host that implements [`HostOps`], with
//!   keyed list reconciliation that moves a minimal set of nodes.
//!
//! The runtime is single-threaded; all state lives in a thread-local context.
//!
//! ```
//! use lumen_ui::{Value, reactive, effect, EffectOptions};
//!
//! let state = reactive(Value::map([("count", Value::from(0))]));
//! let obs = state.as_obs().unwrap().clone();
//!
//! let o = obs.clone();
//! let _e = effect(move || o.get("count"), EffectOptions::default());
//!
//! obs.set("count", Value::from(1)); // the effect re-runs synchronously
//! ```

pub mod core;
pub mod reactive;
pub mod reactivity;
pub mod vdom;

// ===== REACTIVE STATE =====

pub use crate::reactive::convert::{
    is_reactive, is_readonly, readonly, reactive, shallow_reactive, shallow_readonly,
};
pub use crate::reactive::reference::{RefView, is_ref, ref_value, to_ref, to_refs};
pub use crate::reactive::store::Obs;
pub use crate::reactive::value::Value;

// ===== REACTIVITY =====

pub use crate::core::context::untracked;
pub use crate::core::types::Key;
pub use crate::reactivity::computed::{Computed, computed};
pub use crate::reactivity::effect::{Effect, EffectOptions, effect};
pub use crate::reactivity::scheduling::{flush_jobs, has_pending_jobs, queue_job};
pub use crate::reactivity::watch::{Flush, OnInvalidate, WatchOptions, WatchSource, Watcher, watch};

// ===== VIRTUAL TREE =====

pub use crate::vdom::diff::lis_indices;
pub use crate::vdom::host::{HostOps, NodeId};
pub use crate::vdom::patch::{ComponentInstance, Renderer};
pub use crate::vdom::vnode::{
    Children, ComponentDef, VKind, VNode, component, element, fragment, text,
};
