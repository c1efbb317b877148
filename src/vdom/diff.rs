// ============================================================================
// lumen-ui - Keyed Diff
// Dual-ended keyed reconciliation with minimal moves via an LIS
// ============================================================================

use std::rc::Rc;

use indexmap::IndexMap;

use crate::reactive::value::Value;
use crate::vdom::host::NodeId;
use crate::vdom::patch::Renderer;
use crate::vdom::vnode::VNode;

/// A diff key, hashable. Scalars by value (numbers by bit pattern),
/// containers and handlers by identity.
#[derive(Debug, PartialEq, Eq, Hash)]
enum DiffKey {
    None,
    Bool(bool),
    Num(u64),
    Str(Rc<str>),
    Ptr(usize),
}

impl DiffKey {
    fn of(key: Option<&Value>) -> DiffKey {
        match key {
            None | Some(Value::Null) => DiffKey::None,
            Some(Value::Bool(b)) => DiffKey::Bool(*b),
            Some(Value::Num(n)) => DiffKey::Num(n.to_bits()),
            Some(Value::Str(s)) => DiffKey::Str(s.clone()),
            Some(Value::Func(f)) => DiffKey::Ptr(Rc::as_ptr(f) as *const () as usize),
            Some(Value::Obs(o)) => DiffKey::Ptr(o.store_ptr() as usize),
        }
    }
}

/// Whether two children can be patched in place during the diff.
fn same_child(a: &VNode, b: &VNode) -> bool {
    a.kind.same(&b.kind) && DiffKey::of(a.key()) == DiffKey::of(b.key())
}

impl Renderer {
    /// Reconcile two child lists inside `container`.
    ///
    /// Equal prefix and suffix are patched in place first. Of the remaining
    /// window: old-exhausted means pure mounts, new-exhausted pure unmounts.
    /// Otherwise each old child is matched by key (unmatched ones unmount,
    /// with a short-circuit once every new child is patched), and a
    /// right-to-left walk mounts the new entries and moves everything not on
    /// a longest increasing subsequence of old positions.
    ///
    /// Keyed children must be single-rooted: moves and anchors go through a
    /// child's realized handle, and a fragment child (or a component whose
    /// render root is a fragment) has none, so it can be neither relocated
    /// nor anchored against.
    pub(crate) fn fast_diff(&self, old: &[Rc<VNode>], new: &[Rc<VNode>], container: NodeId) {
        let mut j = 0usize;
        while j < old.len() && j < new.len() && same_child(&old[j], &new[j]) {
            self.patch(Some(&old[j]), &new[j], container, None);
            j += 1;
        }

        let mut old_end = old.len() as isize - 1;
        let mut new_end = new.len() as isize - 1;
        while old_end >= j as isize
            && new_end >= j as isize
            && same_child(&old[old_end as usize], &new[new_end as usize])
        {
            self.patch(
                Some(&old[old_end as usize]),
                &new[new_end as usize],
                container,
                None,
            );
            old_end -= 1;
            new_end -= 1;
        }

        if j as isize > old_end && j as isize <= new_end {
            // Only additions: mount before the node after the window
            let next = (new_end + 1) as usize;
            let anchor = new.get(next).and_then(|n| n.el());
            for node in &new[j..=(new_end as usize)] {
                self.patch(None, node, container, anchor);
            }
        } else if j as isize > new_end && j as isize <= old_end {
            // Only removals
            for node in &old[j..=(old_end as usize)] {
                self.unmount(node);
            }
        } else if j as isize <= old_end && j as isize <= new_end {
            self.diff_window(old, new, container, j, old_end as usize, new_end as usize);
        }
    }

    fn diff_window(
        &self,
        old: &[Rc<VNode>],
        new: &[Rc<VNode>],
        container: NodeId,
        start: usize,
        old_end: usize,
        new_end: usize,
    ) {
        let count = new_end - start + 1;
        // source[i]: old position of the child now at window position i,
        // -1 for a brand new child
        let mut source: Vec<isize> = vec![-1; count];

        let mut key_index: IndexMap<DiffKey, usize> = IndexMap::new();
        for (pos, node) in new.iter().enumerate().take(new_end + 1).skip(start) {
            key_index.insert(DiffKey::of(node.key()), pos);
        }

        let mut moved = false;
        let mut last_max = 0usize;
        let mut patched = 0usize;
        for (pos, old_node) in old.iter().enumerate().take(old_end + 1).skip(start) {
            if patched >= count {
                // Every new child is accounted for; the rest are leftovers
                self.unmount(old_node);
                continue;
            }
            match key_index.get(&DiffKey::of(old_node.key())) {
                Some(&new_pos) => {
                    self.patch(Some(old_node), &new[new_pos], container, None);
                    patched += 1;
                    source[new_pos - start] = pos as isize;
                    if new_pos < last_max {
                        moved = true;
                    } else {
                        last_max = new_pos;
                    }
                }
                None => self.unmount(old_node),
            }
        }

        if !moved && !source.contains(&-1) {
            return;
        }

        // Children on an LIS of old positions stay put; everything else is
        // mounted or moved, right to left so the anchor is always final.
        let seq = lis_indices(&source);
        let mut s = seq.len() as isize - 1;
        let mut i = count as isize - 1;
        while i >= 0 {
            let pos = start + i as usize;
            let anchor = new.get(pos + 1).and_then(|n| n.el());
            if source[i as usize] == -1 {
                self.patch(None, &new[pos], container, anchor);
            } else if s < 0 || i as usize != seq[s as usize] {
                if let Some(el) = new[pos].el() {
                    self.ops.insert(el, container, anchor);
                }
            } else {
                s -= 1;
            }
            i -= 1;
        }
    }
}

// =============================================================================
// LONGEST INCREASING SUBSEQUENCE
// =============================================================================

/// Indices of one longest strictly increasing subsequence of `arr`, in
/// increasing order. `-1` entries are sentinels and never participate.
///
/// Patience sorting over indices with predecessor links, O(n log n).
pub fn lis_indices(arr: &[isize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; arr.len()];

    for (i, &v) in arr.iter().enumerate() {
        if v == -1 {
            continue;
        }
        let pos = tails.partition_point(|&t| arr[t] < v);
        if pos > 0 {
            prev[i] = Some(tails[pos - 1]);
        }
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }

    let mut result = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        result.push(i);
        cursor = prev[i];
    }
    result.reverse();
    result
}

// =============================================================================
// TESTS
// =============================================================================
