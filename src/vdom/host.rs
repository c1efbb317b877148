// ============================================================================
// lumen-ui - Host Operations
// The capability set a concrete node tree must provide to the patcher
// ============================================================================

use crate::reactive::value::Value;

/// Opaque identifier of a host node.
///
/// The patcher never inspects host nodes; it only threads their identifiers
/// back into the operations below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Everything the patcher needs from a host tree.
///
/// Implementations decide what an "element" is. The test double records
/// these calls; a real host would translate them to its node tree.
pub trait HostOps {
    /// Create an element node of the given tag.
    fn create_element(&self, tag: &str) -> NodeId;

    /// Create a text node with the given content.
    fn create_text(&self, text: &str) -> NodeId;

    /// Replace the content of a text node.
    fn set_text(&self, node: NodeId, text: &str);

    /// Replace an element's entire child content with one text run.
    fn set_element_text(&self, node: NodeId, text: &str);

    /// Insert `node` under `parent`, before `anchor` (append when `None`).
    fn insert(&self, node: NodeId, parent: NodeId, anchor: Option<NodeId>);

    /// Detach `node` from its parent.
    fn remove(&self, node: NodeId);

    /// Apply one prop change. `prev` is the old value (`None` on first
    /// mount), `next` the new one (`None` when the prop was removed).
    fn patch_prop(&self, node: NodeId, key: &str, prev: Option<&Value>, next: Option<&Value>);
}
