// ============================================================================
// lumen-ui - Test Host
// A recording HostOps double that also maintains a real node tree
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use lumen_ui::{HostOps, NodeId, Value};

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Element(String),
    Text(String),
}

/// Recording host: every operation is appended to `log`, and a real parent /
/// child structure is maintained so tests can assert the final tree, not just
/// the call sequence.
#[derive(Default)]
pub struct MockHost {
    next: Cell<u64>,
    nodes: RefCell<HashMap<u64, NodeKind>>,
    elem_text: RefCell<HashMap<u64, String>>,
    children: RefCell<HashMap<u64, Vec<u64>>>,
    parent: RefCell<HashMap<u64, u64>>,
    log: RefCell<Vec<String>>,
}

impl MockHost {
    pub fn new() -> Rc<MockHost> {
        Rc::new(MockHost::default())
    }

    /// A pre-made container node to render into.
    pub fn container(&self) -> NodeId {
        let id = self.alloc();
        self.nodes
            .borrow_mut()
            .insert(id.0, NodeKind::Element("#root".to_string()));
        id
    }

    fn alloc(&self) -> NodeId {
        let id = self.next.get();
        self.next.set(id + 1);
        NodeId(id)
    }

    fn detach(&self, node: u64) {
        if let Some(parent) = self.parent.borrow_mut().remove(&node) {
            if let Some(siblings) = self.children.borrow_mut().get_mut(&parent) {
                siblings.retain(|&c| c != node);
            }
        }
    }

    // ===== INSPECTION =====

    pub fn children_of(&self, parent: NodeId) -> Vec<NodeId> {
        self.children
            .borrow()
            .get(&parent.0)
            .map(|c| c.iter().map(|&id| NodeId(id)).collect())
            .unwrap_or_default()
    }

    pub fn kind_of(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.borrow().get(&node.0).cloned()
    }

    /// Child labels under `parent`, in order: element tags or text content.
    pub fn labels_of(&self, parent: NodeId) -> Vec<String> {
        self.children_of(parent)
            .into_iter()
            .filter_map(|id| self.kind_of(id))
            .map(|k| match k {
                NodeKind::Element(tag) => tag,
                NodeKind::Text(text) => text,
            })
            .collect()
    }

    pub fn element_text(&self, node: NodeId) -> Option<String> {
        self.elem_text.borrow().get(&node.0).cloned()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    /// Count of logged operations whose name matches `op`.
    pub fn op_count(&self, op: &str) -> usize {
        let prefix = format!("{op}(");
        self.log
            .borrow()
            .iter()
            .filter(|line| line.starts_with(&prefix))
            .count()
    }
}

impl HostOps for MockHost {
    fn create_element(&self, tag: &str) -> NodeId {
        let id = self.alloc();
        self.nodes
            .borrow_mut()
            .insert(id.0, NodeKind::Element(tag.to_string()));
        self.log
            .borrow_mut()
            .push(format!("create_element({tag}) -> {}", id.0));
        id
    }

    fn create_text(&self, text: &str) -> NodeId {
        let id = self.alloc();
        self.nodes
            .borrow_mut()
            .insert(id.0, NodeKind::Text(text.to_string()));
        self.log
            .borrow_mut()
            .push(format!("create_text({text:?}) -> {}", id.0));
        id
    }

    fn set_text(&self, node: NodeId, text: &str) {
        self.nodes
            .borrow_mut()
            .insert(node.0, NodeKind::Text(text.to_string()));
        self.log
            .borrow_mut()
            .push(format!("set_text({}, {text:?})", node.0));
    }

    fn set_element_text(&self, node: NodeId, text: &str) {
        self.elem_text
            .borrow_mut()
            .insert(node.0, text.to_string());
        self.children.borrow_mut().remove(&node.0);
        self.log
            .borrow_mut()
            .push(format!("set_element_text({}, {text:?})", node.0));
    }

    fn insert(&self, node: NodeId, parent: NodeId, anchor: Option<NodeId>) {
        self.detach(node.0);
        let mut children = self.children.borrow_mut();
        let siblings = children.entry(parent.0).or_default();
        let at = anchor
            .and_then(|a| siblings.iter().position(|&c| c == a.0))
            .unwrap_or(siblings.len());
        siblings.insert(at, node.0);
        drop(children);
        self.parent.borrow_mut().insert(node.0, parent.0);
        self.log.borrow_mut().push(format!(
            "insert({}, {}, {:?})",
            node.0,
            parent.0,
            anchor.map(|a| a.0)
        ));
    }

    fn remove(&self, node: NodeId) {
        self.detach(node.0);
        self.children.borrow_mut().remove(&node.0);
        self.log.borrow_mut().push(format!("remove({})", node.0));
    }

    fn patch_prop(&self, node: NodeId, key: &str, prev: Option<&Value>, next: Option<&Value>) {
        self.log.borrow_mut().push(format!(
            "patch_prop({}, {key}, {prev:?} -> {next:?})",
            node.0
        ));
    }
}
