// ============================================================================
// lumen-ui - Virtual Nodes
// The closed node sum type the patcher matches over, plus builders
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::reactive::value::Value;
use crate::vdom::host::NodeId;
use crate::vdom::patch::ComponentInstance;

/// A component description: declared props, initial state, render function.
///
/// Shared by reference; two nodes describe the same component exactly when
/// they hold the same definition.
pub struct ComponentDef {
    /// Prop names the component consumes. Anything else passed to it (except
    /// `on*` handlers, which always count as props) stays an attribute.
    pub props: Vec<String>,
    /// Produces the component's initial state. `None` means stateless.
    pub data: Option<Box<dyn Fn() -> Value>>,
    pub render: Box<dyn Fn(&ComponentInstance) -> Rc<VNode>>,
}

/// What a virtual node is.
#[derive(Clone)]
pub enum VKind {
    Element(String),
    Text,
    Fragment,
    Component(Rc<ComponentDef>),
}

impl VKind {
    /// Whether two nodes can be patched in place rather than replaced.
    pub fn same(&self, other: &VKind) -> bool {
        match (self, other) {
            (VKind::Element(a), VKind::Element(b)) => a == b,
            (VKind::Text, VKind::Text) => true,
            (VKind::Fragment, VKind::Fragment) => true,
            (VKind::Component(a), VKind::Component(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A node's child content.
pub enum Children {
    None,
    Text(String),
    Nodes(Vec<Rc<VNode>>),
}

/// One virtual node.
///
/// `el` is filled in at mount time; for a component node it points at the
/// root host node of the rendered subtree. Nodes are immutable apart from
/// these mount-time slots, so trees can be shared and compared freely.
pub struct VNode {
    pub kind: VKind,
    pub props: IndexMap<String, Value>,
    pub children: Children,
    pub key: Option<Value>,
    pub(crate) el: Cell<Option<NodeId>>,
    pub(crate) component: RefCell<Option<Rc<ComponentInstance>>>,
}

impl VNode {
    pub fn el(&self) -> Option<NodeId> {
        self.el.get()
    }

    pub(crate) fn set_el(&self, node: Option<NodeId>) {
        self.el.set(node);
    }

    pub fn key(&self) -> Option<&Value> {
        self.key.as_ref()
    }

    /// The live instance behind a mounted component node.
    pub fn component_instance(&self) -> Option<Rc<ComponentInstance>> {
        self.component.borrow().clone()
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.children {
            Children::Text(s) => Some(s),
            _ => None,
        }
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

/// Start an element node.
pub fn element(tag: impl Into<String>) -> VNodeBuilder {
    VNodeBuilder::new(VKind::Element(tag.into()))
}

/// A finished text node.
pub fn text(content: impl Into<String>) -> Rc<VNode> {
    Rc::new(VNode {
        kind: VKind::Text,
        props: IndexMap::new(),
        children: Children::Text(content.into()),
        key: None,
        el: Cell::new(None),
        component: RefCell::new(None),
    })
}

/// A finished fragment node wrapping a sequence of children.
pub fn fragment(children: Vec<Rc<VNode>>) -> Rc<VNode> {
    Rc::new(VNode {
        kind: VKind::Fragment,
        props: IndexMap::new(),
        children: Children::Nodes(children),
        key: None,
        el: Cell::new(None),
        component: RefCell::new(None),
    })
}

/// Start a component node.
pub fn component(def: Rc<ComponentDef>) -> VNodeBuilder {
    VNodeBuilder::new(VKind::Component(def))
}

pub struct VNodeBuilder {
    kind: VKind,
    props: IndexMap<String, Value>,
    children: Children,
    key: Option<Value>,
}

impl VNodeBuilder {
    fn new(kind: VKind) -> Self {
        VNodeBuilder {
            kind,
            props: IndexMap::new(),
            children: Children::None,
            key: None,
        }
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// The diff key used to match this node across renders.
    pub fn key(mut self, key: impl Into<Value>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.children = Children::Text(content.into());
        self
    }

    pub fn child(mut self, node: Rc<VNode>) -> Self {
        match &mut self.children {
            Children::Nodes(nodes) => nodes.push(node),
            _ => self.children = Children::Nodes(vec![node]),
        }
        self
    }

    pub fn children(mut self, nodes: Vec<Rc<VNode>>) -> Self {
        self.children = Children::Nodes(nodes);
        self
    }

    pub fn build(self) -> Rc<VNode> {
        Rc::new(VNode {
            kind: self.kind,
            props: self.props,
            children: self.children,
            key: self.key,
            el: Cell::new(None),
            component: RefCell::new(None),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_assembles_an_element() {
        let node = element("div")
            .prop("id", "root")
            .key(1)
            .child(text("hi"))
            .build();

        assert!(node.kind.same(&VKind::Element("div".to_string())));
        assert_eq!(node.props.get("id"), Some(&Value::from("root")));
        assert_eq!(node.key(), Some(&Value::from(1)));
        match &node.children {
            Children::Nodes(nodes) => assert_eq!(nodes.len(), 1),
            _ => panic!("expected child nodes"),
        }
    }

    #[test]
    fn sameness_by_tag_and_definition() {
        let a = element("div").build();
        let b = element("div").build();
        let c = element("span").build();
        assert!(a.kind.same(&b.kind));
        assert!(!a.kind.same(&c.kind));
        assert!(!a.kind.same(&VKind::Text));

        let def = Rc::new(ComponentDef {
            props: vec![],
            data: None,
            render: Box::new(|_| text("x")),
        });
        let c1 = component(def.clone()).build();
        let c2 = component(def).build();
        assert!(c1.kind.same(&c2.kind));
    }

    #[test]
    fn text_node_content() {
        let t = text("hello");
        assert!(t.kind.same(&VKind::Text));
        assert_eq!(t.text_content(), Some("hello"));
    }
}
