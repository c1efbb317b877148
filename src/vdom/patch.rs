// ============================================================================
// lumen-ui - Patcher
// Mount, patch, and unmount of virtual trees over a host, plus component
// instances driven by render effects
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::core::context::Job;
use crate::reactive::convert::{reactive, shallow_reactive};
use crate::reactive::value::Value;
use crate::reactivity::effect::{Effect, EffectInner, EffectOptions, effect, run_effect};
use crate::reactivity::scheduling::queue_job;
use crate::vdom::host::{HostOps, NodeId};
use crate::vdom::vnode::{Children, ComponentDef, VKind, VNode};

// =============================================================================
// COMPONENT INSTANCES
// =============================================================================

/// The live state behind a mounted component node.
///
/// `state` is a deep reactive container (or `Null` for stateless components);
/// `props` is shallow reactive, so replacing a prop triggers a re-render but
/// reading into a prop's own container tracks the container, not the
/// instance.
pub struct ComponentInstance {
    state: Value,
    props: Value,
    attrs: RefCell<IndexMap<String, Value>>,
    is_mounted: Cell<bool>,
    sub_tree: RefCell<Option<Rc<VNode>>>,
    update: RefCell<Option<Effect>>,
}

impl ComponentInstance {
    pub fn state(&self) -> &Value {
        &self.state
    }

    pub fn props(&self) -> &Value {
        &self.props
    }

    /// A pass-through attribute: present on the node, not declared as a prop.
    pub fn attr(&self, name: &str) -> Option<Value> {
        self.attrs.borrow().get(name).cloned()
    }
}

/// Split a node's raw props into component props and pass-through attrs.
///
/// Declared names and `on*` handlers become props; the rest are attrs.
pub(crate) fn resolve_props(
    declared: &[String],
    raw: &IndexMap<String, Value>,
) -> (IndexMap<String, Value>, IndexMap<String, Value>) {
    let mut props = IndexMap::new();
    let mut attrs = IndexMap::new();
    for (name, value) in raw {
        if declared.iter().any(|d| d == name) || name.starts_with("on") {
            props.insert(name.clone(), value.clone());
        } else {
            attrs.insert(name.clone(), value.clone());
        }
    }
    (props, attrs)
}

/// Whether a new prop set differs from the old one at all.
pub(crate) fn has_props_changed(
    old: &IndexMap<String, Value>,
    new: &IndexMap<String, Value>,
) -> bool {
    if old.len() != new.len() {
        return true;
    }
    new.iter().any(|(k, v)| old.get(k) != Some(v))
}

// =============================================================================
// RENDERER
// =============================================================================

/// The tree patcher. Generic over the host through [`HostOps`]; cloning
/// shares the host and the per-container root registry.
#[derive(Clone)]
pub struct Renderer {
    pub(crate) ops: Rc<dyn HostOps>,
    roots: Rc<RefCell<HashMap<NodeId, Rc<VNode>>>>,
}

impl Renderer {
    pub fn new(ops: Rc<dyn HostOps>) -> Renderer {
        Renderer {
            ops,
            roots: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Render a tree into a container, diffing against whatever this
    /// renderer put there last time. `None` unmounts the previous tree.
    pub fn render(&self, vnode: Option<Rc<VNode>>, container: NodeId) {
        let prev = self.roots.borrow().get(&container).cloned();
        match vnode {
            Some(node) => {
                self.patch(prev.as_ref(), &node, container, None);
                self.roots.borrow_mut().insert(container, node);
            }
            None => {
                if let Some(prev) = prev {
                    self.unmount(&prev);
                }
                self.roots.borrow_mut().remove(&container);
            }
        }
    }

    /// Patch `new` over `old` inside `container`.
    ///
    /// Nodes of different kinds are never patched in place: the old tree is
    /// unmounted and the new one mounted fresh.
    pub(crate) fn patch(
        &self,
        old: Option<&Rc<VNode>>,
        new: &Rc<VNode>,
        container: NodeId,
        anchor: Option<NodeId>,
    ) {
        let old = match old {
            Some(o) if !o.kind.same(&new.kind) => {
                self.unmount(o);
                None
            }
            other => other,
        };

        match &new.kind {
            VKind::Element(_) => match old {
                None => self.mount_element(new, container, anchor),
                Some(o) => self.patch_element(o, new),
            },
            VKind::Text => match old {
                None => {
                    let id = self.ops.create_text(new.text_content().unwrap_or(""));
                    new.set_el(Some(id));
                    self.ops.insert(id, container, anchor);
                }
                Some(o) => {
                    new.set_el(o.el());
                    if o.text_content() != new.text_content() {
                        if let Some(id) = new.el() {
                            self.ops.set_text(id, new.text_content().unwrap_or(""));
                        }
                    }
                }
            },
            VKind::Fragment => match old {
                None => {
                    if let Children::Nodes(nodes) = &new.children {
                        for child in nodes {
                            self.patch(None, child, container, anchor);
                        }
                    }
                }
                Some(o) => self.patch_children(o, new, container),
            },
            VKind::Component(def) => match old {
                None => self.mount_component(def.clone(), new, container, anchor),
                Some(o) => self.patch_component(o, new),
            },
        }
    }

    /// Tear a tree down: fragments unmount each child, components unmount
    /// their subtree and detach the render effect, everything else detaches
    /// its host node.
    pub(crate) fn unmount(&self, vnode: &Rc<VNode>) {
        match &vnode.kind {
            VKind::Fragment => {
                if let Children::Nodes(nodes) = &vnode.children {
                    for child in nodes {
                        self.unmount(child);
                    }
                }
            }
            VKind::Component(_) => {
                let instance = vnode.component.borrow_mut().take();
                if let Some(instance) = instance {
                    let sub_tree = instance.sub_tree.borrow_mut().take();
                    if let Some(sub_tree) = sub_tree {
                        self.unmount(&sub_tree);
                    }
                    let update = instance.update.borrow_mut().take();
                    if let Some(update) = update {
                        update.stop();
                    }
                }
            }
            _ => {
                if let Some(el) = vnode.el() {
                    self.ops.remove(el);
                }
            }
        }
    }

    // ===== ELEMENTS =====

    fn mount_element(&self, vnode: &Rc<VNode>, container: NodeId, anchor: Option<NodeId>) {
        let VKind::Element(tag) = &vnode.kind else {
            return;
        };
        let el = self.ops.create_element(tag);
        vnode.set_el(Some(el));

        for (name, value) in &vnode.props {
            self.ops.patch_prop(el, name, None, Some(value));
        }
        match &vnode.children {
            Children::Text(s) => self.ops.set_element_text(el, s),
            Children::Nodes(nodes) => {
                for child in nodes {
                    self.patch(None, child, el, None);
                }
            }
            Children::None => {}
        }

        self.ops.insert(el, container, anchor);
    }

    fn patch_element(&self, old: &Rc<VNode>, new: &Rc<VNode>) {
        let Some(el) = old.el() else {
            return;
        };
        new.set_el(Some(el));

        for (name, next) in &new.props {
            let prev = old.props.get(name);
            if prev != Some(next) {
                self.ops.patch_prop(el, name, prev, Some(next));
            }
        }
        for (name, prev) in &old.props {
            if !new.props.contains_key(name) {
                self.ops.patch_prop(el, name, Some(prev), None);
            }
        }

        self.patch_children(old, new, el);
    }

    /// Patch child content in place inside `container`.
    pub(crate) fn patch_children(&self, old: &Rc<VNode>, new: &Rc<VNode>, container: NodeId) {
        match (&old.children, &new.children) {
            (Children::Nodes(old_nodes), Children::Nodes(new_nodes)) => {
                self.fast_diff(old_nodes, new_nodes, container);
            }
            (Children::Nodes(old_nodes), Children::Text(s)) => {
                for child in old_nodes {
                    self.unmount(child);
                }
                self.ops.set_element_text(container, s);
            }
            (Children::Nodes(old_nodes), Children::None) => {
                for child in old_nodes {
                    self.unmount(child);
                }
            }
            (Children::Text(prev), Children::Text(s)) => {
                if prev != s {
                    self.ops.set_element_text(container, s);
                }
            }
            (Children::Text(_), Children::Nodes(new_nodes)) => {
                self.ops.set_element_text(container, "");
                for child in new_nodes {
                    self.patch(None, child, container, None);
                }
            }
            (Children::Text(_), Children::None) => {
                self.ops.set_element_text(container, "");
            }
            (Children::None, Children::Nodes(new_nodes)) => {
                for child in new_nodes {
                    self.patch(None, child, container, None);
                }
            }
            (Children::None, Children::Text(s)) => {
                self.ops.set_element_text(container, s);
            }
            (Children::None, Children::None) => {}
        }
    }

    // ===== COMPONENTS =====

    fn mount_component(
        &self,
        def: Rc<ComponentDef>,
        vnode: &Rc<VNode>,
        container: NodeId,
        anchor: Option<NodeId>,
    ) {
        let (props, attrs) = resolve_props(&def.props, &vnode.props);
        let state = match &def.data {
            Some(data) => reactive(data()),
            None => Value::Null,
        };

        let instance = Rc::new(ComponentInstance {
            state,
            props: shallow_reactive(Value::map(props)),
            attrs: RefCell::new(attrs),
            is_mounted: Cell::new(false),
            sub_tree: RefCell::new(None),
            update: RefCell::new(None),
        });
        *vnode.component.borrow_mut() = Some(instance.clone());

        // The render effect captures the instance and node weakly so the
        // instance does not keep itself alive through its own effect.
        let renderer = self.clone();
        let inst_weak = Rc::downgrade(&instance);
        let vnode_weak = Rc::downgrade(vnode);
        let body = move || {
            let Some(instance) = inst_weak.upgrade() else {
                return Value::Null;
            };
            let next_tree = (def.render)(&instance);
            let prev_tree = instance.sub_tree.borrow().clone();
            if instance.is_mounted.get() {
                renderer.patch(prev_tree.as_ref(), &next_tree, container, None);
            } else {
                renderer.patch(None, &next_tree, container, anchor);
                instance.is_mounted.set(true);
            }
            if let Some(vn) = vnode_weak.upgrade() {
                vn.set_el(next_tree.el());
            }
            *instance.sub_tree.borrow_mut() = Some(next_tree);
            Value::Null
        };

        // Re-renders batch through the queue under one stable job per
        // instance, so a burst of writes costs one render.
        let effect_slot: Rc<RefCell<Weak<EffectInner>>> = Rc::new(RefCell::new(Weak::new()));
        let job: Job = {
            let effect_slot = effect_slot.clone();
            Rc::new(move || {
                if let Some(update) = effect_slot.borrow().upgrade() {
                    run_effect(&update);
                }
            })
        };
        let scheduler: Rc<dyn Fn(&Effect)> = Rc::new(move |_e: &Effect| queue_job(&job));

        let update = effect(
            body,
            EffectOptions {
                lazy: false,
                scheduler: Some(scheduler),
            },
        );
        *effect_slot.borrow_mut() = Rc::downgrade(update.inner());
        *instance.update.borrow_mut() = Some(update);
    }

    fn patch_component(&self, old: &Rc<VNode>, new: &Rc<VNode>) {
        let instance = old.component.borrow().clone();
        *new.component.borrow_mut() = instance.clone();
        new.set_el(old.el());

        let Some(instance) = instance else {
            return;
        };
        let VKind::Component(def) = &new.kind else {
            return;
        };

        // Compare resolved props of the two nodes; only a real change is
        // pushed into the instance (and only that triggers a re-render).
        let (old_props, _) = resolve_props(&def.props, &old.props);
        let (new_props, new_attrs) = resolve_props(&def.props, &new.props);
        if has_props_changed(&old_props, &new_props) {
            if let Some(obs) = instance.props.as_obs() {
                for (name, value) in &new_props {
                    obs.set(name.as_str(), value.clone());
                }
                for name in old_props.keys() {
                    if !new_props.contains_key(name) {
                        obs.delete(name);
                    }
                }
            }
        }
        *instance.attrs.borrow_mut() = new_attrs;
    }
}

// =============================================================================
// TESTS
// =============================================================================
