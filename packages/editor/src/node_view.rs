//! The node-view lifecycle bridge.
//!
//! A [`NodeViewBinding`] owns exactly one rendered [`Fragment`] for one
//! document node. Bindings live in a [`NodeViewRegistry`] owned by the
//! view layer; every lifecycle call goes through the registry so that
//! the pending-render set and the live set stay consistent.
//!
//! Lifecycle per binding: attached → (selected ⇄ deselected) → destroyed.
//! Destruction is terminal and idempotent; a deferred render scheduled
//! before destruction is cancelled by it.

use indexmap::IndexMap;
use std::collections::VecDeque;
use std::rc::Rc;

use vellum_doc::{Decoration, Node, NodePath};

use crate::fragment::Fragment;

/// Renders one node's UI fragment from its current context.
pub type NodeViewRenderer = Rc<dyn Fn(&NodeViewContext) -> Fragment>;

/// Position accessor handed to a binding at creation; yields `None`
/// once the binding's node has left the tree.
pub type GetPos = Rc<dyn Fn() -> Option<NodePath>>;

pub type BindingId = u64;

/// What a renderer sees on each (re-)render.
pub struct NodeViewContext {
    pub node: Node,
    pub is_selected: bool,
    pub is_editable: bool,
    pub pos: Option<NodePath>,
    pub decorations: Vec<Decoration>,
}

/// One live binding between a document node and a rendered fragment.
pub struct NodeViewBinding {
    id: BindingId,
    node: Node,
    renderer: NodeViewRenderer,
    get_pos: GetPos,
    decorations: Vec<Decoration>,
    selected: bool,
    inline: bool,
    fragment: Fragment,
}

impl NodeViewBinding {
    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    /// Externally observed mutations inside the owned fragment are not
    /// document edits.
    pub fn ignore_mutation(&self) -> bool {
        true
    }

    /// Events inside the fragment do not propagate as document events.
    pub fn stop_event(&self) -> bool {
        true
    }

    fn render(&mut self, editable: bool) {
        let context = NodeViewContext {
            node: self.node.clone(),
            is_selected: self.selected,
            is_editable: editable,
            pos: (self.get_pos)(),
            decorations: self.decorations.clone(),
        };
        let surface = if self.inline { "span" } else { "div" };
        self.fragment = Fragment::element(surface).with_child((self.renderer)(&context));
    }
}

/// The instance-scoped set of live bindings plus the deferred-render
/// queue.
#[derive(Default)]
pub struct NodeViewRegistry {
    bindings: IndexMap<BindingId, NodeViewBinding>,
    pending: VecDeque<BindingId>,
    next_id: BindingId,
}

impl NodeViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a binding and synchronously render its first fragment.
    pub fn create(
        &mut self,
        renderer: NodeViewRenderer,
        node: Node,
        editable: bool,
        get_pos: GetPos,
        decorations: Vec<Decoration>,
        inline: bool,
    ) -> BindingId {
        let id = self.next_id;
        self.next_id += 1;

        let mut binding = NodeViewBinding {
            id,
            node,
            renderer,
            get_pos,
            decorations,
            selected: false,
            inline,
            fragment: Fragment::element(if inline { "span" } else { "div" }),
        };
        binding.render(editable);
        self.bindings.insert(id, binding);
        id
    }

    /// Adopt a structurally compatible replacement node. Returns `false`
    /// on a type mismatch (the caller must destroy and recreate) and for
    /// bindings that no longer exist.
    pub fn update(&mut self, id: BindingId, node: Node) -> bool {
        let Some(binding) = self.bindings.get_mut(&id) else {
            return false;
        };
        if binding.node.type_name != node.type_name {
            return false;
        }
        if binding.node == node {
            return true;
        }
        binding.node = node;
        self.schedule(id);
        true
    }

    /// Flip the selected flag; ignored entirely in a read-only document.
    pub fn select_node(&mut self, id: BindingId, editable: bool) {
        if !editable {
            return;
        }
        if let Some(binding) = self.bindings.get_mut(&id) {
            if !binding.selected {
                binding.selected = true;
                self.schedule(id);
            }
        }
    }

    pub fn deselect_node(&mut self, id: BindingId, editable: bool) {
        if !editable {
            return;
        }
        if let Some(binding) = self.bindings.get_mut(&id) {
            if binding.selected {
                binding.selected = false;
                self.schedule(id);
            }
        }
    }

    /// Destroy a binding: releases its fragment and cancels any pending
    /// render. Destroying twice (or an unknown id) is a no-op.
    pub fn destroy(&mut self, id: BindingId) {
        self.bindings.shift_remove(&id);
        self.pending.retain(|pending| *pending != id);
    }

    /// Queue a deferred re-render for a binding; coalesced per binding.
    pub fn schedule(&mut self, id: BindingId) {
        if !self.pending.contains(&id) {
            self.pending.push_back(id);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self, id: BindingId) -> bool {
        self.pending.contains(&id)
    }

    /// Run every queued render. Ids whose binding was destroyed since
    /// scheduling are skipped. The queue is drained front-to-back so a
    /// render scheduling further work stays safe.
    pub fn flush(&mut self, editable: bool) {
        while let Some(id) = self.pending.pop_front() {
            if let Some(binding) = self.bindings.get_mut(&id) {
                binding.render(editable);
            }
        }
    }

    pub fn get(&self, id: BindingId) -> Option<&NodeViewBinding> {
        self.bindings.get(&id)
    }

    pub fn contains(&self, id: BindingId) -> bool {
        self.bindings.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Every live binding's current fragment, in insertion order.
    pub fn fragments(&self) -> Vec<Fragment> {
        self.bindings
            .values()
            .map(|binding| binding.fragment.clone())
            .collect()
    }

    pub fn ids(&self) -> Vec<BindingId> {
        self.bindings.keys().copied().collect()
    }

    /// Destroy every binding.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> NodeViewRenderer {
        Rc::new(|ctx: &NodeViewContext| {
            let mut el = Fragment::element("widget").with_attr("type", ctx.node.type_name.clone());
            if ctx.is_selected {
                el = el.with_attr("selected", "true");
            }
            el
        })
    }

    fn get_pos() -> GetPos {
        Rc::new(|| Some(NodePath::new(vec![0])))
    }

    fn registry_with_binding() -> (NodeViewRegistry, BindingId) {
        let mut registry = NodeViewRegistry::new();
        let id = registry.create(
            renderer(),
            Node::new("image"),
            true,
            get_pos(),
            Vec::new(),
            false,
        );
        (registry, id)
    }

    #[test]
    fn test_create_renders_synchronously() {
        let (registry, id) = registry_with_binding();
        let binding = registry.get(id).unwrap();
        assert_eq!(binding.fragment().tag(), Some("div"));
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_update_with_same_type_is_deferred() {
        let (mut registry, id) = registry_with_binding();
        assert!(registry.update(id, Node::new("image").with_attr("src", "a.png".into())));
        assert_eq!(registry.pending_count(), 1);

        registry.flush(true);
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_update_with_mismatched_type_is_refused() {
        let (mut registry, id) = registry_with_binding();
        assert!(!registry.update(id, Node::new("embed")));
        // A refused update never schedules a render.
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_selection_ignored_when_not_editable() {
        let (mut registry, id) = registry_with_binding();
        registry.select_node(id, false);

        assert!(!registry.get(id).unwrap().is_selected());
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_selection_round_trip_when_editable() {
        let (mut registry, id) = registry_with_binding();
        registry.select_node(id, true);
        assert!(registry.get(id).unwrap().is_selected());

        registry.flush(true);
        let fragment = registry.get(id).unwrap().fragment().clone();
        let Fragment::Element { children, .. } = fragment else {
            panic!("expected element fragment");
        };
        assert_eq!(children[0].attr("selected"), Some("true"));

        registry.deselect_node(id, true);
        assert!(!registry.get(id).unwrap().is_selected());
    }

    #[test]
    fn test_destroy_cancels_pending_render_and_is_idempotent() {
        let (mut registry, id) = registry_with_binding();
        registry.update(id, Node::new("image"));
        assert_eq!(registry.pending_count(), 1);

        registry.destroy(id);
        assert_eq!(registry.pending_count(), 0);
        assert!(!registry.contains(id));

        // A second destroy and a late flush are both no-ops.
        registry.destroy(id);
        registry.flush(true);
        assert!(!registry.contains(id));
    }

    #[test]
    fn test_fragments_compose_in_insertion_order() {
        let mut registry = NodeViewRegistry::new();
        let first = registry.create(
            renderer(),
            Node::new("image"),
            true,
            get_pos(),
            Vec::new(),
            false,
        );
        let _second = registry.create(
            renderer(),
            Node::new("embed"),
            true,
            get_pos(),
            Vec::new(),
            false,
        );
        registry.destroy(first);
        let _third = registry.create(
            renderer(),
            Node::new("image"),
            true,
            get_pos(),
            Vec::new(),
            false,
        );

        let types: Vec<_> = registry
            .fragments()
            .iter()
            .map(|f| {
                let Fragment::Element { children, .. } = f else {
                    panic!("expected element");
                };
                children[0].attr("type").unwrap().to_string()
            })
            .collect();
        assert_eq!(types, vec!["embed".to_string(), "image".to_string()]);
    }
}
