//! The view layer: holds the current state, the editable flag, and the
//! node-view bindings, and reconciles the bindings against each new
//! document.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use vellum_doc::{Decoration, EditorState, Node, NodePath, Plugin, Selection};

use crate::fragment::Fragment;
use crate::node_view::{BindingId, GetPos, NodeViewRegistry, NodeViewRenderer};

/// Factory data for one bridged node type.
#[derive(Clone)]
pub struct NodeViewFactory {
    pub renderer: NodeViewRenderer,
    pub inline: bool,
}

pub struct EditorView {
    state: EditorState,
    editable: bool,
    factories: HashMap<String, NodeViewFactory>,
    plugins: Vec<Arc<dyn Plugin>>,
    registry: NodeViewRegistry,
    bound: HashMap<NodePath, BindingId>,
    slots: HashMap<BindingId, Rc<RefCell<Option<NodePath>>>>,
}

impl EditorView {
    pub fn new(
        state: EditorState,
        editable: bool,
        factories: HashMap<String, NodeViewFactory>,
        plugins: Vec<Arc<dyn Plugin>>,
    ) -> Self {
        let mut view = Self {
            state,
            editable,
            factories,
            plugins,
            registry: NodeViewRegistry::new(),
            bound: HashMap::new(),
            slots: HashMap::new(),
        };
        view.reconcile();
        view
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn bindings(&self) -> &NodeViewRegistry {
        &self.registry
    }

    pub fn bindings_mut(&mut self) -> &mut NodeViewRegistry {
        &mut self.registry
    }

    /// The binding currently attached at a document position, if any.
    pub fn binding_at(&self, path: &NodePath) -> Option<BindingId> {
        self.bound.get(path).copied()
    }

    /// Swap in a new state and bring the bindings in line with it.
    pub fn update_state(&mut self, state: EditorState) {
        self.state = state;
        self.reconcile();
    }

    /// Flush deferred node-view renders and compose every live
    /// binding's fragment, in insertion order.
    pub fn render(&mut self) -> Vec<Fragment> {
        self.registry.flush(self.editable);
        self.registry.fragments()
    }

    /// Tear down every binding.
    pub fn destroy(&mut self) {
        for (_, slot) in self.slots.drain() {
            *slot.borrow_mut() = None;
        }
        self.bound.clear();
        self.registry.clear();
    }

    fn reconcile(&mut self) {
        let mut desired: Vec<(NodePath, Node)> = Vec::new();
        {
            let factories = &self.factories;
            self.state.doc.descendants(&mut |node, path| {
                if factories.contains_key(&node.type_name) {
                    desired.push((path.clone(), node.clone()));
                }
            });
        }

        let decorations: Vec<Decoration> = self
            .plugins
            .iter()
            .flat_map(|plugin| plugin.decorations(&self.state))
            .collect();

        let old_bound = std::mem::take(&mut self.bound);
        let mut new_bound: HashMap<NodePath, BindingId> = HashMap::new();

        for (path, node) in desired {
            if let Some(id) = old_bound.get(&path).copied() {
                if self.registry.update(id, node.clone()) {
                    if let Some(slot) = self.slots.get(&id) {
                        *slot.borrow_mut() = Some(path.clone());
                    }
                    new_bound.insert(path, id);
                    continue;
                }
                // Type change at this position: the old binding is torn
                // down and a fresh one attached.
                self.destroy_binding(id);
            }

            let factory = self.factories[&node.type_name].clone();
            let node_decorations: Vec<Decoration> = decorations
                .iter()
                .filter(|d| d.path == path)
                .cloned()
                .collect();

            let slot = Rc::new(RefCell::new(Some(path.clone())));
            let handle = slot.clone();
            let get_pos: GetPos = Rc::new(move || handle.borrow().clone());

            let id = self.registry.create(
                factory.renderer,
                node,
                self.editable,
                get_pos,
                node_decorations,
                factory.inline,
            );
            self.slots.insert(id, slot);
            new_bound.insert(path, id);
        }

        for (path, id) in old_bound {
            let kept = new_bound.get(&path) == Some(&id);
            if !kept && self.registry.contains(id) {
                self.destroy_binding(id);
            }
        }
        self.bound = new_bound;

        self.apply_selection();
    }

    fn apply_selection(&mut self) {
        let selected = match &self.state.selection {
            Selection::Node { path } => self.bound.get(path).copied(),
            Selection::Text { .. } => None,
        };
        for id in self.registry.ids() {
            if Some(id) == selected {
                self.registry.select_node(id, self.editable);
            } else {
                self.registry.deselect_node(id, self.editable);
            }
        }
    }

    fn destroy_binding(&mut self, id: BindingId) {
        if let Some(slot) = self.slots.remove(&id) {
            *slot.borrow_mut() = None;
        }
        self.registry.destroy(id);
    }
}
