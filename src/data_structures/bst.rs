use log::debug;

use super::node::{Key, Node, NodeId, NodeRef, RemovedEntry};
use super::tree::{Tree, TreeError};

/// Unbalanced binary search tree. Equal keys descend right.
pub type Bst<V> = Tree<V, ()>;

impl<V> Tree<V, ()> {
    pub fn insert(&mut self, key: Key, value: Option<V>) -> NodeRef<'_, V, ()> {
        let id = self.attach(key, value, ());
        self.node_ref(id)
    }

    /// Removes one node holding `key` and hands back its key and value.
    pub fn delete(&mut self, key: Key) -> Option<RemovedEntry<V>> {
        let target = self.nodes.find(self.root?, key)?;
        if Some(target) != self.root {
            let removed = self.delete_node(target);
            return Some(self.free(removed).into_entry());
        }

        // splicing rewrites the parent's child slot, so the root borrows one
        debug!("deleting root {key} through a pseudo-root");
        let pseudo_root = self.nodes.alloc(Node::new(key, None, ()));
        self.nodes[pseudo_root].left = Some(target);
        self.nodes[target].parent = Some(pseudo_root);

        let removed = self.delete_node(target);

        self.root = self.nodes[pseudo_root].left;
        if let Some(root) = self.root {
            self.nodes[root].parent = None;
        }
        self.nodes.release(pseudo_root);
        Some(self.free(removed).into_entry())
    }

    /// Unlinks `id`, or the successor it traded entries with, and returns
    /// whichever node actually left the tree.
    fn delete_node(&mut self, id: NodeId) -> NodeId {
        let node = &self.nodes[id];
        if node.left.is_none() || node.right.is_none() {
            self.nodes.splice(id);
            return id;
        }

        let successor = self
            .nodes
            .next_larger(id)
            .expect("a node with two children always has a successor");
        self.nodes.swap_entries(id, successor);
        self.delete_node(successor)
    }

    pub fn validate(&self) -> Result<(), TreeError> {
        self.check_links(true)
    }
}
