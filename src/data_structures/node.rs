use std::cmp::Ordering;
use std::fmt;
use std::ops::{Index, IndexMut};

pub type Key = i64;

/// Position of a node inside the arena of the tree that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

pub(crate) type Link = Option<NodeId>;

#[derive(Debug, PartialEq, Eq, PartialOrd, Clone, Copy, Default)]
pub enum Color {
    Red,
    #[default]
    Black,
}

/// Key and value of a node that has been removed from a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEntry<V> {
    pub key: Key,
    pub value: Option<V>,
}

#[derive(Debug, Clone)]
pub(crate) struct Node<V, C> {
    pub(crate) key: Key,
    pub(crate) value: Option<V>,
    pub(crate) color: C,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) parent: Link,
}

impl<V, C> Node<V, C> {
    pub(crate) fn new(key: Key, value: Option<V>, color: C) -> Self {
        Node {
            key,
            value,
            color,
            left: None,
            right: None,
            parent: None,
        }
    }

    pub(crate) fn into_entry(self) -> RemovedEntry<V> {
        RemovedEntry {
            key: self.key,
            value: self.value,
        }
    }
}

#[derive(Debug, Clone)]
enum Slot<V, C> {
    Occupied(Node<V, C>),
    Vacant { next_free: Option<usize> },
}

/// Arena owning every node of one tree. Vacated slots are chained into a
/// free list and handed out again by `alloc`.
#[derive(Debug, Clone)]
pub(crate) struct Nodes<V, C> {
    slots: Vec<Slot<V, C>>,
    free: Option<usize>,
}

impl<V, C> Nodes<V, C> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: None,
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<V, C>) -> NodeId {
        match self.free {
            Some(index) => {
                let previous = std::mem::replace(&mut self.slots[index], Slot::Occupied(node));
                self.free = match previous {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => panic!("free list points at occupied slot {index}"),
                };
                NodeId(index)
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    pub(crate) fn release(&mut self, id: NodeId) -> Node<V, C> {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        match std::mem::replace(&mut self.slots[id.0], vacant) {
            Slot::Occupied(node) => {
                self.free = Some(id.0);
                node
            }
            Slot::Vacant { .. } => panic!("{id:?} was released twice"),
        }
    }

    /// Node with `key` in the subtree rooted at `from`. With duplicates the
    /// match closest to `from` wins.
    pub(crate) fn find(&self, from: NodeId, key: Key) -> Link {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = &self[id];
            current = match key.cmp(&node.key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    pub(crate) fn find_min(&self, from: NodeId) -> NodeId {
        let mut current = from;
        while let Some(left) = self[current].left {
            current = left;
        }
        current
    }

    pub(crate) fn find_max(&self, from: NodeId) -> NodeId {
        let mut current = from;
        while let Some(right) = self[current].right {
            current = right;
        }
        current
    }

    pub(crate) fn next_larger(&self, id: NodeId) -> Link {
        if let Some(right) = self[id].right {
            return Some(self.find_min(right));
        }

        let mut current = id;
        while let Some(parent) = self[current].parent {
            if self[parent].right != Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    pub(crate) fn next_smaller(&self, id: NodeId) -> Link {
        if let Some(left) = self[id].left {
            return Some(self.find_max(left));
        }

        let mut current = id;
        while let Some(parent) = self[current].parent {
            if self[parent].left != Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    pub(crate) fn is_left_child(&self, id: NodeId) -> bool {
        self[id]
            .parent
            .is_some_and(|parent| self[parent].left == Some(id))
    }

    /// Hangs the detached node `id` below the subtree rooted at `from`.
    /// Equal keys go right.
    pub(crate) fn place(&mut self, from: NodeId, id: NodeId) {
        let key = self[id].key;
        let mut current = from;
        loop {
            let node = &mut self[current];
            let slot = if key < node.key {
                &mut node.left
            } else {
                &mut node.right
            };
            match *slot {
                Some(next) => current = next,
                None => {
                    *slot = Some(id);
                    break;
                }
            }
        }
        self[id].parent = Some(current);
    }

    pub(crate) fn replace_child(&mut self, parent: NodeId, old: NodeId, new: Link) {
        let parent = &mut self[parent];
        if parent.left == Some(old) {
            parent.left = new;
        } else {
            parent.right = new;
        }
    }

    /// Unlinks a node with at most one child, moving that child into its
    /// slot. The node stays allocated.
    pub(crate) fn splice(&mut self, id: NodeId) -> Link {
        let node = &self[id];
        assert!(
            node.left.is_none() || node.right.is_none(),
            "can't splice out a node with two children"
        );
        let child = node.left.or(node.right);
        let parent = node
            .parent
            .expect("can't delete a node whose parent is missing");

        self.replace_child(parent, id, child);
        if let Some(child) = child {
            self[child].parent = Some(parent);
        }
        child
    }

    pub(crate) fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (key_b, value_b) = {
            let node = &mut self[b];
            (node.key, node.value.take())
        };
        let node = &mut self[a];
        let key_a = std::mem::replace(&mut node.key, key_b);
        let value_a = std::mem::replace(&mut node.value, value_b);
        let node = &mut self[b];
        node.key = key_a;
        node.value = value_a;
    }
}

impl<V, C> Index<NodeId> for Nodes<V, C> {
    type Output = Node<V, C>;

    fn index(&self, id: NodeId) -> &Self::Output {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("{id:?} refers to a released node"),
        }
    }
}

impl<V, C> IndexMut<NodeId> for Nodes<V, C> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match &mut self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("{id:?} refers to a released node"),
        }
    }
}

/// Borrowed view of a node. Holding one keeps the tree immutably borrowed,
/// so it can never observe a structural change.
pub struct NodeRef<'a, V, C> {
    nodes: &'a Nodes<V, C>,
    id: NodeId,
}

impl<'a, V, C> NodeRef<'a, V, C> {
    pub(crate) fn new(nodes: &'a Nodes<V, C>, id: NodeId) -> Self {
        Self { nodes, id }
    }

    fn node(&self) -> &'a Node<V, C> {
        &self.nodes[self.id]
    }

    fn wrap(&self, link: Link) -> Option<Self> {
        link.map(|id| Self::new(self.nodes, id))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn key(&self) -> Key {
        self.node().key
    }

    pub fn value(&self) -> Option<&'a V> {
        self.node().value.as_ref()
    }

    pub fn parent(&self) -> Option<Self> {
        self.wrap(self.node().parent)
    }

    pub fn left(&self) -> Option<Self> {
        self.wrap(self.node().left)
    }

    pub fn right(&self) -> Option<Self> {
        self.wrap(self.node().right)
    }

    pub fn is_left_child(&self) -> bool {
        self.nodes.is_left_child(self.id)
    }

    /// Searches only the subtree rooted at this node.
    pub fn find(&self, key: Key) -> Option<Self> {
        self.wrap(self.nodes.find(self.id, key))
    }

    pub fn find_min(&self) -> Self {
        Self::new(self.nodes, self.nodes.find_min(self.id))
    }

    pub fn find_max(&self) -> Self {
        Self::new(self.nodes, self.nodes.find_max(self.id))
    }

    /// In-order successor.
    pub fn next_larger(&self) -> Option<Self> {
        self.wrap(self.nodes.next_larger(self.id))
    }

    /// In-order predecessor.
    pub fn next_smaller(&self) -> Option<Self> {
        self.wrap(self.nodes.next_smaller(self.id))
    }
}

impl<V> NodeRef<'_, V, Color> {
    pub fn color(&self) -> Color {
        self.node().color
    }
}

impl<V, C> Clone for NodeRef<'_, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, C> Copy for NodeRef<'_, V, C> {}

impl<V: fmt::Debug, C: fmt::Debug> fmt::Debug for NodeRef<'_, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node();
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("key", &node.key)
            .field("value", &node.value)
            .field("color", &node.color)
            .finish()
    }
}
