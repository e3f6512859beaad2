use thiserror::Error;

use super::ascii_art;
use super::node::{Key, Link, Node, NodeId, NodeRef, Nodes};

/// Structural problems reported by `validate`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("key {key} lies outside the range allowed by its ancestors")]
    Unordered { key: Key },
    #[error("node with key {key} does not point back to its parent")]
    BrokenParentLink { key: Key },
    #[error("tree reports {expected} nodes but {found} are reachable from the root")]
    LengthMismatch { expected: usize, found: usize },
    #[error("root with key {key} is red")]
    RootNotBlack { key: Key },
    #[error("red node with key {key} has a red child")]
    RedRedViolation { key: Key },
    #[error("black-height differs below key {key}: {left} on the left, {right} on the right")]
    BlackHeightMismatch { key: Key, left: usize, right: usize },
}

/// `C` picks the variant: `()` for [`Bst`](super::bst::Bst), `Color` for
/// [`RBTree`](super::rbtree::RBTree).
#[derive(Debug, Clone)]
pub struct Tree<V, C = ()> {
    pub(crate) nodes: Nodes<V, C>,
    pub(crate) root: Link,
    len: usize,
}

impl<V, C> Tree<V, C> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Nodes::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<NodeRef<'_, V, C>> {
        self.root.map(|id| self.node_ref(id))
    }

    pub fn find(&self, key: Key) -> Option<NodeRef<'_, V, C>> {
        let id = self.nodes.find(self.root?, key)?;
        Some(self.node_ref(id))
    }

    pub fn find_min(&self) -> Option<NodeRef<'_, V, C>> {
        self.root.map(|root| self.node_ref(self.nodes.find_min(root)))
    }

    pub fn find_max(&self) -> Option<NodeRef<'_, V, C>> {
        self.root.map(|root| self.node_ref(self.nodes.find_max(root)))
    }

    /// Successor of the node holding `key`.
    pub fn next_larger(&self, key: Key) -> Option<NodeRef<'_, V, C>> {
        self.find(key)?.next_larger()
    }

    /// Predecessor of the node holding `key`.
    pub fn next_smaller(&self, key: Key) -> Option<NodeRef<'_, V, C>> {
        self.find(key)?.next_smaller()
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        let id = self.nodes.find(self.root?, key)?;
        self.nodes[id].value.as_mut()
    }

    pub fn iter(&self) -> Iter<'_, V, C> {
        Iter {
            next: self.find_min(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.iter().map(|node| node.key())
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = &self.nodes[id];
            for child in [node.left, node.right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        deepest
    }

    pub fn render(&self) -> String {
        ascii_art::render(self.root())
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> NodeRef<'_, V, C> {
        NodeRef::new(&self.nodes, id)
    }

    /// Allocates a node and links it in by key, without any rebalancing.
    pub(crate) fn attach(&mut self, key: Key, value: Option<V>, color: C) -> NodeId {
        let id = self.nodes.alloc(Node::new(key, value, color));
        match self.root {
            Some(root) => self.nodes.place(root, id),
            None => self.root = Some(id),
        }
        self.len += 1;
        id
    }

    /// Releases a node that is no longer linked into the tree.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<V, C> {
        self.len -= 1;
        self.nodes.release(id)
    }

    /// Checks key ranges and parent links of every reachable node. Rotations
    /// can lift an equal key above its twin, so `strict_left` only holds for
    /// trees that never rotate.
    pub(crate) fn check_links(&self, strict_left: bool) -> Result<(), TreeError> {
        let mut found = 0;
        let mut stack: Vec<(NodeId, Option<Key>, Option<Key>)> = Vec::new();
        if let Some(root) = self.root {
            let node = &self.nodes[root];
            if node.parent.is_some() {
                return Err(TreeError::BrokenParentLink { key: node.key });
            }
            stack.push((root, None, None));
        }

        while let Some((id, lower, upper)) = stack.pop() {
            found += 1;
            let node = &self.nodes[id];
            let above_lower = lower.map_or(true, |lower| node.key >= lower);
            let below_upper = upper.map_or(true, |upper| {
                node.key < upper || (!strict_left && node.key == upper)
            });
            if !(above_lower && below_upper) {
                return Err(TreeError::Unordered { key: node.key });
            }

            let children = [
                (node.left, lower, Some(node.key)),
                (node.right, Some(node.key), upper),
            ];
            for (child, lower, upper) in children {
                if let Some(child) = child {
                    if self.nodes[child].parent != Some(id) {
                        return Err(TreeError::BrokenParentLink {
                            key: self.nodes[child].key,
                        });
                    }
                    stack.push((child, lower, upper));
                }
            }
        }

        if found != self.len {
            return Err(TreeError::LengthMismatch {
                expected: self.len,
                found,
            });
        }
        Ok(())
    }
}

impl<V, C> Default for Tree<V, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// In-order walk driven by successor links.
pub struct Iter<'a, V, C> {
    next: Option<NodeRef<'a, V, C>>,
}

impl<'a, V, C> Iterator for Iter<'a, V, C> {
    type Item = NodeRef<'a, V, C>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.take().map(|node| {
            self.next = node.next_larger();
            node
        })
    }
}

impl<'a, V, C> IntoIterator for &'a Tree<V, C> {
    type Item = NodeRef<'a, V, C>;
    type IntoIter = Iter<'a, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::{Tree, TreeError};
    use crate::data_structures::bst::Bst;

    fn sample() -> Bst<&'static str> {
        let mut tree = Bst::new();
        for (key, value) in [(50, "a"), (20, "b"), (1, "c"), (80, "d"), (5, "e")] {
            tree.insert(key, Some(value));
        }
        tree
    }

    #[test]
    fn successfully_construct_empty_tree() {
        let tree: Tree<i32> = Tree::default();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert!(tree.root().is_none());
        assert!(tree.find(3).is_none());
        assert!(tree.find_min().is_none());
        assert!(tree.find_max().is_none());
        assert!(tree.next_larger(3).is_none());
        assert_eq!(tree.iter().count(), 0);
        assert_eq!(tree.render(), "");
    }

    #[test]
    fn iteration_is_in_key_order() {
        let tree = sample();
        assert_eq!(tree.keys().collect::<Vec<_>>(), vec![1, 5, 20, 50, 80]);
        let values: Vec<_> = (&tree).into_iter().filter_map(|node| node.value()).collect();
        assert_eq!(values, vec![&"c", &"e", &"b", &"a", &"d"]);
    }

    #[test]
    fn tree_level_neighbours() {
        let tree = sample();
        assert_eq!(tree.next_larger(20).map(|node| node.key()), Some(50));
        assert_eq!(tree.next_smaller(20).map(|node| node.key()), Some(5));
        assert!(tree.next_smaller(1).is_none());
        assert!(tree.next_larger(21).is_none());
    }

    #[test]
    fn get_mut_updates_payload_in_place() {
        let mut tree = sample();
        *tree.get_mut(80).unwrap() = "z";
        assert_eq!(tree.find(80).unwrap().value(), Some(&"z"));
        assert!(tree.get_mut(81).is_none());
    }

    #[test]
    fn height_counts_nodes_on_longest_path() {
        let tree = sample();
        assert_eq!(tree.height(), 4);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn check_links_reports_misplaced_key() {
        let mut tree = sample();
        let id = tree.find(5).unwrap().id();
        tree.nodes[id].key = 60;
        assert_eq!(
            tree.check_links(true),
            Err(TreeError::Unordered { key: 60 })
        );
    }

    #[test]
    fn check_links_reports_broken_parent() {
        let mut tree = sample();
        let id = tree.find(1).unwrap().id();
        tree.nodes[id].parent = tree.root;
        assert_eq!(
            tree.check_links(true),
            Err(TreeError::BrokenParentLink { key: 1 })
        );
    }

    #[test]
    fn check_links_tolerates_lifted_twin_only_when_relaxed() {
        let mut tree = sample();
        let id = tree.find(5).unwrap().id();
        tree.nodes[id].key = 20;
        assert!(tree.check_links(false).is_ok());
        assert_eq!(
            tree.check_links(true),
            Err(TreeError::Unordered { key: 20 })
        );
    }
}
