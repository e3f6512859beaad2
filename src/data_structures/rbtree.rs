use log::trace;

use super::node::{Color, Key, Link, NodeId, NodeRef, RemovedEntry};
use super::tree::{Tree, TreeError};

pub type RBTree<V> = Tree<V, Color>;

impl<V> Tree<V, Color> {
    pub fn insert(&mut self, key: Key, value: Option<V>) -> NodeRef<'_, V, Color> {
        let id = self.attach(key, value, Color::Red);
        self.insert_fixup(id);
        self.node_ref(id)
    }

    pub fn delete(&mut self, key: Key) -> Option<RemovedEntry<V>> {
        let target = self.nodes.find(self.root?, key)?;

        let node = &self.nodes[target];
        let removed = if node.left.is_some() && node.right.is_some() {
            let successor = self
                .nodes
                .next_larger(target)
                .expect("a node with two children always has a successor");
            self.nodes.swap_entries(target, successor);
            successor
        } else {
            target
        };

        let node = &self.nodes[removed];
        let (child, parent) = (node.left.or(node.right), node.parent);
        self.transplant(removed, child);

        let node = self.free(removed);
        if node.color == Color::Black {
            self.delete_fixup(child, parent);
        }
        Some(node.into_entry())
    }

    /// Returns the black-height, counting real nodes only.
    pub fn validate(&self) -> Result<usize, TreeError> {
        self.check_links(false)?;
        let Some(root) = self.root else {
            return Ok(0);
        };
        let node = &self.nodes[root];
        if node.color == Color::Red {
            return Err(TreeError::RootNotBlack { key: node.key });
        }
        self.black_height(Some(root))
    }

    fn black_height(&self, link: Link) -> Result<usize, TreeError> {
        let Some(id) = link else {
            return Ok(0);
        };
        let node = &self.nodes[id];
        if node.color == Color::Red
            && (self.color_of(node.left) == Color::Red || self.color_of(node.right) == Color::Red)
        {
            return Err(TreeError::RedRedViolation { key: node.key });
        }

        let left = self.black_height(node.left)?;
        let right = self.black_height(node.right)?;
        if left != right {
            return Err(TreeError::BlackHeightMismatch {
                key: node.key,
                left,
                right,
            });
        }
        Ok(left + usize::from(node.color == Color::Black))
    }

    fn color_of(&self, link: Link) -> Color {
        link.map_or(Color::Black, |id| self.nodes[id].color)
    }

    fn child(&self, id: NodeId, left: bool) -> Link {
        let node = &self.nodes[id];
        if left {
            node.left
        } else {
            node.right
        }
    }

    fn rotate(&mut self, id: NodeId, toward_left: bool) {
        if toward_left {
            self.left_rotate(id);
        } else {
            self.right_rotate(id);
        }
    }

    /// Puts `new` where `old` hangs, updating the root when `old` has no
    /// parent. `old` keeps its own links.
    fn transplant(&mut self, old: NodeId, new: Link) {
        let parent = self.nodes[old].parent;
        match parent {
            Some(parent) => self.nodes.replace_child(parent, old, new),
            None => self.root = new,
        }
        if let Some(new) = new {
            self.nodes[new].parent = parent;
        }
    }

    fn left_rotate(&mut self, x: NodeId) {
        let y = self.nodes[x]
            .right
            .expect("can't perform left rotate without a right child");

        let inner = self.nodes[y].left;
        self.nodes[x].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }
        self.transplant(x, Some(y));
        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn right_rotate(&mut self, x: NodeId) {
        let y = self.nodes[x]
            .left
            .expect("can't perform right rotate without a left child");

        let inner = self.nodes[y].right;
        self.nodes[x].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }
        self.transplant(x, Some(y));
        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);
    }

    /// Restores the properties after `node` was attached as a red leaf. The
    /// only possible violation is `node` and its parent both being red.
    fn insert_fixup(&mut self, mut node: NodeId) {
        while let Some(parent) = self.nodes[node]
            .parent
            .filter(|&parent| self.nodes[parent].color == Color::Red)
        {
            let grandparent = self.nodes[parent]
                .parent
                .expect("a red node is never the root");
            let parent_is_left = self.nodes[grandparent].left == Some(parent);
            let uncle = self.child(grandparent, !parent_is_left);

            if let Some(uncle) = uncle.filter(|&uncle| self.nodes[uncle].color == Color::Red) {
                trace!("insert fixup at {}: red uncle, flipping colors", self.nodes[node].key);
                self.nodes[parent].color = Color::Black;
                self.nodes[uncle].color = Color::Black;
                self.nodes[grandparent].color = Color::Red;
                node = grandparent;
                continue;
            }

            let node_is_left = self.nodes[parent].left == Some(node);
            if node_is_left != parent_is_left {
                trace!("insert fixup at {}: inner grandchild, rotating parent", self.nodes[node].key);
                node = parent;
                self.rotate(node, parent_is_left);
            }

            trace!("insert fixup at {}: outer grandchild, rotating grandparent", self.nodes[node].key);
            let parent = self.nodes[node]
                .parent
                .expect("rotation keeps the grandchild below its parent");
            self.nodes[parent].color = Color::Black;
            self.nodes[grandparent].color = Color::Red;
            self.rotate(grandparent, !parent_is_left);
        }

        if let Some(root) = self.root {
            self.nodes[root].color = Color::Black;
        }
    }

    /// Pays back the black node removed above `node`, which may be absent;
    /// `parent` locates it in that case.
    fn delete_fixup(&mut self, mut node: Link, mut parent: Link) {
        while node != self.root && self.color_of(node) == Color::Black {
            let Some(above) = parent else {
                break;
            };
            let node_is_left = self.nodes[above].left == node;
            let mut sibling = self
                .child(above, !node_is_left)
                .expect("a black deficiency always has a sibling");

            if self.nodes[sibling].color == Color::Red {
                trace!("delete fixup below {}: red sibling", self.nodes[above].key);
                self.nodes[sibling].color = Color::Black;
                self.nodes[above].color = Color::Red;
                self.rotate(above, node_is_left);
                sibling = self
                    .child(above, !node_is_left)
                    .expect("a red sibling has black children");
            }

            let near = self.child(sibling, node_is_left);
            let far = self.child(sibling, !node_is_left);
            if self.color_of(near) == Color::Black && self.color_of(far) == Color::Black {
                trace!("delete fixup below {}: black nephews, moving up", self.nodes[above].key);
                self.nodes[sibling].color = Color::Red;
                node = Some(above);
                parent = self.nodes[above].parent;
                continue;
            }

            if self.color_of(far) == Color::Black {
                trace!("delete fixup below {}: red near nephew", self.nodes[above].key);
                if let Some(near) = near {
                    self.nodes[near].color = Color::Black;
                }
                self.nodes[sibling].color = Color::Red;
                self.rotate(sibling, !node_is_left);
                sibling = self
                    .child(above, !node_is_left)
                    .expect("the near nephew took the sibling's place");
            }

            trace!("delete fixup below {}: red far nephew", self.nodes[above].key);
            self.nodes[sibling].color = self.nodes[above].color;
            self.nodes[above].color = Color::Black;
            if let Some(far) = self.child(sibling, !node_is_left) {
                self.nodes[far].color = Color::Black;
            }
            self.rotate(above, node_is_left);
            node = self.root;
            break;
        }

        if let Some(node) = node {
            self.nodes[node].color = Color::Black;
        }
    }
}
