pub mod data_structures;

pub use data_structures::bst::Bst;
pub use data_structures::node::{Color, Key, NodeId, NodeRef, RemovedEntry};
pub use data_structures::rbtree::RBTree;
pub use data_structures::tree::{Tree, TreeError};
