pub mod ascii_art;
pub mod bst;
pub mod node;
pub mod rbtree;
pub mod tree;
