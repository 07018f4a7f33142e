/// Data model for the TextSleuth search tree.
///
/// Re-exports the arena-allocated tree structure and its node types.
pub mod file_node;
pub mod file_tree;

pub use file_node::{FileNode, NodeIndex};
pub use file_tree::FileTree;
