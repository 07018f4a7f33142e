/// A single node in the arena-allocated search tree.
///
/// Nodes are stored in a flat `Vec<FileNode>`. Parent-child relationships
/// use indices rather than pointers, so a finished tree can be shared with a
/// background search thread behind a plain `Arc` with no interior locking.
use compact_str::CompactString;

/// Lightweight index into the arena `Vec<FileNode>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Create a new `NodeIndex` from a `usize`.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "NodeIndex overflow");
        Self(index as u32)
    }

    /// Return the index as a `usize` for Vec indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A leaf (file) or branch (folder) in the tree.
///
/// Children form an ordered singly-linked list via `first_child` /
/// `next_sibling`; `last_child` makes appends O(1) while keeping insertion
/// order, which is the order the search walker visits them in.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// File or folder name only (NOT the full path).
    pub name: CompactString,

    /// Byte length for leaves. For branches this is the sum of all
    /// descendant leaf sizes after [`FileTree::aggregate_sizes`].
    ///
    /// [`FileTree::aggregate_sizes`]: super::FileTree::aggregate_sizes
    pub size: u64,

    /// `true` if this node is a branch (folder).
    pub is_dir: bool,

    /// `true` if the node has no backing file on disk.
    /// Virtual leaves are visited by the search but never scanned.
    pub is_virtual: bool,

    /// Index of the parent node. `None` for roots.
    pub parent: Option<NodeIndex>,

    pub first_child: Option<NodeIndex>,
    pub last_child: Option<NodeIndex>,
    pub next_sibling: Option<NodeIndex>,

    /// Number of descendant leaves. A leaf counts itself as one once
    /// aggregated, so the value can size a progress range directly.
    pub descendant_count: u64,
}

impl FileNode {
    /// Create a new file node with the given name and byte length.
    pub fn new_file(name: CompactString, size: u64, parent: Option<NodeIndex>) -> Self {
        Self {
            name,
            size,
            is_dir: false,
            is_virtual: false,
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
            descendant_count: 1,
        }
    }

    /// Create a new folder node.
    pub fn new_dir(name: CompactString, parent: Option<NodeIndex>) -> Self {
        Self {
            name,
            size: 0,
            is_dir: true,
            is_virtual: false,
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
            descendant_count: 0,
        }
    }

    /// Create a leaf with no physical file behind it.
    pub fn new_virtual(name: CompactString, parent: Option<NodeIndex>) -> Self {
        Self {
            is_virtual: true,
            ..Self::new_file(name, 0, parent)
        }
    }

    /// `true` for files, `false` for folders.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        !self.is_dir
    }
}
