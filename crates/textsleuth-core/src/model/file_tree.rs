/// Arena-backed search tree with O(n) bottom-up size aggregation.
///
/// All nodes live in a single `Vec<FileNode>`. The search engine treats a
/// built tree as read-only: it only iterates children, asks leaf/branch,
/// reads sizes and resolves leaves to physical files.
use super::file_node::{FileNode, NodeIndex};
use compact_str::CompactString;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A tree of files and folders that a search can be scoped to.
#[derive(Debug, Clone, Default)]
pub struct FileTree {
    /// Arena: every node in a flat vector.
    pub nodes: Vec<FileNode>,

    /// Root node indices, in insertion order.
    pub roots: Vec<NodeIndex>,

    /// On-disk location of each root, parallel to `roots`.
    /// `None` marks a purely virtual root.
    root_paths: Vec<Option<PathBuf>>,
}

impl FileTree {
    /// Create an empty tree with pre-allocated capacity.
    pub fn with_capacity(estimated_nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(estimated_nodes),
            roots: Vec::new(),
            root_paths: Vec::new(),
        }
    }

    /// Build a tree from a real directory or a single file.
    ///
    /// Directories are walked with `jwalk` in sorted order, so children
    /// appear in name order. Only regular files become leaves: FIFOs,
    /// sockets, devices and symlinks are left out, since opening or reading
    /// them can block forever. Entries that cannot be read are logged and
    /// left out too; only a missing or unsearchable `root` is an error.
    pub fn load(root: &Path) -> io::Result<Self> {
        let meta = std::fs::metadata(root)?;
        let name = root_display_name(root);

        if !meta.is_dir() {
            if !meta.is_file() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} is not a regular file or directory", root.display()),
                ));
            }
            let mut tree = Self::with_capacity(1);
            tree.add_root_node(
                FileNode::new_file(CompactString::new(&name), meta.len(), None),
                Some(root.to_path_buf()),
            );
            return Ok(tree);
        }

        let mut tree = Self::with_capacity(1_024);
        let root_idx = tree.add_root(CompactString::new(&name), Some(root.to_path_buf()));

        let mut dir_map: HashMap<PathBuf, NodeIndex> = HashMap::new();
        dir_map.insert(root.to_path_buf(), root_idx);

        let walker = jwalk::WalkDir::new(root)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
            .parallelism(jwalk::Parallelism::RayonNewPool(num_cpus::get()));

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    warn!("Skipping unreadable entry: {err}");
                    continue;
                }
            };
            if entry.depth == 0 {
                continue;
            }

            let path = entry.path();
            let Some(parent_idx) = path.parent().and_then(|p| dir_map.get(p)).copied() else {
                // The parent folder itself was skipped.
                continue;
            };
            let file_name = entry.file_name().to_string_lossy();

            let file_type = entry.file_type();
            if file_type.is_dir() {
                let idx = tree.add_node(FileNode::new_dir(
                    CompactString::new(file_name.as_ref()),
                    Some(parent_idx),
                ));
                tree.add_child(parent_idx, idx);
                dir_map.insert(path, idx);
            } else if !file_type.is_file() {
                debug!("Skipping non-regular entry {}", path.display());
            } else {
                let size = match std::fs::symlink_metadata(&path) {
                    Ok(meta) => meta.len(),
                    Err(err) => {
                        warn!("Cannot stat {}: {err}", path.display());
                        continue;
                    }
                };
                let idx = tree.add_node(FileNode::new_file(
                    CompactString::new(file_name.as_ref()),
                    size,
                    Some(parent_idx),
                ));
                tree.add_child(parent_idx, idx);
            }
        }

        tree.aggregate_sizes();
        debug!(
            "Loaded {} nodes ({} leaves) from {}",
            tree.len(),
            tree.leaf_count(root_idx),
            root.display()
        );
        Ok(tree)
    }

    /// Allocate a new node in the arena and return its index.
    pub fn add_node(&mut self, node: FileNode) -> NodeIndex {
        let idx = NodeIndex::new(self.nodes.len());
        self.nodes.push(node);
        idx
    }

    /// Add a root folder. `path` is where the folder lives on disk.
    pub fn add_root(&mut self, name: CompactString, path: Option<PathBuf>) -> NodeIndex {
        self.add_root_node(FileNode::new_dir(name, None), path)
    }

    /// Add an arbitrary node (typically a single file) as a root.
    pub fn add_root_node(&mut self, node: FileNode, path: Option<PathBuf>) -> NodeIndex {
        let idx = self.add_node(node);
        self.roots.push(idx);
        self.root_paths.push(path);
        idx
    }

    /// Attach `child` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.nodes[child.idx()].parent = Some(parent);
        self.nodes[child.idx()].next_sibling = None;
        match self.nodes[parent.idx()].last_child {
            Some(last) => self.nodes[last.idx()].next_sibling = Some(child),
            None => self.nodes[parent.idx()].first_child = Some(child),
        }
        self.nodes[parent.idx()].last_child = Some(child);
    }

    /// Compute branch sizes and leaf counts in a single bottom-up pass.
    ///
    /// Children are always inserted after their parent in the arena, so a
    /// reverse pass visits every child before its parent. Safe to call
    /// repeatedly.
    pub fn aggregate_sizes(&mut self) {
        for node in self.nodes.iter_mut() {
            if node.is_dir {
                node.size = 0;
                node.descendant_count = 0;
            }
        }

        for i in (0..self.nodes.len()).rev() {
            let node = &self.nodes[i];
            let (size, count, parent) = (node.size, node.descendant_count, node.parent);
            if let Some(parent_idx) = parent {
                let parent = &mut self.nodes[parent_idx.idx()];
                parent.size += size;
                parent.descendant_count += count;
            }
        }
    }

    /// Iterate the direct children of `parent` in insertion order.
    pub fn children(&self, parent: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(self.nodes[parent.idx()].first_child, move |idx| {
            self.nodes[idx.idx()].next_sibling
        })
    }

    /// Resolve a leaf to the file backing it.
    ///
    /// Returns `None` for folders, virtual leaves, and leaves under a root
    /// that has no on-disk location.
    pub fn physical_file(&self, index: NodeIndex) -> Option<PathBuf> {
        let node = self.node(index);
        if node.is_dir || node.is_virtual {
            return None;
        }

        let mut segments = Vec::new();
        let mut current = index;
        while let Some(parent) = self.nodes[current.idx()].parent {
            segments.push(self.nodes[current.idx()].name.as_str());
            current = parent;
        }

        let slot = self.roots.iter().position(|&r| r == current)?;
        let mut path = self.root_paths[slot].clone()?;
        for segment in segments.iter().rev() {
            path.push(segment);
        }
        Some(path)
    }

    /// Display path for a node: root name followed by each segment.
    pub fn full_path(&self, index: NodeIndex) -> String {
        let mut segments = Vec::new();
        let mut current = Some(index);
        while let Some(idx) = current {
            segments.push(self.nodes[idx.idx()].name.as_str());
            current = self.nodes[idx.idx()].parent;
        }
        segments.reverse();
        segments.join(std::path::MAIN_SEPARATOR_STR)
    }

    /// Total leaf-byte extent of a node.
    #[inline]
    pub fn size(&self, index: NodeIndex) -> u64 {
        self.node(index).size
    }

    /// Number of leaves at or below a node.
    #[inline]
    pub fn leaf_count(&self, index: NodeIndex) -> u64 {
        self.node(index).descendant_count
    }

    /// Get the node at the given index.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> &FileNode {
        &self.nodes[index.idx()]
    }

    /// Total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree contains no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Derive a display name for a tree root.
fn root_display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => path.to_string_lossy().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> (FileTree, NodeIndex, NodeIndex, NodeIndex) {
        let mut tree = FileTree::with_capacity(8);
        let root = tree.add_root(CompactString::new("proj"), Some(PathBuf::from("/data/proj")));
        let dir = tree.add_node(FileNode::new_dir(CompactString::new("src"), Some(root)));
        tree.add_child(root, dir);
        let a = tree.add_node(FileNode::new_file(CompactString::new("a.txt"), 100, Some(dir)));
        tree.add_child(dir, a);
        let b = tree.add_node(FileNode::new_file(CompactString::new("b.txt"), 200, Some(dir)));
        tree.add_child(dir, b);
        tree.aggregate_sizes();
        (tree, root, dir, a)
    }

    #[test]
    fn test_tree_aggregation() {
        let (tree, root, dir, _) = sample_tree();
        assert_eq!(tree.size(dir), 300);
        assert_eq!(tree.size(root), 300);
        assert_eq!(tree.leaf_count(dir), 2);
        assert_eq!(tree.leaf_count(root), 2);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let (mut tree, root, _, _) = sample_tree();
        tree.aggregate_sizes();
        tree.aggregate_sizes();
        assert_eq!(tree.size(root), 300);
        assert_eq!(tree.leaf_count(root), 2);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let (tree, _, dir, a) = sample_tree();
        let names: Vec<&str> = tree
            .children(dir)
            .map(|c| tree.node(c).name.as_str())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(tree.children(dir).next(), Some(a));
        assert_eq!(tree.children(a).count(), 0);
    }

    #[test]
    fn test_physical_file_resolution() {
        let (tree, root, dir, a) = sample_tree();
        assert_eq!(
            tree.physical_file(a),
            Some(PathBuf::from("/data/proj").join("src").join("a.txt"))
        );
        assert_eq!(tree.physical_file(dir), None);
        assert_eq!(tree.physical_file(root), None);
    }

    #[test]
    fn test_virtual_leaf_has_no_file() {
        let (mut tree, root, _, _) = sample_tree();
        let v = tree.add_node(FileNode::new_virtual(CompactString::new("ghost"), Some(root)));
        tree.add_child(root, v);
        tree.aggregate_sizes();
        assert!(tree.node(v).is_leaf());
        assert_eq!(tree.physical_file(v), None);
        assert_eq!(tree.leaf_count(root), 3);
    }

    #[test]
    fn test_root_without_location_has_no_files() {
        let mut tree = FileTree::with_capacity(2);
        let root = tree.add_root(CompactString::new("virtual"), None);
        let f = tree.add_node(FileNode::new_file(CompactString::new("x"), 1, Some(root)));
        tree.add_child(root, f);
        assert_eq!(tree.physical_file(f), None);
    }

    #[test]
    fn test_full_path() {
        let (tree, _, _, a) = sample_tree();
        let sep = std::path::MAIN_SEPARATOR_STR;
        assert_eq!(tree.full_path(a), format!("proj{sep}src{sep}a.txt"));
    }

    #[test]
    fn test_load_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("b.txt"), b"12345").unwrap();
        std::fs::write(tmp.path().join("a.txt"), b"123").unwrap();
        std::fs::write(tmp.path().join("sub").join("c.txt"), b"1").unwrap();

        let tree = FileTree::load(tmp.path()).unwrap();
        let root = tree.roots[0];
        assert_eq!(tree.leaf_count(root), 3);
        assert_eq!(tree.size(root), 9);

        let names: Vec<&str> = tree
            .children(root)
            .map(|c| tree.node(c).name.as_str())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);

        let a = tree.children(root).next().unwrap();
        assert_eq!(tree.physical_file(a), Some(tmp.path().join("a.txt")));
    }

    #[test]
    fn test_load_single_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("only.bin");
        std::fs::write(&file, b"abcdef").unwrap();

        let tree = FileTree::load(&file).unwrap();
        let root = tree.roots[0];
        assert!(tree.node(root).is_leaf());
        assert_eq!(tree.leaf_count(root), 1);
        assert_eq!(tree.physical_file(root), Some(file));
    }

    #[cfg(unix)]
    #[test]
    fn test_load_skips_fifos_and_symlinks() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.txt"), b"hello world").unwrap();
        let status = std::process::Command::new("mkfifo")
            .arg(tmp.path().join("pipe"))
            .status()
            .unwrap();
        assert!(status.success());
        std::os::unix::fs::symlink(tmp.path().join("a.txt"), tmp.path().join("link")).unwrap();

        let tree = FileTree::load(tmp.path()).unwrap();
        let root = tree.roots[0];
        let names: Vec<&str> = tree
            .children(root)
            .map(|c| tree.node(c).name.as_str())
            .collect();
        assert_eq!(names, vec!["a.txt"]);
        assert_eq!(tree.leaf_count(root), 1);

        // A FIFO root cannot be searched at all.
        assert!(FileTree::load(&tmp.path().join("pipe")).is_err());
    }

    #[test]
    fn test_load_missing_path_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(FileTree::load(&tmp.path().join("nope")).is_err());
    }
}
