/// Depth-first tree walker that feeds every leaf in scope to the byte
/// scanner.
///
/// The walker runs entirely on the search thread. It reports through an
/// `emit` callback that returns `false` once nobody is listening any more;
/// that is treated exactly like cancellation.
///
/// # Poll points
///
/// The cancel token is checked before each scope root, before descending
/// into each folder, and before each leaf. A leaf already being scanned is
/// allowed to finish (the scanner itself polls between windows), but a match
/// found after cancellation is never posted.
///
/// # Progress unit
///
/// One unit per leaf, whether it was scanned, skipped for lack of a backing
/// file, or failed with an I/O error. Folders do not count. The total is the
/// scope's leaf count, so the counter ends exactly at its maximum.
use crate::config::SearchConfig;
use crate::model::{FileTree, NodeIndex};
use crate::search::bytes;
use crate::search::cancel::CancelToken;
use crate::search::pattern::Pattern;
use crate::search::progress::SearchProgress;
use std::ops::ControlFlow;
use tracing::{trace, warn};

/// The ordered set of roots a search is confined to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchScope(Vec<NodeIndex>);

impl SearchScope {
    pub fn new(roots: Vec<NodeIndex>) -> Self {
        Self(roots)
    }

    /// A scope of exactly one root.
    pub fn single(root: NodeIndex) -> Self {
        Self(vec![root])
    }

    pub fn roots(&self) -> &[NodeIndex] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total leaves under every root: the progress range for one run.
    pub fn leaf_count(&self, tree: &FileTree) -> u64 {
        self.0.iter().map(|&r| tree.leaf_count(r)).sum()
    }

    /// Total leaf bytes under every root.
    pub fn byte_size(&self, tree: &FileTree) -> u64 {
        self.0.iter().map(|&r| tree.size(r)).sum()
    }
}

/// Running totals for one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Leaves visited (the progress counter value).
    pub visited: u64,
    pub matches: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    Completed(WalkStats),
    Cancelled(WalkStats),
}

pub struct TreeWalker<'a, E>
where
    E: FnMut(SearchProgress) -> bool,
{
    tree: &'a FileTree,
    pattern: &'a Pattern,
    cancel: &'a CancelToken,
    window: usize,
    stride: u64,
    emit: E,
    stats: WalkStats,
    last_posted: u64,
}

impl<'a, E> TreeWalker<'a, E>
where
    E: FnMut(SearchProgress) -> bool,
{
    pub fn new(
        tree: &'a FileTree,
        pattern: &'a Pattern,
        cancel: &'a CancelToken,
        config: &SearchConfig,
        emit: E,
    ) -> Self {
        Self {
            tree,
            pattern,
            cancel,
            window: config.window_size,
            stride: config.progress_stride.max(1),
            emit,
            stats: WalkStats::default(),
            last_posted: 0,
        }
    }

    /// Visit every leaf under every root in `scope`, in order.
    pub fn walk(mut self, scope: &SearchScope) -> WalkOutcome {
        for &root in scope.roots() {
            if self.visit(root).is_break() {
                return WalkOutcome::Cancelled(self.stats);
            }
        }
        match self.flush_progress() {
            ControlFlow::Continue(()) => WalkOutcome::Completed(self.stats),
            ControlFlow::Break(()) => WalkOutcome::Cancelled(self.stats),
        }
    }

    fn visit(&mut self, node: NodeIndex) -> ControlFlow<()> {
        if self.cancel.is_cancelled() {
            return ControlFlow::Break(());
        }

        let tree = self.tree;
        if tree.node(node).is_leaf() {
            return self.visit_leaf(node);
        }

        for child in tree.children(node) {
            self.visit(child)?;
        }
        self.flush_progress()
    }

    fn visit_leaf(&mut self, node: NodeIndex) -> ControlFlow<()> {
        self.stats.visited += 1;

        match self.tree.physical_file(node) {
            None => trace!("No backing file for {}", self.tree.full_path(node)),
            Some(path) => {
                match bytes::contains_pattern_windowed(self.pattern, &path, self.window, self.cancel)
                {
                    Ok(true) => {
                        if self.cancel.is_cancelled() {
                            return ControlFlow::Break(());
                        }
                        self.stats.matches += 1;
                        self.post(SearchProgress::Match(node))?;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        warn!("Error during text search in {}: {err}", path.display());
                        self.stats.errors += 1;
                        self.post(SearchProgress::Error {
                            path: path.to_string_lossy().into_owned(),
                            message: err.to_string(),
                        })?;
                    }
                }
            }
        }

        if self.stats.visited % self.stride == 0 {
            self.flush_progress()?;
        }
        ControlFlow::Continue(())
    }

    /// Post the visited count if it moved since the last post.
    fn flush_progress(&mut self) -> ControlFlow<()> {
        if self.stats.visited == self.last_posted {
            return ControlFlow::Continue(());
        }
        self.last_posted = self.stats.visited;
        self.post(SearchProgress::Progress {
            visited: self.stats.visited,
        })
    }

    fn post(&mut self, msg: SearchProgress) -> ControlFlow<()> {
        if (self.emit)(msg) {
            ControlFlow::Continue(())
        } else {
            self.cancel.cancel();
            ControlFlow::Break(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileNode;
    use compact_str::CompactString;
    use std::path::Path;

    fn config(stride: u64) -> SearchConfig {
        SearchConfig {
            progress_stride: stride,
            ..SearchConfig::default()
        }
    }

    /// root/
    ///   A.txt  "hello world"
    ///   B.txt  "goodbye"
    ///   nested/
    ///     C.txt  "a world apart"
    ///   ghost   (virtual)
    fn build(dir: &Path) -> (FileTree, NodeIndex) {
        std::fs::write(dir.join("A.txt"), b"hello world").unwrap();
        std::fs::write(dir.join("B.txt"), b"goodbye").unwrap();
        std::fs::create_dir(dir.join("nested")).unwrap();
        std::fs::write(dir.join("nested").join("C.txt"), b"a world apart").unwrap();

        let mut tree = FileTree::with_capacity(8);
        let root = tree.add_root(CompactString::new("root"), Some(dir.to_path_buf()));
        for name in ["A.txt", "B.txt"] {
            let f = tree.add_node(FileNode::new_file(CompactString::new(name), 0, Some(root)));
            tree.add_child(root, f);
        }
        let nested = tree.add_node(FileNode::new_dir(CompactString::new("nested"), Some(root)));
        tree.add_child(root, nested);
        let c = tree.add_node(FileNode::new_file(CompactString::new("C.txt"), 0, Some(nested)));
        tree.add_child(nested, c);
        let ghost = tree.add_node(FileNode::new_virtual(CompactString::new("ghost"), Some(root)));
        tree.add_child(root, ghost);
        tree.aggregate_sizes();
        (tree, root)
    }

    fn run(
        tree: &FileTree,
        scope: &SearchScope,
        pattern: &[u8],
        cancel: &CancelToken,
        stride: u64,
    ) -> (WalkOutcome, Vec<SearchProgress>) {
        let pattern = Pattern::new(pattern).unwrap();
        let mut posted = Vec::new();
        let outcome = TreeWalker::new(tree, &pattern, cancel, &config(stride), |msg| {
            posted.push(msg);
            true
        })
        .walk(scope);
        (outcome, posted)
    }

    fn names(tree: &FileTree, posted: &[SearchProgress]) -> Vec<String> {
        posted
            .iter()
            .filter_map(|m| match m {
                SearchProgress::Match(idx) => Some(tree.node(*idx).name.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_finds_matches_depth_first_in_child_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (tree, root) = build(tmp.path());
        let (outcome, posted) =
            run(&tree, &SearchScope::single(root), b"wor", &CancelToken::new(), 1);

        assert_eq!(names(&tree, &posted), vec!["A.txt", "C.txt"]);
        assert_eq!(
            outcome,
            WalkOutcome::Completed(WalkStats {
                visited: 4,
                matches: 2,
                errors: 0
            })
        );
    }

    #[test]
    fn test_progress_is_monotonic_and_ends_at_leaf_count() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (tree, root) = build(tmp.path());
        let scope = SearchScope::single(root);
        let (_, posted) = run(&tree, &scope, b"wor", &CancelToken::new(), 3);

        let visits: Vec<u64> = posted
            .iter()
            .filter_map(|m| match m {
                SearchProgress::Progress { visited } => Some(*visited),
                _ => None,
            })
            .collect();
        assert!(visits.windows(2).all(|w| w[0] < w[1]), "{visits:?}");
        assert_eq!(visits.last().copied(), Some(scope.leaf_count(&tree)));
    }

    #[test]
    fn test_single_folder_finds_only_matching_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("A.txt"), b"hello world").unwrap();
        std::fs::write(tmp.path().join("B.txt"), b"goodbye").unwrap();
        let tree = FileTree::load(tmp.path()).unwrap();
        let scope = SearchScope::single(tree.roots[0]);

        let (_, posted) = run(&tree, &scope, b"wor", &CancelToken::new(), 1);
        assert_eq!(names(&tree, &posted), vec!["A.txt"]);
    }

    #[test]
    fn test_unreadable_leaf_is_reported_and_walk_continues() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (mut tree, root) = build(tmp.path());
        let gone = tree.add_node(FileNode::new_file(CompactString::new("gone.txt"), 0, Some(root)));
        tree.add_child(root, gone);
        tree.aggregate_sizes();

        let (outcome, posted) =
            run(&tree, &SearchScope::single(root), b"wor", &CancelToken::new(), 1);
        assert!(posted
            .iter()
            .any(|m| matches!(m, SearchProgress::Error { path, .. } if path.ends_with("gone.txt"))));
        assert_eq!(
            outcome,
            WalkOutcome::Completed(WalkStats {
                visited: 5,
                matches: 2,
                errors: 1
            })
        );
    }

    #[test]
    fn test_cancelled_before_start_visits_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (tree, root) = build(tmp.path());
        let cancel = CancelToken::new();
        cancel.cancel();
        let (outcome, posted) = run(&tree, &SearchScope::single(root), b"wor", &cancel, 1);
        assert_eq!(outcome, WalkOutcome::Cancelled(WalkStats::default()));
        assert!(posted.is_empty());
    }

    #[test]
    fn test_cancellation_bounds_overshoot_in_wide_folder() {
        let mut tree = FileTree::with_capacity(5_001);
        let root = tree.add_root(CompactString::new("wide"), None);
        for i in 0..5_000 {
            let leaf = tree.add_node(FileNode::new_virtual(
                CompactString::new(format!("n{i}")),
                Some(root),
            ));
            tree.add_child(root, leaf);
        }
        tree.aggregate_sizes();

        let pattern = Pattern::new(b"x").unwrap();
        let cancel = CancelToken::new();
        let outcome = TreeWalker::new(&tree, &pattern, &cancel, &config(1), |msg| {
            if let SearchProgress::Progress { visited } = msg {
                if visited >= 10 {
                    cancel.cancel();
                }
            }
            true
        })
        .walk(&SearchScope::single(root));

        match outcome {
            WalkOutcome::Cancelled(stats) => assert_eq!(stats.visited, 10),
            other => panic!("expected cancellation, got {other:?}"),
        }
    }

    #[test]
    fn test_no_match_posted_after_cancellation() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut tree = FileTree::with_capacity(64);
        let root = tree.add_root(CompactString::new("all"), Some(tmp.path().to_path_buf()));
        for i in 0..50 {
            let name = format!("f{i:02}.txt");
            std::fs::write(tmp.path().join(&name), b"match me").unwrap();
            let f = tree.add_node(FileNode::new_file(CompactString::new(&name), 8, Some(root)));
            tree.add_child(root, f);
        }
        tree.aggregate_sizes();

        let pattern = Pattern::new(b"match").unwrap();
        let cancel = CancelToken::new();
        let mut matches = 0;
        let mut after_cancel = 0;
        let outcome = TreeWalker::new(&tree, &pattern, &cancel, &config(1), |msg| {
            if let SearchProgress::Match(_) = msg {
                if cancel.is_cancelled() {
                    after_cancel += 1;
                }
                matches += 1;
                if matches == 10 {
                    cancel.cancel();
                }
            }
            true
        })
        .walk(&SearchScope::single(root));

        assert!(matches!(outcome, WalkOutcome::Cancelled(_)));
        assert_eq!(matches, 10);
        assert_eq!(after_cancel, 0);
    }

    #[test]
    fn test_dropped_listener_stops_walk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (tree, root) = build(tmp.path());
        let pattern = Pattern::new(b"wor").unwrap();
        let cancel = CancelToken::new();
        let outcome = TreeWalker::new(&tree, &pattern, &cancel, &config(1), |_| false)
            .walk(&SearchScope::single(root));
        assert!(matches!(outcome, WalkOutcome::Cancelled(_)));
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_scope_totals() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (tree, root) = build(tmp.path());
        let nested = tree.children(root).nth(2).unwrap();
        let scope = SearchScope::new(vec![root, nested]);
        assert_eq!(scope.leaf_count(&tree), 5);
        assert_eq!(scope.roots().len(), 2);
        assert!(SearchScope::new(Vec::new()).is_empty());
    }
}
