//! Parent-child index over a flat node list.
//!
//! The tree is re-derived from paths on every pass: each node's parent is
//! found by stripping the last path segment, and children are stored as
//! indices into the node slice rather than references.

use std::collections::HashMap;

use dirmanifest_core::{Node, RollupError};

/// Direct-children index keyed by position in the node slice.
#[derive(Debug, Clone)]
pub struct TreeIndex {
    children: Vec<Vec<usize>>,
    depths: Vec<u32>,
}

impl TreeIndex {
    /// Build the index. Fails on duplicate paths.
    pub fn build(nodes: &[Node]) -> Result<Self, RollupError> {
        let mut by_path = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            if by_path.insert(node.path.clone(), idx).is_some() {
                return Err(RollupError::DuplicatePath {
                    path: node.path.clone(),
                });
            }
        }

        let mut children = vec![Vec::new(); nodes.len()];
        for (idx, node) in nodes.iter().enumerate() {
            // Orphans (parent missing from the set) are simply never visited
            let Some(parent) = node.parent() else {
                continue;
            };
            if let Some(&parent_idx) = by_path.get(parent) {
                children[parent_idx].push(idx);
            }
        }

        let depths = nodes.iter().map(Node::depth).collect();

        Ok(Self { children, depths })
    }

    /// Direct children of the node at `idx`.
    pub fn children(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    /// Number of direct children of `idx` that are directories.
    pub fn direct_subdir_count(&self, nodes: &[Node], idx: usize) -> u64 {
        self.children[idx]
            .iter()
            .filter(|&&child| nodes[child].is_dir)
            .count() as u64
    }

    /// Set `direct_subdir_count` on every directory.
    pub fn assign_direct_subdir_counts(&self, nodes: &mut [Node]) {
        for idx in 0..nodes.len() {
            if nodes[idx].is_dir {
                let count = self.direct_subdir_count(nodes, idx);
                nodes[idx].direct_subdir_count = Some(count);
            }
        }
    }

    /// Directory indices grouped by depth, deepest level first. Each level
    /// is sorted by path.
    pub fn levels(&self, nodes: &[Node]) -> Vec<Vec<usize>> {
        let mut by_depth: Vec<Vec<usize>> = Vec::new();
        for (idx, node) in nodes.iter().enumerate() {
            if !node.is_dir {
                continue;
            }
            let depth = self.depths[idx] as usize;
            if by_depth.len() <= depth {
                by_depth.resize_with(depth + 1, Vec::new);
            }
            by_depth[depth].push(idx);
        }

        by_depth.retain(|level| !level.is_empty());
        for level in &mut by_depth {
            level.sort_by(|&a, &b| nodes[a].path.cmp(&nodes[b].path));
        }
        by_depth.reverse();
        by_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(nodes: &[Node], path: &str) -> usize {
        nodes.iter().position(|n| n.path == path).unwrap()
    }

    fn sample_nodes() -> Vec<Node> {
        vec![
            Node::new_file("a/x.txt", 500),
            Node::new_directory("."),
            Node::new_directory("a"),
            Node::new_directory("a/b"),
            Node::new_file("top.md", 1),
            Node::new_file("orphan/y.txt", 3),
        ]
    }

    #[test]
    fn test_children_are_direct_only() {
        let nodes = sample_nodes();
        let index = TreeIndex::build(&nodes).unwrap();

        let root = position(&nodes, ".");
        let mut root_children: Vec<&str> = index
            .children(root)
            .iter()
            .map(|&i| nodes[i].path.as_str())
            .collect();
        root_children.sort();
        assert_eq!(root_children, vec!["a", "top.md"]);

        let a = position(&nodes, "a");
        assert_eq!(index.children(a).len(), 2);
    }

    #[test]
    fn test_orphans_are_not_children() {
        let nodes = sample_nodes();
        let index = TreeIndex::build(&nodes).unwrap();
        let orphan = position(&nodes, "orphan/y.txt");

        let visited = (0..nodes.len()).any(|i| index.children(i).contains(&orphan));
        assert!(!visited);
    }

    #[test]
    fn test_direct_subdir_counts() {
        let mut nodes = sample_nodes();
        let index = TreeIndex::build(&nodes).unwrap();
        index.assign_direct_subdir_counts(&mut nodes);

        assert_eq!(nodes[1].direct_subdir_count, Some(1));
        assert_eq!(nodes[2].direct_subdir_count, Some(1));
        assert_eq!(nodes[3].direct_subdir_count, Some(0));
        assert_eq!(nodes[0].direct_subdir_count, None);
    }

    #[test]
    fn test_levels_deepest_first() {
        let nodes = sample_nodes();
        let index = TreeIndex::build(&nodes).unwrap();
        let levels: Vec<Vec<&str>> = index
            .levels(&nodes)
            .into_iter()
            .map(|level| level.into_iter().map(|i| nodes[i].path.as_str()).collect())
            .collect();

        assert_eq!(levels, vec![vec!["a/b"], vec!["a"], vec!["."]]);
    }

    #[test]
    fn test_duplicate_paths_rejected() {
        let nodes = vec![Node::new_directory("a"), Node::new_file("a", 1)];
        assert_eq!(
            TreeIndex::build(&nodes).unwrap_err(),
            RollupError::DuplicatePath {
                path: "a".to_string()
            }
        );
    }
}
