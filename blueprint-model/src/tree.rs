use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeNodeKind {
    File,
    Directory,
}

/// Project file tree returned by `POST /api/project/structure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub kind: TreeNodeKind,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Counts `(files, directories)` across the whole subtree, self included.
    pub fn totals(&self) -> (usize, usize) {
        let mut files = 0;
        let mut dirs = 0;
        self.walk(&mut |node| match node.kind {
            TreeNodeKind::File => files += 1,
            TreeNodeKind::Directory => dirs += 1,
        });
        (files, dirs)
    }

    /// Longest path from this node to a leaf, in edges.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    fn walk(&self, visit: &mut impl FnMut(&TreeNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
