// file: src/document/tree_diagram.rs
// description: box-drawing text diagram of the repository tree
// reference: internal data structures

use crate::models::{DirectoryNode, Node, RepositoryTree};

pub fn render_tree(tree: &RepositoryTree, max_depth: usize) -> String {
    let mut out = format!("{}/\n", tree.name);
    render_children(&tree.root, "", 1, max_depth.max(1), &mut out);
    out.truncate(out.trim_end().len());
    out
}

fn render_children(dir: &DirectoryNode, prefix: &str, depth: usize, max_depth: usize, out: &mut String) {
    let count = dir.children.len();
    for (i, child) in dir.children.iter().enumerate() {
        let last = i + 1 == count;
        let branch = if last { "└── " } else { "├── " };
        let indent = if last { "    " } else { "│   " };

        match child {
            Node::File(file) => {
                out.push_str(&format!("{}{}{}\n", prefix, branch, file.name()));
            }
            Node::Directory(sub) => {
                out.push_str(&format!("{}{}{}/\n", prefix, branch, sub.name()));
                let child_prefix = format!("{}{}", prefix, indent);
                if depth >= max_depth {
                    if !sub.children.is_empty() {
                        out.push_str(&format!("{}└── ...\n", child_prefix));
                    }
                } else {
                    render_children(sub, &child_prefix, depth + 1, max_depth, out);
                }
            }
        }
    }
}
