// file: src/models/tree.rs
// description: in-memory repository tree produced by the ingestor
// reference: internal data structures

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Why a file is kept in the tree but never summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    Binary,
    Oversized,
}

impl SkipReason {
    pub fn describe(&self) -> &'static str {
        match self {
            SkipReason::Binary => "binary file",
            SkipReason::Oversized => "exceeds size ceiling",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    /// Path relative to the repository root, `/`-separated.
    pub path: PathBuf,
    #[serde(skip)]
    pub content: Vec<u8>,
    pub size: u64,
    pub language: Option<String>,
    pub skip: Option<SkipReason>,
}

impl FileNode {
    pub fn new(path: PathBuf, content: Vec<u8>, size: u64, language: Option<String>) -> Self {
        Self {
            path,
            content,
            size,
            language,
            skip: None,
        }
    }

    pub fn flagged(path: PathBuf, size: u64, language: Option<String>, reason: SkipReason) -> Self {
        Self {
            path,
            content: Vec::new(),
            size,
            language,
            skip: Some(reason),
        }
    }

    pub fn is_summarizable(&self) -> bool {
        self.skip.is_none()
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    /// Relative path of the immediate parent directory; empty for the root.
    pub fn parent(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.content);
        format!("{:x}", hasher.finalize())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    File(FileNode),
    Directory(DirectoryNode),
}

impl Node {
    pub fn path(&self) -> &Path {
        match self {
            Node::File(file) => &file.path,
            Node::Directory(dir) => &dir.path,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryNode {
    pub path: PathBuf,
    pub children: Vec<Node>,
}

impl DirectoryNode {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn is_root(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

/// Acyclic tree rooted at the repository root. Built once, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryTree {
    pub name: String,
    pub root: DirectoryNode,
}

impl RepositoryTree {
    pub fn new(name: String, root: DirectoryNode) -> Self {
        Self { name, root }
    }

    /// Files in depth-first order.
    pub fn files(&self) -> Vec<&FileNode> {
        let mut out = Vec::new();
        collect_files(&self.root, &mut out);
        out
    }

    /// Directories in depth-first pre-order, root first.
    pub fn directories(&self) -> Vec<&DirectoryNode> {
        let mut out = Vec::new();
        collect_dirs(&self.root, &mut out);
        out
    }

    pub fn file(&self, path: &Path) -> Option<&FileNode> {
        self.files().into_iter().find(|f| f.path == path)
    }

    pub fn file_count(&self) -> usize {
        self.files().len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files().iter().map(|f| f.size).sum()
    }
}

fn collect_files<'a>(dir: &'a DirectoryNode, out: &mut Vec<&'a FileNode>) {
    for child in &dir.children {
        match child {
            Node::File(file) => out.push(file),
            Node::Directory(sub) => collect_files(sub, out),
        }
    }
}

fn collect_dirs<'a>(dir: &'a DirectoryNode, out: &mut Vec<&'a DirectoryNode>) {
    out.push(dir);
    for child in &dir.children {
        if let Node::Directory(sub) = child {
            collect_dirs(sub, out);
        }
    }
}
