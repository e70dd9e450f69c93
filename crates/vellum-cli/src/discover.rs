//! Markdown file discovery.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Collect Markdown files under `root`, sorted for stable processing order.
///
/// Hidden directories (`.git`, `.obsidian`, the reports directory) and
/// `node_modules` are not descended into. A file path is returned as is when
/// it is Markdown.
pub fn discover_markdown_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return if is_markdown_file(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_markdown_file(e.path()))
        .map(DirEntry::into_path)
        .collect();
    files.sort();
    files
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.') || name == "node_modules")
            .unwrap_or(false)
}

fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}
