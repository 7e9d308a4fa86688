//! Virtual filesystem data types shared across host contracts and implementations.

use serde::{Deserialize, Serialize};

/// Root of the virtual filesystem.
pub const ROOT_DIR: &str = "/";
/// Canonical documents directory used by the text editor.
pub const DOCUMENTS_DIR: &str = "/Documents";
/// Directory that receives trashed entries.
pub const TRASH_DIR: &str = "/Trash";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One file or directory reported by the virtual filesystem.
pub struct FsEntry {
    /// Base name of the entry.
    pub name: String,
    /// Full normalized path.
    pub path: String,
    /// Whether the entry is a directory.
    pub is_directory: bool,
    /// Text content (files only, `None` when never written).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Icon path shown by file browsers.
    pub icon: String,
    /// Coarse entry type such as `directory`, `text` or `html`.
    #[serde(rename = "type")]
    pub file_type: String,
}

impl FsEntry {
    /// Builds a directory entry for `path`.
    pub fn directory(path: &str) -> Self {
        Self {
            name: base_name(path),
            path: path.to_string(),
            is_directory: true,
            content: None,
            icon: "/icons/directory.png".to_string(),
            file_type: "directory".to_string(),
        }
    }

    /// Builds a file entry for `path` with `content`.
    pub fn file(path: &str, content: impl Into<String>) -> Self {
        let name = base_name(path);
        let file_type = file_type_for(&name);
        Self {
            icon: icon_for(file_type).to_string(),
            name,
            path: path.to_string(),
            is_directory: false,
            content: Some(content.into()),
            file_type: file_type.to_string(),
        }
    }
}

fn base_name(path: &str) -> String {
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("/")
        .to_string()
}

fn file_type_for(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        "html"
    } else if lower.ends_with(".md") {
        "markdown"
    } else {
        "text"
    }
}

fn icon_for(file_type: &str) -> &'static str {
    match file_type {
        "html" => "/icons/html.png",
        "markdown" => "/icons/markdown.png",
        _ => "/icons/file-text.png",
    }
}
