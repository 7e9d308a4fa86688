//! In-memory virtual filesystem used by tests and hosts without durable storage.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use super::{
    path::{normalize_virtual_path, parent_virtual_path},
    service::{VirtualFsFuture, VirtualFsService},
    types::{FsEntry, ROOT_DIR, TRASH_DIR},
};

const SEED_DIRECTORIES: [&str; 6] = [
    ROOT_DIR,
    "/Applications",
    "/Documents",
    "/Images",
    "/Music",
    TRASH_DIR,
];

#[derive(Debug)]
struct MemoryFsState {
    entries: BTreeMap<String, FsEntry>,
    trashed: Vec<FsEntry>,
    current_dir: String,
}

#[derive(Debug, Clone)]
/// Virtual filesystem held in memory; clones share the same tree.
pub struct MemoryVirtualFs {
    inner: Rc<RefCell<MemoryFsState>>,
}

impl Default for MemoryVirtualFs {
    fn default() -> Self {
        let entries = SEED_DIRECTORIES
            .iter()
            .map(|path| (path.to_string(), FsEntry::directory(path)))
            .collect();
        Self {
            inner: Rc::new(RefCell::new(MemoryFsState {
                entries,
                trashed: Vec::new(),
                current_dir: ROOT_DIR.to_string(),
            })),
        }
    }
}

impl MemoryVirtualFs {
    /// Creates a filesystem seeded with the standard top-level folders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a directory (and missing parents) synchronously.
    pub fn with_directory(self, path: &str) -> Self {
        let path = normalize_virtual_path(path);
        {
            let mut state = self.inner.borrow_mut();
            let mut current = String::new();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                current.push('/');
                current.push_str(segment);
                state
                    .entries
                    .entry(current.clone())
                    .or_insert_with(|| FsEntry::directory(&current));
            }
        }
        self
    }

    /// Seeds a text file synchronously, creating missing parent directories.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        let path = normalize_virtual_path(path);
        let this = self.with_directory(&parent_virtual_path(&path));
        this.inner
            .borrow_mut()
            .entries
            .insert(path.clone(), FsEntry::file(&path, content));
        this
    }

    /// Entries moved to the trash, oldest first, with their original paths.
    pub fn trashed(&self) -> Vec<FsEntry> {
        self.inner.borrow().trashed.clone()
    }

    /// Number of entries currently in the tree (directories included).
    pub fn entry_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Directory most recently passed to [`VirtualFsService::navigate`].
    pub fn current_dir(&self) -> String {
        self.inner.borrow().current_dir.clone()
    }

    fn children_of(state: &MemoryFsState, dir: &str) -> Vec<FsEntry> {
        state
            .entries
            .values()
            .filter(|entry| entry.path != ROOT_DIR && parent_virtual_path(&entry.path) == dir)
            .cloned()
            .collect()
    }

    fn list_dir(&self, path: &str) -> Result<Vec<FsEntry>, String> {
        let path = normalize_virtual_path(path);
        let state = self.inner.borrow();
        match state.entries.get(&path) {
            Some(entry) if entry.is_directory => Ok(Self::children_of(&state, &path)),
            Some(_) => Err(format!("not a directory: {path}")),
            None => Err(format!("no such directory: {path}")),
        }
    }
}

impl VirtualFsService for MemoryVirtualFs {
    fn list<'a>(&'a self, path: &'a str) -> VirtualFsFuture<'a, Result<Vec<FsEntry>, String>> {
        Box::pin(async move { self.list_dir(path) })
    }

    fn navigate<'a>(
        &'a self,
        path: &'a str,
    ) -> VirtualFsFuture<'a, Result<Vec<FsEntry>, String>> {
        Box::pin(async move {
            let listing = self.list_dir(path)?;
            self.inner.borrow_mut().current_dir = normalize_virtual_path(path);
            Ok(listing)
        })
    }

    fn stat<'a>(&'a self, path: &'a str) -> VirtualFsFuture<'a, Result<Option<FsEntry>, String>> {
        Box::pin(async move {
            let path = normalize_virtual_path(path);
            Ok(self.inner.borrow().entries.get(&path).cloned())
        })
    }

    fn save<'a>(&'a self, entry: FsEntry) -> VirtualFsFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let path = normalize_virtual_path(&entry.path);
            if path == ROOT_DIR {
                return Err("cannot overwrite the root directory".to_string());
            }
            let parent = parent_virtual_path(&path);
            let mut state = self.inner.borrow_mut();
            match state.entries.get(&parent) {
                Some(dir) if dir.is_directory => {}
                _ => return Err(format!("no such directory: {parent}")),
            }
            state.entries.insert(path.clone(), FsEntry { path, ..entry });
            Ok(())
        })
    }

    fn move_to_trash<'a>(&'a self, path: &'a str) -> VirtualFsFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let path = normalize_virtual_path(path);
            if path == ROOT_DIR || path == TRASH_DIR {
                return Err(format!("cannot move {path} to the trash"));
            }
            let mut state = self.inner.borrow_mut();
            let Some(entry) = state.entries.remove(&path) else {
                return Err(format!("no such file or directory: {path}"));
            };
            let nested_prefix = format!("{path}/");
            state
                .entries
                .retain(|key, _| !key.starts_with(&nested_prefix));
            let trash_path = format!("{TRASH_DIR}/{}", entry.name);
            state.entries.insert(
                trash_path.clone(),
                FsEntry {
                    path: trash_path,
                    ..entry.clone()
                },
            );
            state.trashed.push(entry);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    fn names(entries: &[FsEntry]) -> Vec<String> {
        entries.iter().map(|entry| entry.name.clone()).collect()
    }

    #[test]
    fn seeded_root_lists_top_level_folders() {
        let fs = MemoryVirtualFs::new();
        let listing = block_on(fs.list("/")).expect("list root");
        assert_eq!(
            names(&listing),
            vec!["Applications", "Documents", "Images", "Music", "Trash"]
        );
    }

    #[test]
    fn navigate_rejects_files_and_missing_paths() {
        let fs = MemoryVirtualFs::new().with_file("/Documents/a.txt", "hi");
        assert!(block_on(fs.navigate("/Documents/a.txt")).is_err());
        assert!(block_on(fs.navigate("/Nope")).is_err());
        assert_eq!(fs.current_dir(), "/");

        let listing = block_on(fs.navigate("/Documents")).expect("navigate");
        assert_eq!(names(&listing), vec!["a.txt"]);
        assert_eq!(fs.current_dir(), "/Documents");
    }

    #[test]
    fn save_requires_existing_parent_directory() {
        let fs = MemoryVirtualFs::new();
        let err = block_on(fs.save(FsEntry::file("/Missing/a.txt", ""))).expect_err("no parent");
        assert!(err.contains("/Missing"));

        block_on(fs.save(FsEntry::file("/Documents/a.txt", "body"))).expect("save");
        let entry = block_on(fs.stat("/Documents/a.txt"))
            .expect("stat")
            .expect("exists");
        assert_eq!(entry.content.as_deref(), Some("body"));
    }

    #[test]
    fn move_to_trash_relocates_entry_and_drops_children() {
        let fs = MemoryVirtualFs::new()
            .with_file("/Documents/Sub/inner.txt", "x")
            .with_file("/Documents/keep.txt", "y");
        block_on(fs.move_to_trash("/Documents/Sub")).expect("trash");

        assert_eq!(block_on(fs.stat("/Documents/Sub")).expect("stat"), None);
        assert_eq!(
            block_on(fs.stat("/Documents/Sub/inner.txt")).expect("stat"),
            None
        );
        assert!(block_on(fs.stat("/Trash/Sub")).expect("stat").is_some());
        assert_eq!(fs.trashed().len(), 1);
        assert_eq!(fs.trashed()[0].path, "/Documents/Sub");
        assert!(block_on(fs.move_to_trash("/")).is_err());
    }
}
