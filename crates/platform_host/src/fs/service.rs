//! Virtual filesystem service contract.

use std::{future::Future, pin::Pin};

use super::types::FsEntry;

/// Object-safe boxed future used by [`VirtualFsService`] async methods.
pub type VirtualFsFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service for the virtual filesystem browsed by the terminal and file browser.
pub trait VirtualFsService {
    /// Lists the entries directly inside the directory at `path`.
    fn list<'a>(&'a self, path: &'a str) -> VirtualFsFuture<'a, Result<Vec<FsEntry>, String>>;

    /// Makes `path` the backend's current directory and returns its listing.
    ///
    /// Fails when `path` does not exist or is not a directory.
    fn navigate<'a>(&'a self, path: &'a str)
        -> VirtualFsFuture<'a, Result<Vec<FsEntry>, String>>;

    /// Returns the entry at `path`, or `None` when nothing exists there.
    fn stat<'a>(&'a self, path: &'a str) -> VirtualFsFuture<'a, Result<Option<FsEntry>, String>>;

    /// Creates or overwrites an entry.
    fn save<'a>(&'a self, entry: FsEntry) -> VirtualFsFuture<'a, Result<(), String>>;

    /// Moves the entry at `path` (and its children) into the trash.
    fn move_to_trash<'a>(&'a self, path: &'a str) -> VirtualFsFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Virtual filesystem adapter for hosts without storage.
pub struct NoopVirtualFs;

impl NoopVirtualFs {
    fn unsupported_error(op: &str) -> String {
        format!("virtual fs unavailable: {op}")
    }
}

impl VirtualFsService for NoopVirtualFs {
    fn list<'a>(&'a self, _path: &'a str) -> VirtualFsFuture<'a, Result<Vec<FsEntry>, String>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn navigate<'a>(
        &'a self,
        _path: &'a str,
    ) -> VirtualFsFuture<'a, Result<Vec<FsEntry>, String>> {
        Box::pin(async { Err(Self::unsupported_error("navigate")) })
    }

    fn stat<'a>(&'a self, _path: &'a str) -> VirtualFsFuture<'a, Result<Option<FsEntry>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save<'a>(&'a self, _entry: FsEntry) -> VirtualFsFuture<'a, Result<(), String>> {
        Box::pin(async { Err(Self::unsupported_error("save")) })
    }

    fn move_to_trash<'a>(&'a self, _path: &'a str) -> VirtualFsFuture<'a, Result<(), String>> {
        Box::pin(async { Err(Self::unsupported_error("move_to_trash")) })
    }
}
