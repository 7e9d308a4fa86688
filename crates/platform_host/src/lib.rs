//! Typed host-domain contracts shared by the ryOS desktop core crates.
//!
//! This crate is the boundary for platform services. It exposes the virtual filesystem contract
//! consumed by the terminal interpreter, the flat key-value persistence contract used for window
//! geometry and command history, and time helpers. Browser adapters live in `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod fs;
pub mod storage;
pub mod time;

pub use fs::memory::MemoryVirtualFs;
pub use fs::path::{join_virtual_path, normalize_virtual_path, parent_virtual_path};
pub use fs::service::{NoopVirtualFs, VirtualFsFuture, VirtualFsService};
pub use fs::types::{FsEntry, DOCUMENTS_DIR, ROOT_DIR, TRASH_DIR};
pub use storage::kv::{
    load_json_with, save_json_with, KeyValueFuture, KeyValueStore, MemoryKeyValueStore,
    NoopKeyValueStore,
};
pub use time::{next_monotonic_timestamp_ms, unix_time_ms_now};
