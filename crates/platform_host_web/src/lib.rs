//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! Only the flat key-value store has a browser adapter; the virtual filesystem and chat transport
//! are supplied by the embedding page.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;

pub use storage::local_kv::LocalStorageKeyValueStore;
