//! Virtual filesystem contracts and the in-memory adapter.

pub mod memory;
pub mod path;
pub mod service;
pub mod types;
