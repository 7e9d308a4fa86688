//! Flat key-value persistence contracts.

pub mod kv;
