//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable key-value contract used by the persistence adapter.
//! - Isolate SQLite query details from store/business orchestration.

pub mod kv_repo;
