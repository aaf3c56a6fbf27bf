//! Flutter-facing bindings for MemoryShare core.

pub mod api;
