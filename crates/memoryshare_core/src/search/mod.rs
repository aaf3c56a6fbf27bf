//! Read-side queries over the memory list.
//!
//! # Responsibility
//! - Text and tag filtering for the home list.
//! - Month counts and map projections.
//!
//! # Invariants
//! - Pure functions over borrowed slices; input order is preserved.

pub mod filter;
pub mod map;
